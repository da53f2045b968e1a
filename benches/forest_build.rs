//! Benchmarks for forest construction.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use skos_forest::config::{NotationFormat, SortAxis, TransformConfig};
use skos_forest::engine::{ThesaurusEngine, transform};
use skos_forest::graph::{Literal, Triple};
use skos_forest::vocab::{SKOS_BROADER, SKOS_IN_SCHEME, SKOS_NOTATION, SKOS_PREF_LABEL};

/// Synthetic polyhierarchy: a tree of `width`-ary fan-out with every fourth
/// concept given a second parent, split across two schemes.
fn polyhierarchy(concepts: usize, width: usize) -> Vec<Triple> {
    let iri = |i: usize| format!("http://bench.example/c{i}");
    let mut triples = Vec::with_capacity(concepts * 5);
    for i in 0..concepts {
        let me = iri(i);
        triples.push(Triple::literal(&me, SKOS_PREF_LABEL, Literal::tagged(format!("Concept {i}"), "en")));
        triples.push(Triple::literal(&me, SKOS_NOTATION, Literal::plain(format!("{}.{}", i / width, i % width))));
        let scheme = if i % 2 == 0 { "http://bench.example/even" } else { "http://bench.example/odd" };
        triples.push(Triple::iris(&me, SKOS_IN_SCHEME, scheme));
        if i > 0 {
            triples.push(Triple::iris(&me, SKOS_BROADER, &iri((i - 1) / width)));
        }
        if i > width && i % 4 == 0 {
            triples.push(Triple::iris(&me, SKOS_BROADER, &iri(i / (width * 2))));
        }
    }
    triples
}

fn bench_ingest(c: &mut Criterion) {
    let triples = polyhierarchy(10_000, 8);
    c.bench_function("ingest_10k", |bench| {
        bench.iter(|| {
            let mut engine = ThesaurusEngine::new(TransformConfig::classic()).unwrap();
            engine.ingest_all(&triples).unwrap();
            engine.finish().unwrap();
            black_box(engine.graph().len())
        })
    });
}

fn bench_build_classic(c: &mut Criterion) {
    let triples = polyhierarchy(10_000, 8);
    c.bench_function("build_classic_10k", |bench| {
        bench.iter_batched(
            || {
                let mut engine = ThesaurusEngine::new(TransformConfig::classic()).unwrap();
                engine.ingest_all(&triples).unwrap();
                engine.finish().unwrap();
                engine
            },
            |engine| black_box(engine.build().unwrap()),
            BatchSize::LargeInput,
        )
    });
}

fn bench_full_schemes_notation(c: &mut Criterion) {
    let triples = polyhierarchy(10_000, 8);
    let config = TransformConfig::classic()
        .with_schemes(true)
        .with_notation(NotationFormat::Dotted, SortAxis::Notation);
    c.bench_function("transform_schemes_dotted_10k", |bench| {
        bench.iter(|| black_box(transform(config.clone(), &triples).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_ingest,
    bench_build_classic,
    bench_full_schemes_notation
);
criterion_main!(benches);
