//! Engine facade: top-level API for one thesaurus-to-tree transform.
//!
//! A [`ThesaurusEngine`] owns the resource graph for exactly one invocation:
//! triples are folded in one at a time, then [`ThesaurusEngine::build`]
//! freezes the graph, builds the forest and applies notation sorting.

use crate::config::TransformConfig;
use crate::error::SkosResult;
use crate::forest::builder::ForestBuilder;
use crate::forest::{Forest, TransformOutput, notation_sort};
use crate::graph::Triple;
use crate::graph::analytics::{self, HierarchyStats};
use crate::graph::index::ResourceGraph;

/// Single-use transform engine.
pub struct ThesaurusEngine {
    config: TransformConfig,
    graph: ResourceGraph,
}

impl ThesaurusEngine {
    /// Create an engine for the given configuration.
    pub fn new(config: TransformConfig) -> SkosResult<Self> {
        config.validate()?;
        tracing::info!(
            language = %config.primary_language,
            schemes = config.concept_schemes,
            collections = config.collections,
            resolve_urls = config.resolve_urls,
            notation = ?config.notation,
            "initializing thesaurus engine"
        );
        let graph = ResourceGraph::new(&config);
        Ok(Self { config, graph })
    }

    /// Fold one triple into the resource graph.
    pub fn ingest(&mut self, triple: &Triple) -> SkosResult<()> {
        Ok(self.graph.ingest(triple)?)
    }

    /// Fold a sequence of triples, in order. Returns how many were read.
    pub fn ingest_all<'a>(&mut self, triples: impl IntoIterator<Item = &'a Triple>) -> SkosResult<usize> {
        let mut count = 0;
        for triple in triples {
            self.graph.ingest(triple)?;
            count += 1;
        }
        Ok(count)
    }

    /// The resource graph as ingested so far.
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Resolve lists and freeze the graph. Idempotent.
    pub fn finish(&mut self) -> SkosResult<()> {
        if !self.graph.is_frozen() {
            self.graph.finish()?;
        }
        Ok(())
    }

    /// Hierarchy analytics over the frozen graph.
    pub fn stats(&mut self) -> SkosResult<HierarchyStats> {
        self.finish()?;
        Ok(analytics::hierarchy_stats(&self.graph)?)
    }

    /// Build the forest. Data problems end up in the output's diagnostics;
    /// only defects are returned as errors.
    pub fn build(mut self) -> SkosResult<TransformOutput> {
        self.finish()?;
        let mut diagnostics = self.graph.take_diagnostics();
        let outcome = ForestBuilder::new(&self.graph).build(&mut diagnostics)?;

        let mut roots = outcome.roots;
        let mut notation_error = None;
        if let Some(notation) = &self.config.notation {
            if let Err(err) = notation_sort::apply(&mut roots, notation) {
                tracing::warn!(error = %err, "notation sorting abandoned");
                notation_error = Some(err);
            }
        }

        let forest = Forest::new(roots);
        tracing::info!(
            roots = forest.roots.len(),
            nodes = forest.node_count(),
            references = forest.reference_count(),
            cycle = outcome.cycle,
            issues = diagnostics.len(),
            "forest built"
        );
        Ok(TransformOutput {
            forest,
            cycle: outcome.cycle,
            only_tree_edges: outcome.only_tree_edges,
            diagnostics: diagnostics.into_messages(),
            notation_error,
        })
    }
}

/// Run one complete transform.
pub fn transform<'a>(
    config: TransformConfig,
    triples: impl IntoIterator<Item = &'a Triple>,
) -> SkosResult<TransformOutput> {
    let mut engine = ThesaurusEngine::new(config)?;
    engine.ingest_all(triples)?;
    engine.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NotationFormat, SortAxis};
    use crate::error::{ConfigError, SkosError};
    use crate::graph::Literal;
    use crate::vocab::*;

    fn ex(local: &str) -> String {
        format!("http://ex.org/{local}")
    }

    fn notated(local: &str, notation: &str) -> Triple {
        Triple::literal(&ex(local), SKOS_NOTATION, Literal::plain(notation))
    }

    fn sample() -> Vec<Triple> {
        vec![
            Triple::iris(&ex("a"), SKOS_BROADER, &ex("root")),
            Triple::iris(&ex("b"), SKOS_BROADER, &ex("root")),
            Triple::literal(&ex("a"), SKOS_PREF_LABEL, Literal::plain("Alpha")),
            Triple::literal(&ex("b"), SKOS_PREF_LABEL, Literal::plain("Beta")),
            notated("a", "1.10"),
            notated("b", "1.9"),
        ]
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TransformConfig::classic().with_language("");
        let err = ThesaurusEngine::new(config).err().unwrap();
        assert!(matches!(err, SkosError::Config(ConfigError::Invalid { .. })));
    }

    #[test]
    fn notation_default_axis_reorders() {
        let config = TransformConfig::classic().with_notation(NotationFormat::Dotted, SortAxis::Notation);
        let out = transform(config, &sample()).unwrap();
        let root = out.forest.find(&ex("root")).unwrap();
        assert_eq!(root.child_iris(), vec![ex("b").as_str(), ex("a").as_str()]);
        assert!(out.notation_error.is_none());
    }

    #[test]
    fn malformed_notation_keeps_label_order() {
        let mut triples = sample();
        triples.push(notated("b", "1.x"));
        let config = TransformConfig::classic().with_notation(NotationFormat::Dotted, SortAxis::Notation);
        let out = transform(config, &triples).unwrap();
        let root = out.forest.find(&ex("root")).unwrap();
        assert_eq!(root.child_iris(), vec![ex("a").as_str(), ex("b").as_str()]);
        assert!(root.children.iter().all(|c| !c.sort_by_notation));
        assert!(out.notation_error.is_some());
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn stats_then_build() {
        let mut engine = ThesaurusEngine::new(TransformConfig::classic()).unwrap();
        assert_eq!(engine.ingest_all(&sample()).unwrap(), 6);
        let stats = engine.stats().unwrap();
        assert_eq!(stats.concepts, 3);
        let out = engine.build().unwrap();
        assert_eq!(out.forest.node_count(), 3);
    }

    #[test]
    fn ingest_after_finish_fails() {
        let mut engine = ThesaurusEngine::new(TransformConfig::classic()).unwrap();
        engine.finish().unwrap();
        engine.finish().unwrap();
        assert!(engine.ingest(&sample()[0]).is_err());
    }

    #[test]
    fn deep_chain_builds_sorts_and_drops() {
        let depth = 50_000;
        let mut triples = Vec::with_capacity(depth * 2);
        for i in 0..depth {
            triples.push(Triple::iris(&ex(&format!("c{}", i + 1)), SKOS_BROADER, &ex(&format!("c{i}"))));
            triples.push(notated(&format!("c{i}"), "1"));
        }
        let config = TransformConfig::classic().with_notation(NotationFormat::Dotted, SortAxis::Notation);
        let output = transform(config, &triples).unwrap();
        assert_eq!(output.forest.root_iris(), vec![ex("c0")]);
        assert_eq!(output.forest.node_count(), depth + 1);
        assert!(output.notation_error.is_none());
        drop(output);
    }
}
