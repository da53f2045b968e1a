//! RDF front-end adapter backed by oxigraph's parsers.
//!
//! Converts parsed quads into the engine's [`Triple`] shape. Graph names are
//! dropped; the engine only sees the default-graph view of the input.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Quad, Term};

use crate::error::InputError;

use super::{Literal, Node, Object, Triple};

/// Parse every statement of `reader` in the given syntax.
pub fn read_triples<R: Read>(reader: R, format: RdfFormat) -> Result<Vec<Triple>, InputError> {
    let mut triples = Vec::new();
    for quad in RdfParser::from_format(format).for_reader(reader) {
        let quad = quad.map_err(|e| InputError::Syntax {
            message: e.to_string(),
        })?;
        if let Some(triple) = convert(quad) {
            triples.push(triple);
        }
    }
    tracing::debug!(triples = triples.len(), format = %format, "parsed RDF input");
    Ok(triples)
}

/// Pick a parser from the file extension.
pub fn format_for_path(path: &Path) -> Result<RdfFormat, InputError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
            "owl" | "xml" => Some(RdfFormat::RdfXml),
            other => RdfFormat::from_extension(other),
        })
        .ok_or_else(|| InputError::UnknownFormat {
            path: path.display().to_string(),
        })
}

/// Parse a file, choosing the syntax from its extension unless given.
pub fn load_file(path: &Path, format: Option<RdfFormat>) -> Result<Vec<Triple>, InputError> {
    let format = match format {
        Some(format) => format,
        None => format_for_path(path)?,
    };
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), format = %format, "reading RDF input");
    read_triples(BufReader::new(file), format)
}

fn convert(quad: Quad) -> Option<Triple> {
    let subject = match Term::from(quad.subject) {
        Term::NamedNode(node) => Node::Iri(node.into_string()),
        Term::BlankNode(node) => Node::Blank(node.into_string()),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    let object = match quad.object {
        Term::NamedNode(node) => Object::Node(Node::Iri(node.into_string())),
        Term::BlankNode(node) => Object::Node(Node::Blank(node.into_string())),
        Term::Literal(literal) => Object::Literal(Literal {
            value: literal.value().to_string(),
            language: literal.language().map(str::to_string),
        }),
        // Triple terms carry nothing the engine can show.
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(Triple {
        subject,
        predicate: quad.predicate.into_string(),
        object,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::*;

    const TURTLE: &str = r#"
        @prefix skos: <http://www.w3.org/2004/02/skos/core#> .
        @prefix ex: <http://ex.org/> .

        ex:dog a skos:Concept ;
            skos:prefLabel "Dog"@en ;
            skos:notation "1.2" ;
            skos:broader ex:animal .

        ex:k skos:memberList ( ex:dog ) .
    "#;

    #[test]
    fn parses_turtle() {
        let triples = read_triples(TURTLE.as_bytes(), RdfFormat::Turtle).unwrap();
        let dog = Node::iri("http://ex.org/dog");
        assert!(triples.contains(&Triple::new(dog.clone(), RDF_TYPE, Node::iri(SKOS_CONCEPT))));
        assert!(triples.contains(&Triple::new(
            dog.clone(),
            SKOS_PREF_LABEL,
            Literal::tagged("Dog", "en")
        )));
        assert!(triples.contains(&Triple::new(dog, SKOS_NOTATION, Literal::plain("1.2"))));
        assert!(triples.iter().any(|t| t.predicate == RDF_FIRST));
        assert!(
            triples
                .iter()
                .any(|t| t.predicate == RDF_REST && t.object == Object::Node(Node::iri(RDF_NIL)))
        );
    }

    #[test]
    fn syntax_error_is_reported() {
        let err = read_triples("ex:a ex:b".as_bytes(), RdfFormat::Turtle).unwrap_err();
        assert!(matches!(err, InputError::Syntax { .. }));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(format_for_path(Path::new("a.ttl")).unwrap(), RdfFormat::Turtle);
        assert_eq!(format_for_path(Path::new("a.NT")).unwrap(), RdfFormat::NTriples);
        assert_eq!(format_for_path(Path::new("a.owl")).unwrap(), RdfFormat::RdfXml);
        assert!(matches!(
            format_for_path(Path::new("a.docx")),
            Err(InputError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/thesaurus.ttl"), None).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
