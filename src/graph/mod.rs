//! Resource Graph: the per-IRI node store fed by a stream of triples.
//!
//! - **Term model** (this module): [`Node`], [`Literal`], [`Object`], [`Triple`]
//! - **Resources** ([`resource`]): type-state, display fields, scaffolding edges
//! - **Ingestion** ([`index::ResourceGraph`]): one streaming pass, then a list
//!   post-pass and the freeze step
//! - **Lists** ([`list`]): `rdf:first` / `rdf:rest` reconstruction
//! - **Analytics** ([`analytics`]): hierarchy statistics via `petgraph`
//! - **RDF input** ([`rdf`]): file parsing via `oxigraph`

pub mod analytics;
pub mod index;
pub mod list;
pub mod rdf;
pub mod resource;

use serde::{Deserialize, Serialize};

/// An IRI or a blank node: anything that can be the subject of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    Iri(String),
    Blank(String),
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Node::Blank(id.into())
    }

    /// Whether this is the `rdf:nil` list terminator.
    pub fn is_nil(&self) -> bool {
        matches!(self, Node::Iri(iri) if iri == crate::vocab::RDF_NIL)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Iri(iri) => write!(f, "{iri}"),
            Node::Blank(id) => write!(f, "_:{id}"),
        }
    }
}

/// A literal with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }

    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: Some(language.into()),
        }
    }
}

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Object {
    Node(Node),
    Literal(Literal),
}

impl From<Node> for Object {
    fn from(node: Node) -> Self {
        Object::Node(node)
    }
}

impl From<Literal> for Object {
    fn from(literal: Literal) -> Self {
        Object::Literal(literal)
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Node(node) => write!(f, "{node}"),
            Object::Literal(Literal {
                value,
                language: Some(lang),
            }) => write!(f, "\"{value}\"@{lang}"),
            Object::Literal(Literal {
                value,
                language: None,
            }) => write!(f, "\"{value}\""),
        }
    }
}

/// One subject–predicate–object statement fed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Node,
    /// Predicate IRI; predicates outside [`crate::vocab::Predicate`] are ignored.
    pub predicate: String,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: Node, predicate: impl Into<String>, object: impl Into<Object>) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Triple between two IRIs.
    pub fn iris(subject: &str, predicate: &str, object: &str) -> Self {
        Self::new(Node::iri(subject), predicate, Node::iri(object))
    }

    /// Triple with an IRI subject and a literal object.
    pub fn literal(subject: &str, predicate: &str, literal: Literal) -> Self {
        Self::new(Node::iri(subject), predicate, literal)
    }
}
