// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # skos-forest
//!
//! Thesaurus-to-tree transform engine: folds SKOS triples into a resource
//! graph and turns it into a deterministic, serializable browse forest.
//!
//! ## Architecture
//!
//! - **Resource graph** (`graph`): streaming ingestion with type-state, list
//!   resolution and a freeze step
//! - **Forest** (`forest`): root selection, cycle-aware DFS, per-context
//!   deputies, sibling ordering and notation sorting
//! - **Engine** (`engine`): one transform from triples to [`forest::TransformOutput`]
//!
//! Data problems never abort a transform; they are collected as markup-safe
//! diagnostics in the output.
//!
//! ## Library usage
//!
//! ```no_run
//! use skos_forest::config::TransformConfig;
//! use skos_forest::engine::transform;
//! use skos_forest::graph::Triple;
//! use skos_forest::vocab::SKOS_BROADER;
//!
//! let triples = vec![
//!     Triple::iris("http://ex.org/dog", SKOS_BROADER, "http://ex.org/animal"),
//! ];
//! let output = transform(TransformConfig::classic(), &triples).unwrap();
//! assert_eq!(output.forest.root_iris(), vec!["http://ex.org/animal"]);
//! ```

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod forest;
pub mod graph;
pub mod notation;
pub mod vocab;
