//! Rich diagnostic error types for the skos-forest engine.
//!
//! Only *defects* and outer-surface failures (configuration files, RDF input
//! files) are Rust errors. Problems with the thesaurus data itself are
//! recorded in [`crate::diagnostics::Diagnostics`] and never abort a
//! transform. Notation format problems have their own
//! [`NotationError`](crate::notation::NotationError), which is reported in the
//! transform output rather than raised.

use miette::Diagnostic;
use thiserror::Error;

pub use crate::notation::NotationError;

/// Top-level error type for the skos-forest engine.
#[derive(Debug, Error, Diagnostic)]
pub enum SkosError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Notation(#[from] NotationError),
}

// ---------------------------------------------------------------------------
// Transform errors (defects)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TransformError {
    #[error("resource index {index} is not part of the graph ({len} resources)")]
    #[diagnostic(
        code(skos::transform::dangling_resource),
        help(
            "An edge points at a resource that does not exist. This is a bug in the \
             engine (the freeze step must remap every scaffolding edge); please file \
             a report with the input that triggered it."
        )
    )]
    DanglingResource { index: usize, len: usize },

    #[error("traversal frame for {iri} expected a context but had none")]
    #[diagnostic(
        code(skos::transform::missing_context),
        help("Deputy edges are only created inside scheme or collection frames. This is a bug.")
    )]
    MissingContext { iri: String },

    #[error("resource {iri} reached the forest builder with unresolved type")]
    #[diagnostic(
        code(skos::transform::untyped_resource),
        help(
            "Only typed resources may be scheduled for traversal. The root-of-interest \
             set is built from typed resources, so this indicates a bug."
        )
    )]
    UntypedResource { iri: String },

    #[error("triple ingested after the resource graph was frozen")]
    #[diagnostic(
        code(skos::transform::frozen),
        help(
            "All triples must be ingested before the graph is finished. Create a new \
             engine for another transform."
        )
    )]
    AlreadyFrozen,

    #[error("traversal stack underflow while closing {iri}")]
    #[diagnostic(
        code(skos::transform::stack_underflow),
        help("The depth-first traversal popped more frames than it pushed. This is a bug.")
    )]
    StackUnderflow { iri: String },

    #[error("predicate {predicate} was routed to the {handler} handler")]
    #[diagnostic(
        code(skos::transform::misrouted_predicate),
        help(
            "Triples are dispatched on whether their predicate expects a resource or \
             text. A predicate reaching the other handler is a bug in the vocabulary table."
        )
    )]
    MisroutedPredicate {
        predicate: String,
        handler: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read transform config: {path}")]
    #[diagnostic(
        code(skos::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse transform config: {path}: {message}")]
    #[diagnostic(
        code(skos::config::parse),
        help(
            "Check the TOML syntax. Recognised keys: primary_language, concept_schemes, \
             collections, resolve_urls and a [notation] table with format \
             (alpha|dotted|float) and default_axis (label|notation)."
        )
    )]
    Parse { path: String, message: String },

    #[error("failed to write transform config: {path}")]
    #[diagnostic(
        code(skos::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(skos::config::invalid), help("{message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Input errors (RDF front-end adapter)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InputError {
    #[error("failed to read RDF input: {path}")]
    #[diagnostic(
        code(skos::input::io),
        help("Ensure the input file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine RDF format of {path}")]
    #[diagnostic(
        code(skos::input::unknown_format),
        help(
            "Use a recognised extension (.ttl, .nt, .nq, .trig, .rdf, .owl) \
             or pass the format explicitly."
        )
    )]
    UnknownFormat { path: String },

    #[error("RDF syntax error: {message}")]
    #[diagnostic(
        code(skos::input::syntax),
        help("The input is not valid in the selected RDF syntax. Fix the file or pick another format.")
    )]
    Syntax { message: String },
}

/// Convenience alias for functions returning skos-forest results.
pub type SkosResult<T> = std::result::Result<T, SkosError>;
