//! Data-error accumulation.
//!
//! Malformed or inconsistent thesaurus data never aborts a transform. Each
//! problem becomes a [`DataIssue`] whose message has already been escaped for
//! embedding in HTML/XML, and processing continues with a locally safe choice.

use serde::{Deserialize, Serialize};

/// Classification of a recorded data problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// A type assertion contradicts the resource's settled type.
    TypeConflict,
    /// A literal appeared where an IRI or blank node is required.
    LiteralAsResource,
    /// A member list loops back on itself.
    ListCycle,
    /// `rdf:nil` used as a list element rather than as a terminator.
    ListTerminatorAsValue,
    /// A list node's head or tail was set twice to different values.
    ListConflict,
    /// A list node is missing its head or tail, or was never declared.
    ListBroken,
    /// `skos:memberList` and `skos:member` disagree.
    OrderedMembersMismatch,
    /// A collection member that cannot live in a collection.
    WrongMemberKind,
    /// An explicit top concept has a broader concept within its own scheme.
    TopConceptHasBroader,
    /// A back edge found during traversal.
    HierarchyCycle,
}

/// One recorded data problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIssue {
    pub kind: IssueKind,
    /// Markup-safe message.
    pub message: String,
}

/// Ordered list of data problems found during one transform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    issues: Vec<DataIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue. `message` must already be escaped; use [`escape_markup`]
    /// on every interpolated IRI or label.
    pub fn record(&mut self, kind: IssueKind, message: String) {
        tracing::warn!(?kind, "{message}");
        self.issues.push(DataIssue { kind, message });
    }

    pub fn issues(&self) -> &[DataIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Flatten into the message list handed to callers.
    pub fn into_messages(self) -> Vec<String> {
        self.issues.into_iter().map(|i| i.message).collect()
    }
}

/// Escape the five markup-significant characters.
pub fn escape_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
