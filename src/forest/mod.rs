//! Forest: the browse tree handed back to callers.
//!
//! Ownership in the output is strictly tree-shaped. A resource appears as an
//! *owned* [`TreeNode`] exactly once; every other place it is reachable from
//! gets a *reference* node (`reference == true`, no children).
//!
//! - **Ordering** ([`order`]): composite sibling key
//! - **Deputies** ([`deputy`]): context-scoped copies inside schemes/collections
//! - **Builder** ([`builder`]): root selection and cycle-aware DFS
//! - **Notation sorting** ([`notation_sort`]): optional secondary ranking

pub mod builder;
pub mod deputy;
pub mod notation_sort;
pub mod order;

use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::graph::resource::{ResourceType, ResourceView};
use crate::notation::NotationError;

/// One node of the output forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub view: ResourceView,
    /// Non-owning pointer to a node placed elsewhere in the forest.
    #[serde(default)]
    pub reference: bool,
    /// Explicit top concept of the scheme it is shown in.
    #[serde(default)]
    pub top_concept: bool,
    /// Siblings are presented in notation order.
    #[serde(default)]
    pub sort_by_notation: bool,
    /// Declared position inside an ordered collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Rank among siblings by notation, when notation sorting is offered but
    /// not the default order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notation_rank: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// An owned node.
    pub fn owned(view: ResourceView) -> Self {
        Self {
            view,
            reference: false,
            top_concept: false,
            sort_by_notation: false,
            position: None,
            notation_rank: None,
            children: Vec::new(),
        }
    }

    /// A non-owning reference node.
    pub fn reference(view: ResourceView) -> Self {
        let mut node = Self::owned(view);
        node.reference = true;
        node
    }

    pub fn iri(&self) -> &str {
        &self.view.iri
    }

    pub fn kind(&self) -> ResourceType {
        self.view.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.view.display_label()
    }

    /// IRIs of the direct children, in order.
    pub fn child_iris(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.iri()).collect()
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            visit(node);
            stack.extend(node.children.iter().rev());
        }
    }
}

// Dropping a long chain would otherwise recurse once per level.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Ordered top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    pub roots: Vec<TreeNode>,
}

impl Forest {
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    /// Visit every node in pre-order.
    pub fn for_each<'a>(&'a self, mut visit: impl FnMut(&'a TreeNode)) {
        for root in &self.roots {
            root.walk(&mut visit);
        }
    }

    /// Total number of nodes, references included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.for_each(|_| count += 1);
        count
    }

    /// Number of reference nodes.
    pub fn reference_count(&self) -> usize {
        let mut count = 0;
        self.for_each(|n| count += usize::from(n.reference));
        count
    }

    /// How many times each IRI appears as an owned node.
    pub fn owned_occurrences(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        self.for_each(|n| {
            if !n.reference {
                *counts.entry(n.iri()).or_insert(0) += 1;
            }
        });
        counts
    }

    /// First owned node with the given IRI.
    pub fn find(&self, iri: &str) -> Option<&TreeNode> {
        let mut found = None;
        self.for_each(|n| {
            if found.is_none() && !n.reference && n.iri() == iri {
                found = Some(n);
            }
        });
        found
    }

    /// IRIs of the roots, in order.
    pub fn root_iris(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.iri()).collect()
    }
}

/// Everything one transform hands back.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    pub forest: Forest,
    /// A back edge (true cycle) was found.
    pub cycle: bool,
    /// No reference nodes were needed.
    pub only_tree_edges: bool,
    /// Markup-safe data-error messages.
    pub diagnostics: Vec<String>,
    /// Set when notation sorting had to be abandoned.
    #[serde(serialize_with = "serialize_notation_error")]
    pub notation_error: Option<NotationError>,
}

impl TransformOutput {
    pub fn is_cycle(&self) -> bool {
        self.cycle
    }

    pub fn is_only_tree_edges(&self) -> bool {
        self.only_tree_edges
    }
}

fn serialize_notation_error<S: Serializer>(
    error: &Option<NotationError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.explanation()),
        None => serializer.serialize_none(),
    }
}
