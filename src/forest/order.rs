//! Sibling ordering.
//!
//! Children of one parent are ordered by a composite key:
//!
//! 1. declared position in an ordered collection (positioned items first)
//! 2. type category (see [`category`])
//! 3. explicit top concepts first
//! 4. case-insensitive display label, missing labels last
//! 5. IRI
//! 6. owned before reference
//!
//! The key is a strict total order over distinct children, so sorting and
//! deduplicating by it yields an ordered set.

use std::cmp::Ordering;

use crate::graph::resource::{Resource, ResourceType, ResourceView};

use super::TreeNode;

/// Fixed category table. References share the category of their type.
pub fn category(kind: ResourceType) -> u8 {
    match kind {
        ResourceType::ConceptScheme => 0,
        ResourceType::Collection | ResourceType::OrderedCollection => 1,
        ResourceType::Concept => 2,
        ResourceType::Unknown => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    position: Option<usize>,
    category: u8,
    top: bool,
    label: Option<String>,
    iri: String,
    reference: bool,
}

impl SortKey {
    pub fn new(
        view_label: Option<&str>,
        iri: String,
        kind: ResourceType,
        position: Option<usize>,
        top: bool,
        reference: bool,
    ) -> Self {
        Self {
            position,
            category: category(kind),
            top,
            label: view_label.map(str::to_lowercase),
            iri,
            reference,
        }
    }

    pub fn of_node(node: &TreeNode) -> Self {
        Self::of_view(&node.view, node.position, node.top_concept, node.reference)
    }

    pub fn of_view(view: &ResourceView, position: Option<usize>, top: bool, reference: bool) -> Self {
        Self::new(
            view.display_label(),
            view.iri.clone(),
            view.kind,
            position,
            top,
            reference,
        )
    }

    /// Key for a not-yet-materialized child, used to schedule traversal in
    /// display order.
    pub fn of_resource(resource: &Resource, position: Option<usize>, top: bool) -> Self {
        let view = resource.view();
        Self::of_view(&view, position, top, false)
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let position = match (self.position, other.position) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let label = match (&self.label, &other.label) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        position
            .then(self.category.cmp(&other.category))
            .then(other.top.cmp(&self.top))
            .then(label)
            .then_with(|| self.iri.cmp(&other.iri))
            .then(self.reference.cmp(&other.reference))
    }
}

/// Order siblings by [`SortKey`] and drop exact duplicates.
pub fn sort_siblings(nodes: &mut Vec<TreeNode>) {
    nodes.sort_by_cached_key(SortKey::of_node);
    nodes.dedup_by(|a, b| SortKey::of_node(a) == SortKey::of_node(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::resource::LangString;

    fn node(iri: &str, label: Option<&str>, kind: ResourceType) -> TreeNode {
        TreeNode::owned(ResourceView {
            iri: iri.into(),
            url: None,
            kind,
            pref_label: label.map(|l| LangString::new(l, None)),
            alt_label: None,
            title: None,
            rdfs_label: None,
            notation: None,
            definition: None,
            description: None,
        })
    }

    fn iris(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.iri()).collect()
    }

    #[test]
    fn labels_are_case_insensitive() {
        let mut v = vec![
            node("x:1", Some("banana"), ResourceType::Concept),
            node("x:2", Some("Apple"), ResourceType::Concept),
            node("x:3", Some("cherry"), ResourceType::Concept),
        ];
        sort_siblings(&mut v);
        assert_eq!(iris(&v), vec!["x:2", "x:1", "x:3"]);
    }

    #[test]
    fn missing_labels_last_ties_by_iri() {
        let mut v = vec![
            node("x:b", None, ResourceType::Concept),
            node("x:z", Some("Zebra"), ResourceType::Concept),
            node("x:a", None, ResourceType::Concept),
        ];
        sort_siblings(&mut v);
        assert_eq!(iris(&v), vec!["x:z", "x:a", "x:b"]);
    }

    #[test]
    fn position_overrides_everything() {
        let mut first = node("x:z", Some("zzz"), ResourceType::Concept);
        first.position = Some(0);
        let mut second = node("x:a", Some("aaa"), ResourceType::Collection);
        second.position = Some(1);
        let loose = node("x:s", Some("aaa"), ResourceType::ConceptScheme);
        let mut v = vec![loose, second, first];
        sort_siblings(&mut v);
        assert_eq!(iris(&v), vec!["x:z", "x:a", "x:s"]);
    }

    #[test]
    fn categories_then_top_flag() {
        let concept = node("x:c", Some("a"), ResourceType::Concept);
        let mut top = node("x:t", Some("z"), ResourceType::Concept);
        top.top_concept = true;
        let collection = node("x:k", Some("m"), ResourceType::OrderedCollection);
        let mut collection_ref = node("x:j", Some("n"), ResourceType::Collection);
        collection_ref.reference = true;
        let scheme = node("x:s", Some("zz"), ResourceType::ConceptScheme);
        let mut v = vec![concept, top, collection_ref, collection, scheme];
        sort_siblings(&mut v);
        assert_eq!(iris(&v), vec!["x:s", "x:k", "x:j", "x:t", "x:c"]);
    }

    #[test]
    fn owned_and_reference_are_distinct() {
        let owned = node("x:a", Some("a"), ResourceType::Concept);
        let mut reference = owned.clone();
        reference.reference = true;
        let mut v = vec![reference, owned.clone(), owned];
        sort_siblings(&mut v);
        assert_eq!(v.len(), 2);
        assert!(!v[0].reference);
        assert!(v[1].reference);
    }
}
