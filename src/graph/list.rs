//! List Resolver: rebuilds `rdf:first` / `rdf:rest` chains.
//!
//! List cells are collected during ingestion, but a chain can only be walked
//! once every cell is known, so resolution is a post-pass. Walking stops at
//! `rdf:nil`, at a cell that was already visited (a cycle), or at a broken
//! cell. Elements are deduplicated with first occurrence winning.

use std::collections::{HashMap, HashSet};

use crate::diagnostics::{Diagnostics, IssueKind, escape_markup};

use super::Node;

/// One list cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListNode {
    /// `rdf:first`. `rdf:nil` here is a modelling error caught at resolve time.
    pub first: Option<Node>,
    /// `rdf:rest`. `rdf:nil` terminates the list.
    pub rest: Option<Node>,
}

/// Store of list cells keyed by their IRI or blank identity.
#[derive(Debug, Clone, Default)]
pub struct ListResolver {
    cells: HashMap<Node, ListNode>,
}

impl ListResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, node: &Node) -> Option<&ListNode> {
        self.cells.get(node)
    }

    /// Record `cell rdf:first value`. Setting the head twice to different
    /// values keeps the first and records a conflict.
    pub fn set_first(&mut self, cell: &Node, value: Node, diagnostics: &mut Diagnostics) {
        let entry = self.cells.entry(cell.clone()).or_default();
        Self::set_once(&mut entry.first, value, cell, "rdf:first", diagnostics);
    }

    /// Record `cell rdf:rest next`.
    pub fn set_rest(&mut self, cell: &Node, next: Node, diagnostics: &mut Diagnostics) {
        let entry = self.cells.entry(cell.clone()).or_default();
        Self::set_once(&mut entry.rest, next, cell, "rdf:rest", diagnostics);
    }

    fn set_once(
        slot: &mut Option<Node>,
        value: Node,
        cell: &Node,
        what: &str,
        diagnostics: &mut Diagnostics,
    ) {
        match slot {
            None => *slot = Some(value),
            Some(existing) if *existing == value => {}
            Some(existing) => diagnostics.record(
                IssueKind::ListConflict,
                format!(
                    "List node {} has conflicting {what} values {} and {}; keeping the first.",
                    escape_markup(&cell.to_string()),
                    escape_markup(&existing.to_string()),
                    escape_markup(&value.to_string()),
                ),
            ),
        }
    }

    /// Walk the list starting at `head`, for the collection `owner`.
    ///
    /// Always returns the elements gathered before any problem was found.
    pub fn resolve(&self, owner: &Node, head: &Node, diagnostics: &mut Diagnostics) -> Vec<Node> {
        let mut elements = Vec::new();
        let mut seen_elements: HashSet<&Node> = HashSet::new();
        let mut visited: HashSet<&Node> = HashSet::new();
        let mut current = head;

        loop {
            if current.is_nil() {
                break;
            }
            if !visited.insert(current) {
                diagnostics.record(
                    IssueKind::ListCycle,
                    format!(
                        "Member list of {} loops back to list node {}.",
                        escape_markup(&owner.to_string()),
                        escape_markup(&current.to_string()),
                    ),
                );
                break;
            }
            let Some(cell) = self.cells.get(current) else {
                diagnostics.record(
                    IssueKind::ListBroken,
                    format!(
                        "Member list of {} refers to undeclared list node {}.",
                        escape_markup(&owner.to_string()),
                        escape_markup(&current.to_string()),
                    ),
                );
                break;
            };

            match &cell.first {
                Some(value) if value.is_nil() => diagnostics.record(
                    IssueKind::ListTerminatorAsValue,
                    format!(
                        "Member list of {} uses rdf:nil as an element at list node {}; \
                         rdf:nil may only terminate a list.",
                        escape_markup(&owner.to_string()),
                        escape_markup(&current.to_string()),
                    ),
                ),
                Some(value) => {
                    if seen_elements.insert(value) {
                        elements.push(value.clone());
                    }
                }
                None => diagnostics.record(
                    IssueKind::ListBroken,
                    format!(
                        "List node {} in the member list of {} has no rdf:first.",
                        escape_markup(&current.to_string()),
                        escape_markup(&owner.to_string()),
                    ),
                ),
            }

            match &cell.rest {
                Some(next) => current = next,
                None => {
                    diagnostics.record(
                        IssueKind::ListBroken,
                        format!(
                            "List node {} in the member list of {} has no rdf:rest; \
                             the list is cut off there.",
                            escape_markup(&current.to_string()),
                            escape_markup(&owner.to_string()),
                        ),
                    );
                    break;
                }
            }
        }

        elements
    }
}
