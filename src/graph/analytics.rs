//! Hierarchy analytics over a frozen resource graph.
//!
//! The broader/narrower scaffolding is copied into a petgraph [`DiGraph`]
//! (edges point from broader to narrower) so the standard algorithms can run
//! on it. Results are sorted for stable output.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::index::{GraphResult, ResourceGraph};
use super::resource::{ResourceId, ResourceType};

// ---------------------------------------------------------------------------
// Hierarchy graph
// ---------------------------------------------------------------------------

/// The narrower relation as a petgraph graph. Node weights are resource ids;
/// node `i` always holds `ResourceId` `i`.
pub fn hierarchy_graph(graph: &ResourceGraph) -> DiGraph<ResourceId, ()> {
    let mut dag = DiGraph::with_capacity(graph.len(), 0);
    for resource in graph.resources() {
        dag.add_node(resource.id());
    }
    for resource in graph.resources() {
        let from = NodeIndex::new(resource.id().index());
        for narrower in &resource.scaffold().narrower {
            dag.add_edge(from, NodeIndex::new(narrower.index()), ());
        }
    }
    dag
}

/// Whether the broader/narrower relation contains no cycle.
pub fn is_acyclic(graph: &ResourceGraph) -> bool {
    !is_cyclic_directed(&hierarchy_graph(graph))
}

// ---------------------------------------------------------------------------
// Cycle components
// ---------------------------------------------------------------------------

/// A strongly connected group of concepts, i.e. one or more hierarchy cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleComponent {
    /// Member IRIs, sorted.
    pub members: Vec<String>,
}

/// Strongly connected components of size two or more, plus self loops.
/// Sorted by size desc, then by first member.
pub fn cycle_components(graph: &ResourceGraph) -> GraphResult<Vec<CycleComponent>> {
    let dag = hierarchy_graph(graph);
    let mut components = Vec::new();
    for scc in tarjan_scc(&dag) {
        let cyclic = scc.len() > 1 || scc.iter().any(|idx| dag.contains_edge(*idx, *idx));
        if !cyclic {
            continue;
        }
        let mut members = Vec::with_capacity(scc.len());
        for idx in scc {
            members.push(graph.resource(dag[idx])?.node().to_string());
        }
        members.sort();
        components.push(CycleComponent { members });
    }
    components.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| a.members.cmp(&b.members))
    });
    Ok(components)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts per type plus hierarchy shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyStats {
    pub concepts: usize,
    pub schemes: usize,
    pub collections: usize,
    pub ordered_collections: usize,
    pub untyped: usize,
    /// Number of narrower edges.
    pub hierarchy_edges: usize,
    /// Concepts without a broader concept.
    pub top_level_concepts: usize,
    /// Length of the longest broader chain, ignoring cyclic parts.
    pub max_depth: usize,
    pub cycles: Vec<CycleComponent>,
}

/// Summarize a frozen graph.
pub fn hierarchy_stats(graph: &ResourceGraph) -> GraphResult<HierarchyStats> {
    let mut stats = HierarchyStats::default();
    for resource in graph.resources() {
        match resource.kind() {
            ResourceType::Concept => {
                stats.concepts += 1;
                if resource.scaffold().broader.is_empty() {
                    stats.top_level_concepts += 1;
                }
            }
            ResourceType::ConceptScheme => stats.schemes += 1,
            ResourceType::Collection => stats.collections += 1,
            ResourceType::OrderedCollection => stats.ordered_collections += 1,
            ResourceType::Unknown => stats.untyped += 1,
        }
        stats.hierarchy_edges += resource.scaffold().narrower.len();
    }
    stats.max_depth = max_depth(graph);
    stats.cycles = cycle_components(graph)?;
    Ok(stats)
}

/// Longest path (in nodes) through the condensation of the narrower graph.
fn max_depth(graph: &ResourceGraph) -> usize {
    let dag = hierarchy_graph(graph);
    // tarjan_scc yields components in reverse topological order, so every
    // component's successors are already measured when it is reached.
    let sccs = tarjan_scc(&dag);
    let mut component_of = vec![0usize; dag.node_count()];
    for (c, scc) in sccs.iter().enumerate() {
        for idx in scc {
            component_of[idx.index()] = c;
        }
    }
    let mut depth = vec![0usize; sccs.len()];
    for (c, scc) in sccs.iter().enumerate() {
        let mut below = 0;
        for idx in scc {
            for next in dag.neighbors(*idx) {
                let other = component_of[next.index()];
                if other != c {
                    below = below.max(depth[other]);
                }
            }
        }
        depth[c] = below + 1;
    }
    depth.into_iter().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformConfig;
    use crate::graph::Triple;
    use crate::vocab::*;

    fn ex(local: &str) -> String {
        format!("http://ex.org/{local}")
    }

    fn frozen(triples: &[Triple]) -> ResourceGraph {
        let mut g = ResourceGraph::new(&TransformConfig::classic());
        for t in triples {
            g.ingest(t).unwrap();
        }
        g.finish().unwrap();
        g
    }

    fn broader(child: &str, parent: &str) -> Triple {
        Triple::iris(&ex(child), SKOS_BROADER, &ex(parent))
    }

    #[test]
    fn tree_is_acyclic() {
        let g = frozen(&[broader("b", "a"), broader("c", "b"), broader("d", "a")]);
        assert!(is_acyclic(&g));
        let stats = hierarchy_stats(&g).unwrap();
        assert_eq!(stats.concepts, 4);
        assert_eq!(stats.hierarchy_edges, 3);
        assert_eq!(stats.top_level_concepts, 1);
        assert_eq!(stats.max_depth, 3);
        assert!(stats.cycles.is_empty());
    }

    #[test]
    fn finds_cycle_component() {
        let g = frozen(&[
            broader("b", "a"),
            broader("c", "b"),
            broader("a", "c"),
            broader("d", "c"),
        ]);
        assert!(!is_acyclic(&g));
        let cycles = cycle_components(&g).unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec![ex("a"), ex("b"), ex("c")]);
        // The cycle counts as one level above d.
        assert_eq!(hierarchy_stats(&g).unwrap().max_depth, 2);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = frozen(&[broader("a", "a")]);
        let cycles = cycle_components(&g).unwrap();
        assert_eq!(cycles, vec![CycleComponent { members: vec![ex("a")] }]);
    }

    #[test]
    fn empty_graph() {
        let g = frozen(&[]);
        let stats = hierarchy_stats(&g).unwrap();
        assert_eq!(stats, HierarchyStats::default());
    }
}
