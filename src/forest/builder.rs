//! Forest Builder: root selection and cycle-aware depth-first traversal.
//!
//! Two identity sets drive the traversal:
//!
//! - `unvisited`: every typed resource not yet placed as an owned node
//! - `active`: the resources on the current DFS stack
//!
//! An edge into `unvisited` is a tree edge and opens a new frame. An edge into
//! `active` is a back edge (a true cycle) and yields a reference plus a
//! diagnostic. Any other edge is a cross or forward edge from a
//! polyhierarchy and yields a reference silently.
//!
//! The DFS is iterative: each frame keeps its not-yet-followed edges, so the
//! traversal itself never grows the call stack with the hierarchy's depth.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::diagnostics::{Diagnostics, IssueKind, escape_markup};
use crate::error::TransformError;
use crate::graph::index::{GraphResult, ResourceGraph};
use crate::graph::resource::{Resource, ResourceId, ResourceType};

use super::TreeNode;
use super::deputy::DeputyResolver;
use super::order::{SortKey, sort_siblings};

/// An edge waiting to be followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    target: ResourceId,
    /// Scheme or collection the target is shown in, if any.
    context: Option<ResourceId>,
    /// Declared position inside an ordered collection.
    position: Option<usize>,
}

impl Edge {
    fn master(target: ResourceId) -> Self {
        Self {
            target,
            context: None,
            position: None,
        }
    }

    fn within(target: ResourceId, context: ResourceId) -> Self {
        Self {
            target,
            context: Some(context),
            position: None,
        }
    }
}

/// One open node on the DFS stack.
struct Frame {
    id: ResourceId,
    node: TreeNode,
    /// Context this frame opened (schemes and collections only).
    opens: Option<ResourceId>,
    /// Remaining edges, last one is followed next.
    pending: Vec<Edge>,
}

enum EdgeClass {
    Tree,
    Back,
    Cross,
}

/// Result of one build pass.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub roots: Vec<TreeNode>,
    pub cycle: bool,
    pub only_tree_edges: bool,
}

/// Builds the forest for a frozen [`ResourceGraph`].
pub struct ForestBuilder<'g> {
    graph: &'g ResourceGraph,
    schemes: bool,
    collections: bool,
    unvisited: BTreeSet<ResourceId>,
    active: HashSet<ResourceId>,
    contexts: HashMap<ResourceId, DeputyResolver<'g>>,
    cycle: bool,
    only_tree_edges: bool,
}

impl<'g> ForestBuilder<'g> {
    pub fn new(graph: &'g ResourceGraph) -> Self {
        let config = graph.config();
        let unvisited = graph
            .resources()
            .iter()
            .filter(|r| r.kind().is_known())
            .map(Resource::id)
            .collect();
        Self {
            graph,
            schemes: config.concept_schemes,
            collections: config.collections,
            unvisited,
            active: HashSet::new(),
            contexts: HashMap::new(),
            cycle: false,
            only_tree_edges: true,
        }
    }

    /// Run root selection and the full traversal.
    pub fn build(mut self, diagnostics: &mut Diagnostics) -> GraphResult<BuildOutcome> {
        let planned = self.select_roots()?;
        tracing::debug!(roots = planned.len(), "root selection done");

        let mut roots = Vec::with_capacity(planned.len());
        for id in planned {
            if self.unvisited.contains(&id) {
                roots.push(self.grow(Edge::master(id), diagnostics)?);
            }
        }

        // Whatever is left sits on cycles no root reaches.
        while let Some(id) = self.unvisited.first().copied() {
            tracing::debug!(
                iri = %self.graph.resource(id)?.node(),
                "promoting unreachable resource to root"
            );
            roots.push(self.grow(Edge::master(id), diagnostics)?);
        }

        sort_siblings(&mut roots);
        Ok(BuildOutcome {
            roots,
            cycle: self.cycle,
            only_tree_edges: self.only_tree_edges,
        })
    }

    /// Roots in traversal order: concepts, then schemes, then top-level
    /// collections. Each group is in display order.
    fn select_roots(&self) -> GraphResult<Vec<ResourceId>> {
        let mut concepts = Vec::new();
        let mut schemes = Vec::new();
        let mut collections = Vec::new();
        for resource in self.graph.resources() {
            let key = SortKey::of_resource(resource, None, false);
            match resource.kind() {
                ResourceType::Concept if self.is_concept_root(resource)? => {
                    concepts.push((key, resource.id()))
                }
                ResourceType::ConceptScheme if self.schemes => schemes.push((key, resource.id())),
                ResourceType::Collection | ResourceType::OrderedCollection
                    if self.collections && resource.scaffold().in_collections.is_empty() =>
                {
                    collections.push((key, resource.id()))
                }
                _ => {}
            }
        }
        let mut planned = Vec::new();
        for mut group in [concepts, schemes, collections] {
            group.sort();
            planned.extend(group.into_iter().map(|(_, id)| id));
        }
        Ok(planned)
    }

    /// A concept is a master-level root when it belongs to no scheme, has no
    /// broader concept outside all schemes, and is in no collection. With
    /// schemes on, a collection member is still a root when one of its
    /// narrower concepts lies in no scheme.
    fn is_concept_root(&self, concept: &Resource) -> GraphResult<bool> {
        let scaffold = concept.scaffold();
        if self.schemes && !scaffold.in_schemes.is_empty() {
            return Ok(false);
        }
        for broader in &scaffold.broader {
            if self.graph.resource(*broader)?.scaffold().in_schemes.is_empty() {
                return Ok(false);
            }
        }
        if !self.collections || scaffold.in_collections.is_empty() {
            return Ok(true);
        }
        if !self.schemes {
            return Ok(false);
        }
        for narrower in &scaffold.narrower {
            if self.graph.resource(*narrower)?.scaffold().in_schemes.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn classify(&self, id: ResourceId) -> EdgeClass {
        if self.unvisited.contains(&id) {
            EdgeClass::Tree
        } else if self.active.contains(&id) {
            EdgeClass::Back
        } else {
            EdgeClass::Cross
        }
    }

    fn is_top(&self, edge: &Edge) -> bool {
        edge.context
            .and_then(|ctx| self.contexts.get(&ctx))
            .is_some_and(|resolver| resolver.is_top(edge.target))
    }

    /// Build the subtree owned by `root`.
    fn grow(&mut self, root: Edge, diagnostics: &mut Diagnostics) -> GraphResult<TreeNode> {
        let first = self.open(root)?;
        let root_iri = first.node.iri().to_string();
        let mut stack = vec![first];

        loop {
            let Some(frame) = stack.last_mut() else {
                return Err(TransformError::StackUnderflow { iri: root_iri });
            };

            if let Some(edge) = frame.pending.pop() {
                match self.classify(edge.target) {
                    EdgeClass::Tree => {
                        let child = self.open(edge)?;
                        stack.push(child);
                    }
                    EdgeClass::Back => {
                        self.cycle = true;
                        self.only_tree_edges = false;
                        let reference = self.reference(&edge)?;
                        diagnostics.record(
                            IssueKind::HierarchyCycle,
                            format!(
                                "Cycle detected: {} is an ancestor of {} and also listed below it; \
                                 shown as a reference.",
                                escape_markup(reference.iri()),
                                escape_markup(frame.node.iri()),
                            ),
                        );
                        frame.node.children.push(reference);
                    }
                    EdgeClass::Cross => {
                        self.only_tree_edges = false;
                        let reference = self.reference(&edge)?;
                        frame.node.children.push(reference);
                    }
                }
                continue;
            }

            // Members of a context that its roots never reached become extra
            // roots of that context, one at a time.
            if let Some(ctx) = frame.opens {
                if let Some(next) = self.leftover_member(ctx) {
                    frame.pending.push(Edge::within(next, ctx));
                    continue;
                }
            }

            let Some(done) = stack.pop() else {
                return Err(TransformError::StackUnderflow { iri: root_iri });
            };
            let node = self.close(done);
            match stack.last_mut() {
                Some(parent) => parent.node.children.push(node),
                None => return Ok(node),
            }
        }
    }

    fn leftover_member(&self, ctx: ResourceId) -> Option<ResourceId> {
        let resolver = self.contexts.get(&ctx)?;
        resolver
            .members()
            .iter()
            .copied()
            .find(|m| self.unvisited.contains(m))
    }

    /// Place `edge.target` as an owned node and collect its outgoing edges.
    fn open(&mut self, edge: Edge) -> GraphResult<Frame> {
        let graph = self.graph;
        let resource = graph.resource(edge.target)?;
        self.unvisited.remove(&edge.target);
        self.active.insert(edge.target);

        let mut node = TreeNode::owned(resource.view());
        node.position = edge.position;
        let mut opens = None;

        let edges = match resource.kind() {
            ResourceType::Unknown => {
                return Err(TransformError::UntypedResource {
                    iri: resource.node().to_string(),
                });
            }
            ResourceType::Concept => match edge.context {
                None => self.master_narrower(resource)?,
                Some(ctx) => {
                    let resolver =
                        self.contexts
                            .get_mut(&ctx)
                            .ok_or_else(|| TransformError::MissingContext {
                                iri: resource.node().to_string(),
                            })?;
                    let deputy = resolver.deputy(edge.target)?;
                    node.view = deputy.view.clone();
                    node.top_concept = deputy.top_concept;
                    deputy
                        .narrower
                        .iter()
                        .map(|n| Edge::within(*n, ctx))
                        .collect()
                }
            },
            ResourceType::ConceptScheme => {
                let mut resolver = DeputyResolver::for_context(graph, edge.target)?;
                let edges = resolver
                    .roots()?
                    .into_iter()
                    .map(|r| Edge::within(r, edge.target))
                    .collect();
                self.contexts.insert(edge.target, resolver);
                opens = Some(edge.target);
                edges
            }
            ResourceType::Collection | ResourceType::OrderedCollection => {
                let mut resolver = DeputyResolver::for_context(graph, edge.target)?;
                let edges = Self::collection_edges(graph, resource, &mut resolver)?;
                self.contexts.insert(edge.target, resolver);
                opens = Some(edge.target);
                edges
            }
        };

        let pending = self.schedule(edges)?;
        Ok(Frame {
            id: edge.target,
            node,
            opens,
            pending,
        })
    }

    /// Narrower edges at master level. With scheme handling on, concepts that
    /// belong to a scheme are only reachable through that scheme.
    fn master_narrower(&self, concept: &Resource) -> GraphResult<Vec<Edge>> {
        let mut edges = Vec::new();
        for narrower in &concept.scaffold().narrower {
            let child = self.graph.resource(*narrower)?;
            if self.schemes && !child.scaffold().in_schemes.is_empty() {
                continue;
            }
            edges.push(Edge::master(*narrower));
        }
        Ok(edges)
    }

    fn collection_edges(
        graph: &ResourceGraph,
        collection: &Resource,
        resolver: &mut DeputyResolver<'_>,
    ) -> GraphResult<Vec<Edge>> {
        let ctx = collection.id();
        let scaffold = collection.scaffold();
        let mut edges = Vec::new();

        if resolver.is_flat() {
            let ordered = scaffold.ordered_members.iter().flatten();
            for (position, member) in ordered.enumerate() {
                let context = resolver.contains(*member).then_some(ctx);
                edges.push(Edge {
                    target: *member,
                    context,
                    position: Some(position),
                });
            }
            return Ok(edges);
        }

        for member in &scaffold.members {
            match graph.resource(*member)?.kind() {
                ResourceType::Concept => {
                    if resolver.deputy(*member)?.broader.is_empty() {
                        edges.push(Edge::within(*member, ctx));
                    }
                }
                ResourceType::Collection | ResourceType::OrderedCollection => {
                    edges.push(Edge::master(*member));
                }
                ResourceType::ConceptScheme | ResourceType::Unknown => {}
            }
        }
        Ok(edges)
    }

    /// Order edges so they are followed in display order; the first to be
    /// followed ends up last in the vector.
    fn schedule(&self, edges: Vec<Edge>) -> GraphResult<Vec<Edge>> {
        let mut keyed = Vec::with_capacity(edges.len());
        for edge in edges {
            let resource = self.graph.resource(edge.target)?;
            let key = SortKey::of_resource(resource, edge.position, self.is_top(&edge));
            keyed.push((key, edge));
        }
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(keyed.into_iter().map(|(_, edge)| edge).collect())
    }

    fn reference(&self, edge: &Edge) -> GraphResult<TreeNode> {
        let resource = self.graph.resource(edge.target)?;
        let mut node = TreeNode::reference(resource.view());
        node.position = edge.position;
        node.top_concept = self.is_top(edge);
        Ok(node)
    }

    fn close(&mut self, frame: Frame) -> TreeNode {
        self.active.remove(&frame.id);
        if let Some(ctx) = frame.opens {
            self.contexts.remove(&ctx);
        }
        let mut node = frame.node;
        sort_siblings(&mut node.children);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformConfig;
    use crate::forest::Forest;
    use crate::graph::{Literal, Node, Triple};
    use crate::vocab::*;

    fn ex(local: &str) -> String {
        format!("http://ex.org/{local}")
    }

    fn build(config: TransformConfig, triples: &[Triple]) -> (BuildOutcome, Diagnostics) {
        let mut g = ResourceGraph::new(&config);
        for t in triples {
            g.ingest(t).unwrap();
        }
        g.finish().unwrap();
        let mut diags = Diagnostics::new();
        let outcome = ForestBuilder::new(&g).build(&mut diags).unwrap();
        (outcome, diags)
    }

    fn label(local: &str, text: &str) -> Triple {
        Triple::literal(&ex(local), SKOS_PREF_LABEL, Literal::plain(text))
    }

    fn broader(child: &str, parent: &str) -> Triple {
        Triple::iris(&ex(child), SKOS_BROADER, &ex(parent))
    }

    #[test]
    fn classic_roots_are_concepts_without_broader() {
        let (out, diags) = build(
            TransformConfig::classic(),
            &[
                broader("dog", "animal"),
                broader("cat", "animal"),
                label("animal", "Animal"),
                label("dog", "Dog"),
                label("cat", "Cat"),
                Triple::iris(&ex("rock"), RDF_TYPE, SKOS_CONCEPT),
            ],
        );
        let forest = Forest::new(out.roots);
        assert_eq!(forest.root_iris(), vec![ex("animal").as_str(), ex("rock").as_str()]);
        let animal = forest.find(&ex("animal")).unwrap();
        assert_eq!(animal.child_iris(), vec![ex("cat").as_str(), ex("dog").as_str()]);
        assert!(!out.cycle);
        assert!(out.only_tree_edges);
        assert!(diags.is_empty());
    }

    #[test]
    fn polyhierarchy_yields_reference_without_error() {
        let (out, diags) = build(
            TransformConfig::classic(),
            &[broader("c", "a"), broader("c", "b")],
        );
        let forest = Forest::new(out.roots);
        assert_eq!(forest.reference_count(), 1);
        assert_eq!(forest.owned_occurrences()[ex("c").as_str()], 1);
        assert!(!out.cycle);
        assert!(!out.only_tree_edges);
        assert!(diags.is_empty());
    }

    #[test]
    fn unreachable_cycle_is_promoted() {
        let (out, diags) = build(
            TransformConfig::classic(),
            &[broader("b", "a"), broader("c", "b"), broader("a", "c")],
        );
        let forest = Forest::new(out.roots);
        assert!(out.cycle);
        assert_eq!(diags.count(IssueKind::HierarchyCycle), 1);
        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.owned_occurrences().len(), 3);
        assert_eq!(forest.reference_count(), 1);
    }

    #[test]
    fn cycle_below_a_root() {
        let (out, diags) = build(
            TransformConfig::classic(),
            &[broader("a", "root"), broader("b", "a"), broader("a", "b")],
        );
        let forest = Forest::new(out.roots);
        assert_eq!(forest.root_iris(), vec![ex("root").as_str()]);
        assert!(out.cycle);
        assert_eq!(diags.count(IssueKind::HierarchyCycle), 1);
        let b = forest.find(&ex("b")).unwrap();
        assert!(b.children[0].reference);
        assert_eq!(b.children[0].iri(), ex("a"));
    }

    #[test]
    fn schemes_get_their_own_subtree() {
        let (out, diags) = build(
            TransformConfig::classic().with_schemes(true),
            &[
                Triple::iris(&ex("s"), RDF_TYPE, SKOS_CONCEPT_SCHEME),
                Triple::iris(&ex("a"), SKOS_TOP_CONCEPT_OF, &ex("s")),
                Triple::iris(&ex("b"), SKOS_IN_SCHEME, &ex("s")),
                broader("b", "a"),
                broader("loose", "a"),
            ],
        );
        let forest = Forest::new(out.roots);
        assert_eq!(forest.root_iris(), vec![ex("s").as_str(), ex("loose").as_str()]);
        let s = forest.find(&ex("s")).unwrap();
        assert_eq!(s.child_iris(), vec![ex("a").as_str()]);
        assert!(s.children[0].top_concept);
        assert_eq!(s.children[0].child_iris(), vec![ex("b").as_str()]);
        assert!(out.only_tree_edges);
        assert!(diags.is_empty());
    }

    #[test]
    fn cycle_inside_scheme_stays_in_scheme() {
        let (out, diags) = build(
            TransformConfig::classic().with_schemes(true),
            &[
                Triple::iris(&ex("a"), SKOS_IN_SCHEME, &ex("s")),
                Triple::iris(&ex("b"), SKOS_IN_SCHEME, &ex("s")),
                broader("a", "b"),
                broader("b", "a"),
            ],
        );
        let forest = Forest::new(out.roots);
        assert_eq!(forest.root_iris(), vec![ex("s").as_str()]);
        let s = forest.find(&ex("s")).unwrap();
        assert_eq!(s.child_iris(), vec![ex("a").as_str()]);
        assert!(out.cycle);
        assert_eq!(diags.count(IssueKind::HierarchyCycle), 1);
    }

    #[test]
    fn ordered_collection_keeps_declared_order() {
        let (out, _) = build(
            TransformConfig::classic().with_collections(true),
            &[
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("a")),
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("b")),
                Triple::iris(&ex("a"), RDF_TYPE, SKOS_CONCEPT),
                Triple::iris(&ex("b"), RDF_TYPE, SKOS_CONCEPT),
                label("a", "Alpha"),
                label("b", "Beta"),
                Triple::new(Node::iri(ex("k")), SKOS_MEMBER_LIST, Node::blank("l1")),
                Triple::new(Node::blank("l1"), RDF_FIRST, Node::iri(ex("b"))),
                Triple::new(Node::blank("l1"), RDF_REST, Node::blank("l2")),
                Triple::new(Node::blank("l2"), RDF_FIRST, Node::iri(ex("a"))),
                Triple::new(Node::blank("l2"), RDF_REST, Node::iri(RDF_NIL)),
            ],
        );
        let forest = Forest::new(out.roots);
        assert_eq!(forest.root_iris(), vec![ex("k").as_str()]);
        let k = forest.find(&ex("k")).unwrap();
        assert_eq!(k.child_iris(), vec![ex("b").as_str(), ex("a").as_str()]);
        assert_eq!(k.children[0].position, Some(0));
        assert_eq!(k.children[1].position, Some(1));
    }

    #[test]
    fn nested_collections_hang_below_parent() {
        let (out, _) = build(
            TransformConfig::classic().with_collections(true),
            &[
                Triple::iris(&ex("outer"), SKOS_MEMBER, &ex("inner")),
                Triple::iris(&ex("inner"), RDF_TYPE, SKOS_COLLECTION),
                Triple::iris(&ex("inner"), SKOS_MEMBER, &ex("c")),
                Triple::iris(&ex("c"), RDF_TYPE, SKOS_CONCEPT),
            ],
        );
        let forest = Forest::new(out.roots);
        assert_eq!(forest.root_iris(), vec![ex("outer").as_str()]);
        let inner = forest.find(&ex("inner")).unwrap();
        assert_eq!(inner.child_iris(), vec![ex("c").as_str()]);
        assert!(out.only_tree_edges);
    }

    #[test]
    fn collection_member_is_not_a_root_without_schemes() {
        let (out, _) = build(
            TransformConfig::classic().with_collections(true),
            &[
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("a")),
                broader("b", "a"),
            ],
        );
        let forest = Forest::new(out.roots);
        assert!(!forest.root_iris().contains(&ex("a").as_str()));
        let k = forest.find(&ex("k")).unwrap();
        assert_eq!(k.child_iris(), vec![ex("a").as_str()]);
        assert!(!k.children[0].reference);
    }

    #[test]
    fn concept_escaping_all_schemes_is_a_root() {
        let (out, _) = build(
            TransformConfig::classic().with_schemes(true).with_collections(true),
            &[
                Triple::iris(&ex("s"), RDF_TYPE, SKOS_CONCEPT_SCHEME),
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("a")),
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("b")),
                broader("b", "a"),
            ],
        );
        let forest = Forest::new(out.roots);
        // b shares k with a, but lies in no scheme, so a still escapes.
        assert!(forest.root_iris().contains(&ex("a").as_str()));
        let a = forest.find(&ex("a")).unwrap();
        assert!(!a.reference);
        assert_eq!(a.child_iris(), vec![ex("b").as_str()]);
    }

    #[test]
    fn concept_with_only_scheme_narrower_stays_in_collection() {
        let (out, _) = build(
            TransformConfig::classic().with_schemes(true).with_collections(true),
            &[
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("a")),
                Triple::iris(&ex("b"), SKOS_IN_SCHEME, &ex("s")),
                broader("b", "a"),
            ],
        );
        let forest = Forest::new(out.roots);
        assert!(!forest.root_iris().contains(&ex("a").as_str()));
    }

    #[test]
    fn every_typed_resource_is_owned_once() {
        let (out, _) = build(
            TransformConfig::classic().with_schemes(true).with_collections(true),
            &[
                Triple::iris(&ex("s"), SKOS_HAS_TOP_CONCEPT, &ex("a")),
                Triple::iris(&ex("b"), SKOS_IN_SCHEME, &ex("s")),
                broader("b", "a"),
                broader("c", "b"),
                broader("c", "x"),
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("c")),
                Triple::iris(&ex("k"), SKOS_MEMBER, &ex("x")),
                Triple::iris(&ex("k2"), SKOS_MEMBER, &ex("k")),
            ],
        );
        let forest = Forest::new(out.roots);
        let owned = forest.owned_occurrences();
        for local in ["s", "a", "b", "c", "x", "k", "k2"] {
            assert_eq!(owned.get(ex(local).as_str()), Some(&1), "{local}");
        }
        assert_eq!(owned.len(), 7);
    }
}
