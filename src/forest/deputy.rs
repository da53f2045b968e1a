//! Deputy Resolver: context-scoped copies of concepts.
//!
//! Inside a concept scheme or collection a concept is shown through a
//! *deputy*: same display fields as the master resource, but with
//! broader/narrower edges restricted to members of that context. One resolver
//! exists per open context and is dropped when the context's traversal frame
//! closes, so deputies are reused within a context and never across contexts.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use crate::error::TransformError;
use crate::graph::index::{GraphResult, ResourceGraph};
use crate::graph::resource::{Resource, ResourceId, ResourceType, ResourceView};

/// Context-scoped shallow copy of a concept.
#[derive(Debug, Clone)]
pub struct Deputy {
    pub context: ResourceId,
    pub view: ResourceView,
    /// Broader neighbours that are members of the same context.
    pub broader: BTreeSet<ResourceId>,
    /// Narrower neighbours that are members of the same context.
    pub narrower: BTreeSet<ResourceId>,
    pub top_concept: bool,
}

/// Produces and caches the deputies of one context.
pub struct DeputyResolver<'g> {
    graph: &'g ResourceGraph,
    context: ResourceId,
    members: BTreeSet<ResourceId>,
    tops: BTreeSet<ResourceId>,
    /// Ordered collections with a valid member list are rendered flat.
    flat: bool,
    cache: HashMap<ResourceId, Deputy>,
}

impl<'g> DeputyResolver<'g> {
    /// Open a resolver for a scheme or collection.
    pub fn for_context(graph: &'g ResourceGraph, context: ResourceId) -> GraphResult<Self> {
        let resource = graph.resource(context)?;
        let scaffold = resource.scaffold();
        let (candidates, declared_tops, flat) = match resource.kind() {
            ResourceType::ConceptScheme => {
                (&scaffold.scheme_members, Some(&scaffold.top_concepts), false)
            }
            ResourceType::OrderedCollection => {
                (&scaffold.members, None, scaffold.ordered_members.is_some())
            }
            ResourceType::Collection => (&scaffold.members, None, false),
            ResourceType::Concept | ResourceType::Unknown => {
                return Err(TransformError::MissingContext {
                    iri: resource.node().to_string(),
                });
            }
        };

        let mut members = BTreeSet::new();
        for id in candidates {
            if graph.resource(*id)?.kind() == ResourceType::Concept {
                members.insert(*id);
            }
        }
        let tops = declared_tops
            .map(|tops| tops.intersection(&members).copied().collect())
            .unwrap_or_default();

        Ok(Self {
            graph,
            context,
            members,
            tops,
            flat,
            cache: HashMap::new(),
        })
    }

    /// Concept members of the context.
    pub fn members(&self) -> &BTreeSet<ResourceId> {
        &self.members
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_top(&self, id: ResourceId) -> bool {
        self.tops.contains(&id)
    }

    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// The deputy of `id` in this context, created on first request.
    pub fn deputy(&mut self, id: ResourceId) -> GraphResult<&Deputy> {
        match self.cache.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let master = self.graph.resource(id)?;
                let deputy = Self::make(master, self.context, &self.members, &self.tops, self.flat);
                Ok(entry.insert(deputy))
            }
        }
    }

    fn make(
        master: &Resource,
        context: ResourceId,
        members: &BTreeSet<ResourceId>,
        tops: &BTreeSet<ResourceId>,
        flat: bool,
    ) -> Deputy {
        let in_context = |set: &BTreeSet<ResourceId>| -> BTreeSet<ResourceId> {
            if flat {
                return BTreeSet::new();
            }
            set.intersection(members).copied().collect()
        };
        Deputy {
            context,
            view: master.view(),
            broader: in_context(&master.scaffold().broader),
            narrower: in_context(&master.scaffold().narrower),
            top_concept: tops.contains(&master.id()),
        }
    }

    /// Roots of the context: explicit top concepts plus every member without
    /// a broader neighbour inside the context.
    pub fn roots(&mut self) -> GraphResult<Vec<ResourceId>> {
        let members: Vec<ResourceId> = self.members.iter().copied().collect();
        let mut roots = Vec::new();
        for id in members {
            if self.is_top(id) || self.deputy(id)?.broader.is_empty() {
                roots.push(id);
            }
        }
        Ok(roots)
    }
}
