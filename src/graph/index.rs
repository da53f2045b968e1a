//! Resource Graph ingestion.
//!
//! [`ResourceGraph`] folds triples into resources one at a time. After the last
//! triple, [`ResourceGraph::finish`] resolves member lists, checks
//! collection/scheme consistency and freezes the graph (pruning resources whose
//! type never resolved when scheme or collection filtering is active).

use std::collections::{BTreeSet, HashMap};

use crate::config::TransformConfig;
use crate::diagnostics::{Diagnostics, IssueKind, escape_markup};
use crate::error::TransformError;
use crate::vocab::{ClassIri, Predicate};

use super::list::ListResolver;
use super::resource::{
    LangString, Resource, ResourceId, ResourceType, Transition, offer_localized, url_form,
};
use super::{Literal, Node, Object, Triple};

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, TransformError>;

/// Ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub triples: usize,
    pub ignored: usize,
    pub pruned: usize,
}

/// Mutable per-IRI node store.
pub struct ResourceGraph {
    config: TransformConfig,
    resources: Vec<Resource>,
    index: HashMap<Node, ResourceId>,
    lists: ListResolver,
    diagnostics: Diagnostics,
    stats: IngestStats,
    frozen: bool,
}

impl ResourceGraph {
    /// Create an empty graph for the given configuration.
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            config: config.clone(),
            resources: Vec::new(),
            index: HashMap::new(),
            lists: ListResolver::new(),
            diagnostics: Diagnostics::new(),
            stats: IngestStats::default(),
            frozen: false,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Look up a resource by IRI or blank identity.
    pub fn lookup(&self, node: &Node) -> Option<ResourceId> {
        self.index.get(node).copied()
    }

    /// Resolve an index, failing loudly on a dangling one.
    pub fn resource(&self, id: ResourceId) -> GraphResult<&Resource> {
        self.resources
            .get(id.index())
            .ok_or(TransformError::DanglingResource {
                index: id.index(),
                len: self.resources.len(),
            })
    }

    fn resource_mut(&mut self, id: ResourceId) -> &mut Resource {
        // Ids handed out by `ensure` always index into the arena.
        &mut self.resources[id.index()]
    }

    /// Get or create the resource for `node`.
    fn ensure(&mut self, node: &Node) -> ResourceId {
        if let Some(id) = self.index.get(node) {
            return *id;
        }
        let id = ResourceId::from_index(self.resources.len());
        let mut resource = Resource::new(id, node.clone());
        if self.config.resolve_urls {
            if let Node::Iri(iri) = node {
                resource.url = url_form(iri);
            }
        }
        self.resources.push(resource);
        self.index.insert(node.clone(), id);
        id
    }

    /// Push a resource toward `requested`. Conflicts are recorded and the
    /// assertion skipped. Returns whether the resource now has a compatible type.
    fn request_type(&mut self, id: ResourceId, requested: ResourceType, cause: &str) -> bool {
        let current = self.resources[id.index()].kind;
        match current.transition(requested) {
            Transition::Keep => true,
            Transition::Set(kind) => {
                self.resource_mut(id).kind = kind;
                true
            }
            Transition::Conflict => {
                let iri = self.resources[id.index()].node.to_string();
                self.diagnostics.record(
                    IssueKind::TypeConflict,
                    format!(
                        "{} is a {current} and cannot also be a {requested} (from {cause}); \
                         the assertion was skipped.",
                        escape_markup(&iri),
                    ),
                );
                false
            }
        }
    }

    /// Fold one triple into the graph.
    ///
    /// Data problems are recorded as diagnostics. Errors are defects only:
    /// ingesting into a frozen graph, or a predicate dispatched to the wrong
    /// handler.
    pub fn ingest(&mut self, triple: &Triple) -> GraphResult<()> {
        if self.frozen {
            return Err(TransformError::AlreadyFrozen);
        }
        self.stats.triples += 1;

        let Some(predicate) = Predicate::from_iri(&triple.predicate) else {
            self.stats.ignored += 1;
            return Ok(());
        };

        match (&triple.object, predicate.expects_resource()) {
            (Object::Node(object), true) => {
                self.ingest_relation(&triple.subject, predicate, object)?
            }
            (Object::Literal(literal), false) => {
                self.ingest_text(&triple.subject, predicate, literal)?
            }
            (Object::Literal(literal), true) => {
                self.diagnostics.record(
                    IssueKind::LiteralAsResource,
                    format!(
                        "{} {} has the literal \"{}\" where a resource is required; \
                         the assertion was skipped.",
                        escape_markup(&triple.subject.to_string()),
                        predicate.curie(),
                        escape_markup(&literal.value),
                    ),
                );
            }
            // A resource where text is expected carries nothing displayable.
            (Object::Node(_), false) => self.stats.ignored += 1,
        }
        Ok(())
    }

    fn ingest_text(
        &mut self,
        subject: &Node,
        predicate: Predicate,
        literal: &Literal,
    ) -> GraphResult<()> {
        let id = self.ensure(subject);
        let primary = self.config.primary_language.clone();
        let value = LangString::new(literal.value.clone(), literal.language.clone());
        let resource = self.resource_mut(id);
        match predicate {
            Predicate::PrefLabel => {
                offer_localized(&mut resource.pref_label, value, &primary);
            }
            Predicate::AltLabel => {
                offer_localized(&mut resource.alt_label, value, &primary);
            }
            Predicate::Title => {
                offer_localized(&mut resource.title, value, &primary);
            }
            Predicate::Label => {
                offer_localized(&mut resource.rdfs_label, value, &primary);
            }
            Predicate::Description => {
                offer_localized(&mut resource.description, value, &primary);
            }
            Predicate::Notation => resource.notation = Some(literal.value.clone()),
            Predicate::Definition => resource.definition = Some(value),
            other => {
                return Err(TransformError::MisroutedPredicate {
                    predicate: other.curie().to_string(),
                    handler: "text",
                });
            }
        }
        Ok(())
    }

    fn ingest_relation(
        &mut self,
        subject: &Node,
        predicate: Predicate,
        object: &Node,
    ) -> GraphResult<()> {
        match predicate {
            Predicate::Type => self.ingest_type(subject, object),
            Predicate::Broader => self.link_hierarchy(object, subject, predicate),
            Predicate::Narrower => self.link_hierarchy(subject, object, predicate),
            Predicate::InScheme if self.config.concept_schemes => {
                self.link_scheme(subject, object, false, predicate)
            }
            Predicate::TopConceptOf if self.config.concept_schemes => {
                self.link_scheme(subject, object, true, predicate)
            }
            Predicate::HasTopConcept if self.config.concept_schemes => {
                self.link_scheme(object, subject, true, predicate)
            }
            Predicate::Member if self.config.collections => self.link_member(subject, object),
            Predicate::MemberList if self.config.collections => {
                self.link_member_list(subject, object)
            }
            Predicate::ListFirst => {
                self.lists.set_first(subject, object.clone(), &mut self.diagnostics)
            }
            Predicate::ListRest => {
                self.lists.set_rest(subject, object.clone(), &mut self.diagnostics)
            }
            Predicate::InScheme
            | Predicate::TopConceptOf
            | Predicate::HasTopConcept
            | Predicate::Member
            | Predicate::MemberList => self.stats.ignored += 1,
            other => {
                return Err(TransformError::MisroutedPredicate {
                    predicate: other.curie().to_string(),
                    handler: "relation",
                });
            }
        }
        Ok(())
    }

    fn ingest_type(&mut self, subject: &Node, class: &Node) {
        let Node::Iri(class_iri) = class else {
            self.stats.ignored += 1;
            return;
        };
        let requested = match ClassIri::from_iri(class_iri) {
            Some(ClassIri::Concept) => ResourceType::Concept,
            Some(ClassIri::ConceptScheme) if self.config.concept_schemes => {
                ResourceType::ConceptScheme
            }
            Some(ClassIri::Collection) if self.config.collections => ResourceType::Collection,
            Some(ClassIri::OrderedCollection) if self.config.collections => {
                ResourceType::OrderedCollection
            }
            _ => {
                self.stats.ignored += 1;
                return;
            }
        };
        let id = self.ensure(subject);
        self.request_type(id, requested, "rdf:type");
    }

    fn link_hierarchy(&mut self, parent: &Node, child: &Node, predicate: Predicate) {
        let parent_id = self.ensure(parent);
        let child_id = self.ensure(child);
        let parent_ok = self.request_type(parent_id, ResourceType::Concept, predicate.curie());
        let child_ok = self.request_type(child_id, ResourceType::Concept, predicate.curie());
        if parent_ok && child_ok {
            self.resource_mut(parent_id).scaffold.narrower.insert(child_id);
            self.resource_mut(child_id).scaffold.broader.insert(parent_id);
        }
    }

    fn link_scheme(&mut self, concept: &Node, scheme: &Node, top: bool, predicate: Predicate) {
        let scheme_id = self.ensure(scheme);
        let concept_id = self.ensure(concept);
        if !self.request_type(scheme_id, ResourceType::ConceptScheme, predicate.curie()) {
            return;
        }
        if top && !self.request_type(concept_id, ResourceType::Concept, predicate.curie()) {
            return;
        }
        self.resource_mut(concept_id).scaffold.in_schemes.insert(scheme_id);
        let scheme_scaffold = &mut self.resource_mut(scheme_id).scaffold;
        scheme_scaffold.scheme_members.insert(concept_id);
        if top {
            scheme_scaffold.top_concepts.insert(concept_id);
        }
    }

    fn link_member(&mut self, collection: &Node, member: &Node) {
        let collection_id = self.ensure(collection);
        let member_id = self.ensure(member);
        if !self.request_type(collection_id, ResourceType::Collection, "skos:member") {
            return;
        }
        self.resource_mut(collection_id).scaffold.members.insert(member_id);
        self.resource_mut(member_id)
            .scaffold
            .in_collections
            .insert(collection_id);
    }

    fn link_member_list(&mut self, collection: &Node, head: &Node) {
        let collection_id = self.ensure(collection);
        if !self.request_type(collection_id, ResourceType::OrderedCollection, "skos:memberList") {
            return;
        }
        let existing = self.resources[collection_id.index()].scaffold.member_list.clone();
        match existing {
            None => self.resource_mut(collection_id).scaffold.member_list = Some(head.clone()),
            Some(existing) if existing == *head => {}
            Some(existing) => {
                let message = format!(
                    "{} has two member lists ({} and {}); keeping the first.",
                    escape_markup(&self.resources[collection_id.index()].node.to_string()),
                    escape_markup(&existing.to_string()),
                    escape_markup(&head.to_string()),
                );
                self.diagnostics.record(IssueKind::ListConflict, message);
            }
        }
    }

    /// Post-ingestion pass: resolve member lists, check member kinds, freeze.
    pub fn finish(&mut self) -> GraphResult<()> {
        if self.frozen {
            return Err(TransformError::AlreadyFrozen);
        }
        self.resolve_member_lists();
        self.drop_wrong_member_kinds();
        self.freeze();
        self.check_top_concepts();
        tracing::info!(
            resources = self.resources.len(),
            triples = self.stats.triples,
            ignored = self.stats.ignored,
            pruned = self.stats.pruned,
            issues = self.diagnostics.len(),
            "resource graph frozen"
        );
        Ok(())
    }

    fn resolve_member_lists(&mut self) {
        for idx in 0..self.resources.len() {
            let resource = &self.resources[idx];
            if resource.kind != ResourceType::OrderedCollection {
                continue;
            }
            let Some(head) = resource.scaffold.member_list.clone() else {
                continue;
            };
            let owner = resource.node.clone();
            let elements = self.lists.resolve(&owner, &head, &mut self.diagnostics);

            let mut ordered = Vec::with_capacity(elements.len());
            let mut unlisted_members = Vec::new();
            let mut not_members = Vec::new();
            for element in &elements {
                match self.index.get(element) {
                    Some(id) if self.resources[idx].scaffold.members.contains(id) => {
                        ordered.push(*id)
                    }
                    _ => not_members.push(element.to_string()),
                }
            }
            let listed: BTreeSet<ResourceId> = ordered.iter().copied().collect();
            for member in &self.resources[idx].scaffold.members {
                if !listed.contains(member) {
                    unlisted_members.push(self.resources[member.index()].node.to_string());
                }
            }

            if not_members.is_empty() && unlisted_members.is_empty() {
                self.resources[idx].scaffold.ordered_members = Some(ordered);
                continue;
            }
            let mut message = format!(
                "Ordered collection {} has a member list that disagrees with its skos:member \
                 statements; the declared order is ignored.",
                escape_markup(&owner.to_string())
            );
            if !not_members.is_empty() {
                let escaped: Vec<String> = not_members.iter().map(|s| escape_markup(s)).collect();
                message.push_str(&format!(" Listed but not members: {}.", escaped.join(", ")));
            }
            if !unlisted_members.is_empty() {
                let escaped: Vec<String> =
                    unlisted_members.iter().map(|s| escape_markup(s)).collect();
                message.push_str(&format!(" Members not listed: {}.", escaped.join(", ")));
            }
            self.diagnostics
                .record(IssueKind::OrderedMembersMismatch, message);
        }
    }

    fn drop_wrong_member_kinds(&mut self) {
        for idx in 0..self.resources.len() {
            if !self.resources[idx].kind.is_collection() {
                continue;
            }
            let wrong: Vec<ResourceId> = self.resources[idx]
                .scaffold
                .members
                .iter()
                .copied()
                .filter(|m| self.resources[m.index()].kind == ResourceType::ConceptScheme)
                .collect();
            for member in wrong {
                let message = format!(
                    "Collection {} lists the concept scheme {} as a member; \
                     only concepts and collections can be members.",
                    escape_markup(&self.resources[idx].node.to_string()),
                    escape_markup(&self.resources[member.index()].node.to_string()),
                );
                self.diagnostics.record(IssueKind::WrongMemberKind, message);
                let collection_id = self.resources[idx].id;
                let scaffold = &mut self.resources[idx].scaffold;
                scaffold.members.remove(&member);
                if let Some(ordered) = scaffold.ordered_members.as_mut() {
                    ordered.retain(|m| *m != member);
                }
                self.resources[member.index()]
                    .scaffold
                    .in_collections
                    .remove(&collection_id);
            }
        }
    }

    /// Prune unknown-typed resources when scheme or collection filtering is
    /// active, then compact the arena.
    fn freeze(&mut self) {
        self.frozen = true;
        if !self.config.filters_by_type() {
            return;
        }

        let mut map: Vec<Option<ResourceId>> = Vec::with_capacity(self.resources.len());
        let mut next = 0usize;
        for resource in &self.resources {
            if resource.kind.is_known() {
                map.push(Some(ResourceId::from_index(next)));
                next += 1;
            } else {
                map.push(None);
            }
        }
        let pruned = self.resources.len() - next;
        if pruned == 0 {
            return;
        }

        let old = std::mem::take(&mut self.resources);
        self.index.clear();
        for (mut resource, new_id) in old.into_iter().zip(map.iter()) {
            let Some(new_id) = new_id else { continue };
            resource.id = *new_id;
            resource.scaffold.remap(&map);
            self.index.insert(resource.node.clone(), *new_id);
            self.resources.push(resource);
        }
        self.stats.pruned = pruned;
        tracing::debug!(pruned, "pruned resources with unresolved type");
    }

    fn check_top_concepts(&mut self) {
        for scheme in &self.resources {
            if scheme.kind != ResourceType::ConceptScheme {
                continue;
            }
            for top in &scheme.scaffold.top_concepts {
                let concept = &self.resources[top.index()];
                let inner_broader = concept
                    .scaffold
                    .broader
                    .iter()
                    .find(|b| scheme.scaffold.scheme_members.contains(b));
                if let Some(broader) = inner_broader {
                    let message = format!(
                        "{} is a top concept of {} but has the broader concept {} in the same scheme.",
                        escape_markup(&concept.node.to_string()),
                        escape_markup(&scheme.node.to_string()),
                        escape_markup(&self.resources[broader.index()].node.to_string()),
                    );
                    self.diagnostics
                        .record(IssueKind::TopConceptHasBroader, message);
                }
            }
        }
    }

    /// Hand the recorded diagnostics to the caller.
    pub(crate) fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}
