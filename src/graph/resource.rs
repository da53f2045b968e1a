//! Resources: the nodes of the Resource Graph.
//!
//! A [`Resource`] is created on first mention of an IRI and carries its
//! type-state, display fields and the *scaffolding* edges accumulated during
//! ingestion. Scaffolding is never serialized; the forest builder turns it into
//! tree edges.

use std::collections::BTreeSet;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::Node;

/// Stable arena index of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ResourceId(u32);

impl ResourceId {
    pub(crate) fn from_index(index: usize) -> Self {
        ResourceId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "res:{}", self.0)
    }
}

/// Type-state of a resource.
///
/// `Unknown` may become anything. `Collection` may later be upgraded to
/// `OrderedCollection`. `Concept` and `ConceptScheme` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResourceType {
    #[default]
    Unknown,
    Concept,
    ConceptScheme,
    Collection,
    OrderedCollection,
}

/// Outcome of asking for a type change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Type is already compatible; nothing changes.
    Keep,
    /// Type moves to the given state.
    Set(ResourceType),
    /// The request contradicts the current type.
    Conflict,
}

impl ResourceType {
    /// Decide how a request for `requested` applies to the current state.
    pub fn transition(self, requested: ResourceType) -> Transition {
        use ResourceType::*;
        match (self, requested) {
            (_, Unknown) => Transition::Keep,
            (current, requested) if current == requested => Transition::Keep,
            (Unknown, requested) => Transition::Set(requested),
            (Collection, OrderedCollection) => Transition::Set(OrderedCollection),
            // An ordered collection is also a collection.
            (OrderedCollection, Collection) => Transition::Keep,
            _ => Transition::Conflict,
        }
    }

    pub fn is_known(self) -> bool {
        self != ResourceType::Unknown
    }

    pub fn is_collection(self) -> bool {
        matches!(
            self,
            ResourceType::Collection | ResourceType::OrderedCollection
        )
    }

    /// Short name used in diagnostics and output.
    pub fn name(self) -> &'static str {
        match self {
            ResourceType::Unknown => "unknown",
            ResourceType::Concept => "Concept",
            ResourceType::ConceptScheme => "ConceptScheme",
            ResourceType::Collection => "Collection",
            ResourceType::OrderedCollection => "OrderedCollection",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A text value with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LangString {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl LangString {
    pub fn new(value: impl Into<String>, language: Option<String>) -> Self {
        Self {
            value: value.into(),
            language,
        }
    }

    fn is_primary(&self, primary: &str) -> bool {
        self.language
            .as_deref()
            .is_some_and(|lang| lang.eq_ignore_ascii_case(primary))
    }
}

/// Offer `candidate` to a language-aware slot.
///
/// An untagged value always wins over a tagged one. Among tagged values the
/// last write wins, except that a non-primary value never replaces a recorded
/// primary-language value. Returns whether the slot changed.
pub fn offer_localized(slot: &mut Option<LangString>, candidate: LangString, primary: &str) -> bool {
    let replace = match slot.as_ref() {
        None => true,
        Some(current) if current.language.is_none() => candidate.language.is_none(),
        Some(_) if candidate.language.is_none() => true,
        Some(current) if current.is_primary(primary) => candidate.is_primary(primary),
        Some(_) => true,
    };
    if replace {
        *slot = Some(candidate);
    }
    replace
}

/// Display fields of a resource: everything a tree node shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceView {
    pub iri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_label: Option<LangString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_label: Option<LangString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<LangString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdfs_label: Option<LangString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<LangString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<LangString>,
}

impl ResourceView {
    /// The label used for ordering: pref → alt → title → rdfs:label.
    pub fn display_label(&self) -> Option<&str> {
        self.pref_label
            .as_ref()
            .or(self.alt_label.as_ref())
            .or(self.title.as_ref())
            .or(self.rdfs_label.as_ref())
            .map(|l| l.value.as_str())
    }
}

/// Ingestion-time edges. Never serialized.
#[derive(Debug, Clone, Default)]
pub struct Scaffolding {
    pub broader: BTreeSet<ResourceId>,
    pub narrower: BTreeSet<ResourceId>,
    /// `skos:member` targets (collections only).
    pub members: BTreeSet<ResourceId>,
    /// Head of the `skos:memberList` list (ordered collections only).
    pub member_list: Option<Node>,
    /// Resolved `skos:memberList`, set by the list post-pass when it agrees
    /// with `members`.
    pub ordered_members: Option<Vec<ResourceId>>,
    /// Schemes this resource belongs to.
    pub in_schemes: BTreeSet<ResourceId>,
    /// Collections this resource is a member of.
    pub in_collections: BTreeSet<ResourceId>,
    /// Members of this scheme.
    pub scheme_members: BTreeSet<ResourceId>,
    /// Explicit top concepts of this scheme.
    pub top_concepts: BTreeSet<ResourceId>,
}

impl Scaffolding {
    /// Rewrite every edge through `map`, dropping edges to removed resources.
    pub(crate) fn remap(&mut self, map: &[Option<ResourceId>]) {
        fn remap_set(set: &mut BTreeSet<ResourceId>, map: &[Option<ResourceId>]) {
            *set = set
                .iter()
                .filter_map(|id| map.get(id.index()).copied().flatten())
                .collect();
        }
        remap_set(&mut self.broader, map);
        remap_set(&mut self.narrower, map);
        remap_set(&mut self.members, map);
        remap_set(&mut self.in_schemes, map);
        remap_set(&mut self.in_collections, map);
        remap_set(&mut self.scheme_members, map);
        remap_set(&mut self.top_concepts, map);
        if let Some(ordered) = self.ordered_members.as_mut() {
            *ordered = ordered
                .iter()
                .filter_map(|id| map.get(id.index()).copied().flatten())
                .collect();
        }
    }
}

/// A node of the Resource Graph.
#[derive(Debug, Clone)]
pub struct Resource {
    pub(crate) id: ResourceId,
    pub(crate) node: Node,
    pub(crate) kind: ResourceType,
    pub(crate) url: Option<String>,
    pub(crate) pref_label: Option<LangString>,
    pub(crate) alt_label: Option<LangString>,
    pub(crate) title: Option<LangString>,
    pub(crate) rdfs_label: Option<LangString>,
    pub(crate) notation: Option<String>,
    pub(crate) definition: Option<LangString>,
    pub(crate) description: Option<LangString>,
    pub(crate) scaffold: Scaffolding,
}

impl Resource {
    pub(crate) fn new(id: ResourceId, node: Node) -> Self {
        Self {
            id,
            node,
            kind: ResourceType::Unknown,
            url: None,
            pref_label: None,
            alt_label: None,
            title: None,
            rdfs_label: None,
            notation: None,
            definition: None,
            description: None,
            scaffold: Scaffolding::default(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn kind(&self) -> ResourceType {
        self.kind
    }

    pub fn notation(&self) -> Option<&str> {
        self.notation.as_deref()
    }

    pub fn pref_label(&self) -> Option<&LangString> {
        self.pref_label.as_ref()
    }

    pub fn scaffold(&self) -> &Scaffolding {
        &self.scaffold
    }

    /// Snapshot of the display fields.
    pub fn view(&self) -> ResourceView {
        ResourceView {
            iri: self.node.to_string(),
            url: self.url.clone(),
            kind: self.kind,
            pref_label: self.pref_label.clone(),
            alt_label: self.alt_label.clone(),
            title: self.title.clone(),
            rdfs_label: self.rdfs_label.clone(),
            notation: self.notation.clone(),
            definition: self.definition.clone(),
            description: self.description.clone(),
        }
    }
}

/// Bytes escaped in the URL form on top of everything non-ASCII.
const URL_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// NFC-normalize and percent-encode an IRI. Returns `None` when the result is
/// identical to the input, i.e. the IRI is already a plain URL.
pub fn url_form(iri: &str) -> Option<String> {
    let normalized: String = iri.nfc().collect();
    let encoded = utf8_percent_encode(&normalized, URL_UNSAFE).to_string();
    (encoded != iri).then_some(encoded)
}
