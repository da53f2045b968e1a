//! The fixed vocabulary the transform understands.
//!
//! Predicates outside this table are ignored during ingestion; class IRIs
//! outside [`ClassIri`] leave a resource's type untouched.

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

pub const SKOS_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
pub const SKOS_CONCEPT_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#ConceptScheme";
pub const SKOS_COLLECTION: &str = "http://www.w3.org/2004/02/skos/core#Collection";
pub const SKOS_ORDERED_COLLECTION: &str =
    "http://www.w3.org/2004/02/skos/core#OrderedCollection";

pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const SKOS_ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
pub const SKOS_NOTATION: &str = "http://www.w3.org/2004/02/skos/core#notation";
pub const SKOS_DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
pub const SKOS_BROADER: &str = "http://www.w3.org/2004/02/skos/core#broader";
pub const SKOS_NARROWER: &str = "http://www.w3.org/2004/02/skos/core#narrower";
pub const SKOS_IN_SCHEME: &str = "http://www.w3.org/2004/02/skos/core#inScheme";
pub const SKOS_TOP_CONCEPT_OF: &str = "http://www.w3.org/2004/02/skos/core#topConceptOf";
pub const SKOS_HAS_TOP_CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#hasTopConcept";
pub const SKOS_MEMBER: &str = "http://www.w3.org/2004/02/skos/core#member";
pub const SKOS_MEMBER_LIST: &str = "http://www.w3.org/2004/02/skos/core#memberList";

pub const DCTERMS_TITLE: &str = "http://purl.org/dc/terms/title";
pub const DCTERMS_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
pub const DC_TITLE: &str = "http://purl.org/dc/elements/1.1/title";
pub const DC_DESCRIPTION: &str = "http://purl.org/dc/elements/1.1/description";

/// A predicate the ingestion step acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    Type,
    PrefLabel,
    AltLabel,
    Notation,
    Definition,
    Broader,
    Narrower,
    InScheme,
    TopConceptOf,
    HasTopConcept,
    Member,
    MemberList,
    ListFirst,
    ListRest,
    Title,
    Description,
    Label,
}

impl Predicate {
    /// Look up a predicate IRI. Returns `None` for anything outside the vocabulary.
    pub fn from_iri(iri: &str) -> Option<Self> {
        let predicate = match iri {
            RDF_TYPE => Self::Type,
            SKOS_PREF_LABEL => Self::PrefLabel,
            SKOS_ALT_LABEL => Self::AltLabel,
            SKOS_NOTATION => Self::Notation,
            SKOS_DEFINITION => Self::Definition,
            SKOS_BROADER => Self::Broader,
            SKOS_NARROWER => Self::Narrower,
            SKOS_IN_SCHEME => Self::InScheme,
            SKOS_TOP_CONCEPT_OF => Self::TopConceptOf,
            SKOS_HAS_TOP_CONCEPT => Self::HasTopConcept,
            SKOS_MEMBER => Self::Member,
            SKOS_MEMBER_LIST => Self::MemberList,
            RDF_FIRST => Self::ListFirst,
            RDF_REST => Self::ListRest,
            DCTERMS_TITLE | DC_TITLE => Self::Title,
            DCTERMS_DESCRIPTION | DC_DESCRIPTION => Self::Description,
            RDFS_LABEL => Self::Label,
            _ => return None,
        };
        Some(predicate)
    }

    /// Predicates whose object must be an IRI or blank node.
    pub fn expects_resource(self) -> bool {
        matches!(
            self,
            Self::Type
                | Self::Broader
                | Self::Narrower
                | Self::InScheme
                | Self::TopConceptOf
                | Self::HasTopConcept
                | Self::Member
                | Self::MemberList
                | Self::ListFirst
                | Self::ListRest
        )
    }

    /// Short prefixed name, used in diagnostics.
    pub fn curie(self) -> &'static str {
        match self {
            Self::Type => "rdf:type",
            Self::PrefLabel => "skos:prefLabel",
            Self::AltLabel => "skos:altLabel",
            Self::Notation => "skos:notation",
            Self::Definition => "skos:definition",
            Self::Broader => "skos:broader",
            Self::Narrower => "skos:narrower",
            Self::InScheme => "skos:inScheme",
            Self::TopConceptOf => "skos:topConceptOf",
            Self::HasTopConcept => "skos:hasTopConcept",
            Self::Member => "skos:member",
            Self::MemberList => "skos:memberList",
            Self::ListFirst => "rdf:first",
            Self::ListRest => "rdf:rest",
            Self::Title => "dcterms:title",
            Self::Description => "dcterms:description",
            Self::Label => "rdfs:label",
        }
    }
}

/// A class IRI that drives the type-state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassIri {
    Concept,
    ConceptScheme,
    Collection,
    OrderedCollection,
}

impl ClassIri {
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            SKOS_CONCEPT => Some(Self::Concept),
            SKOS_CONCEPT_SCHEME => Some(Self::ConceptScheme),
            SKOS_COLLECTION => Some(Self::Collection),
            SKOS_ORDERED_COLLECTION => Some(Self::OrderedCollection),
            _ => None,
        }
    }
}
