//! Wire types for the remote term store REST API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One taxonomy as returned by the store's taxonomy listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTaxonomy {
    pub name: String,
    pub uuid: String,
}

/// Envelope for the taxonomy listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyListing {
    pub results: Vec<RemoteTaxonomy>,
    #[serde(default)]
    pub length: u64,
}

/// One term as returned by the root-terms and children-by-path endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTerm {
    pub term: String,
    pub uuid: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default, rename = "parentUuid")]
    pub parent_uuid: Option<String>,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub readonly: bool,
}

/// Body for term creation. Everything except the uuid, which the store
/// assigns and reports back in the response's Location header.
#[derive(Debug, Clone, Serialize)]
pub struct NewTerm {
    pub term: String,
    pub data: BTreeMap<String, String>,
    #[serde(rename = "parentUuid")]
    pub parent_uuid: Option<String>,
    pub index: u32,
    pub readonly: bool,
}

/// Result of a term-creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The store created the term and assigned this id.
    Created(String),
    /// A sibling with the same label already exists under the given parent.
    /// The store does not tell us its id; resolve via a sibling lookup.
    DuplicateSibling,
}

/// Scope restriction for free-text term search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRestriction {
    TopLevelOnly,
    LeafOnly,
}

impl SearchRestriction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLevelOnly => "TOP_LEVEL_ONLY",
            Self::LeafOnly => "LEAF_ONLY",
        }
    }
}

/// Options for free-text term search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub restriction: Option<SearchRestriction>,
    pub limit: Option<u32>,
    /// Match against the full term path rather than the term text alone.
    pub search_full_term: bool,
}

/// One search result. The search endpoint reports labels and full paths but
/// no term ids.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub term: String,
    #[serde(rename = "fullTerm")]
    pub full_term: String,
}

/// Envelope for the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
}

// ---------------------------------------------------------------------------
// User groups
// ---------------------------------------------------------------------------

/// One user group. The group listing names its uuid "id", unlike terms.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteGroup {
    #[serde(rename = "id")]
    pub uuid: String,
    pub name: String,
    #[serde(default, rename = "parentId")]
    pub parent_uuid: Option<String>,
}

/// Envelope for the group listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupListing {
    pub results: Vec<RemoteGroup>,
}

/// One member in a group's user listing.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupUserRef {
    pub id: String,
}

/// Envelope for the group-users endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupUsers {
    pub results: Vec<GroupUserRef>,
}

/// Full group body for membership updates (the store has no incremental
/// add/remove endpoint; the whole member list is PUT back).
#[derive(Debug, Clone, Serialize)]
pub struct GroupUpdate {
    pub id: String,
    pub name: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    pub users: Vec<String>,
}
