//! Remote term store client for taxsync.
//!
//! Thin, typed wrapper over the store's REST API: taxonomy listings, term
//! creation/deletion, per-term data writes, free-text search, and user-group
//! membership. All hierarchy reconciliation logic lives in `taxsync-core`;
//! this crate only speaks the wire protocol.

pub mod client;
pub mod types;

pub use client::TermStore;
pub use types::{
    CreateOutcome, GroupUpdate, NewTerm, RemoteGroup, RemoteTaxonomy, RemoteTerm, SearchHit,
    SearchOptions, SearchRestriction, TaxonomyListing,
};
