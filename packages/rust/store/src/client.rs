//! HTTP client for the remote term store.
//!
//! One [`TermStore`] is built per run and shared by every taxonomy walk.
//! All calls are strictly sequential from the caller's point of view; the
//! store is the sole authority and may be mutated concurrently by other
//! editors, which is why term creation reports duplicate-sibling conflicts
//! as a distinct outcome rather than an error.

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use tracing::debug;

use taxsync_shared::{Result, TaxSyncError};

use crate::types::{
    CreateOutcome, GroupListing, GroupUpdate, GroupUsers, NewTerm, RemoteGroup, RemoteTaxonomy,
    RemoteTerm, SearchHit, SearchOptions, SearchResults, TaxonomyListing,
};

/// User-Agent string for store requests.
const USER_AGENT: &str = concat!("taxsync/", env!("CARGO_PKG_VERSION"));

/// The store's listing endpoints default to ten results; ask for everything.
const TAXONOMY_LIST_LENGTH: u32 = 5000;

/// Client for the term store REST API, scoped to one API root and token.
pub struct TermStore {
    api_root: String,
    client: Client,
}

impl TermStore {
    /// Build a client for the given API root and OAuth token.
    pub fn new(api_root: &str, token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(&format!("access_token={token}"))
            .map_err(|_| TaxSyncError::config("OAuth token contains invalid characters"))?;
        headers.insert("X-Authorization", auth);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TaxSyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_root: api_root.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_root)
    }

    /// Map a non-success response to a store error carrying status and body.
    async fn check(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TaxSyncError::store(
            status.as_u16(),
            format!("{context}: {body}"),
        ))
    }

    // -----------------------------------------------------------------------
    // Taxonomies and terms
    // -----------------------------------------------------------------------

    /// List every taxonomy in the store.
    pub async fn list_taxonomies(&self) -> Result<Vec<RemoteTaxonomy>> {
        let response = self
            .client
            .get(self.url("/taxonomy"))
            .query(&[("length", TAXONOMY_LIST_LENGTH)])
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("list taxonomies: {e}")))?;
        let response = Self::check(response, "list taxonomies").await?;
        let listing: TaxonomyListing = response
            .json()
            .await
            .map_err(|e| TaxSyncError::parse(format!("taxonomy listing: {e}")))?;
        Ok(listing.results)
    }

    /// List the root terms of a taxonomy, in sibling order.
    pub async fn root_terms(&self, taxo_uuid: &str) -> Result<Vec<RemoteTerm>> {
        debug!(taxonomy = taxo_uuid, "fetching root terms");
        let response = self
            .client
            .get(self.url(&format!("/taxonomy/{taxo_uuid}/term")))
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("root terms: {e}")))?;
        let response = Self::check(response, "root terms").await?;
        response
            .json()
            .await
            .map_err(|e| TaxSyncError::parse(format!("root terms: {e}")))
    }

    /// List the children of the term at `full_path`, in sibling order.
    pub async fn term_children(&self, taxo_uuid: &str, full_path: &str) -> Result<Vec<RemoteTerm>> {
        debug!(taxonomy = taxo_uuid, path = full_path, "fetching term children");
        let response = self
            .client
            .get(self.url(&format!("/taxonomy/{taxo_uuid}/term")))
            .query(&[("path", full_path)])
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("term children: {e}")))?;
        let response = Self::check(response, "term children").await?;
        response
            .json()
            .await
            .map_err(|e| TaxSyncError::parse(format!("term children: {e}")))
    }

    /// Create a term. A duplicate sibling under the same parent is reported
    /// as [`CreateOutcome::DuplicateSibling`], never as an error; any other
    /// non-success status (e.g. the taxonomy is locked by another editor) is
    /// a [`TaxSyncError::Store`].
    pub async fn create_term(&self, taxo_uuid: &str, term: &NewTerm) -> Result<CreateOutcome> {
        let response = self
            .client
            .post(self.url(&format!("/taxonomy/{taxo_uuid}/term")))
            .json(term)
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("create term: {e}")))?;

        if response.status() == StatusCode::NOT_ACCEPTABLE {
            // cannot rely on the error message, it varies between parent and
            // child duplicates
            return Ok(CreateOutcome::DuplicateSibling);
        }

        let response = Self::check(response, &format!("create term \"{}\"", term.term)).await?;

        // the store reports the new term's uuid in the Location header,
        // e.g. ".../api/taxonomy/<taxo>/term/<uuid>"
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                TaxSyncError::parse(format!(
                    "created term \"{}\" but response lacks a Location header",
                    term.term
                ))
            })?;
        let uuid = location
            .rsplit_once("/term/")
            .map(|(_, id)| id.to_string())
            .ok_or_else(|| {
                TaxSyncError::parse(format!("unexpected Location header: {location}"))
            })?;

        Ok(CreateOutcome::Created(uuid))
    }

    /// Set one data key/value on a term. Idempotent on the store side.
    pub async fn set_term_data(
        &self,
        taxo_uuid: &str,
        term_uuid: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let path = format!(
            "/taxonomy/{taxo_uuid}/term/{term_uuid}/data/{}/{}",
            urlencoding::encode(key),
            urlencoding::encode(value),
        );
        let response = self
            .client
            .put(self.url(&path))
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("set term data: {e}")))?;
        Self::check(response, &format!("set data key \"{key}\"")).await?;
        Ok(())
    }

    /// Delete a term by id. The store cascades deletion to descendants.
    pub async fn delete_term(&self, taxo_uuid: &str, term_uuid: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/taxonomy/{taxo_uuid}/term/{term_uuid}")))
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("delete term: {e}")))?;
        Self::check(response, "delete term").await?;
        Ok(())
    }

    /// Free-text search within a taxonomy. Results carry labels and full
    /// paths but no ids.
    pub async fn search(
        &self,
        taxo_uuid: &str,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        debug!(taxonomy = taxo_uuid, query, "searching taxonomy");
        let mut params: Vec<(&str, String)> = vec![("q", query.to_string())];
        if let Some(restriction) = options.restriction {
            params.push(("restriction", restriction.as_str().to_string()));
        }
        if let Some(limit) = options.limit {
            params.push(("limit", limit.to_string()));
        }
        if options.search_full_term {
            params.push(("searchfullterm", "true".to_string()));
        }
        let response = self
            .client
            .get(self.url(&format!("/taxonomy/{taxo_uuid}/search")))
            .query(&params)
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("search: {e}")))?;
        let response = Self::check(response, "search").await?;
        let results: SearchResults = response
            .json()
            .await
            .map_err(|e| TaxSyncError::parse(format!("search results: {e}")))?;
        Ok(results.results)
    }

    // -----------------------------------------------------------------------
    // User groups
    // -----------------------------------------------------------------------

    /// List every user group, including nested ones.
    pub async fn list_groups(&self) -> Result<Vec<RemoteGroup>> {
        let response = self
            .client
            .get(self.url("/usermanagement/local/group"))
            .query(&[("allParents", "true")])
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("list groups: {e}")))?;
        let response = Self::check(response, "list groups").await?;
        let listing: GroupListing = response
            .json()
            .await
            .map_err(|e| TaxSyncError::parse(format!("group listing: {e}")))?;
        Ok(listing.results)
    }

    /// List the usernames in a group.
    pub async fn group_users(&self, group_uuid: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url(&format!("/usermanagement/local/group/{group_uuid}/user")))
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("group users: {e}")))?;
        let response = Self::check(response, "group users").await?;
        let users: GroupUsers = response
            .json()
            .await
            .map_err(|e| TaxSyncError::parse(format!("group users: {e}")))?;
        Ok(users.results.into_iter().map(|u| u.id).collect())
    }

    /// Replace a group's full member list.
    pub async fn update_group(&self, update: &GroupUpdate) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/usermanagement/local/group/{}", update.id)))
            .json(update)
            .send()
            .await
            .map_err(|e| TaxSyncError::Network(format!("update group: {e}")))?;
        Self::check(response, &format!("update group \"{}\"", update.name)).await?;
        Ok(())
    }
}
