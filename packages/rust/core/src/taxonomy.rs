//! Taxonomy and term model, the local mirror, and the reconciler.
//!
//! The remote store is the source of truth; each [`Taxonomy`] keeps a mirror
//! of terms it has resolved so far. The mirror may under-represent the store
//! but must never misstate an id or retain a deleted entry. Reconciliation
//! ([`Taxonomy::add`]) creates each term at most once, reuses existing
//! matches, and resolves the store's duplicate-sibling conflicts by sibling
//! lookup so that reruns converge to the same tree shape.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, error, info};

use taxsync_shared::{Result, TaxSyncError};
use taxsync_store::{CreateOutcome, NewTerm, SearchHit, SearchOptions, TermStore};

/// Separator joining ancestor labels into a full term path.
pub const PATH_SEP: &str = "\\";

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// One node in a taxonomy hierarchy, constructed in memory before any store
/// interaction. The id stays `None` until the store creates the term or a
/// duplicate conflict is resolved to an existing sibling.
#[derive(Debug, Clone, Default)]
pub struct Term {
    pub label: String,
    pub uuid: Option<String>,
    /// Ancestor labels from root down to the direct parent. Owned by this
    /// term; never aliased with another node's list.
    pub ancestors: Vec<String>,
    pub parent_uuid: Option<String>,
    /// Leaf data map, attached after the term has an id.
    pub data: BTreeMap<String, String>,
    /// Sibling order index.
    pub index: u32,
    pub readonly: bool,
}

impl Term {
    /// A root-level term with no ancestors.
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// A nested term with the given ancestor-label chain.
    pub fn child(label: impl Into<String>, ancestors: Vec<String>) -> Self {
        Self {
            label: label.into(),
            ancestors,
            ..Self::default()
        }
    }

    /// Full path: ancestor labels followed by this term's label, joined by
    /// the path separator, e.g. `Fall 2024\CERAM\Intro to Ceramics`.
    pub fn full_path(&self) -> String {
        if self.ancestors.is_empty() {
            return self.label.clone();
        }
        let mut parts = self.ancestors.clone();
        parts.push(self.label.clone());
        parts.join(PATH_SEP)
    }

    /// Serialization body for term creation (everything except the uuid,
    /// which the store assigns).
    pub fn as_new_term(&self) -> NewTerm {
        NewTerm {
            term: self.label.clone(),
            data: self.data.clone(),
            parent_uuid: self.parent_uuid.clone(),
            index: self.index,
            readonly: self.readonly,
        }
    }
}

/// Identity invariant: two terms with known, equal ids are the same entity
/// regardless of label text; when either id is unknown, equality falls back
/// to full-path comparison.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (&self.uuid, &other.uuid) {
            (Some(a), Some(b)) => a == b,
            _ => self.full_path() == other.full_path(),
        }
    }
}

impl Eq for Term {}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

// ---------------------------------------------------------------------------
// TermMirror
// ---------------------------------------------------------------------------

/// A store-confirmed term held in the mirror.
#[derive(Debug, Clone)]
pub struct MirrorEntry {
    pub label: String,
    pub full_path: String,
    pub uuid: String,
    pub parent_uuid: Option<String>,
    /// Ids of locally recorded children, used for cascade removal.
    pub children: Vec<String>,
}

/// Per-taxonomy cache of resolved terms, keyed by id and by full path.
#[derive(Debug, Default)]
pub struct TermMirror {
    by_uuid: HashMap<String, MirrorEntry>,
    by_path: HashMap<String, String>,
}

impl TermMirror {
    pub fn by_path(&self, full_path: &str) -> Option<&MirrorEntry> {
        self.by_path
            .get(full_path)
            .and_then(|uuid| self.by_uuid.get(uuid))
    }

    pub fn by_uuid(&self, uuid: &str) -> Option<&MirrorEntry> {
        self.by_uuid.get(uuid)
    }

    /// Insert a store-confirmed entry, recording it under its parent's
    /// children when the parent is mirrored.
    pub fn insert(&mut self, entry: MirrorEntry) {
        if let Some(parent_uuid) = &entry.parent_uuid {
            if let Some(parent) = self.by_uuid.get_mut(parent_uuid) {
                if !parent.children.contains(&entry.uuid) {
                    parent.children.push(entry.uuid.clone());
                }
            }
        }
        self.by_path.insert(entry.full_path.clone(), entry.uuid.clone());
        self.by_uuid.insert(entry.uuid.clone(), entry);
    }

    /// Remove an entry and every locally recorded descendant (the store
    /// cascades the remote deletion automatically).
    pub fn remove_cascade(&mut self, uuid: &str) {
        let mut stack = vec![uuid.to_string()];
        // detach from the parent's children list first
        let parent_uuid = self.by_uuid.get(uuid).and_then(|e| e.parent_uuid.clone());
        if let Some(parent_uuid) = parent_uuid {
            if let Some(parent) = self.by_uuid.get_mut(&parent_uuid) {
                parent.children.retain(|c| c != uuid);
            }
        }
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.by_uuid.remove(&current) {
                self.by_path.remove(&entry.full_path);
                stack.extend(entry.children);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_uuid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uuid.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_uuid.clear();
        self.by_path.clear();
    }
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// A named taxonomy in the remote store plus its local mirror.
#[derive(Debug)]
pub struct Taxonomy {
    pub name: String,
    pub uuid: String,
    pub mirror: TermMirror,
    roots_loaded: bool,
}

impl Taxonomy {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            mirror: TermMirror::default(),
            roots_loaded: false,
        }
    }

    /// Fetch the store's root terms and mirror them, replacing nothing that
    /// is already mirrored deeper in the tree. Returns root ids in sibling
    /// order.
    pub async fn load_root_terms(&mut self, store: &TermStore) -> Result<Vec<String>> {
        debug!(taxonomy = %self.name, "loading root terms");
        let remote = store.root_terms(&self.uuid).await?;
        let mut uuids = Vec::with_capacity(remote.len());
        for term in remote {
            uuids.push(term.uuid.clone());
            self.mirror.insert(MirrorEntry {
                label: term.term.clone(),
                full_path: term.term,
                uuid: term.uuid,
                parent_uuid: None,
                children: Vec::new(),
            });
        }
        self.roots_loaded = true;
        Ok(uuids)
    }

    /// Load root terms at most once per run.
    pub async fn ensure_root_terms(&mut self, store: &TermStore) -> Result<()> {
        if !self.roots_loaded {
            self.load_root_terms(store).await?;
        }
        Ok(())
    }

    fn lookup(&self, term: &Term) -> Option<String> {
        if let Some(uuid) = &term.uuid {
            if self.mirror.by_uuid(uuid).is_some() {
                return Some(uuid.clone());
            }
        }
        self.mirror.by_path(&term.full_path()).map(|e| e.uuid.clone())
    }

    /// Reconcile one term against this taxonomy: reuse a mirrored match,
    /// otherwise create it remotely, resolving duplicate-sibling conflicts
    /// to the pre-existing id. Attaches the term's data map once its id is
    /// known. Returns the resolved id.
    pub async fn add(&mut self, store: &TermStore, term: &mut Term) -> Result<String> {
        if let Some(existing) = self.lookup(term) {
            debug!(taxonomy = %self.name, term = %term, "term already mirrored");
            term.uuid = Some(existing.clone());
            return Ok(existing);
        }

        let uuid = match store.create_term(&self.uuid, &term.as_new_term()).await? {
            CreateOutcome::Created(uuid) => {
                info!(taxonomy = %self.name, term = %term, "created term");
                self.mirror.insert(MirrorEntry {
                    label: term.label.clone(),
                    full_path: term.full_path(),
                    uuid: uuid.clone(),
                    parent_uuid: term.parent_uuid.clone(),
                    children: Vec::new(),
                });
                uuid
            }
            CreateOutcome::DuplicateSibling => self.resolve_duplicate(store, term).await?,
        };
        term.uuid = Some(uuid.clone());

        if !term.data.is_empty() {
            self.add_data(store, term).await?;
        }
        Ok(uuid)
    }

    /// Resolve a duplicate-sibling conflict to the existing sibling's id.
    /// Root-level duplicates are found in the (lazily loaded) root listing;
    /// nested duplicates via a children-by-path query on the parent.
    async fn resolve_duplicate(&mut self, store: &TermStore, term: &Term) -> Result<String> {
        let uuid = match &term.parent_uuid {
            None => {
                self.ensure_root_terms(store).await?;
                self.mirror
                    .by_path(&term.label)
                    .map(|e| e.uuid.clone())
                    .ok_or_else(|| TaxSyncError::DuplicateUnresolved {
                        term: term.label.clone(),
                        message: format!("no matching root term in taxonomy \"{}\"", self.name),
                    })?
            }
            Some(parent_uuid) => {
                let parent_path = self
                    .mirror
                    .by_uuid(parent_uuid)
                    .map(|p| p.full_path.clone())
                    .ok_or_else(|| TaxSyncError::DuplicateUnresolved {
                        term: term.label.clone(),
                        message: format!("parent {parent_uuid} is not mirrored"),
                    })?;
                let siblings = store.term_children(&self.uuid, &parent_path).await?;
                let sibling = siblings
                    .into_iter()
                    .find(|s| s.term == term.label)
                    .ok_or_else(|| TaxSyncError::DuplicateUnresolved {
                        term: term.label.clone(),
                        message: "no identical sibling among the parent's children".into(),
                    })?;
                self.mirror.insert(MirrorEntry {
                    label: sibling.term,
                    full_path: term.full_path(),
                    uuid: sibling.uuid.clone(),
                    parent_uuid: Some(parent_uuid.clone()),
                    children: Vec::new(),
                });
                sibling.uuid
            }
        };
        info!(taxonomy = %self.name, term = %term, %uuid, "resolved duplicate sibling");
        Ok(uuid)
    }

    /// Attach a term's data map, one key/value write per non-empty value.
    /// Calling this before the term has an id is a contract violation.
    /// Writes are best-effort: values written before a failing key stay
    /// written; reruns converge because each write is idempotent.
    pub async fn add_data(&self, store: &TermStore, term: &Term) -> Result<()> {
        let uuid = term.uuid.as_ref().ok_or_else(|| TaxSyncError::MissingTermId {
            term: term.label.clone(),
        })?;
        for (key, value) in &term.data {
            if value.is_empty() {
                continue;
            }
            store.set_term_data(&self.uuid, uuid, key, value).await?;
        }
        info!(taxonomy = %self.name, term = %term, "attached term data");
        Ok(())
    }

    /// Delete a term and purge it plus its recorded descendants from the
    /// mirror. A term whose id cannot be determined fails gracefully with
    /// `Ok(false)`, expected when clearing a semester that was only
    /// partially created.
    pub async fn remove(&mut self, store: &TermStore, term: &Term) -> Result<bool> {
        let uuid = term
            .uuid
            .clone()
            .or_else(|| self.mirror.by_path(&term.full_path()).map(|e| e.uuid.clone()));
        let Some(uuid) = uuid else {
            error!(taxonomy = %self.name, term = %term, "cannot delete term without knowing its id");
            return Ok(false);
        };
        store.delete_term(&self.uuid, &uuid).await?;
        self.mirror.remove_cascade(&uuid);
        info!(taxonomy = %self.name, term = %term, "deleted term");
        Ok(true)
    }

    /// Delete every root term (descendants cascade remotely) and empty the
    /// mirror.
    pub async fn clear(&mut self, store: &TermStore) -> Result<()> {
        let roots = self.load_root_terms(store).await?;
        for uuid in roots {
            store.delete_term(&self.uuid, &uuid).await?;
        }
        self.mirror.clear();
        self.roots_loaded = false;
        Ok(())
    }

    /// Free-text search within this taxonomy.
    pub async fn search(
        &self,
        store: &TermStore,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        store.search(&self.uuid, query, options).await
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
