//! Taxonomy-list snapshot: avoid one remote listing call per run.
//!
//! The taxonomy listing rarely changes, so it is cached as JSON under the
//! data directory. The snapshot only saves the listing call; term-level
//! idempotence never consults it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use taxsync_shared::{Result, TaxSyncError};
use taxsync_store::{RemoteTaxonomy, TermStore};

use crate::taxonomy::Taxonomy;

/// On-disk shape of the snapshot file.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    results: Vec<RemoteTaxonomy>,
}

fn to_taxonomies(remote: Vec<RemoteTaxonomy>) -> Vec<Taxonomy> {
    remote
        .into_iter()
        .map(|t| Taxonomy::new(t.name, t.uuid))
        .collect()
}

/// Fetch the taxonomy listing from the store and write the snapshot file.
pub async fn download_taxonomies(store: &TermStore, snapshot: &Path) -> Result<Vec<Taxonomy>> {
    let remote = store.list_taxonomies().await?;
    if let Some(dir) = snapshot.parent() {
        std::fs::create_dir_all(dir).map_err(|e| TaxSyncError::io(dir, e))?;
    }
    let body = serde_json::to_string(&Snapshot {
        results: remote.clone(),
    })
    .map_err(|e| TaxSyncError::parse(format!("serialize taxonomy snapshot: {e}")))?;
    std::fs::write(snapshot, body).map_err(|e| TaxSyncError::io(snapshot, e))?;
    info!(path = %snapshot.display(), count = remote.len(), "wrote taxonomy snapshot");
    Ok(to_taxonomies(remote))
}

/// Load taxonomies from the snapshot file, downloading a fresh listing when
/// the file is absent or `force_download` is set.
pub async fn load_taxonomies(
    store: &TermStore,
    snapshot: &Path,
    force_download: bool,
) -> Result<Vec<Taxonomy>> {
    if force_download || !snapshot.exists() {
        return download_taxonomies(store, snapshot).await;
    }
    let raw = std::fs::read_to_string(snapshot).map_err(|e| TaxSyncError::io(snapshot, e))?;
    let parsed: Snapshot = serde_json::from_str(&raw)
        .map_err(|e| TaxSyncError::parse(format!("taxonomy snapshot: {e}")))?;
    Ok(to_taxonomies(parsed.results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_snapshot(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("taxsync-snapshot-test-{tag}-{}", std::process::id()))
            .join("taxonomies.json")
    }

    #[tokio::test]
    async fn download_writes_snapshot_then_load_uses_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/taxonomy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "length": 2,
                "results": [
                    {"name": "CERAM - COURSE LIST", "uuid": "t1"},
                    {"name": "SYLLABUS - COURSE LIST", "uuid": "t2"},
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = TermStore::new(&server.uri(), "test-token").unwrap();
        let snapshot = temp_snapshot("roundtrip");

        let downloaded = load_taxonomies(&store, &snapshot, false).await.unwrap();
        assert_eq!(downloaded.len(), 2);
        assert!(snapshot.exists());

        // second load hits the file, not the store (the mock expects 1 call)
        let cached = load_taxonomies(&store, &snapshot, false).await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].name, "CERAM - COURSE LIST");
        assert_eq!(cached[0].uuid, "t1");

        let _ = std::fs::remove_dir_all(snapshot.parent().unwrap());
    }

    #[tokio::test]
    async fn force_download_refreshes_the_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/taxonomy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "length": 1,
                "results": [{"name": "TESTS", "uuid": "t9"}],
            })))
            .expect(2)
            .mount(&server)
            .await;

        let store = TermStore::new(&server.uri(), "test-token").unwrap();
        let snapshot = temp_snapshot("force");

        load_taxonomies(&store, &snapshot, false).await.unwrap();
        let refreshed = load_taxonomies(&store, &snapshot, true).await.unwrap();
        assert_eq!(refreshed.len(), 1);

        let _ = std::fs::remove_dir_all(snapshot.parent().unwrap());
    }
}
