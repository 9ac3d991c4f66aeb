//! Semester clearer: delete a stale semester subtree before a rerun.

use tracing::info;

use taxsync_shared::Result;
use taxsync_store::TermStore;

use crate::taxonomy::{Taxonomy, Term};

/// Delete the root term whose label equals `semester` (the store cascades
/// the deletion to the whole subtree). Semester terms only ever live at the
/// taxonomy root. A missing semester is a non-fatal, logged no-op, expected
/// when rerunning a partially completed import.
pub async fn clear_semester(
    store: &TermStore,
    taxo: &mut Taxonomy,
    semester: &str,
) -> Result<bool> {
    taxo.ensure_root_terms(store).await?;

    let Some(uuid) = taxo.mirror.by_path(semester).map(|e| e.uuid.clone()) else {
        info!(taxonomy = %taxo, semester, "no semester term to clear");
        return Ok(false);
    };

    let mut term = Term::root(semester);
    term.uuid = Some(uuid);
    info!(taxonomy = %taxo, semester, "clearing semester subtree");
    taxo.remove(store, &term).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> TermStore {
        TermStore::new(&server.uri(), "test-token").expect("build client")
    }

    #[tokio::test]
    async fn clears_existing_semester() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/taxonomy/t1/term"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"term": "Fall 2024", "uuid": "u1"},
                {"term": "Spring 2025", "uuid": "u2"},
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/taxonomy/t1/term/u1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        let mut taxo = Taxonomy::new("CERAM - COURSE LIST", "t1");
        assert!(clear_semester(&store, &mut taxo, "Fall 2024").await.unwrap());
        // the cleared subtree is gone from the mirror, the sibling stays
        assert!(taxo.mirror.by_path("Fall 2024").is_none());
        assert!(taxo.mirror.by_path("Spring 2025").is_some());
    }

    #[tokio::test]
    async fn missing_semester_is_a_noop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/taxonomy/t1/term"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"term": "Fall 2024", "uuid": "u1"},
            ])))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let mut taxo = Taxonomy::new("CERAM - COURSE LIST", "t1");
        assert!(!clear_semester(&store, &mut taxo, "Spring 2024").await.unwrap());
        // term count unchanged, no DELETE was mocked so one would have failed
        assert_eq!(taxo.mirror.len(), 1);
    }
}
