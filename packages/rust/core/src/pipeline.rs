//! End-to-end batch run: clear stale semester terms, then file every
//! on-portal course into its taxonomies.
//!
//! Execution is strictly sequential: one course is fully classified,
//! decomposed, and reconciled across every applicable taxonomy before the
//! next course begins. A store failure aborts only the affected
//! course × taxonomy target; the batch itself always runs to completion and
//! reports partial success.

use tracing::{debug, error, info};

use taxsync_shared::{Course, Result};
use taxsync_store::TermStore;

use crate::clear::clear_semester;
use crate::reconcile::add_course_to_taxonomies;
use crate::taxonomy::Taxonomy;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Only create terms in course-list taxonomies, skipping the flat ones.
    /// Initial population wants everything; repeat runs usually set this.
    pub course_lists_only: bool,
    /// Delete the batch's semester from every course-list taxonomy first.
    /// Disable when rerunning a failed, partial import.
    pub delete_semester: bool,
    /// Stop after clearing semester terms.
    pub clear_only: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            course_lists_only: false,
            delete_semester: true,
            clear_only: false,
        }
    }
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each course, synced or skipped.
    fn course_done(&self, section_code: &str, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn course_done(&self, _section_code: &str, _current: usize, _total: usize) {}
}

/// Summary of a completed batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Courses synced into at least one taxonomy target.
    pub synced: usize,
    /// Courses skipped because they are not on the portal.
    pub skipped: usize,
    /// Course-list taxonomies whose semester subtree was cleared.
    pub semesters_cleared: usize,
    /// (course, taxonomy, error message) per failed target.
    pub failures: Vec<(String, String, String)>,
}

/// Run the full batch: sort courses for stable ordering, optionally clear
/// the current semester from every course-list taxonomy, then reconcile
/// each on-portal course.
pub async fn run_sync(
    store: &TermStore,
    taxos: &mut [Taxonomy],
    mut courses: Vec<Course>,
    options: &RunOptions,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    courses.sort_by_key(Course::sort_key);

    if options.delete_semester && !courses.is_empty() {
        // the semester is the same for the whole batch
        let semester = courses[0].semester();
        progress.phase("clearing semester terms");
        info!(%semester, "deleting semester from all course list taxonomies");

        let course_lists: Vec<usize> = taxos
            .iter()
            .enumerate()
            .filter(|(_, t)| t.name.to_lowercase().contains("course list"))
            .map(|(i, _)| i)
            .collect();
        for i in course_lists {
            match clear_semester(store, &mut taxos[i], &semester).await {
                Ok(true) => summary.semesters_cleared += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(taxonomy = %taxos[i], error = %e, "failed to clear semester");
                    summary.failures.push((
                        format!("clear \"{semester}\""),
                        taxos[i].name.clone(),
                        e.to_string(),
                    ));
                }
            }
        }
    }

    if options.clear_only {
        return Ok(summary);
    }

    progress.phase("syncing courses");
    info!(count = courses.len(), "adding courses to taxonomies");
    let total = courses.len();
    for (idx, course) in courses.iter().enumerate() {
        if course.on_portal() {
            let report =
                add_course_to_taxonomies(store, taxos, course, options.course_lists_only).await;
            for (taxo, err) in report.failures {
                summary.failures.push((course.to_string(), taxo, err));
            }
            summary.synced += 1;
        } else {
            debug!(course = %course, "course not on portal, skipping");
            summary.skipped += 1;
        }
        progress.course_done(&course.section_code, idx + 1, total);
    }

    info!(
        synced = summary.synced,
        skipped = summary.skipped,
        failures = summary.failures.len(),
        "batch run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn course(status: &str, section: &str, title: &str) -> Course {
        serde_json::from_str(&format!(
            r#"{{
              "term": "AP_Fall_2024",
              "subject": "TESTS",
              "subject_name": "Testing",
              "section_code": "{section}",
              "section_title": "{title}",
              "course_code": "TESTS-100",
              "course_refid": "TESTS-100",
              "section_def_refid": "DEF_{section}_2024FA",
              "hidden": "0",
              "status": "{status}",
              "instructors": [
                {{"first_name": "Jane", "last_name": "Doe", "username": "jdoe"}}
              ],
              "academic_units": [
                {{"refid": "AU_TESTS", "name": "Tests", "course_owner": true}}
              ]
            }}"#
        ))
        .expect("parse course")
    }

    fn mock_create(server: &MockServer, label: &str, uuid: &str) -> Mock {
        Mock::given(method("POST"))
            .and(path("/taxonomy/t1/term"))
            .and(body_partial_json(serde_json::json!({"term": label})))
            .respond_with(ResponseTemplate::new(201).insert_header(
                "Location",
                format!("{}/taxonomy/t1/term/{uuid}", server.uri()).as_str(),
            ))
    }

    #[tokio::test]
    async fn batch_clears_semester_then_syncs_portal_courses() {
        let server = MockServer::start().await;
        // stale semester subtree from a previous run
        Mock::given(method("GET"))
            .and(path("/taxonomy/t1/term"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"term": "Fall 2024", "uuid": "stale-1"},
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/taxonomy/t1/term/stale-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        // fresh chain for the one on-portal course
        for (label, uuid) in [
            ("Fall 2024", "u1"),
            ("Studio I", "u2"),
            ("Jane Doe", "u3"),
            ("TESTS-100-01", "u4"),
        ] {
            mock_create(&server, label, uuid).expect(1).mount(&server).await;
        }
        Mock::given(method("PUT"))
            .and(path_regex("^/taxonomy/t1/term/u4/data/.+"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = TermStore::new(&server.uri(), "test-token").unwrap();
        let mut taxos = vec![Taxonomy::new("TESTS - COURSE LIST", "t1")];
        let courses = vec![
            course("Open", "TESTS-100-01", "Studio I"),
            course("Preliminary", "TESTS-100-02", "Studio II"),
        ];

        let options = RunOptions {
            course_lists_only: true,
            ..RunOptions::default()
        };
        let summary = run_sync(&store, &mut taxos, courses, &options, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.semesters_cleared, 1);
        assert_eq!(summary.synced, 1);
        assert_eq!(summary.skipped, 1);
        assert!(summary.failures.is_empty());
    }

    #[tokio::test]
    async fn clear_only_stops_before_syncing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/taxonomy/t1/term"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = TermStore::new(&server.uri(), "test-token").unwrap();
        let mut taxos = vec![Taxonomy::new("TESTS - COURSE LIST", "t1")];
        let courses = vec![course("Open", "TESTS-100-01", "Studio I")];

        let options = RunOptions {
            clear_only: true,
            ..RunOptions::default()
        };
        let summary = run_sync(&store, &mut taxos, courses, &options, &SilentProgress)
            .await
            .unwrap();
        // nothing to clear, nothing synced, and no create was ever mocked
        assert_eq!(summary.semesters_cleared, 0);
        assert_eq!(summary.synced, 0);
    }

    #[tokio::test]
    async fn clear_failure_is_reported_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/taxonomy/t1/term"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error_description": "Taxonomy is locked by another user: jdoe",
            })))
            .mount(&server)
            .await;

        let store = TermStore::new(&server.uri(), "test-token").unwrap();
        let mut taxos = vec![Taxonomy::new("TESTS - COURSE LIST", "t1")];
        let courses = vec![course("Preliminary", "TESTS-100-01", "Studio I")];

        let summary = run_sync(
            &store,
            &mut taxos,
            courses,
            &RunOptions::default(),
            &SilentProgress,
        )
        .await
        .unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.skipped, 1);
    }
}
