//! Reconciling courses against their target taxonomies.
//!
//! A course fans out to one course-list taxonomy per department bucket, plus
//! flat taxonomies (sections, names, titles, faculty) unless a run is
//! restricted to course lists. Within a course-list taxonomy the node chain
//! is walked strictly top-down: each child is only created once its parent's
//! id is resolved.

use tracing::{debug, error, warn};

use taxsync_shared::{Course, Result};
use taxsync_store::TermStore;

use crate::classifier::course_departments;
use crate::path::course_term_path;
use crate::taxonomy::{Taxonomy, Term};

/// Taxonomy name suffixes per department bucket.
pub const COURSE_LIST_SUFFIX: &str = " - COURSE LIST";
pub const COURSE_SECTIONS_SUFFIX: &str = " - course sections";
pub const COURSE_NAMES_SUFFIX: &str = " - course names";
pub const COURSE_TITLES_SUFFIX: &str = " - course titles";
pub const FACULTY_SUFFIX: &str = " - faculty";

/// Find a taxonomy by name, case-insensitively.
pub fn find_taxonomy<'a>(taxos: &'a mut [Taxonomy], name: &str) -> Option<&'a mut Taxonomy> {
    taxos.iter_mut().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Whether a course-list taxonomy aggregates multiple departments and thus
/// includes a department layer in its hierarchy.
fn has_dept_layer(taxo_name: &str) -> bool {
    taxo_name.contains("SYLLABUS") || taxo_name.contains("ARCH DIV")
}

/// Add a bare string term at the root of the named taxonomy. An empty or
/// whitespace-only string is a no-op; an unknown taxonomy name is logged and
/// treated as "no result". Returns the term's id otherwise.
pub async fn create_string_term(
    store: &TermStore,
    taxos: &mut [Taxonomy],
    taxo_name: &str,
    text: &str,
) -> Result<Option<String>> {
    let Some(taxo) = find_taxonomy(taxos, taxo_name) else {
        warn!(taxonomy = taxo_name, "unable to find taxonomy in the provided set");
        return Ok(None);
    };
    if text.trim().is_empty() {
        debug!(taxonomy = %taxo, "no term to be added");
        return Ok(None);
    }
    let mut term = Term::root(text);
    Ok(Some(taxo.add(store, &mut term).await?))
}

/// Realize a course's full node chain against the named course-list
/// taxonomy. The walk is sequential because each node's creation needs the
/// previous node's just-resolved id; a store failure aborts the remaining
/// walk for this taxonomy, since child nodes cannot exist without their
/// parent's id.
pub async fn create_course_terms(
    store: &TermStore,
    taxos: &mut [Taxonomy],
    taxo_name: &str,
    course: &Course,
) -> Result<()> {
    let dept_layer = has_dept_layer(taxo_name);
    let Some(taxo) = find_taxonomy(taxos, taxo_name) else {
        warn!(taxonomy = taxo_name, "unable to find taxonomy in the provided set");
        return Ok(());
    };
    debug!(course = %course, taxonomy = %taxo, "reconciling course node chain");

    let mut parent_uuid: Option<String> = None;
    for mut term in course_term_path(course, dept_layer) {
        term.parent_uuid = parent_uuid;
        let uuid = taxo.add(store, &mut term).await?;
        parent_uuid = Some(uuid);
    }
    Ok(())
}

/// Outcome of syncing one course across its taxonomy targets. Failures are
/// per course × taxonomy; a failed target never halts the remaining ones.
#[derive(Debug, Default)]
pub struct CourseSyncReport {
    /// Taxonomy targets attempted.
    pub targets: usize,
    /// (taxonomy name, error message) per failed target.
    pub failures: Vec<(String, String)>,
}

impl CourseSyncReport {
    fn record_failure(&mut self, taxo_name: String, error: &taxsync_shared::TaxSyncError) {
        error!(taxonomy = %taxo_name, error = %error, "taxonomy target failed");
        self.failures.push((taxo_name, error.to_string()));
    }
}

/// Create every taxonomy term for a course: the hierarchical course list in
/// each of its department buckets and, unless `only_course_lists`, the flat
/// section/name/title/faculty taxonomies as well.
pub async fn add_course_to_taxonomies(
    store: &TermStore,
    taxos: &mut [Taxonomy],
    course: &Course,
    only_course_lists: bool,
) -> CourseSyncReport {
    debug!(course = %course, "processing taxonomies for course");
    let mut report = CourseSyncReport::default();

    for dept in course_departments(course) {
        let list_name = format!("{dept}{COURSE_LIST_SUFFIX}");
        report.targets += 1;
        if let Err(e) = create_course_terms(store, taxos, &list_name, course).await {
            report.record_failure(list_name, &e);
        }

        if only_course_lists {
            continue;
        }

        let flats: [(String, String); 4] = [
            (
                format!("{dept}{COURSE_SECTIONS_SUFFIX}"),
                course.section_code.clone(),
            ),
            (
                format!("{dept}{COURSE_NAMES_SUFFIX}"),
                course.course_refid.clone(),
            ),
            (
                format!("{dept}{COURSE_TITLES_SUFFIX}"),
                course.section_title.clone(),
            ),
            (format!("{dept}{FACULTY_SUFFIX}"), course.instructor_names()),
        ];
        for (taxo_name, text) in flats {
            report.targets += 1;
            if let Err(e) = create_string_term(store, taxos, &taxo_name, &text).await {
                report.record_failure(taxo_name, &e);
            }
        }
    }
    report
}
