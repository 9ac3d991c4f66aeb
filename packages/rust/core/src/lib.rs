//! Course-to-taxonomy sync engine.
//!
//! Takes course records for one semester and reconciles them into remote
//! hierarchical term stores: classification into department buckets, term
//! path construction, idempotent term creation with a local mirror, semester
//! clearing, and faculty group membership.

pub mod classifier;
pub mod clear;
pub mod groups;
pub mod path;
pub mod pipeline;
pub mod reconcile;
pub mod snapshot;
pub mod taxonomy;

pub use classifier::course_departments;
pub use clear::clear_semester;
pub use groups::{FacultyGroup, GroupSyncReport, sync_faculty_groups, teaching_by_department};
pub use path::course_term_path;
pub use pipeline::{ProgressReporter, RunOptions, RunSummary, SilentProgress, run_sync};
pub use reconcile::{CourseSyncReport, add_course_to_taxonomies, create_string_term, find_taxonomy};
pub use snapshot::{download_taxonomies, load_taxonomies};
pub use taxonomy::{PATH_SEP, Taxonomy, Term, TermMirror};
