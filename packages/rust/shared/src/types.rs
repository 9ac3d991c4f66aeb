//! Course-record domain types.
//!
//! Courses arrive as bulk JSON exported from the student information system.
//! Identifiers there carry `AX_` prefixes (`AU_CERAM` for an academic unit,
//! `AP_Fall_2024` for an academic period) which we strip for matching, and
//! every text field may contain HTML entities, so all string attributes pass
//! through an explicit decode step at ingest.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Section statuses that are allowed to appear on the portal.
pub const PORTAL_STATUSES: [&str; 3] = ["Closed", "Open", "Waitlist"];

/// Department codes whose courses never appear on the portal.
pub const EXCLUDED_DEPTS: [&str; 1] = ["EXTED"];

/// Display sentinel for sections that have no assigned instructor yet.
pub const TBD_INSTRUCTORS: &str = "[instructors to be determined]";

/// Legacy unit codes that were renamed; old exports still use them.
const LEGACY_DEPT_REMAPS: [(&str, &str); 2] = [("FASHD", "FASHN"), ("ILLST", "ILLUS")];

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^A[A-Z]_").expect("valid prefix regex"));

/// Strip the `AX_` identifier prefix from unit codes and period names,
/// e.g. `AU_CERAM` → `CERAM`, `AP_Fall_2024` → `Fall_2024`.
pub fn strip_prefix(s: &str) -> String {
    PREFIX_RE.replace(s, "").into_owned()
}

/// Decode HTML entities in a raw record field (`&amp;` → `&`, `&#39;` → `'`).
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Serde helper: deserialize a string field, decoding HTML entities.
fn entity_decoded<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(decode_entities(&raw))
}

// ---------------------------------------------------------------------------
// Instructor
// ---------------------------------------------------------------------------

/// One instructor assigned to a course section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(deserialize_with = "entity_decoded")]
    pub first_name: String,
    #[serde(deserialize_with = "entity_decoded")]
    pub last_name: String,
    pub username: String,
}

impl Instructor {
    /// Display name, e.g. "Jane Doe".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ---------------------------------------------------------------------------
// AcademicUnit
// ---------------------------------------------------------------------------

/// An academic unit a course is offered through. Exactly one unit per course
/// carries the `course_owner` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicUnit {
    /// Prefixed unit code, e.g. `AU_CERAM`.
    pub refid: String,
    #[serde(default, deserialize_with = "entity_decoded")]
    pub name: String,
    #[serde(default)]
    pub course_owner: bool,
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// A single course section record from the bulk JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Academic period, e.g. `AP_Fall_2024`.
    pub term: String,
    /// Subject code, e.g. `CERAM`.
    pub subject: String,
    /// Human-readable subject name.
    #[serde(default, deserialize_with = "entity_decoded")]
    pub subject_name: String,
    /// Section code, e.g. `CERAM-101-01`.
    pub section_code: String,
    #[serde(deserialize_with = "entity_decoded")]
    pub section_title: String,
    /// Course code, e.g. `CERAM-101`.
    pub course_code: String,
    /// Course identifier without section digits.
    #[serde(default)]
    pub course_refid: String,
    /// Definitive section identifier, e.g. `DEF_CERAM-101-01_2024FA`.
    pub section_def_refid: String,
    #[serde(default)]
    pub acad_level: String,
    #[serde(default)]
    pub delivery_mode: String,
    #[serde(default)]
    pub instructional_format: String,
    /// "1" when the section is hidden from the portal.
    #[serde(default)]
    pub hidden: String,
    /// Section status, e.g. "Open" or "Preliminary".
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    /// Definitive section ids of sections colocated with this one.
    #[serde(default)]
    pub colocated_sections: Vec<String>,
    #[serde(default)]
    pub academic_units: Vec<AcademicUnit>,
}

impl Course {
    /// Owning department code: the refid of the academic unit flagged as
    /// course owner, prefix-stripped, with legacy code remaps applied.
    pub fn owner(&self) -> Option<String> {
        let unit = self.academic_units.iter().find(|au| au.course_owner)?;
        let code = strip_prefix(&unit.refid);
        let remapped = LEGACY_DEPT_REMAPS
            .iter()
            .find(|(old, _)| *old == code)
            .map(|(_, new)| (*new).to_string())
            .unwrap_or(code);
        Some(remapped)
    }

    /// Human-readable semester label, e.g. `AP_Fall_2024` → "Fall 2024".
    pub fn semester(&self) -> String {
        strip_prefix(&self.term).replace('_', " ")
    }

    /// Comma-joined instructor display names, or the TBD sentinel when the
    /// section has no instructors assigned yet.
    pub fn instructor_names(&self) -> String {
        if self.instructors.is_empty() {
            return TBD_INSTRUCTORS.to_string();
        }
        self.instructors
            .iter()
            .map(Instructor::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma-joined instructor usernames (empty string when none).
    pub fn instructor_usernames(&self) -> String {
        self.instructors
            .iter()
            .map(|i| i.username.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether this section should appear on the portal: acceptable status,
    /// not hidden, and not owned by an excluded department.
    pub fn on_portal(&self) -> bool {
        if self.hidden == "1" {
            return false;
        }
        if !PORTAL_STATUSES.contains(&self.status.as_str()) {
            return false;
        }
        match self.owner() {
            Some(owner) => !EXCLUDED_DEPTS.contains(&owner.as_str()),
            None => false,
        }
    }

    /// Placeholder sections have no instructors and a title flagging them.
    pub fn placeholder(&self) -> bool {
        self.instructors.is_empty() && self.section_title.to_lowercase().contains("placeholder")
    }

    /// Section codes of colocated sections, resolved against the full batch
    /// by definitive section id. Symmetric: if A references B then B's own
    /// record references A.
    pub fn find_colocated_sections(&self, courses: &[Course]) -> Vec<String> {
        let mut sections = Vec::new();
        for colo in &self.colocated_sections {
            if let Some(other) = courses.iter().find(|c| &c.section_def_refid == colo) {
                sections.push(other.section_code.clone());
            }
        }
        sections
    }

    /// Stable ordering for batch runs: by owner, title, instructors, section.
    pub fn sort_key(&self) -> (String, String, String, String) {
        (
            self.owner().unwrap_or_default(),
            self.section_title.clone(),
            self.instructor_names(),
            self.section_code.clone(),
        )
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.semester(),
            self.section_code,
            self.section_title
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_json(owner: &str, subject: &str) -> String {
        format!(
            r#"{{
              "term": "AP_Fall_2024",
              "subject": "{subject}",
              "subject_name": "Ceramics",
              "section_code": "{subject}-101-01",
              "section_title": "Intro &amp; Practice",
              "course_code": "{subject}-101",
              "course_refid": "{subject}-101",
              "section_def_refid": "DEF_{subject}-101-01_2024FA",
              "acad_level": "Undergraduate",
              "delivery_mode": "In-Person",
              "instructional_format": "Studio",
              "hidden": "0",
              "status": "Open",
              "instructors": [
                {{"first_name": "Jane", "last_name": "Doe", "username": "jdoe"}},
                {{"first_name": "Sam", "last_name": "O&#39;Neill", "username": "soneill"}}
              ],
              "colocated_sections": [],
              "academic_units": [
                {{"refid": "AU_{owner}", "name": "Unit", "course_owner": true}}
              ]
            }}"#
        )
    }

    fn course(owner: &str, subject: &str) -> Course {
        serde_json::from_str(&course_json(owner, subject)).expect("parse course")
    }

    #[test]
    fn strip_prefix_variants() {
        assert_eq!(strip_prefix("AU_CERAM"), "CERAM");
        assert_eq!(strip_prefix("AP_Spring_2024"), "Spring_2024");
        // only a leading prefix is stripped
        assert_eq!(strip_prefix("CERAM"), "CERAM");
    }

    #[test]
    fn entities_decoded_on_ingest() {
        let c = course("CERAM", "CERAM");
        assert_eq!(c.section_title, "Intro & Practice");
        assert_eq!(c.instructors[1].last_name, "O'Neill");
    }

    #[test]
    fn derived_attributes() {
        let c = course("CERAM", "CERAM");
        assert_eq!(c.owner().as_deref(), Some("CERAM"));
        assert_eq!(c.semester(), "Fall 2024");
        assert_eq!(c.instructor_names(), "Jane Doe, Sam O'Neill");
        assert_eq!(c.instructor_usernames(), "jdoe, soneill");
        assert!(c.on_portal());
        assert!(!c.placeholder());
        assert_eq!(c.to_string(), "Fall 2024 CERAM-101-01 Intro & Practice");
    }

    #[test]
    fn legacy_owner_remaps() {
        assert_eq!(course("FASHD", "FASHN").owner().as_deref(), Some("FASHN"));
        assert_eq!(course("ILLST", "ILLUS").owner().as_deref(), Some("ILLUS"));
    }

    #[test]
    fn on_portal_exclusions() {
        let mut hidden = course("CERAM", "CERAM");
        hidden.hidden = "1".into();
        assert!(!hidden.on_portal());

        let mut preliminary = course("CERAM", "CERAM");
        preliminary.status = "Preliminary".into();
        assert!(!preliminary.on_portal());

        let excluded = course("EXTED", "CERAM");
        assert!(!excluded.on_portal());

        let mut ownerless = course("CERAM", "CERAM");
        ownerless.academic_units.clear();
        assert!(!ownerless.on_portal());
    }

    #[test]
    fn placeholder_detection() {
        let mut c = course("CERAM", "CERAM");
        c.instructors.clear();
        c.section_title = "Placeholder - do not enroll".into();
        assert!(c.placeholder());
        assert_eq!(c.instructor_names(), TBD_INSTRUCTORS);
        assert_eq!(c.instructor_usernames(), "");
    }

    #[test]
    fn colocated_sections_are_symmetric() {
        let mut a = course("INDUS", "INDUS");
        let mut b = course("GLASS", "GLASS");
        a.colocated_sections = vec![b.section_def_refid.clone()];
        b.colocated_sections = vec![a.section_def_refid.clone()];
        let batch = vec![a.clone(), b.clone()];
        assert_eq!(a.find_colocated_sections(&batch), vec![b.section_code.clone()]);
        assert_eq!(b.find_colocated_sections(&batch), vec![a.section_code.clone()]);
    }

    #[test]
    fn sort_key_orders_by_owner_then_title() {
        let mut x = course("CERAM", "CERAM");
        x.section_title = "B Title".into();
        let mut y = course("ANIMA", "ANIMA");
        y.section_title = "Z Title".into();
        let mut batch = vec![x, y];
        batch.sort_by_key(Course::sort_key);
        assert_eq!(batch[0].owner().as_deref(), Some("ANIMA"));
    }
}
