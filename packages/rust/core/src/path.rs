//! Term-path builder: decompose a course into an ordered chain of terms.
//!
//! Course-list taxonomies nest semester → (department) → title → instructors
//! → section. The department layer only appears in taxonomies that aggregate
//! multiple departments (syllabus-wide and the architecture division). Each
//! node carries its own copy of the ancestor-label chain so full paths can be
//! computed before any id is known.

use crate::taxonomy::Term;
use taxsync_shared::Course;

/// Build the ordered node chain for a course. With `dept_layer`:
/// `Fall 2024\CERAM\Intro to Ceramics\Jane Doe\CERAM-101-01`; without it the
/// department level is omitted. The final (section) node carries the course's
/// data map.
pub fn course_term_path(course: &Course, dept_layer: bool) -> Vec<Term> {
    let mut chain: Vec<Term> = Vec::with_capacity(5);
    let mut ancestors: Vec<String> = Vec::new();

    let semester = Term::root(course.semester());
    ancestors.push(semester.label.clone());
    chain.push(semester);

    if dept_layer {
        if let Some(owner) = course.owner() {
            let dept = Term::child(owner, ancestors.clone());
            ancestors.push(dept.label.clone());
            chain.push(dept);
        }
    }

    let title = Term::child(course.section_title.clone(), ancestors.clone());
    ancestors.push(title.label.clone());
    chain.push(title);

    let instructors = Term::child(course.instructor_names(), ancestors.clone());
    ancestors.push(instructors.label.clone());
    chain.push(instructors);

    let mut section = Term::child(course.section_code.clone(), ancestors);
    section.data = [
        ("CrsName", course.course_code.clone()),
        ("facultyID", course.instructor_usernames()),
        ("acad_level", course.acad_level.clone()),
        ("delivery_mode", course.delivery_mode.clone()),
        ("instructional_format", course.instructional_format.clone()),
        // true identifier of the section
        ("section_def_refid", course.section_def_refid.clone()),
        ("subject_name", course.subject_name.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    chain.push(section);

    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        serde_json::from_str(
            r#"{
              "term": "AP_Fall_2024",
              "subject": "ARCHT",
              "subject_name": "Architecture",
              "section_code": "ARCHT-100-01",
              "section_title": "Studio I",
              "course_code": "ARCHT-100",
              "section_def_refid": "DEF_ARCHT-100-01_2024FA",
              "acad_level": "Undergraduate",
              "instructors": [],
              "academic_units": [
                {"refid": "AU_INTER", "name": "Interior Design", "course_owner": true}
              ]
            }"#,
        )
        .expect("parse course")
    }

    #[test]
    fn chain_with_department_layer() {
        let chain = course_term_path(&course(), true);
        let labels: Vec<&str> = chain.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Fall 2024",
                "INTER",
                "Studio I",
                "[instructors to be determined]",
                "ARCHT-100-01",
            ]
        );
        // every node knows its full ancestry before any id exists
        assert_eq!(
            chain[4].full_path(),
            "Fall 2024\\INTER\\Studio I\\[instructors to be determined]\\ARCHT-100-01"
        );
        // ancestor lists are owned, not aliased across nodes
        assert_eq!(chain[1].ancestors, vec!["Fall 2024".to_string()]);
        assert_eq!(chain[2].ancestors.len(), 2);
    }

    #[test]
    fn chain_without_department_layer() {
        let chain = course_term_path(&course(), false);
        let labels: Vec<&str> = chain.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Fall 2024",
                "Studio I",
                "[instructors to be determined]",
                "ARCHT-100-01",
            ]
        );
    }

    #[test]
    fn leaf_carries_course_data() {
        let chain = course_term_path(&course(), true);
        let leaf = chain.last().unwrap();
        assert_eq!(leaf.data.get("CrsName").map(String::as_str), Some("ARCHT-100"));
        assert_eq!(
            leaf.data.get("section_def_refid").map(String::as_str),
            Some("DEF_ARCHT-100-01_2024FA")
        );
        // no instructors: the usernames value is empty and will be skipped
        // by the data-attachment step
        assert_eq!(leaf.data.get("facultyID").map(String::as_str), Some(""));
        // non-leaf nodes carry no data
        assert!(chain[0].data.is_empty());
    }
}
