//! Course classifier: which department buckets a course is filed under.

use std::collections::BTreeSet;

use tracing::debug;

use taxsync_shared::Course;

/// Bucket for the syllabus-wide course catalog; nearly every course lands
/// here in addition to its department.
pub const SYLLABUS_BUCKET: &str = "SYLLABUS";

/// Shared bucket for the architecture division's programs.
pub const ARCH_DIVISION_BUCKET: &str = "ARCH DIV";

/// Bucket for interdisciplinary critique courses.
pub const UDIST_BUCKET: &str = "UDIST";

/// Programs filed under the architecture division bucket.
pub const ARCH_DIVISION: [&str; 4] = ["ARCHT", "BARCH", "INTER", "MARCH"];

/// Determine the set of department buckets a course belongs to. An empty
/// result means the course is filed nowhere.
///
/// Institution-specific exceptions, evaluated once, in order: architecture
/// programs share one division bucket; test courses bypass the syllabus
/// bucket; international exchange (CCA) is fully excluded; Fine Arts files
/// critique under UDIST and drops internship (FNART) courses.
pub fn course_departments(course: &Course) -> BTreeSet<String> {
    let Some(owner) = course.owner() else {
        debug!(course = %course, "course has no owning unit, filing nowhere");
        return BTreeSet::new();
    };

    let mut depts = BTreeSet::from([SYLLABUS_BUCKET.to_string()]);
    if ARCH_DIVISION.contains(&owner.as_str()) {
        depts.insert(ARCH_DIVISION_BUCKET.to_string());
    } else if owner == "TESTS" {
        // don't add test courses to the syllabus collection
        return BTreeSet::from(["TESTS".to_string()]);
    } else if owner == "CCA" {
        // international exchange & other exceptions, skip them
        return BTreeSet::new();
    } else if owner == "FA" {
        if course.subject == "CRITI" {
            depts.insert(UDIST_BUCKET.to_string());
        } else if course.subject == "FNART" {
            // ignore Fine Arts internship courses
            return BTreeSet::new();
        }
    } else {
        depts.insert(owner);
    }
    depts
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxsync_shared::AcademicUnit;

    fn course(owner: &str, subject: &str) -> Course {
        serde_json::from_str::<Course>(&format!(
            r#"{{
              "term": "AP_Fall_2024",
              "subject": "{subject}",
              "section_code": "{subject}-100-01",
              "section_title": "Studio I",
              "course_code": "{subject}-100",
              "section_def_refid": "DEF_{subject}-100-01_2024FA",
              "academic_units": [
                {{"refid": "AU_{owner}", "name": "Unit", "course_owner": true}}
              ]
            }}"#
        ))
        .expect("parse course")
    }

    fn buckets(owner: &str, subject: &str) -> BTreeSet<String> {
        course_departments(&course(owner, subject))
    }

    #[test]
    fn architecture_programs_share_division_bucket() {
        for owner in ARCH_DIVISION {
            let depts = buckets(owner, "ARCHT");
            assert!(depts.contains(ARCH_DIVISION_BUCKET), "{owner}");
            assert!(depts.contains(SYLLABUS_BUCKET), "{owner}");
        }
    }

    #[test]
    fn test_courses_bypass_syllabus() {
        assert_eq!(buckets("TESTS", "TESTS"), BTreeSet::from(["TESTS".to_string()]));
    }

    #[test]
    fn exchange_courses_are_excluded() {
        assert!(buckets("CCA", "EXCHG").is_empty());
    }

    #[test]
    fn fine_arts_exceptions() {
        let criti = buckets("FA", "CRITI");
        assert!(criti.contains(UDIST_BUCKET));
        assert!(criti.contains(SYLLABUS_BUCKET));

        assert!(buckets("FA", "FNART").is_empty());

        // other FA subjects fall through to the syllabus bucket alone
        assert_eq!(
            buckets("FA", "PNTDR"),
            BTreeSet::from([SYLLABUS_BUCKET.to_string()])
        );
    }

    #[test]
    fn ordinary_departments_get_their_own_bucket() {
        let depts = buckets("CERAM", "CERAM");
        assert_eq!(
            depts,
            BTreeSet::from(["CERAM".to_string(), SYLLABUS_BUCKET.to_string()])
        );
    }

    #[test]
    fn ownerless_course_is_filed_nowhere() {
        let mut c = course("CERAM", "CERAM");
        c.academic_units = vec![AcademicUnit {
            refid: "AU_CERAM".into(),
            name: "Ceramics".into(),
            course_owner: false,
        }];
        assert!(course_departments(&c).is_empty());
    }
}
