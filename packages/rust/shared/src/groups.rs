//! Static department → faculty-group lookup table.
//!
//! Maps five-letter academic unit codes to the portal faculty group name and
//! the LDAP group name used by the help desk. Built once at first use and
//! never mutated after load; units with no faculty group (exchange programs,
//! extension) map to `None` entries.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Faculty group names for one department.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeptGroup {
    /// Portal group name, e.g. "Ceramics Faculty".
    pub group: Option<&'static str>,
    /// LDAP group name, e.g. "fac_cer".
    pub ldap: Option<&'static str>,
}

static DEPT_GROUPS: LazyLock<HashMap<&'static str, DeptGroup>> = LazyLock::new(|| {
    let entries: [(&str, Option<&str>, Option<&str>); 43] = [
        ("ANIMA", Some("Animation Faculty"), Some("fac_an")),
        ("ARCHT", Some("Architecture Division Faculty"), Some("fac_ar")),
        ("BARCH", Some("Architecture Division Faculty"), Some("fac_ar")),
        ("CCA", None, None),
        ("CERAM", Some("Ceramics Faculty"), Some("fac_cer")),
        ("COMAR", Some("Community Arts Faculty"), Some("fac_ca")),
        ("COMIC", Some("Comics MFA Faculty"), Some("fac_cm")),
        ("CORES", Some("First Year Faculty"), Some("fac_co")),
        ("CRAFT", Some("Craft Faculty"), Some("fac_craft")),
        ("CRTSD", Some("Critical Studies Faculty"), Some("fac_cr")),
        ("CURPR", Some("Curatorial Practice Faculty"), Some("fac_cu")),
        ("DESGN", Some("Design MFA Faculty"), Some("fac_de")),
        ("DIVST", Some("Diversity Studies Faculty"), Some("fac_di")),
        ("DSMBA", Some("Design MBA Faculty"), Some("fac_de")),
        ("EXTED", None, None),
        ("FA", None, None),
        ("FASHN", Some("Fashion Design Faculty"), Some("fac_fa")),
        ("FILMG", Some("Film MFA Faculty"), Some("fac_gradfm")),
        ("FILMU", Some("Film Faculty"), Some("fac_fm")),
        ("FINAR", Some("Graduate Fine Arts Faculty"), Some("fac_fina")),
        ("FURNT", Some("Furniture Faculty"), Some("fac_fn")),
        ("GLASS", Some("Glass Faculty"), Some("fac_gl")),
        ("GRAPH", Some("Graphic Design Faculty"), Some("fac_gr")),
        ("ILLUS", Some("Illustration Faculty"), Some("fac_il")),
        ("INDIV", Some("Individualized Faculty"), Some("fac_ind")),
        ("INDUS", Some("Industrial Design Faculty"), Some("fac_in")),
        ("INTER", Some("Architecture Division Faculty"), Some("fac_ar")),
        ("IXDGR", Some("Interaction Design (MDes) Faculty"), Some("fac_ixd")),
        ("IXDSN", Some("Interaction Design Faculty"), Some("fac_ixd")),
        ("MAAD", Some("Architecture Division Faculty"), Some("fac_ar")),
        ("MARCH", Some("Architecture Division Faculty"), Some("fac_ar")),
        ("METAL", Some("Jewelry Metal Arts Faculty"), Some("fac_jma")),
        ("PHOTO", Some("Photography Faculty"), Some("fac_ph")),
        ("PNTDR", Some("Painting/Drawing Faculty"), Some("fac_padr")),
        ("PRINT", Some("Printmedia Faculty"), Some("fac_pm")),
        ("SCULP", Some("Sculpture Faculty"), Some("fac_sc")),
        ("TEXTL", Some("Textiles Faculty"), Some("fac_te")),
        ("UDIST", Some("Interdisciplinary Faculty"), Some("fac_ids")),
        ("VISCR", Some("Visual Critical Studies Faculty"), Some("fac_vcs")),
        ("VISST", Some("Visual Studies Faculty"), Some("fac_vi")),
        ("WRITE", Some("Writing and Literature Faculty"), Some("fac_wl")),
        ("WRLIT", Some("Writing MFA Faculty"), Some("fac_wr")),
        ("TESTS", None, None),
    ];
    entries
        .into_iter()
        .map(|(code, group, ldap)| (code, DeptGroup { group, ldap }))
        .collect()
});

/// Look up the faculty groups for a department code.
pub fn dept_group(code: &str) -> Option<DeptGroup> {
    DEPT_GROUPS.get(code).copied()
}

/// Group name → department code, built once from the forward table.
/// Architecture programs share one group; the lowest code claims it.
static GROUP_DEPTS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut codes: Vec<&&'static str> = DEPT_GROUPS.keys().collect();
    codes.sort();
    let mut reverse = HashMap::new();
    for code in codes {
        if let Some(group) = DEPT_GROUPS.get(*code).and_then(|g| g.group) {
            reverse.entry(group).or_insert(*code);
        }
    }
    reverse
});

/// Reverse lookup: the department code for a portal group name.
pub fn dept_for_group(group_name: &str) -> Option<&'static str> {
    GROUP_DEPTS.get(group_name).copied()
}
