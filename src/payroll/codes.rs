//! Static code tables used by the statutory exports. These are plain
//! lookups (code → label); nothing behaves differently per code beyond
//! display and eligibility gating.

use strum_macros::{AsRefStr, Display, EnumString};

/// Insurance-type code reported in column A of the KWDI filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
pub enum InsuranceType {
    /// Employment insurance + industrial accident
    #[strum(serialize = "01")]
    Both,
    /// Industrial accident only
    #[strum(serialize = "02")]
    AccidentOnly,
    /// Employment insurance only
    #[strum(serialize = "03")]
    EmploymentOnly,
}

impl InsuranceType {
    pub const DEFAULT_CODE: &'static str = "01";

    pub fn label(&self) -> &'static str {
        match self {
            InsuranceType::Both => "고용·산재",
            InsuranceType::AccidentOnly => "산재만",
            InsuranceType::EmploymentOnly => "고용만",
        }
    }
}

/// Nationality codes accepted by KWDI. Domestic workers are reported with
/// a blank (or "100") nationality column.
pub const NATIONALITY_CODES: &[(&str, &str)] = &[
    ("100", "한국"),
    ("101", "중국"),
    ("102", "베트남"),
    ("103", "필리핀"),
    ("104", "태국"),
    ("105", "우즈베키스탄"),
    ("106", "캄보디아"),
    ("999", "기타"),
];

/// Residency (visa) status codes for foreign workers.
pub const VISA_CODES: &[(&str, &str)] = &[
    ("E-9", "비전문취업"),
    ("H-2", "방문취업"),
    ("F-4", "재외동포"),
    ("F-5", "영주"),
    ("F-6", "결혼이민"),
];

/// Construction job classification codes used in the filings.
pub const JOB_CODES: &[(&str, &str)] = &[
    ("01", "보통인부"),
    ("02", "특별인부"),
    ("03", "조력공"),
    ("04", "목공"),
    ("05", "철근공"),
    ("06", "콘크리트공"),
    ("07", "비계공"),
    ("08", "전기공"),
    ("09", "배관공"),
    ("99", "기타"),
];

pub fn nationality_label(code: &str) -> Option<&'static str> {
    NATIONALITY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

pub fn job_label(code: &str) -> Option<&'static str> {
    JOB_CODES.iter().find(|(c, _)| *c == code).map(|(_, l)| *l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn insurance_codes_round_trip() {
        assert_eq!(InsuranceType::Both.to_string(), "01");
        assert_eq!(InsuranceType::from_str("03").unwrap(), InsuranceType::EmploymentOnly);
        assert!(InsuranceType::from_str("07").is_err());
    }

    #[test]
    fn job_lookup_resolves_known_codes() {
        assert_eq!(job_label("01"), Some("보통인부"));
        assert_eq!(job_label("42"), None);
    }

    #[test]
    fn nationality_lookup() {
        assert_eq!(nationality_label("102"), Some("베트남"));
        assert_eq!(nationality_label(""), None);
    }
}
