//! Hipo Labs university list records
//!
//! The public dataset at universities.hipolabs.com publishes one JSON object
//! per university. `normalize` maps a record onto a `NewUniversity`:
//!
//! - `alpha_two_code` -> country_code (upper-cased)
//! - `state-province` -> state_province
//! - `web_pages[0]`   -> website
//! - `domains[0]`     -> domain
//!
//! City, aliases, external ids and portals are not part of the dataset and
//! start out empty.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::university::{normalize_optional, CountryCode, NewUniversity};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HipoRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alpha_two_code: Option<String>,
    #[serde(default, rename = "state-province")]
    pub state_province: Option<String>,
    #[serde(default)]
    pub web_pages: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Parse a JSON array of Hipo records
pub fn read_records<R: Read>(reader: R) -> Result<Vec<HipoRecord>> {
    serde_json::from_reader(reader).map_err(|e| CoreError::json("hipo records", e))
}

/// Map a Hipo record onto the universities table.
///
/// Returns `None` when the record lacks a usable name or country code.
pub fn normalize(record: &HipoRecord) -> Option<NewUniversity> {
    let name = normalize_optional(record.name.clone())?;
    let country_code = CountryCode::new(record.alpha_two_code.as_deref()?).ok()?;

    let mut uni = NewUniversity::new(&name, country_code.as_str()).ok()?;
    uni.state_province = normalize_optional(record.state_province.clone());
    uni.website = normalize_optional(record.web_pages.first().cloned());
    uni.domain = normalize_optional(record.domains.first().cloned());
    Some(uni)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "name": "Massachusetts Institute of Technology",
            "alpha_two_code": "us",
            "state-province": null,
            "web_pages": ["https://web.mit.edu/"],
            "domains": ["mit.edu", "alum.mit.edu"],
            "country": "United States"
        },
        {
            "name": "  ",
            "alpha_two_code": "AU",
            "web_pages": [],
            "domains": []
        },
        {
            "name": "Nameless Country College",
            "web_pages": [],
            "domains": []
        }
    ]"#;

    #[test]
    fn reads_array() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].country.as_deref(), Some("United States"));
    }

    #[test]
    fn normalizes_first_page_and_domain() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        let uni = normalize(&records[0]).unwrap();

        assert_eq!(uni.name, "Massachusetts Institute of Technology");
        assert_eq!(uni.country_code.as_str(), "US");
        assert_eq!(uni.website.as_deref(), Some("https://web.mit.edu/"));
        assert_eq!(uni.domain.as_deref(), Some("mit.edu"));
        assert_eq!(uni.city, None);
        assert_eq!(uni.state_province, None);
        assert!(uni.aliases.is_empty());
        assert!(uni.apply_portals.is_empty());
    }

    #[test]
    fn skips_records_missing_key_fields() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert!(normalize(&records[1]).is_none());
        assert!(normalize(&records[2]).is_none());
    }

    #[test]
    fn rejects_non_array_input() {
        let err = read_records(r#"{"name": "x"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::Json { .. }));
    }
}
