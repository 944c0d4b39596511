//! University reference data
//!
//! `University` mirrors a stored row. `NewUniversity` and `UniversityUpdate`
//! carry validated input toward the store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Two ASCII letters, matches the `length(country_code) = 2` column check.
static COUNTRY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}$").expect("invalid country code regex"));

/// ISO 3166-1 alpha-2 style country code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate and normalise a country code.
    ///
    /// ```
    /// use unitrack_core::CountryCode;
    ///
    /// assert_eq!(CountryCode::new(" au ").unwrap().as_str(), "AU");
    /// assert!(CountryCode::new("AUS").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let code = s.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(ValidationError::Empty {
                field: "country_code",
            });
        }
        if !COUNTRY_CODE_RE.is_match(&code) {
            return Err(ValidationError::InvalidFormat {
                field: "country_code",
                reason: "must be exactly two ASCII letters",
            });
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// University row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct University {
    pub id: Uuid,
    pub name: String,
    pub country_code: String,
    pub state_province: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub domain: Option<String>,
    pub aliases: Vec<String>,
    pub external_ids: Map<String, Value>,
    pub apply_portals: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact projection used by bulk lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversitySummary {
    pub id: Uuid,
    pub name: String,
    pub country_code: String,
    pub domain: Option<String>,
}

/// Number of universities stored for one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country_code: String,
    pub universities: i64,
}

/// Input for inserting a university
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUniversity {
    pub name: String,
    pub country_code: CountryCode,
    #[serde(default)]
    pub state_province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub external_ids: Map<String, Value>,
    #[serde(default)]
    pub apply_portals: Vec<Value>,
}

impl NewUniversity {
    pub fn new(name: &str, country_code: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_empty("name", name)?,
            country_code: CountryCode::new(country_code)?,
            state_province: None,
            city: None,
            website: None,
            domain: None,
            aliases: Vec::new(),
            external_ids: Map::new(),
            apply_portals: Vec::new(),
        })
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = normalize_optional(Some(domain.into()));
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = normalize_optional(Some(website.into()));
        self
    }

    pub fn with_location(mut self, state_province: Option<String>, city: Option<String>) -> Self {
        self.state_province = normalize_optional(state_province);
        self.city = normalize_optional(city);
        self
    }

    /// Re-check invariants on values that may have been deserialized or
    /// mutated after construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        if let Some(domain) = &self.domain {
            non_empty("domain", domain)?;
        }
        Ok(())
    }
}

/// Partial update for a university.
///
/// `None` leaves a column untouched. For nullable columns `Some(None)` clears
/// the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniversityUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country_code: Option<CountryCode>,
    #[serde(default)]
    pub state_province: Option<Option<String>>,
    #[serde(default)]
    pub city: Option<Option<String>>,
    #[serde(default)]
    pub website: Option<Option<String>>,
    #[serde(default)]
    pub domain: Option<Option<String>>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub external_ids: Option<Map<String, Value>>,
    #[serde(default)]
    pub apply_portals: Option<Vec<Value>>,
}

impl UniversityUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            non_empty("name", name)?;
        }
        if let Some(Some(domain)) = &self.domain {
            non_empty("domain", domain)?;
        }
        Ok(())
    }
}

impl From<&NewUniversity> for UniversityUpdate {
    /// Overwrite every column with the values of `new`.
    fn from(new: &NewUniversity) -> Self {
        Self {
            name: Some(new.name.clone()),
            country_code: Some(new.country_code.clone()),
            state_province: Some(new.state_province.clone()),
            city: Some(new.city.clone()),
            website: Some(new.website.clone()),
            domain: Some(new.domain.clone()),
            aliases: Some(new.aliases.clone()),
            external_ids: Some(new.external_ids.clone()),
            apply_portals: Some(new.apply_portals.clone()),
        }
    }
}

/// Sort key for university listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniversitySort {
    #[default]
    Name,
    CountryCode,
    CreatedAt,
}

impl FromStr for UniversitySort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "country_code" => Ok(Self::CountryCode),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(ValidationError::InvalidVariant {
                field: "sort_by",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ValidationError::InvalidVariant {
                field: "sort_order",
                value: other.to_owned(),
            }),
        }
    }
}

/// Filters for a paginated university listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniversityFilter {
    pub search: Option<String>,
    pub country_code: Option<CountryCode>,
    pub sort: UniversitySort,
    pub order: SortOrder,
}

pub(crate) fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional string, mapping blank input to `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
