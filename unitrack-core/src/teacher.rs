//! Teacher specialization of a profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Column default for `max_advisees`
pub const DEFAULT_MAX_ADVISEES: i32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub user_id: Uuid,
    pub subjects: Option<Vec<String>>,
    pub organization: Option<String>,
    pub timezone: Option<String>,
    pub bio: Option<String>,
    pub max_advisees: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a teacher row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeacherProfile {
    pub user_id: Uuid,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default = "default_max_advisees")]
    pub max_advisees: i32,
}

fn default_max_advisees() -> i32 {
    DEFAULT_MAX_ADVISEES
}

impl NewTeacherProfile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            subjects: None,
            organization: None,
            timezone: None,
            bio: None,
            max_advisees: DEFAULT_MAX_ADVISEES,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_capacity(self.max_advisees)
    }
}

/// Partial update of a teacher row; `Some(None)` clears a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfileUpdate {
    #[serde(default)]
    pub subjects: Option<Option<Vec<String>>>,
    #[serde(default)]
    pub organization: Option<Option<String>>,
    #[serde(default)]
    pub timezone: Option<Option<String>>,
    #[serde(default)]
    pub bio: Option<Option<String>>,
    #[serde(default)]
    pub max_advisees: Option<i32>,
}

impl TeacherProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.max_advisees {
            Some(capacity) => check_capacity(capacity),
            None => Ok(()),
        }
    }
}

fn check_capacity(capacity: i32) -> Result<(), ValidationError> {
    if capacity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "max_advisees",
            min: 0.0,
            max: f64::from(i32::MAX),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_capacity() {
        let t = NewTeacherProfile::new(Uuid::new_v4());
        assert_eq!(t.max_advisees, 50);

        let json = format!(r#"{{"user_id":"{}"}}"#, Uuid::new_v4());
        let parsed: NewTeacherProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.max_advisees, DEFAULT_MAX_ADVISEES);
    }

    #[test]
    fn rejects_negative_capacity() {
        let mut t = NewTeacherProfile::new(Uuid::new_v4());
        t.max_advisees = -1;
        assert!(t.validate().is_err());

        let update = TeacherProfileUpdate {
            max_advisees: Some(-5),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
