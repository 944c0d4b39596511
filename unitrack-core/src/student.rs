//! Student specialization of a profile

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{check_range, ValidationError};

/// Upper bound of a NUMERIC(3,2) column
pub const MAX_GPA: f64 = 9.99;
pub const SAT_RANGE: (i32, i32) = (400, 1600);
pub const ACT_RANGE: (i32, i32) = (1, 36);

/// Academic attributes of a student, one row per student profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user_id: Uuid,
    pub graduation_year: Option<i32>,
    pub gpa: Option<f64>,
    pub sat_score: Option<i32>,
    pub act_score: Option<i32>,
    pub target_countries: Option<Vec<String>>,
    pub intended_majors: Option<Vec<String>>,
}

impl StudentProfile {
    /// Empty academic record for `user_id`
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            graduation_year: None,
            gpa: None,
            sat_score: None,
            act_score: None,
            target_countries: None,
            intended_majors: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_scores(self.gpa, self.sat_score, self.act_score)
    }
}

/// Partial update of a student row; `Some(None)` clears a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfileUpdate {
    #[serde(default)]
    pub graduation_year: Option<Option<i32>>,
    #[serde(default)]
    pub gpa: Option<Option<f64>>,
    #[serde(default)]
    pub sat_score: Option<Option<i32>>,
    #[serde(default)]
    pub act_score: Option<Option<i32>>,
    #[serde(default)]
    pub target_countries: Option<Option<Vec<String>>>,
    #[serde(default)]
    pub intended_majors: Option<Option<Vec<String>>>,
}

impl StudentProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_scores(
            self.gpa.flatten(),
            self.sat_score.flatten(),
            self.act_score.flatten(),
        )
    }
}

fn validate_scores(
    gpa: Option<f64>,
    sat: Option<i32>,
    act: Option<i32>,
) -> Result<(), ValidationError> {
    check_gpa(gpa)?;
    check_range("sat_score", sat, SAT_RANGE.0, SAT_RANGE.1)?;
    check_range("act_score", act, ACT_RANGE.0, ACT_RANGE.1)
}

/// NUMERIC(3,2): finite, in range, at most two decimal places.
fn check_gpa(gpa: Option<f64>) -> Result<(), ValidationError> {
    let Some(value) = gpa else {
        return Ok(());
    };
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "gpa",
            reason: "must be a finite number",
        });
    }
    check_range("gpa", gpa, 0.0, MAX_GPA)?;

    let hundredths = value * 100.0;
    if (hundredths - hundredths.round()).abs() > 1e-6 {
        return Err(ValidationError::InvalidFormat {
            field: "gpa",
            reason: "must have at most two decimal places",
        });
    }
    Ok(())
}
