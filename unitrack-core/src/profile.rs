//! Profiles and the role-tagged view over them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;
use crate::student::StudentProfile;
use crate::teacher::TeacherProfile;
use crate::university::normalize_optional;
use crate::validation::ValidationError;

/// Column width of the name and email columns.
pub const MAX_TEXT_LEN: usize = 255;

/// Core identity record, keyed by the externally issued user id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub role: Role,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewProfile {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self {
            user_id,
            role,
            first_name: None,
            last_name: None,
            email: None,
        }
    }

    pub fn with_name(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = normalize_optional(first_name);
        self.last_name = normalize_optional(last_name);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = normalize_optional(Some(email.into()));
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("first_name", self.first_name.as_deref())?;
        check_len("last_name", self.last_name.as_deref())?;
        check_email(self.email.as_deref())
    }
}

/// Partial profile update. `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub first_name: Option<Option<String>>,
    #[serde(default)]
    pub last_name: Option<Option<String>>,
    #[serde(default)]
    pub email: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("first_name", self.first_name.as_ref().and_then(|v| v.as_deref()))?;
        check_len("last_name", self.last_name.as_ref().and_then(|v| v.as_deref()))?;
        check_email(self.email.as_ref().and_then(|v| v.as_deref()))
    }
}

/// A profile together with its role-specific payload.
///
/// Specialization rows are optional: a student or teacher may exist before
/// their academic or teaching details are filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Student {
        profile: Profile,
        details: Option<StudentProfile>,
    },
    Parent {
        profile: Profile,
    },
    Teacher {
        profile: Profile,
        details: Option<TeacherProfile>,
    },
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Student { .. } => Role::Student,
            RoleProfile::Parent { .. } => Role::Parent,
            RoleProfile::Teacher { .. } => Role::Teacher,
        }
    }

    pub fn profile(&self) -> &Profile {
        match self {
            RoleProfile::Student { profile, .. }
            | RoleProfile::Parent { profile }
            | RoleProfile::Teacher { profile, .. } => profile,
        }
    }

    pub fn student_details(&self) -> Option<&StudentProfile> {
        match self {
            RoleProfile::Student { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn teacher_details(&self) -> Option<&TeacherProfile> {
        match self {
            RoleProfile::Teacher { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

fn check_len(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        }),
        _ => Ok(()),
    }
}

fn check_email(email: Option<&str>) -> Result<(), ValidationError> {
    let Some(email) = email else { return Ok(()) };
    check_len("email", Some(email))?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "must look like local@domain",
        }),
    }
}
