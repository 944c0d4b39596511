//! Many-to-many role pairings between profiles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// Which association table a link lives in.
///
/// Both tables pair some adult role with a student; the kind knows the
/// column names and the role each side must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Parent,
    Teacher,
}

impl LinkKind {
    pub fn table(&self) -> &'static str {
        match self {
            LinkKind::Parent => "parent_links",
            LinkKind::Teacher => "teacher_student_links",
        }
    }

    /// Column holding the non-student side
    pub fn owner_column(&self) -> &'static str {
        match self {
            LinkKind::Parent => "parent_user_id",
            LinkKind::Teacher => "teacher_user_id",
        }
    }

    pub fn student_column(&self) -> &'static str {
        "student_user_id"
    }

    /// Role required of the non-student side
    pub fn owner_role(&self) -> Role {
        match self {
            LinkKind::Parent => Role::Parent,
            LinkKind::Teacher => Role::Teacher,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    pub parent_user_id: Uuid,
    pub student_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherStudentLink {
    pub teacher_user_id: Uuid,
    pub student_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
