//! Store errors
//!
//! Database failures are mapped onto a small taxonomy so callers can tell a
//! duplicate from a dangling reference from a role violation without parsing
//! driver messages themselves. Role triggers identify themselves with a
//! message prefix; everything else is classified by `sqlx::error::ErrorKind`.

use std::fmt;

use sqlx::error::ErrorKind;
use unitrack_core::{LinkKind, Role, ValidationError};
use uuid::Uuid;

/// Prefix of messages raised when a link side holds the wrong role
pub const ROLE_CHECK_MARKER: &str = "role_check_violation";

/// Prefix of messages raised when both link sides are the same profile
pub const SAME_IDENTIFIER_MARKER: &str = "same_identifier_violation";

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value: {message}")]
    Duplicate { message: String },

    #[error("referenced profile does not exist: {message}")]
    ForeignKey { message: String },

    #[error("{column} {} must reference a profile with role {required}", OptionalId(.user_id))]
    RoleMismatch {
        column: String,
        user_id: Option<Uuid>,
        required: Role,
    },

    #[error("profile {} cannot be linked to itself", OptionalId(.user_id))]
    SameIdentifier { user_id: Option<Uuid> },

    #[error("check constraint failed: {message}")]
    Check { message: String },

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("unsupported database url '{0}' (expected sqlite: or postgres:)")]
    UnsupportedBackend(String),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Attach the identifiers of a link write to a trigger error.
    ///
    /// Trigger messages name the offending column but not the value, so the
    /// link repositories fill it in from the row they tried to write. The
    /// side is picked by the role the trigger asked for.
    pub fn with_link_ids(self, kind: LinkKind, owner: Uuid, student: Uuid) -> Self {
        match self {
            StoreError::RoleMismatch {
                column,
                user_id: None,
                required,
            } => {
                let user_id = if required == kind.owner_role() {
                    owner
                } else {
                    student
                };
                StoreError::RoleMismatch {
                    column,
                    user_id: Some(user_id),
                    required,
                }
            }
            StoreError::SameIdentifier { user_id: None } => StoreError::SameIdentifier {
                user_id: Some(owner),
            },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return StoreError::Database(err);
        };

        let message = db_err.message().to_owned();
        if let Some(classified) = parse_trigger_message(&message) {
            return classified;
        }

        match db_err.kind() {
            ErrorKind::UniqueViolation => StoreError::Duplicate { message },
            ErrorKind::ForeignKeyViolation => StoreError::ForeignKey { message },
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                StoreError::Check { message }
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Recognise a message raised by one of the link role triggers.
///
/// Expected shapes:
/// `role_check_violation: <column> must reference a profile with role <role>`
/// and `same_identifier_violation: <column> must differ from student_user_id`.
pub fn parse_trigger_message(message: &str) -> Option<StoreError> {
    let message = message.trim();

    if message.starts_with(SAME_IDENTIFIER_MARKER) {
        return Some(StoreError::SameIdentifier { user_id: None });
    }

    let detail = message.strip_prefix(ROLE_CHECK_MARKER)?;
    let detail = detail.trim_start_matches(':').trim();
    let column = detail.split_whitespace().next()?.to_owned();
    let required = detail.split_whitespace().last()?.parse::<Role>().ok()?;

    Some(StoreError::RoleMismatch {
        column,
        user_id: None,
        required,
    })
}

struct OptionalId<'a>(&'a Option<Uuid>);

impl fmt::Display for OptionalId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "'{id}'"),
            None => f.write_str("value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_check_message() {
        let err = parse_trigger_message(
            "role_check_violation: parent_user_id must reference a profile with role parent",
        )
        .unwrap();
        match err {
            StoreError::RoleMismatch {
                column,
                user_id,
                required,
            } => {
                assert_eq!(column, "parent_user_id");
                assert_eq!(user_id, None);
                assert_eq!(required, Role::Parent);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_same_identifier_message() {
        let err = parse_trigger_message(
            "same_identifier_violation: teacher_user_id must differ from student_user_id",
        )
        .unwrap();
        assert!(matches!(err, StoreError::SameIdentifier { user_id: None }));
    }

    #[test]
    fn ignores_unrelated_messages() {
        assert!(parse_trigger_message("FOREIGN KEY constraint failed").is_none());
        assert!(parse_trigger_message("role_check_violation: garbage").is_none());
    }

    #[test]
    fn fills_in_link_ids() {
        let owner = Uuid::new_v4();
        let student = Uuid::new_v4();

        let err = StoreError::RoleMismatch {
            column: LinkKind::Parent.student_column().into(),
            user_id: None,
            required: Role::Student,
        }
        .with_link_ids(LinkKind::Parent, owner, student);
        assert!(matches!(err, StoreError::RoleMismatch { user_id: Some(id), .. } if id == student));

        let err = StoreError::RoleMismatch {
            column: LinkKind::Teacher.owner_column().into(),
            user_id: None,
            required: Role::Teacher,
        }
        .with_link_ids(LinkKind::Teacher, owner, student);
        assert!(matches!(err, StoreError::RoleMismatch { user_id: Some(id), .. } if id == owner));

        let err = StoreError::SameIdentifier { user_id: None }
            .with_link_ids(LinkKind::Parent, owner, owner);
        assert!(matches!(err, StoreError::SameIdentifier { user_id: Some(id) } if id == owner));
    }

    #[test]
    fn display_mentions_role_and_id() {
        let id = Uuid::nil();
        let err = StoreError::RoleMismatch {
            column: "teacher_user_id".into(),
            user_id: Some(id),
            required: Role::Teacher,
        };
        let text = err.to_string();
        assert!(text.contains("teacher_user_id"));
        assert!(text.contains(&id.to_string()));
        assert!(text.ends_with("role teacher"));
    }
}
