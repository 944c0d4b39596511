//! Teacher specialization rows

use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::instrument;
use unitrack_core::{NewTeacherProfile, Role, TeacherProfile, TeacherProfileUpdate};
use uuid::Uuid;

use super::students::warn_on_role_mismatch;
use super::{optional_json_column, uuid_column};
use crate::error::{Result, StoreError};

const COLUMNS: &str = "user_id, subjects, organization, timezone, bio, max_advisees, created_at";

pub struct TeacherProfileRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TeacherProfileRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the teaching row for an existing profile.
    ///
    /// Like student rows, the role of the owning profile is only checked for
    /// a warning.
    #[instrument(skip(self, teacher), fields(user_id = %teacher.user_id))]
    pub async fn create(&self, teacher: &NewTeacherProfile) -> Result<TeacherProfile> {
        teacher.validate()?;
        warn_on_role_mismatch(self.pool, teacher.user_id, Role::Teacher).await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO teacher_profile (
                user_id, subjects, organization, timezone, bio, max_advisees
            )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(teacher.user_id.to_string())
        .bind(teacher.subjects.clone().map(Json))
        .bind(&teacher.organization)
        .bind(&teacher.timezone)
        .bind(&teacher.bio)
        .bind(teacher.max_advisees)
        .fetch_one(self.pool)
        .await?;

        teacher_from_row(&row)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<TeacherProfile> {
        self.find(user_id)
            .await?
            .ok_or_else(|| StoreError::not_found("teacher profile", user_id))
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<TeacherProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM teacher_profile WHERE user_id = ?"
        ))
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await?;
        row.as_ref().map(teacher_from_row).transpose()
    }

    /// Teachers whose subject list contains `subject` exactly.
    pub async fn by_subject(&self, subject: &str) -> Result<Vec<TeacherProfile>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM teacher_profile
            WHERE EXISTS (
                SELECT 1 FROM json_each(teacher_profile.subjects) WHERE json_each.value = ?
            )
            ORDER BY created_at, user_id
            "#
        ))
        .bind(subject)
        .fetch_all(self.pool)
        .await?;
        rows.iter().map(teacher_from_row).collect()
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        user_id: Uuid,
        update: &TeacherProfileUpdate,
    ) -> Result<TeacherProfile> {
        update.validate()?;
        if update.is_empty() {
            return self.get(user_id).await;
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE teacher_profile SET ");
        let mut set = qb.separated(", ");
        if let Some(value) = &update.subjects {
            set.push("subjects = ")
                .push_bind_unseparated(value.clone().map(Json));
        }
        if let Some(value) = &update.organization {
            set.push("organization = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &update.timezone {
            set.push("timezone = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &update.bio {
            set.push("bio = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = update.max_advisees {
            set.push("max_advisees = ").push_bind_unseparated(value);
        }
        qb.push(" WHERE user_id = ").push_bind(user_id.to_string());

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("teacher profile", user_id));
        }
        self.get(user_id).await
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM teacher_profile WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("teacher profile", user_id));
        }
        Ok(())
    }
}

fn teacher_from_row(row: &SqliteRow) -> Result<TeacherProfile> {
    Ok(TeacherProfile {
        user_id: uuid_column(row, "user_id")?,
        subjects: optional_json_column(row, "subjects")?,
        organization: row.try_get("organization")?,
        timezone: row.try_get("timezone")?,
        bio: row.try_get("bio")?,
        max_advisees: row.try_get("max_advisees")?,
        created_at: row.try_get("created_at")?,
    })
}
