//! Student specialization rows

use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{instrument, warn};
use unitrack_core::{Role, StudentProfile, StudentProfileUpdate};
use uuid::Uuid;

use super::{optional_json_column, uuid_column};
use crate::error::{Result, StoreError};

const COLUMNS: &str =
    "user_id, graduation_year, gpa, sat_score, act_score, target_countries, intended_majors";

pub struct StudentProfileRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StudentProfileRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the academic row for an existing profile.
    ///
    /// The schema does not tie this row to `profiles.role`, so a row for a
    /// non-student profile is stored and a warning is logged.
    #[instrument(skip(self, student), fields(user_id = %student.user_id))]
    pub async fn create(&self, student: &StudentProfile) -> Result<StudentProfile> {
        student.validate()?;
        warn_on_role_mismatch(self.pool, student.user_id, Role::Student).await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO student_profile (
                user_id, graduation_year, gpa, sat_score, act_score,
                target_countries, intended_majors
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(student.user_id.to_string())
        .bind(student.graduation_year)
        .bind(student.gpa)
        .bind(student.sat_score)
        .bind(student.act_score)
        .bind(student.target_countries.clone().map(Json))
        .bind(student.intended_majors.clone().map(Json))
        .fetch_one(self.pool)
        .await?;

        student_from_row(&row)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<StudentProfile> {
        self.find(user_id)
            .await?
            .ok_or_else(|| StoreError::not_found("student profile", user_id))
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<StudentProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM student_profile WHERE user_id = ?"
        ))
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await?;
        row.as_ref().map(student_from_row).transpose()
    }

    pub async fn by_graduation_year(&self, year: i32) -> Result<Vec<StudentProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM student_profile WHERE graduation_year = ? ORDER BY user_id"
        ))
        .bind(year)
        .fetch_all(self.pool)
        .await?;
        rows.iter().map(student_from_row).collect()
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        user_id: Uuid,
        update: &StudentProfileUpdate,
    ) -> Result<StudentProfile> {
        update.validate()?;
        if update.is_empty() {
            return self.get(user_id).await;
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE student_profile SET ");
        let mut set = qb.separated(", ");
        if let Some(value) = update.graduation_year {
            set.push("graduation_year = ").push_bind_unseparated(value);
        }
        if let Some(value) = update.gpa {
            set.push("gpa = ").push_bind_unseparated(value);
        }
        if let Some(value) = update.sat_score {
            set.push("sat_score = ").push_bind_unseparated(value);
        }
        if let Some(value) = update.act_score {
            set.push("act_score = ").push_bind_unseparated(value);
        }
        if let Some(value) = &update.target_countries {
            set.push("target_countries = ")
                .push_bind_unseparated(value.clone().map(Json));
        }
        if let Some(value) = &update.intended_majors {
            set.push("intended_majors = ")
                .push_bind_unseparated(value.clone().map(Json));
        }
        qb.push(" WHERE user_id = ").push_bind(user_id.to_string());

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("student profile", user_id));
        }
        self.get(user_id).await
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM student_profile WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("student profile", user_id));
        }
        Ok(())
    }
}

/// Log when a specialization row is written for a profile of another role.
///
/// A missing profile is left for the foreign key to reject.
pub(crate) async fn warn_on_role_mismatch(
    pool: &SqlitePool,
    user_id: Uuid,
    expected: Role,
) -> Result<()> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM profiles WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    if let Some(role) = role.filter(|r| r != expected.as_str()) {
        warn!(
            %user_id,
            profile_role = %role,
            expected = %expected,
            "specialization row does not match profile role"
        );
    }
    Ok(())
}

fn student_from_row(row: &SqliteRow) -> Result<StudentProfile> {
    Ok(StudentProfile {
        user_id: uuid_column(row, "user_id")?,
        graduation_year: row.try_get("graduation_year")?,
        gpa: row.try_get("gpa")?,
        sat_score: row.try_get("sat_score")?,
        act_score: row.try_get("act_score")?,
        target_countries: optional_json_column(row, "target_countries")?,
        intended_majors: optional_json_column(row, "intended_majors")?,
    })
}
