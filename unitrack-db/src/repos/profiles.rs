//! Profile repository

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, instrument};
use unitrack_core::{NewProfile, Profile, ProfileUpdate, Role, RoleProfile};
use uuid::Uuid;

use super::students::StudentProfileRepo;
use super::teachers::TeacherProfileRepo;
use super::uuid_column;
use crate::error::{Result, StoreError};

const COLUMNS: &str = "user_id, role, first_name, last_name, email, created_at";

pub struct ProfileRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a profile. An existing user id or email is a `Duplicate`.
    #[instrument(skip(self, new), fields(user_id = %new.user_id, role = %new.role))]
    pub async fn create(&self, new: &NewProfile) -> Result<Profile> {
        new.validate()?;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO profiles (user_id, role, first_name, last_name, email)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.user_id.to_string())
        .bind(new.role.as_str())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .fetch_one(self.pool)
        .await?;

        profile_from_row(&row)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Profile> {
        self.find(user_id)
            .await?
            .ok_or_else(|| StoreError::not_found("profile", user_id))
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM profiles WHERE user_id = ?"))
            .bind(user_id.to_string())
            .fetch_optional(self.pool)
            .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM profiles WHERE email = ?"))
            .bind(email.trim())
            .fetch_optional(self.pool)
            .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    pub async fn by_role(&self, role: Role) -> Result<Vec<Profile>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM profiles WHERE role = ? ORDER BY created_at, user_id"
        ))
        .bind(role.as_str())
        .fetch_all(self.pool)
        .await?;
        rows.iter().map(profile_from_row).collect()
    }

    /// Apply a partial update and return the stored row.
    ///
    /// A role change is not checked against existing links; link rows are
    /// only validated when they are written.
    #[instrument(skip(self, update))]
    pub async fn update(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
        update.validate()?;
        if update.is_empty() {
            return self.get(user_id).await;
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE profiles SET ");
        let mut set = qb.separated(", ");
        if let Some(role) = update.role {
            set.push("role = ").push_bind_unseparated(role.as_str());
        }
        if let Some(value) = &update.first_name {
            set.push("first_name = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &update.last_name {
            set.push("last_name = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &update.email {
            set.push("email = ").push_bind_unseparated(value.clone());
        }
        qb.push(" WHERE user_id = ").push_bind(user_id.to_string());

        let result = qb.build().execute(self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("profile", user_id));
        }
        self.get(user_id).await
    }

    /// Delete a profile. Its specialization row and every link that names it
    /// go with it.
    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("profile", user_id));
        }
        debug!(%user_id, "profile deleted");
        Ok(())
    }

    /// The profile together with the specialization row its role implies.
    pub async fn get_role_profile(&self, user_id: Uuid) -> Result<RoleProfile> {
        let profile = self.get(user_id).await?;
        let role_profile = match profile.role {
            Role::Student => {
                let details = StudentProfileRepo::new(self.pool).find(user_id).await?;
                RoleProfile::Student { profile, details }
            }
            Role::Parent => RoleProfile::Parent { profile },
            Role::Teacher => {
                let details = TeacherProfileRepo::new(self.pool).find(user_id).await?;
                RoleProfile::Teacher { profile, details }
            }
        };
        Ok(role_profile)
    }
}

fn profile_from_row(row: &SqliteRow) -> Result<Profile> {
    let role: String = row.try_get("role")?;
    let role = role.parse::<Role>().map_err(|e| {
        StoreError::Database(sqlx::Error::ColumnDecode {
            index: "role".to_owned(),
            source: Box::new(e),
        })
    })?;

    Ok(Profile {
        user_id: uuid_column(row, "user_id")?,
        role,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}
