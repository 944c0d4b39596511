//! Parent-student and teacher-student link repositories
//!
//! Role checks happen in the link triggers; errors coming back from them are
//! enriched with the ids of the row that was being written.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};
use unitrack_core::{LinkKind, ParentLink, TeacherStudentLink};
use uuid::Uuid;

use super::uuid_column;
use crate::error::{Result, StoreError};

struct LinkRow {
    owner: Uuid,
    student: Uuid,
    created_at: DateTime<Utc>,
}

/// Shared queries over one link table
struct LinkTable<'a> {
    pool: &'a SqlitePool,
    kind: LinkKind,
}

impl<'a> LinkTable<'a> {
    fn resource(&self) -> &'static str {
        match self.kind {
            LinkKind::Parent => "parent link",
            LinkKind::Teacher => "teacher link",
        }
    }

    fn select(&self) -> String {
        format!(
            "SELECT {owner} AS owner, {student} AS student, created_at FROM {table}",
            owner = self.kind.owner_column(),
            student = self.kind.student_column(),
            table = self.kind.table(),
        )
    }

    async fn create(&self, owner: Uuid, student: Uuid) -> Result<LinkRow> {
        let sql = format!(
            "INSERT INTO {table} ({owner}, {student}) VALUES (?, ?) \
             RETURNING {owner} AS owner, {student} AS student, created_at",
            owner = self.kind.owner_column(),
            student = self.kind.student_column(),
            table = self.kind.table(),
        );
        let row = sqlx::query(&sql)
            .bind(owner.to_string())
            .bind(student.to_string())
            .fetch_one(self.pool)
            .await
            .map_err(|e| StoreError::from(e).with_link_ids(self.kind, owner, student))?;

        debug!(kind = ?self.kind, %owner, %student, "link created");
        link_from_row(&row)
    }

    async fn replace(
        &self,
        current: (Uuid, Uuid),
        owner: Uuid,
        student: Uuid,
    ) -> Result<LinkRow> {
        let sql = format!(
            "UPDATE {table} SET {owner} = ?, {student} = ? \
             WHERE {owner} = ? AND {student} = ? \
             RETURNING {owner} AS owner, {student} AS student, created_at",
            owner = self.kind.owner_column(),
            student = self.kind.student_column(),
            table = self.kind.table(),
        );
        let row = sqlx::query(&sql)
            .bind(owner.to_string())
            .bind(student.to_string())
            .bind(current.0.to_string())
            .bind(current.1.to_string())
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StoreError::from(e).with_link_ids(self.kind, owner, student))?
            .ok_or_else(|| {
                StoreError::not_found(self.resource(), format!("{}/{}", current.0, current.1))
            })?;
        link_from_row(&row)
    }

    async fn delete(&self, owner: Uuid, student: Uuid) -> Result<bool> {
        let sql = format!(
            "DELETE FROM {table} WHERE {owner} = ? AND {student} = ?",
            owner = self.kind.owner_column(),
            student = self.kind.student_column(),
            table = self.kind.table(),
        );
        let result = sqlx::query(&sql)
            .bind(owner.to_string())
            .bind(student.to_string())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, owner: Uuid, student: Uuid) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE {owner} = ? AND {student} = ?)",
            owner = self.kind.owner_column(),
            student = self.kind.student_column(),
            table = self.kind.table(),
        );
        let found: i64 = sqlx::query_scalar(&sql)
            .bind(owner.to_string())
            .bind(student.to_string())
            .fetch_one(self.pool)
            .await?;
        Ok(found != 0)
    }

    async fn by_owner(&self, owner: Uuid) -> Result<Vec<LinkRow>> {
        let sql = format!(
            "{select} WHERE {owner} = ? ORDER BY created_at, {student}",
            select = self.select(),
            owner = self.kind.owner_column(),
            student = self.kind.student_column(),
        );
        let rows = sqlx::query(&sql)
            .bind(owner.to_string())
            .fetch_all(self.pool)
            .await?;
        rows.iter().map(link_from_row).collect()
    }

    async fn by_student(&self, student: Uuid) -> Result<Vec<LinkRow>> {
        let sql = format!(
            "{select} WHERE {student} = ? ORDER BY created_at, {owner}",
            select = self.select(),
            owner = self.kind.owner_column(),
            student = self.kind.student_column(),
        );
        let rows = sqlx::query(&sql)
            .bind(student.to_string())
            .fetch_all(self.pool)
            .await?;
        rows.iter().map(link_from_row).collect()
    }
}

fn link_from_row(row: &SqliteRow) -> Result<LinkRow> {
    Ok(LinkRow {
        owner: uuid_column(row, "owner")?,
        student: uuid_column(row, "student")?,
        created_at: row.try_get("created_at")?,
    })
}

impl From<LinkRow> for ParentLink {
    fn from(row: LinkRow) -> Self {
        ParentLink {
            parent_user_id: row.owner,
            student_user_id: row.student,
            created_at: row.created_at,
        }
    }
}

impl From<LinkRow> for TeacherStudentLink {
    fn from(row: LinkRow) -> Self {
        TeacherStudentLink {
            teacher_user_id: row.owner,
            student_user_id: row.student,
            created_at: row.created_at,
        }
    }
}

/// Parent-student pairings
pub struct ParentLinkRepo<'a> {
    table: LinkTable<'a>,
}

impl<'a> ParentLinkRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            table: LinkTable {
                pool,
                kind: LinkKind::Parent,
            },
        }
    }

    /// Link a parent to a student.
    ///
    /// Fails with `RoleMismatch` when either side holds the wrong role,
    /// `SameIdentifier` when both ids are equal, `ForeignKey` when a profile
    /// is missing and `Duplicate` when the pair already exists.
    #[instrument(skip(self))]
    pub async fn create(&self, parent: Uuid, student: Uuid) -> Result<ParentLink> {
        self.table.create(parent, student).await.map(Into::into)
    }

    /// Rewrite an existing pair. The new pair is checked like a fresh insert.
    pub async fn replace(
        &self,
        current: (Uuid, Uuid),
        parent: Uuid,
        student: Uuid,
    ) -> Result<ParentLink> {
        self.table.replace(current, parent, student).await.map(Into::into)
    }

    /// Returns whether a link was removed.
    pub async fn delete(&self, parent: Uuid, student: Uuid) -> Result<bool> {
        self.table.delete(parent, student).await
    }

    pub async fn exists(&self, parent: Uuid, student: Uuid) -> Result<bool> {
        self.table.exists(parent, student).await
    }

    pub async fn by_parent(&self, parent: Uuid) -> Result<Vec<ParentLink>> {
        let rows = self.table.by_owner(parent).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn by_student(&self, student: Uuid) -> Result<Vec<ParentLink>> {
        let rows = self.table.by_student(student).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Teacher-student pairings
pub struct TeacherLinkRepo<'a> {
    table: LinkTable<'a>,
}

impl<'a> TeacherLinkRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            table: LinkTable {
                pool,
                kind: LinkKind::Teacher,
            },
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, teacher: Uuid, student: Uuid) -> Result<TeacherStudentLink> {
        self.table.create(teacher, student).await.map(Into::into)
    }

    pub async fn replace(
        &self,
        current: (Uuid, Uuid),
        teacher: Uuid,
        student: Uuid,
    ) -> Result<TeacherStudentLink> {
        self.table.replace(current, teacher, student).await.map(Into::into)
    }

    pub async fn delete(&self, teacher: Uuid, student: Uuid) -> Result<bool> {
        self.table.delete(teacher, student).await
    }

    pub async fn exists(&self, teacher: Uuid, student: Uuid) -> Result<bool> {
        self.table.exists(teacher, student).await
    }

    pub async fn by_teacher(&self, teacher: Uuid) -> Result<Vec<TeacherStudentLink>> {
        let rows = self.table.by_owner(teacher).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn by_student(&self, student: Uuid) -> Result<Vec<TeacherStudentLink>> {
        let rows = self.table.by_student(student).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
