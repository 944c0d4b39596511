//! Repository implementations
//!
//! Each repository borrows the store's pool. Ids are stored as hyphenated
//! TEXT and list columns as JSON TEXT, so rows are mapped by hand.

pub mod links;
pub mod profiles;
pub mod students;
pub mod teachers;
pub mod universities;

pub use links::{ParentLinkRepo, TeacherLinkRepo};
pub use profiles::ProfileRepo;
pub use students::StudentProfileRepo;
pub use teachers::TeacherProfileRepo;
pub use universities::{UniversityRepo, UpsertOutcome};

use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::error::{Result, StoreError};

pub(crate) fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| {
        StoreError::Database(sqlx::Error::ColumnDecode {
            index: column.to_owned(),
            source: Box::new(e),
        })
    })
}

pub(crate) fn json_column<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T> {
    let Json(value) = row.try_get::<Json<T>, _>(column)?;
    Ok(value)
}

pub(crate) fn optional_json_column<T: DeserializeOwned>(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<T>> {
    let value = row.try_get::<Option<Json<T>>, _>(column)?;
    Ok(value.map(|Json(v)| v))
}

pub(crate) fn parse_uuids(rows: &[SqliteRow], column: &str) -> Result<Vec<Uuid>> {
    rows.iter().map(|row| uuid_column(row, column)).collect()
}
