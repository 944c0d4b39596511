//! Command implementations for the unitrack CLI

pub mod link;
pub mod profile;
pub mod schema;
pub mod student;
pub mod teacher;
pub mod university;

pub use link::run_link;
pub use profile::run_profile;
pub use schema::{run_migrate, run_schema};
pub use student::run_student;
pub use teacher::run_teacher;
pub use university::run_university;

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use unitrack_core::UnitrackConfig;
use unitrack_db::pool::redact;
use unitrack_db::Store;

/// Settings shared by every database command
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: UnitrackConfig,
}

impl AppContext {
    pub fn database_url(&self) -> &str {
        &self.config.database.url
    }

    /// Open and migrate the configured SQLite store.
    pub async fn open_store(&self) -> Result<Store> {
        let url = self.database_url();
        prepare_sqlite_path(url)?;
        Store::connect(&self.config.database)
            .await
            .with_context(|| format!("Failed to open store at {}", redact(url)))
    }
}

/// Create the directory a file-backed SQLite URL points into.
pub fn prepare_sqlite_path(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Fold a `--field` value and a `--clear field` flag into a partial-update
/// column: `Some(Some(v))` sets, `Some(None)` clears, `None` leaves it alone.
pub fn nullable<T>(value: Option<T>, clear: bool) -> Result<Option<Option<T>>> {
    match (value, clear) {
        (Some(_), true) => bail!("cannot set and clear the same column"),
        (Some(v), false) => Ok(Some(Some(v))),
        (None, true) => Ok(Some(None)),
        (None, false) => Ok(None),
    }
}
