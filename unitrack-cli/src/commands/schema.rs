//! Schema export and migrations

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use unitrack_db::pool::redact;
use unitrack_db::{run_migrations, schema_sql, Dialect};

use super::{prepare_sqlite_path, AppContext};
use crate::ui;

#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// SQL dialect to print
    #[arg(long, value_enum, default_value = "sqlite")]
    pub dialect: DialectArg,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DialectArg {
    Sqlite,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

pub fn run_schema(args: SchemaArgs) -> Result<()> {
    print!("{}", schema_sql(args.dialect.into()));
    Ok(())
}

/// Apply migrations to the configured database (SQLite or PostgreSQL).
pub async fn run_migrate(ctx: &AppContext) -> Result<()> {
    let url = ctx.database_url();
    prepare_sqlite_path(url)?;

    let backend = ui::with_spinner_async(
        "Applying migrations",
        "Migrations applied",
        run_migrations(url, ctx.config.database.max_connections),
    )
    .await
    .with_context(|| format!("Failed to migrate {}", redact(url)))?;

    info!(backend = backend.as_str(), url = %redact(url), "database is up to date");
    println!("{} schema is up to date", backend.as_str());
    Ok(())
}
