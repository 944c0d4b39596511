//! unitrack-db: relational schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool, no `Arc<Mutex<Connection>>`
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Role integrity of link rows lives in triggers, not in Rust
//! - Transactions for multi-step operations
//!
//! ```ignore
//! let store = Store::open("sqlite://unitrack.db").await?;
//! let parent = store.profiles().create(&NewProfile::new(id, Role::Parent)).await?;
//! store.parent_links().create(parent.user_id, student_id).await?;
//! ```

pub mod error;
pub mod escape;
pub mod import;
pub mod pool;
pub mod repos;
pub mod schema;

pub use error::{Result, StoreError};
pub use import::{import_records, ImportSummary};
pub use pool::{run_migrations, Backend, MIGRATOR, POSTGRES_MIGRATOR};
pub use repos::*;
pub use schema::{schema_sql, Dialect};

use std::time::Duration;

use sqlx::SqlitePool;
use tracing::info;
use unitrack_core::DatabaseConfig;

/// Handle to a migrated SQLite store
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database at `url` and migrate it.
    pub async fn open(url: &str) -> Result<Self> {
        let pool = pool::create_pool(url).await?;
        Self::migrated(pool).await
    }

    /// Fresh private in-memory database, gone when the store is dropped.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = pool::create_memory_pool().await?;
        Self::migrated(pool).await
    }

    /// Open the store described by the configuration file.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if Backend::from_url(&config.url)? == Backend::Postgres {
            // PostgreSQL only receives the deployment schema.
            return Err(StoreError::UnsupportedBackend(pool::redact(&config.url)));
        }
        let pool = pool::create_pool_with_options(
            &config.url,
            config.max_connections,
            Duration::from_secs(config.acquire_timeout_secs),
        )
        .await?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self> {
        pool::migrate(&pool).await?;
        info!("store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn universities(&self) -> UniversityRepo<'_> {
        UniversityRepo::new(&self.pool)
    }

    pub fn profiles(&self) -> ProfileRepo<'_> {
        ProfileRepo::new(&self.pool)
    }

    pub fn students(&self) -> StudentProfileRepo<'_> {
        StudentProfileRepo::new(&self.pool)
    }

    pub fn teachers(&self) -> TeacherProfileRepo<'_> {
        TeacherProfileRepo::new(&self.pool)
    }

    pub fn parent_links(&self) -> ParentLinkRepo<'_> {
        ParentLinkRepo::new(&self.pool)
    }

    pub fn teacher_links(&self) -> TeacherLinkRepo<'_> {
        TeacherLinkRepo::new(&self.pool)
    }
}
