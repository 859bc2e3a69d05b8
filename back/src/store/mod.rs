//! Persistence gateway for todo records.
//!
//! Every operation is a single atomic record mutation against the backing
//! store. Two implementations exist: [`PgTodoStore`] for PostgreSQL and
//! [`MemoryTodoStore`] for development and tests.

mod memory;
mod postgres;

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use mint_api::v1::Todo;
use uuid::Uuid;

pub use memory::MemoryTodoStore;
pub use postgres::PgTodoStore;

use crate::config::{Config, Deployment};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("todo not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("snapshot error: {0}")]
    Snapshot(eyre::Report),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Resolves once the store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// All records, newest first.
    async fn list(&self) -> StoreResult<Vec<Todo>>;

    async fn create(&self, title: &str) -> StoreResult<Todo>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Todo>>;

    async fn set_completed(&self, id: Uuid, completed: bool) -> StoreResult<Todo>;

    /// Flips `completed` in one statement; `None` if the id is unknown.
    async fn toggle_completed(&self, id: Uuid) -> StoreResult<Option<Todo>>;

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()>;

    /// Persists any buffered state. No-op for stores that write through.
    async fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Where records live, parsed from the connection string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreUrl {
    Postgres(String),
    Memory,
    Snapshot(PathBuf),
}

impl StoreUrl {
    pub fn parse(url: &str) -> eyre::Result<Self> {
        let url = url.trim();

        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(Self::Postgres(url.to_owned()));
        }

        if url == "memory://" || url == "memory:" {
            return Ok(Self::Memory);
        }

        if let Some(path) = url.strip_prefix("ron://") {
            if path.is_empty() {
                eyre::bail!("snapshot url is missing a file path");
            }

            return Ok(Self::Snapshot(PathBuf::from(path)));
        }

        eyre::bail!("unsupported database url scheme")
    }
}

/// Opens the store named by the configuration.
///
/// Persistent servers connect eagerly and fail fast; on-demand deployments
/// get a lazy pool that connects on first use.
pub async fn open(config: &Config) -> eyre::Result<Arc<dyn TodoStore>> {
    let store: Arc<dyn TodoStore> = match StoreUrl::parse(&config.database_url)? {
        StoreUrl::Postgres(url) => Arc::new(match config.deployment() {
            Deployment::Server => PgTodoStore::connect(&url, config.max_connections).await?,
            Deployment::OnDemand => PgTodoStore::connect_lazy(&url, config.max_connections)?,
        }),
        StoreUrl::Memory => Arc::new(MemoryTodoStore::default()),
        StoreUrl::Snapshot(path) => Arc::new(MemoryTodoStore::load(path)?),
    };

    Ok(store)
}
