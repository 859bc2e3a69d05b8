//! PostgreSQL implementation of [`TodoStore`].
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE todos (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     title TEXT NOT NULL CHECK (btrim(title) <> ''),
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mint_api::v1::Todo;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        title TEXT NOT NULL CHECK (btrim(title) <> ''),
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS todos_created_at_idx ON todos (created_at DESC)",
];

#[derive(Debug)]
pub struct PgTodoStore {
    pool: PgPool,
    schema: OnceCell<()>,
}

#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: Uuid,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}

impl PgTodoStore {
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = Self::pool_options(max_connections).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Builds a pool that opens its first connection on first use.
    pub fn connect_lazy(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = Self::pool_options(max_connections).connect_lazy(url)?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }

    fn pool_options(max_connections: u32) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
    }

    /// Creates the `todos` table if it is missing. Runs at most once.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.schema
            .get_or_try_init(|| async {
                for statement in SCHEMA {
                    sqlx::query(statement).execute(&self.pool).await?;
                }

                tracing::debug!("todos schema ready");
                Ok::<_, StoreError>(())
            })
            .await?;

        Ok(())
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.ensure_schema().await?;
        sqlx::query("SELECT 1").execute(&self.pool).await?;

        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, completed, created_at FROM todos ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn create(&self, title: &str) -> StoreResult<Todo> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            INSERT INTO todos (title)
            VALUES ($1)
            RETURNING id, title, completed, created_at
            "#,
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, completed, created_at FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Todo::from))
    }

    async fn set_completed(&self, id: Uuid, completed: bool) -> StoreResult<Todo> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos SET completed = $2
            WHERE id = $1
            RETURNING id, title, completed, created_at
            "#,
        )
        .bind(id)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Todo::from).ok_or(StoreError::NotFound)
    }

    async fn toggle_completed(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos SET completed = NOT completed
            WHERE id = $1
            RETURNING id, title, completed, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Todo::from))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        match result.rows_affected() {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }
}
