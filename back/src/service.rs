use std::sync::Arc;

use mint_api::v1::Todo;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    store::TodoStore,
};

pub const TITLE_REQUIRED: &str = "title is required";

/// Validation and delegation between the routes and the store.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TodoStore> {
        &self.store
    }

    pub async fn list(&self) -> ApiResult<Vec<Todo>> {
        Ok(self.store.list().await?)
    }

    /// Creates a todo from a request body of the shape `{"title": string}`.
    pub async fn create(&self, body: &Value) -> ApiResult<Todo> {
        let title = validate_title(body)?;
        let todo = self.store.create(&title).await?;

        info!(
            id = %todo.id,
            title = %todo.title,
            "created todo"
        );

        Ok(todo)
    }

    pub async fn toggle(&self, id: &str) -> ApiResult<Todo> {
        let id = parse_id(id)?;
        let todo = (self.store.toggle_completed(id).await?).ok_or(ApiError::NotFound)?;

        info!(
            id = %todo.id,
            completed = todo.completed,
            "toggled todo"
        );

        Ok(todo)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let id = parse_id(id)?;
        self.store.delete_by_id(id).await?;

        info!(id = %id, "deleted todo");

        Ok(())
    }
}

/// Extracts the trimmed, non-empty `title` of a create request.
pub fn validate_title(body: &Value) -> ApiResult<String> {
    let title = match body.get("title") {
        Some(Value::String(title)) => title.trim(),
        _ => return Err(ApiError::validation(TITLE_REQUIRED)),
    };

    if title.is_empty() {
        return Err(ApiError::validation(TITLE_REQUIRED));
    }

    Ok(title.to_owned())
}

// ids are opaque to callers, anything unparseable simply names no record
fn parse_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}
