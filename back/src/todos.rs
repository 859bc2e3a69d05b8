use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};
use mint_api::v1::Todo;
use serde_json::Value;

use crate::{error::ApiResult, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/:id", delete(delete_todo))
        .route("/:id/toggle", patch(toggle_todo))
}

async fn list_todos(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.service.list().await?))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    // a body that is not JSON carries no title
    let body = body.map(|Json(body)| body).unwrap_or(Value::Null);
    let todo = state.service.create(&body).await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

async fn toggle_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    Ok(Json(state.service.toggle(&id).await?))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
