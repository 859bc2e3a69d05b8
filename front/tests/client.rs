use std::sync::Arc;

use mint_back::{store::MemoryTodoStore, AppState, Config};
use mint_front::{ApiClient, Controller};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Starts a server on an ephemeral port and returns its base url.
async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = Config::in_memory();
    let state = Arc::new(AppState::new(
        Arc::new(MemoryTodoStore::default()),
        config.environment.clone(),
    ));
    let app = mint_back::app(state, &config).unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // trailing slash on purpose
    format!("http://{addr}/")
}

// --- api client ---

#[tokio::test]
async fn client_round_trip() {
    let api = ApiClient::new(spawn_server().await);

    assert!(api.list_todos().await.unwrap().is_empty());

    let created = api.create_todo("  Buy milk ").await.unwrap();
    assert_eq!(created.title, "Buy milk");
    assert!(!created.completed);

    let toggled = api.toggle_todo(created.id).await.unwrap();
    assert!(toggled.completed);

    api.delete_todo(created.id).await.unwrap();
    assert!(api.list_todos().await.unwrap().is_empty());
}

#[tokio::test]
async fn client_errors_carry_body_text() {
    let api = ApiClient::new(spawn_server().await);

    let err = api.create_todo("   ").await.unwrap_err();
    assert_eq!(err.to_string(), r#"{"message":"title is required"}"#);

    let err = api.delete_todo(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.to_string(), r#"{"message":"Todo not found"}"#);
}

#[tokio::test]
async fn client_errors_fall_back_to_status_text() {
    let base = spawn_server().await;
    let api = ApiClient::new(format!("{base}nowhere"));

    let err = api.list_todos().await.unwrap_err();
    assert_eq!(err.to_string(), "Not Found");
}

// --- controller ---

#[tokio::test]
async fn controller_reconciles_after_each_mutation() {
    let base = spawn_server().await;
    let seed = ApiClient::new(base.clone());
    let existing = seed.create_todo("existing").await.unwrap();

    let mut controller = Controller::new(ApiClient::new(base));
    assert!(controller.state().loading);

    controller.mount().await;
    assert!(!controller.state().loading);
    assert_eq!(controller.state().todos, vec![existing.clone()]);

    controller.edit_title("  Walk dog ");
    controller.submit().await;

    let state = controller.state();
    assert_eq!(state.todos.len(), 2);
    assert_eq!(state.todos[0].title, "Walk dog");
    assert!(state.new_title.is_empty());
    assert!(!state.submitting);

    controller.toggle(existing.id).await;
    assert!(controller.state().todos[1].completed);
    assert_eq!(controller.state().completed_count(), 1);

    controller.delete(existing.id).await;
    assert_eq!(controller.state().todos.len(), 1);
    assert!(controller.state().error.is_none());
}

#[tokio::test]
async fn controller_blank_submit_sends_nothing() {
    let base = spawn_server().await;
    let mut controller = Controller::new(ApiClient::new(base.clone()));
    controller.mount().await;

    controller.edit_title("   ");
    controller.submit().await;

    assert!(controller.state().error.is_none());
    assert!(ApiClient::new(base).list_todos().await.unwrap().is_empty());
}

#[tokio::test]
async fn controller_failure_keeps_list_and_sets_error() {
    let base = spawn_server().await;
    let seed = ApiClient::new(base.clone());
    let todo = seed.create_todo("only").await.unwrap();

    let mut controller = Controller::new(ApiClient::new(base));
    controller.mount().await;

    seed.delete_todo(todo.id).await.unwrap();
    controller.toggle(todo.id).await;

    let state = controller.state();
    assert_eq!(state.todos, vec![todo.clone()]);
    assert_eq!(
        state.error.as_deref(),
        Some(r#"{"message":"Todo not found"}"#)
    );

    controller.delete(todo.id).await;
    assert_eq!(controller.state().todos, vec![todo]);
}

#[tokio::test]
async fn controller_mount_failure_stops_loading() {
    // nothing listens on this port once the listener is dropped
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut controller = Controller::new(ApiClient::new(format!("http://{addr}")));
    controller.mount().await;

    let state = controller.state();
    assert!(!state.loading);
    assert!(state.error.is_some());
    assert!(state.todos.is_empty());
}
