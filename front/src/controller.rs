use tracing::warn;
use uuid::Uuid;

use crate::{
    api::ApiClient,
    state::{Action, ViewState},
};

/// Drives [`ViewState`] from API results. Nothing is applied optimistically.
pub struct Controller {
    api: ApiClient,
    state: ViewState,
}

impl Controller {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub async fn mount(&mut self) {
        match self.api.list_todos().await {
            Ok(todos) => self.state.apply(Action::LoadSucceeded(todos)),
            Err(err) => self.fail(err, "Failed to load todos"),
        }

        self.state.apply(Action::LoadFinished);
    }

    pub fn edit_title(&mut self, title: impl Into<String>) {
        self.state.apply(Action::TitleEdited(title.into()));
    }

    /// Creates a todo from the pending title. Blank titles send nothing.
    pub async fn submit(&mut self) {
        if !self.state.can_submit() {
            return;
        }

        let title = self.state.new_title.trim().to_owned();
        self.state.apply(Action::CreateStarted);

        match self.api.create_todo(&title).await {
            Ok(todo) => self.state.apply(Action::CreateSucceeded(todo)),
            Err(err) => self.fail(err, "Failed to create todo"),
        }

        self.state.apply(Action::CreateFinished);
    }

    pub async fn toggle(&mut self, id: Uuid) {
        match self.api.toggle_todo(id).await {
            Ok(todo) => self.state.apply(Action::ToggleSucceeded(todo)),
            Err(err) => self.fail(err, "Failed to update todo"),
        }
    }

    pub async fn delete(&mut self, id: Uuid) {
        match self.api.delete_todo(id).await {
            Ok(()) => self.state.apply(Action::DeleteSucceeded(id)),
            Err(err) => self.fail(err, "Failed to delete todo"),
        }
    }

    fn fail(&mut self, err: eyre::Report, fallback: &str) {
        warn!("{:?}", err);

        let message = match err.to_string() {
            message if message.is_empty() => fallback.to_owned(),
            message => message,
        };

        self.state.apply(Action::OperationFailed(message));
    }
}
