//! Client-side view state, changed only through [`Action`]s.

use mint_api::v1::Todo;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    TitleEdited(String),
    LoadSucceeded(Vec<Todo>),
    LoadFinished,
    CreateStarted,
    CreateSucceeded(Todo),
    CreateFinished,
    ToggleSucceeded(Todo),
    DeleteSucceeded(Uuid),
    OperationFailed(String),
}

/// Local mirror of the server's list plus form and status flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    /// Newest first, as served.
    pub todos: Vec<Todo>,
    pub new_title: String,
    pub loading: bool,
    pub submitting: bool,
    pub error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            new_title: String::new(),
            loading: true,
            submitting: false,
            error: None,
        }
    }
}

impl ViewState {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::TitleEdited(title) => self.new_title = title,
            Action::LoadSucceeded(todos) => self.todos = todos,
            Action::LoadFinished => self.loading = false,
            Action::CreateStarted => self.submitting = true,
            Action::CreateSucceeded(todo) => {
                self.todos.insert(0, todo);
                self.new_title.clear();
            }
            Action::CreateFinished => self.submitting = false,
            Action::ToggleSucceeded(updated) => {
                if let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == updated.id) {
                    *todo = updated;
                }
            }
            Action::DeleteSucceeded(id) => self.todos.retain(|todo| todo.id != id),
            Action::OperationFailed(message) => self.error = Some(message),
        }
    }

    pub fn total(&self) -> usize {
        self.todos.len()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.new_title.trim().is_empty()
    }
}
