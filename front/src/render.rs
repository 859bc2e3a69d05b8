use std::fmt::Write;

use chrono::Local;

use crate::state::ViewState;

/// Renders the whole view as plain text.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Todo dashboard");
    let _ = writeln!(
        out,
        "{} total / {} completed",
        state.total(),
        state.completed_count()
    );

    if let Some(error) = &state.error {
        let _ = writeln!(out, "error: {error}");
    }

    if state.loading {
        let _ = writeln!(out, "Loading todos…");
        return out;
    }

    if state.todos.is_empty() {
        let _ = writeln!(out, "No todos yet. Create your first one above.");
        return out;
    }

    for todo in &state.todos {
        let mark = if todo.completed { "x" } else { " " };
        let created = todo.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");

        let _ = writeln!(out, "[{mark}] {} ({created}) {}", todo.title, todo.id);
    }

    out
}
