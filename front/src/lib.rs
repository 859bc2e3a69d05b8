pub mod api;
pub mod controller;
pub mod render;
pub mod state;

pub use api::ApiClient;
pub use controller::Controller;
pub use state::{Action, ViewState};
