pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod store;

mod todos;

pub use config::{Config, Deployment};
pub use server::{app, AppState};
