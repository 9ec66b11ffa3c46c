pub mod auth_forms;
pub mod dashboard;
pub mod document;
pub mod notify;
pub mod render;
pub mod shared;
pub mod shell;
pub mod state;

// Re-export the shell pieces the binary builds on.
pub use shell::{Landing, Screen, Shell};
pub use state::{AppState, Outcome, ViewScope};
