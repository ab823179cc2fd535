//! Grimoire client library.
//!
//! Talks to the Grimoire document service over HTTP: uploads documents,
//! requests text extraction and summaries, and runs semantic, faceted and
//! keyword searches. Results are rendered as HTML fragments by [`ui`].

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod services;
pub mod session;
pub mod ui;

pub use api::{ApiError, GrimoireApi, HttpApi};
pub use config::Settings;
pub use session::SessionState;
pub use ui::Controller;
