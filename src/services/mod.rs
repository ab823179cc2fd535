//! Service layer for Grimoire client logic.
//!
//! This module contains the request lifecycle separated from rendering.
//! Services operate on an explicit [`SessionState`](crate::session::SessionState)
//! and can be driven by the CLI, a UI controller, or tests.

pub mod actions;
pub mod connector;
pub mod debounce;
pub mod search;
pub mod upload;

pub use actions::{ActionDispatcher, ActionOutcome, DocumentAction};
pub use connector::{AutocompleteResponse, QueryConfig, SearchConnector, SearchState, SortOption};
pub use debounce::Debouncer;
pub use upload::{BatchOutcome, NoProgress, ProgressSink, UploadOrchestrator, UploadReport};
