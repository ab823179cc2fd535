//! Backend API access.
//!
//! [`GrimoireApi`] is the seam between the UI layer and the network; the
//! controller only ever talks to the backend through it.

mod client;

pub use client::HttpApi;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    DocumentId, FileListing, QuickHit, SearchRequest, SearchResponsePage, SemanticHit, StagedFile,
    UploadedDocument,
};

/// Errors surfaced by the backend API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a usable payload: connection failure,
    /// timeout, or a body that was not the expected JSON.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The server answered with a well-formed failure payload.
    #[error("{0}")]
    Application(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Message to show the user: the server's text for application failures,
    /// the given generic text for transport failures.
    pub fn user_message(&self, transport_fallback: &str) -> String {
        match self {
            ApiError::Application(msg) => msg.clone(),
            ApiError::Transport(_) => transport_fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// Operations the Grimoire backend offers.
#[async_trait]
pub trait GrimoireApi: Send + Sync {
    /// `POST /api/upload` with a single file.
    async fn upload_document(&self, file: &StagedFile) -> Result<UploadedDocument, ApiError>;

    /// `POST /upload` with every file in one multipart body. Returns the
    /// server's confirmation message.
    async fn upload_batch(&self, files: &[StagedFile]) -> Result<Option<String>, ApiError>;

    /// `POST /api/extract-text/{id}`.
    async fn extract_text(&self, id: DocumentId) -> Result<String, ApiError>;

    /// `POST /api/summarize/{id}`.
    async fn summarize(&self, id: DocumentId) -> Result<String, ApiError>;

    /// `POST /api/search` with a plain `{query}` body.
    async fn semantic_search(&self, query: &str) -> Result<Vec<SemanticHit>, ApiError>;

    /// `POST /api/search` with the connector body.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponsePage, ApiError>;

    /// `GET /api/buscar?q=`.
    async fn quick_search(&self, query: &str) -> Result<Vec<QuickHit>, ApiError>;

    /// `GET /read-files`.
    async fn list_files(&self) -> Result<FileListing, ApiError>;
}
