//! Per-document server operations: text extraction and summarization.

use tracing::{info, warn};

use crate::api::GrimoireApi;
use crate::models::DocumentId;
use crate::session::{Control, SessionState, Severity};

pub const NO_DOCUMENT_SELECTED: &str = "Please select a document first";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    ExtractText,
    Summarize,
}

impl DocumentAction {
    pub fn control(&self) -> Control {
        match self {
            DocumentAction::ExtractText => Control::Extract,
            DocumentAction::Summarize => Control::Summarize,
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            DocumentAction::ExtractText => "Text extracted successfully!",
            DocumentAction::Summarize => "Summary generated successfully!",
        }
    }

    fn transport_message(&self) -> &'static str {
        match self {
            DocumentAction::ExtractText => "An error occurred while extracting text",
            DocumentAction::Summarize => "An error occurred while summarizing",
        }
    }
}

/// Successful result of a document action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub document_id: DocumentId,
    pub action: DocumentAction,
    /// Extracted text or summary.
    pub content: String,
}

pub struct ActionDispatcher<'a> {
    api: &'a dyn GrimoireApi,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(api: &'a dyn GrimoireApi) -> Self {
        Self { api }
    }

    /// Run an action on the selected document (or the first one uploaded).
    ///
    /// Returns `None` when nothing ran or the request failed; the reason is
    /// reported through the session's flash board.
    pub async fn dispatch(
        &self,
        session: &mut SessionState,
        action: DocumentAction,
    ) -> Option<ActionOutcome> {
        let Some(document_id) = session.selected_or_first() else {
            session.flashes.push(NO_DOCUMENT_SELECTED, Severity::Error);
            return None;
        };

        let control = action.control();
        if !session.controls.begin(control) {
            return None;
        }

        let result = match action {
            DocumentAction::ExtractText => self.api.extract_text(document_id).await,
            DocumentAction::Summarize => self.api.summarize(document_id).await,
        };

        let outcome = match result {
            Ok(content) => {
                info!("{:?} finished for document {}", action, document_id);
                session
                    .flashes
                    .push(action.success_message(), Severity::Success);
                Some(ActionOutcome {
                    document_id,
                    action,
                    content,
                })
            }
            Err(e) => {
                warn!("{:?} failed for document {}: {}", action, document_id, e);
                session.flashes.push(
                    e.user_message(action.transport_message()),
                    Severity::Error,
                );
                None
            }
        };

        session.controls.finish(control);
        outcome
    }
}
