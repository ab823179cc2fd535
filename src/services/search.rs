//! Searches issued from the document workspace: semantic search, keyword
//! lookup and the server file listing.

use tracing::{info, warn};

use crate::api::{ApiError, GrimoireApi};
use crate::models::{FileListing, QuickHit, SemanticHit};
use crate::session::{Control, SessionState, Severity};

pub const EMPTY_QUERY: &str = "Please enter a search query";
pub const EMPTY_LOOKUP: &str = "Please type something to search.";
const SEARCH_COMPLETED: &str = "Search completed!";
const SEARCH_FAILED: &str = "An error occurred while searching";
const LOOKUP_FAILED: &str = "An error occurred while contacting the server.";

/// Semantic search over uploaded documents.
///
/// An empty (or whitespace-only) query is rejected before any request.
pub async fn semantic_search(
    api: &dyn GrimoireApi,
    session: &mut SessionState,
    query: &str,
) -> Option<Vec<SemanticHit>> {
    let query = query.trim();
    if query.is_empty() {
        session.flashes.push(EMPTY_QUERY, Severity::Error);
        return None;
    }

    // Only the busy state gates this; the backend searches every stored
    // document, not just this session's uploads.
    if !session.controls.begin(Control::Search) {
        return None;
    }

    let outcome = match api.semantic_search(query).await {
        Ok(hits) => {
            info!("Search for {:?} returned {} hit(s)", query, hits.len());
            session.flashes.push(SEARCH_COMPLETED, Severity::Success);
            Some(hits)
        }
        Err(e) => {
            warn!("Search for {:?} failed: {}", query, e);
            session
                .flashes
                .push(e.user_message(SEARCH_FAILED), Severity::Error);
            None
        }
    };

    session.controls.finish(Control::Search);
    outcome
}

/// Keyword lookup against `/api/buscar`.
pub async fn quick_search(
    api: &dyn GrimoireApi,
    session: &mut SessionState,
    query: &str,
) -> Option<Vec<QuickHit>> {
    let query = query.trim();
    if query.is_empty() {
        session.flashes.push(EMPTY_LOOKUP, Severity::Error);
        return None;
    }

    match api.quick_search(query).await {
        Ok(hits) => Some(hits),
        Err(e) => {
            warn!("Lookup for {:?} failed: {}", query, e);
            session.flashes.push(LOOKUP_FAILED, Severity::Error);
            None
        }
    }
}

/// Fetch the list of files the server holds.
pub async fn list_files(api: &dyn GrimoireApi, session: &mut SessionState) -> Option<FileListing> {
    match api.list_files().await {
        Ok(listing) => {
            info!("Loaded {} file(s)", listing.total);
            Some(listing)
        }
        Err(e) => {
            warn!("Loading files failed: {}", e);
            let reason = match e {
                ApiError::Transport(reason) | ApiError::Application(reason) => reason,
            };
            session
                .flashes
                .push(format!("Error loading files: {}", reason), Severity::Error);
            None
        }
    }
}
