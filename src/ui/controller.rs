//! Top-level UI controller.
//!
//! Owns the session state and the results panel, and exposes one method per
//! user event. Each event runs to completion before the next one starts.

use std::time::Instant;

use tracing::debug;

use super::templates;
use crate::api::GrimoireApi;
use crate::config::Settings;
use crate::models::{
    DocumentId, FileListing, QuickHit, SearchResponsePage, SemanticHit, StagedFile,
};
use crate::services::{
    search, ActionDispatcher, ActionOutcome, AutocompleteResponse, BatchOutcome, Debouncer,
    DocumentAction, ProgressSink, QueryConfig, SearchConnector, SearchState, SortOption,
    UploadOrchestrator, UploadReport,
};
use crate::session::{FlashId, SessionState};

/// What the results panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Documents,
    Action {
        text: Option<String>,
        summary: Option<String>,
    },
    SemanticResults(Vec<SemanticHit>),
    SearchPage(SearchResponsePage),
    QuickResults(Vec<QuickHit>),
    Files(FileListing),
}

pub struct Controller<A: GrimoireApi> {
    api: A,
    settings: Settings,
    session: SessionState,
    panel: Panel,
    search_state: SearchState,
    query_config: QueryConfig,
    debouncer: Debouncer,
}

impl<A: GrimoireApi> Controller<A> {
    pub fn new(api: A, settings: Settings) -> Self {
        let search_state = SearchState {
            results_per_page: settings.results_per_page,
            ..Default::default()
        };
        Self {
            api,
            session: SessionState::new(settings.flash_ttl()),
            panel: Panel::Documents,
            search_state,
            query_config: QueryConfig::default(),
            debouncer: Debouncer::new(settings.debounce()),
            settings,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search_state
    }

    pub fn set_search_state(&mut self, state: SearchState) {
        self.search_state = state;
    }

    // Staging

    /// Replace the staged list with a new picker selection.
    pub fn stage_files(&mut self, files: Vec<StagedFile>) {
        self.session.stage(files);
    }

    /// Add dropped files to the staged list.
    pub fn add_staged(&mut self, files: Vec<StagedFile>) {
        self.session.stage_more(files);
    }

    pub fn remove_staged(&mut self, index: usize) -> Option<StagedFile> {
        self.session.unstage(index)
    }

    // Uploads

    /// Upload files one request per file.
    pub async fn upload_files(
        &mut self,
        files: &[StagedFile],
        progress: &dyn ProgressSink,
    ) -> UploadReport {
        let report = UploadOrchestrator::new(&self.api)
            .upload_each(&mut self.session, files, progress)
            .await;
        if !report.uploaded.is_empty() {
            self.panel = Panel::Documents;
        }
        report
    }

    /// Submit the staged list as one batch.
    pub async fn submit_staged(&mut self) -> BatchOutcome {
        UploadOrchestrator::new(&self.api)
            .submit_staged(&mut self.session)
            .await
    }

    // Document actions

    pub fn select_document(&mut self, id: DocumentId) -> bool {
        let selected = self.session.select(id);
        debug!("Select document {}: {}", id, selected);
        selected
    }

    pub async fn extract_text(&mut self) -> Option<ActionOutcome> {
        self.run_action(DocumentAction::ExtractText).await
    }

    pub async fn summarize(&mut self) -> Option<ActionOutcome> {
        self.run_action(DocumentAction::Summarize).await
    }

    async fn run_action(&mut self, action: DocumentAction) -> Option<ActionOutcome> {
        let outcome = ActionDispatcher::new(&self.api)
            .dispatch(&mut self.session, action)
            .await?;

        self.panel = match action {
            DocumentAction::ExtractText => Panel::Action {
                text: Some(outcome.content.clone()),
                summary: None,
            },
            DocumentAction::Summarize => Panel::Action {
                text: None,
                summary: Some(outcome.content.clone()),
            },
        };
        Some(outcome)
    }

    // Workspace searches

    pub async fn semantic_search(&mut self, query: &str) -> bool {
        match search::semantic_search(&self.api, &mut self.session, query).await {
            Some(hits) => {
                self.panel = Panel::SemanticResults(hits);
                true
            }
            None => false,
        }
    }

    pub async fn quick_search(&mut self, query: &str) -> bool {
        match search::quick_search(&self.api, &mut self.session, query).await {
            Some(hits) => {
                self.panel = Panel::QuickResults(hits);
                true
            }
            None => false,
        }
    }

    pub async fn load_files(&mut self) -> bool {
        match search::list_files(&self.api, &mut self.session).await {
            Some(listing) => {
                self.panel = Panel::Files(listing);
                true
            }
            None => false,
        }
    }

    // Connector searches

    pub fn connector(&self) -> SearchConnector<'_> {
        SearchConnector::new(&self.api)
    }

    pub fn debouncer(&self) -> Debouncer {
        self.debouncer.clone()
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.query_config
    }

    /// Search with the current state; used on initial load. Returns the
    /// total result count.
    pub async fn refresh_search(&mut self) -> u64 {
        let page = self
            .connector()
            .on_search(&self.search_state, &self.query_config)
            .await;
        let total = page.total_results;
        self.show_search_page(page);
        total
    }

    /// Run a search for a new term, starting from the first page.
    pub async fn search(&mut self, term: &str) -> u64 {
        self.search_state.search_term = term.to_string();
        self.search_state.current = 1;
        self.refresh_search().await
    }

    pub async fn go_to_page(&mut self, page: u32) -> u64 {
        self.search_state.current = page.max(1);
        self.refresh_search().await
    }

    pub async fn sort_by(&mut self, option: &SortOption) -> u64 {
        self.search_state.sort_list = option.sort_list();
        self.search_state.current = 1;
        self.refresh_search().await
    }

    /// Add a value to a facet filter, creating the filter if needed.
    pub async fn add_filter(&mut self, field: &str, value: &str) -> u64 {
        self.search_state.add_filter_value(field, value);
        self.search_state.current = 1;
        self.refresh_search().await
    }

    pub async fn clear_filters(&mut self) -> u64 {
        self.search_state.filters.clear();
        self.search_state.current = 1;
        self.refresh_search().await
    }

    pub async fn autocomplete(&self, term: &str) -> AutocompleteResponse {
        let state = SearchState {
            search_term: term.to_string(),
            ..self.search_state.clone()
        };
        self.connector()
            .on_autocomplete(&state, &self.query_config)
            .await
    }

    /// Show a page produced outside the controller, e.g. by a debounced
    /// search running on another task.
    pub fn show_search_page(&mut self, page: SearchResponsePage) {
        self.panel = Panel::SearchPage(page);
    }

    // Flashes

    pub fn dismiss_flash(&mut self, id: FlashId) -> bool {
        self.session.flashes.dismiss(id)
    }

    /// Expire old flash messages. Returns how many were removed.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.session.flashes.expire(now)
    }

    // Rendering

    /// Results container: flash messages on top of the current panel.
    pub fn render(&self) -> String {
        let mut html = templates::flashes(self.session.flashes.messages());
        if !html.is_empty() {
            html.push('\n');
        }
        html.push_str(&self.render_panel());
        html
    }

    pub fn render_panel(&self) -> String {
        match &self.panel {
            Panel::Documents => templates::document_list(self.session.documents()),
            Panel::Action { text, summary } => templates::action_card(
                text.as_deref(),
                summary.as_deref(),
                self.settings.preview_chars,
            ),
            Panel::SemanticResults(hits) => {
                templates::semantic_hits(hits, &self.settings.date_format)
            }
            Panel::SearchPage(page) => templates::search_page(
                page,
                self.search_state.current,
                self.search_state.results_per_page,
                &self.settings.date_format,
            ),
            Panel::QuickResults(hits) => templates::quick_hits(hits),
            Panel::Files(listing) => templates::file_listing(listing),
        }
    }

    /// Upload area: staged files, per-file progress and the action buttons.
    pub fn render_upload_area(&self) -> String {
        let staged = templates::staged_files(self.session.staged());
        let progress = templates::upload_progress(self.session.progress());
        let buttons = templates::action_buttons(&self.session.controls);
        format!(
            r#"<div class="upload-section">{}</div>
<div id="uploadProgress">{}</div>
<div class="actions">{}</div>"#,
            staged, progress, buttons
        )
    }
}
