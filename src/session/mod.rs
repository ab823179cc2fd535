//! Client-side session state.
//!
//! Everything the UI remembers between events lives in [`SessionState`]:
//! uploaded documents, the selected document, staged files, per-file upload
//! progress, flash messages and control state. Nothing outlives the session.

mod controls;
mod flash;

pub use controls::{Control, ControlState, Controls};
pub use flash::{FlashBoard, FlashId, FlashMessage, Severity};

use std::time::Duration;

use crate::models::{DocumentId, StagedFile, UploadedDocument};

/// Upload state of one file in per-file mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressItem {
    pub name: String,
    pub status: UploadStatus,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    documents: Vec<UploadedDocument>,
    selected: Option<DocumentId>,
    staged: Vec<StagedFile>,
    progress: Vec<ProgressItem>,
    pub flashes: FlashBoard,
    pub controls: Controls,
}

impl SessionState {
    pub fn new(flash_ttl: Duration) -> Self {
        Self {
            documents: Vec::new(),
            selected: None,
            staged: Vec::new(),
            progress: Vec::new(),
            flashes: FlashBoard::new(flash_ttl),
            controls: Controls::default(),
        }
    }

    // Documents

    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&UploadedDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Append an uploaded document and enable the dependent controls.
    pub fn add_document(&mut self, document: UploadedDocument) {
        self.documents.push(document);
        self.controls.set_documents_available(true);
    }

    // Selection

    pub fn selected(&self) -> Option<DocumentId> {
        self.selected
    }

    /// Select a document. Unknown ids are rejected and the selection is kept.
    pub fn select(&mut self, id: DocumentId) -> bool {
        if self.document(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// The explicit selection, or the first uploaded document when nothing
    /// was selected yet. The fallback becomes the selection.
    pub fn selected_or_first(&mut self) -> Option<DocumentId> {
        if self.selected.is_none() {
            self.selected = self.documents.first().map(|d| d.id);
        }
        self.selected
    }

    // Staged files

    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Replace the staged list with a new selection.
    pub fn stage(&mut self, files: Vec<StagedFile>) {
        self.staged = files;
    }

    /// Add files to the staged list, keeping what is already there.
    pub fn stage_more(&mut self, files: impl IntoIterator<Item = StagedFile>) {
        self.staged.extend(files);
    }

    pub fn unstage(&mut self, index: usize) -> Option<StagedFile> {
        (index < self.staged.len()).then(|| self.staged.remove(index))
    }

    pub fn clear_staged(&mut self) {
        self.staged.clear();
    }

    // Upload progress

    pub fn progress(&self) -> &[ProgressItem] {
        &self.progress
    }

    /// Start a fresh set of progress items, one per file, all pending.
    pub fn reset_progress<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.progress = names
            .into_iter()
            .map(|name| ProgressItem {
                name: name.to_string(),
                status: UploadStatus::Pending,
            })
            .collect();
    }

    pub fn set_progress(&mut self, index: usize, status: UploadStatus) {
        if let Some(item) = self.progress.get_mut(index) {
            item.status = status;
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_FLASH_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i64, name: &str) -> UploadedDocument {
        UploadedDocument {
            id: DocumentId(id),
            filename: name.to_string(),
            file_size: 100,
        }
    }

    #[test]
    fn test_select_requires_known_document() {
        let mut session = SessionState::default();
        assert!(!session.select(DocumentId(1)));
        assert_eq!(session.selected(), None);

        session.add_document(doc(1, "a.pdf"));
        session.add_document(doc(2, "b.pdf"));
        assert!(session.select(DocumentId(2)));
        assert!(!session.select(DocumentId(9)));
        assert_eq!(session.selected(), Some(DocumentId(2)));
    }

    #[test]
    fn test_selected_or_first_defaults_to_first_upload() {
        let mut session = SessionState::default();
        assert_eq!(session.selected_or_first(), None);

        session.add_document(doc(5, "a.pdf"));
        session.add_document(doc(6, "b.pdf"));
        assert_eq!(session.selected_or_first(), Some(DocumentId(5)));
        assert_eq!(session.selected(), Some(DocumentId(5)));
    }

    #[test]
    fn test_adding_document_enables_controls() {
        let mut session = SessionState::default();
        assert!(!session.controls.get(Control::Extract).enabled);
        session.add_document(doc(1, "a.pdf"));
        assert!(session.controls.get(Control::Extract).enabled);
        assert!(session.controls.get(Control::Search).enabled);
    }

    #[test]
    fn test_unstage_by_index() {
        let mut session = SessionState::default();
        session.stage(vec![
            StagedFile::from_bytes("a.txt", b"a".to_vec()),
            StagedFile::from_bytes("b.txt", b"b".to_vec()),
        ]);
        session.stage_more([StagedFile::from_bytes("c.txt", b"c".to_vec())]);

        assert_eq!(session.unstage(1).map(|f| f.name), Some("b.txt".to_string()));
        assert!(session.unstage(5).is_none());
        let names: Vec<_> = session.staged().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
    }
}
