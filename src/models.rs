//! Data types shared by the API client, the session and the renderer.
//!
//! Wire types mirror the JSON the Grimoire backend speaks; domain types are
//! what the session keeps once a response has been reconciled.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-assigned document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file selected by the user that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl StagedFile {
    pub fn from_bytes(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Read a file from disk into a staged handle.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, content))
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// Per-file response of `POST /api/upload`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub document_id: Option<DocumentId>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadResult {
    /// Convert a successful result into the document the session tracks.
    ///
    /// Returns the server error (if any) when the upload was rejected.
    pub fn into_document(self, fallback_name: &str) -> Result<UploadedDocument, Option<String>> {
        match (self.success, self.document_id) {
            (true, Some(id)) => Ok(UploadedDocument {
                id,
                filename: self.filename.unwrap_or_else(|| fallback_name.to_string()),
                file_size: self.file_size.unwrap_or(0),
            }),
            _ => Err(self.error),
        }
    }
}

/// A document the server accepted during this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: DocumentId,
    pub filename: String,
    pub file_size: u64,
}

/// Response of the per-document extract/summarize endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of the batch upload endpoint (`POST /upload`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchUploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// How the values of a filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    All,
    Any,
    None,
}

/// An active facet filter: field name and selected values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub values: Vec<String>,
    #[serde(rename = "type", default)]
    pub filter_type: FilterType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One entry of the sort list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Body of `POST /api/search` as sent by the search connector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_term: String,
    pub filters: Vec<Filter>,
    pub current: u32,
    pub results_per_page: u32,
    pub sort: Vec<Sort>,
}

/// A single search result: field name to `{raw, snippet}` plus `_meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResultMeta>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMeta {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl ResultRecord {
    /// Raw value of a field.
    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).and_then(|v| v.get("raw"))
    }

    /// Raw value of a field rendered as a string.
    pub fn raw_str(&self, field: &str) -> Option<String> {
        match self.raw(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Server-highlighted snippet of a field.
    pub fn snippet(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|v| v.get("snippet"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn score(&self) -> Option<f64> {
        self.meta.as_ref().and_then(|m| m.score)
    }
}

/// A value/count pair inside a facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: Value,
    pub count: u64,
}

/// One aggregation block for a facet field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetGroup {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(rename = "type", default)]
    pub facet_type: Option<String>,
    #[serde(default)]
    pub data: Vec<FacetValue>,
}

pub type Facets = BTreeMap<String, Vec<FacetGroup>>;

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub total_pages: u64,
    pub total_results: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMeta {
    pub page: PageMeta,
}

/// Raw body of the connector search response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponseBody {
    pub results: Vec<ResultRecord>,
    pub meta: SearchMeta,
    #[serde(default)]
    pub facets: Facets,
}

/// Normalized page of search results handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResponsePage {
    pub results: Vec<ResultRecord>,
    pub total_pages: u64,
    pub total_results: u64,
    pub facets: Facets,
}

impl SearchResponsePage {
    /// The shape returned when anything goes wrong.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<SearchResponseBody> for SearchResponsePage {
    fn from(body: SearchResponseBody) -> Self {
        Self {
            results: body.results,
            total_pages: body.meta.page.total_pages,
            total_results: body.meta.page.total_results,
            facets: body.facets,
        }
    }
}

/// Result of the semantic search issued by the document workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticHit {
    #[serde(default)]
    pub document_id: Option<DocumentId>,
    pub filename: String,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SemanticSearchResponse {
    #[serde(default)]
    pub results: Option<Vec<SemanticHit>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Entry returned by the keyword lookup (`GET /api/buscar`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickHit {
    pub url: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
}

/// A file known to the server's file store (`GET /read-files`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedFile {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tamaño_kb", default)]
    pub size_kb: f64,
    #[serde(rename = "fecha_modificacion", default)]
    pub modified: Option<String>,
    #[serde(rename = "tipo", default)]
    pub kind: Option<String>,
    #[serde(rename = "ruta", default)]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileListing {
    #[serde(rename = "archivos", default)]
    pub files: Vec<ListedFile>,
    #[serde(rename = "total_archivos", default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_uses_connector_field_names() {
        let request = SearchRequest {
            search_term: "budget".to_string(),
            filters: vec![Filter {
                field: "fileType".to_string(),
                values: vec!["pdf".to_string()],
                filter_type: FilterType::Any,
            }],
            current: 2,
            results_per_page: 20,
            sort: vec![Sort {
                field: "uploadDate".to_string(),
                direction: SortDirection::Desc,
            }],
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "searchTerm": "budget",
                "filters": [{"field": "fileType", "values": ["pdf"], "type": "any"}],
                "current": 2,
                "resultsPerPage": 20,
                "sort": [{"field": "uploadDate", "direction": "desc"}],
            })
        );
    }

    #[test]
    fn test_result_record_reads_raw_and_snippet() {
        let record: ResultRecord = serde_json::from_value(json!({
            "_meta": {"id": "7", "score": 3.5},
            "fileName": {"raw": "report.pdf", "snippet": "<em>report</em>.pdf"},
            "fileSize": {"raw": 2048},
            "summary": {"raw": "plain", "snippet": ""},
        }))
        .unwrap();

        assert_eq!(record.score(), Some(3.5));
        assert_eq!(record.raw_str("fileName").as_deref(), Some("report.pdf"));
        assert_eq!(record.snippet("fileName"), Some("<em>report</em>.pdf"));
        assert_eq!(record.raw("fileSize").and_then(Value::as_u64), Some(2048));
        // Empty snippets fall back to raw in the renderer.
        assert_eq!(record.snippet("summary"), None);
        assert!(record.raw("missing").is_none());
    }

    #[test]
    fn test_upload_result_without_id_is_rejected() {
        let result: UploadResult =
            serde_json::from_value(json!({"success": false, "error": "File type not allowed"}))
                .unwrap();
        assert_eq!(
            result.into_document("x.exe"),
            Err(Some("File type not allowed".to_string()))
        );

        let ok: UploadResult = serde_json::from_value(json!({
            "success": true, "document_id": 4, "filename": "a_1.pdf", "file_size": 10
        }))
        .unwrap();
        let doc = ok.into_document("a.pdf").unwrap();
        assert_eq!(doc.id, DocumentId(4));
        assert_eq!(doc.filename, "a_1.pdf");
    }

    #[test]
    fn test_file_listing_accepts_partial_entries() {
        let listing: FileListing = serde_json::from_value(json!({
            "total_archivos": 1,
            "archivos": [{"nombre": "a.txt", "tamaño_kb": 1.5, "ruta": "/srv/a.txt"}]
        }))
        .unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.files[0].name, "a.txt");
        assert!(listing.files[0].modified.is_none());
    }
}
