//! HttpApi against a local mock backend.
//!
//! The mock mirrors the payloads the real service returns, including its
//! failure shapes, and binds to an ephemeral port per test.

use std::collections::HashMap;
use std::io::Write;

use axum::extract::{Multipart, Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use grimoire::api::{ApiError, GrimoireApi, HttpApi};
use grimoire::config::Settings;
use grimoire::models::{DocumentId, StagedFile};
use grimoire::services::{NoProgress, SearchState};
use grimoire::ui::{Controller, Panel};

async fn upload(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let mut names = Vec::new();
    let mut size = 0;
    while let Ok(Some(field)) = multipart.next_field().await {
        assert_eq!(field.name(), Some("file"));
        names.push(field.file_name().unwrap_or_default().to_string());
        size += field.bytes().await.map(|b| b.len()).unwrap_or(0);
    }

    let name = names.first().cloned().unwrap_or_default();
    if name.ends_with(".exe") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "File type not allowed"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "document_id": 42,
            "filename": name,
            "file_size": size,
            "message": "File uploaded successfully",
        })),
    )
}

async fn upload_batch(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let mut count = 0;
    let mut broken = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        broken |= field.file_name() == Some("broken.pdf");
        let _ = field.bytes().await;
        count += 1;
    }
    if broken {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Could not store broken.pdf"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"message": format!("{} file(s) stored", count)})),
    )
}

async fn extract_text(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if id == 42 {
        (
            StatusCode::OK,
            Json(json!({"success": true, "text": "Annual report 2023"})),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Document not found"})),
        )
    }
}

async fn summarize(Path(_id): Path<i64>) -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<h1>Internal Server Error</h1>")
}

async fn search(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if let Some(query) = body.get("query").and_then(Value::as_str) {
        return (
            StatusCode::OK,
            Json(json!({"results": [{
                "document_id": 42,
                "filename": "report.pdf",
                "similarity_score": 0.5,
                "summary": format!("About {}", query),
                "created_at": "2024-03-05T10:00:00",
            }]})),
        );
    }

    let term = body["searchTerm"].as_str().unwrap_or_default();
    if term == "boom" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "index offline"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "results": [{
                "_meta": {"id": "42", "score": 2.0},
                "fileName": {"raw": "report.pdf", "snippet": "<em>report</em>.pdf"},
                "fileType": {"raw": "pdf"},
                "fileSize": {"raw": 2048},
            }],
            "meta": {"page": {
                "current": body["current"],
                "size": body["resultsPerPage"],
                "total_pages": 3,
                "total_results": 41,
            }},
            "facets": {"fileType": [{"field": "fileType", "type": "value",
                "data": [{"value": "pdf", "count": 41}]}]},
        })),
    )
}

async fn buscar(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    Json(json!([{"url": "/docs/1", "titulo": q, "descripcion": "Match"}]))
}

async fn read_files() -> Json<Value> {
    Json(json!({
        "total_archivos": 2,
        "archivos": [
            {"nombre": "a.txt", "tamaño_kb": 1.5, "fecha_modificacion": "2024-01-02",
             "tipo": ".txt", "ruta": "/srv/a.txt"},
            {"nombre": "b.pdf", "tamaño_kb": 20.0, "ruta": "/srv/b.pdf"},
        ]
    }))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/upload", post(upload))
        .route("/upload", post(upload_batch))
        .route("/api/extract-text/:id", post(extract_text))
        .route("/api/summarize/:id", post(summarize))
        .route("/api/search", post(search))
        .route("/api/buscar", get(buscar))
        .route("/read-files", get(read_files));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn api() -> HttpApi {
    let base = spawn_backend().await;
    HttpApi::new(&Settings::with_base_url(&base)).expect("Failed to build client")
}

fn pdf(name: &str) -> StagedFile {
    StagedFile::from_bytes(name, b"%PDF-1.4 test".to_vec())
}

#[tokio::test]
async fn upload_returns_document() {
    let api = api().await;

    let doc = api.upload_document(&pdf("report.pdf")).await.unwrap();

    assert_eq!(doc.id, DocumentId(42));
    assert_eq!(doc.filename, "report.pdf");
    assert_eq!(doc.file_size, 13);
}

#[tokio::test]
async fn rejected_upload_carries_server_error() {
    let api = api().await;

    let err = api.upload_document(&pdf("setup.exe")).await.unwrap_err();

    assert_eq!(err, ApiError::Application("File type not allowed".to_string()));
}

#[tokio::test]
async fn upload_reads_file_from_disk() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"hello grimoire").unwrap();

    let staged = StagedFile::from_path(&path).await.unwrap();
    assert_eq!(staged.name, "notes.txt");
    assert_eq!(staged.size, 14);
    assert_eq!(staged.mime_type(), "text/plain");

    let doc = api().await.upload_document(&staged).await.unwrap();
    assert_eq!(doc.file_size, 14);
}

#[tokio::test]
async fn batch_upload_message_and_error() {
    let api = api().await;

    let message = api
        .upload_batch(&[pdf("a.pdf"), pdf("b.pdf")])
        .await
        .unwrap();
    assert_eq!(message.as_deref(), Some("2 file(s) stored"));

    let err = api
        .upload_batch(&[pdf("a.pdf"), pdf("broken.pdf")])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Application("Could not store broken.pdf".to_string())
    );
}

#[tokio::test]
async fn extract_and_summarize_errors() {
    let api = api().await;

    assert_eq!(
        api.extract_text(DocumentId(42)).await.unwrap(),
        "Annual report 2023"
    );
    assert_eq!(
        api.extract_text(DocumentId(7)).await.unwrap_err(),
        ApiError::Application("Document not found".to_string())
    );

    // A non-JSON error page is a transport failure.
    assert!(api.summarize(DocumentId(42)).await.unwrap_err().is_transport());
}

#[tokio::test]
async fn semantic_and_connector_search_share_endpoint() {
    let api = api().await;

    let hits = api.semantic_search("budget").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].summary.as_deref(), Some("About budget"));

    let mut state = SearchState::with_term("report");
    state.current = 2;
    let page = api.search(&state.to_request()).await.unwrap();
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_results, 41);
    assert_eq!(page.results[0].raw_str("fileName").as_deref(), Some("report.pdf"));
    assert_eq!(page.facets["fileType"][0].data[0].count, 41);

    let err = api
        .search(&SearchState::with_term("boom").to_request())
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn quick_search_encodes_query() {
    let api = api().await;

    let hits = api.quick_search("año fiscal & co").await.unwrap();

    assert_eq!(hits[0].title, "año fiscal & co");
    assert_eq!(hits[0].url, "/docs/1");
}

#[tokio::test]
async fn list_files_reads_listing() {
    let listing = api().await.list_files().await.unwrap();

    assert_eq!(listing.total, 2);
    assert_eq!(listing.files[1].name, "b.pdf");
    assert!(listing.files[1].kind.is_none());
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let api = HttpApi::new(&Settings::with_base_url("http://127.0.0.1:9")).unwrap();

    assert!(api.list_files().await.unwrap_err().is_transport());
}

#[tokio::test]
async fn controller_over_http() {
    let base = spawn_backend().await;
    let api = HttpApi::new(&Settings::with_base_url(&base)).unwrap();
    let mut controller = Controller::new(api, Settings::with_base_url(&base));

    controller
        .upload_files(&[pdf("report.pdf"), pdf("setup.exe")], &NoProgress)
        .await;
    assert_eq!(controller.session().documents().len(), 1);

    let outcome = controller.extract_text().await.unwrap();
    assert_eq!(outcome.document_id, DocumentId(42));

    assert!(controller.semantic_search("budget").await);
    let html = controller.render_panel();
    assert!(html.contains("50.0%"));
    assert!(html.contains("5/3/2024"));

    assert_eq!(controller.search("report").await, 41);
    assert!(matches!(controller.panel(), Panel::SearchPage(_)));
    assert!(controller.render_panel().contains("of <strong>41</strong>"));
}
