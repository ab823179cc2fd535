//! HTTP implementation of [`GrimoireApi`] on top of reqwest.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::{ApiError, GrimoireApi};
use crate::config::Settings;
use crate::models::{
    ActionResponse, BatchUploadResponse, DocumentId, FileListing, QuickHit, SearchRequest,
    SearchResponseBody, SearchResponsePage, SemanticHit, SemanticSearchResponse, StagedFile,
    UploadResult, UploadedDocument,
};

/// Multipart field name the backend reads files from.
const FILE_FIELD: &str = "file";

/// HTTP client for a Grimoire backend.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Create a client from settings.
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.request_timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base: parse_base_url(&settings.base_url)?,
        })
    }

    /// Backend base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Transport(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(path)?;
        self.send(self.client.post(url).json(body), "POST", path)
            .await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        path: &str,
    ) -> Result<Response, ApiError> {
        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, path, e);
            ApiError::from(e)
        })?;
        debug!(
            "{} {} -> {} in {}ms",
            method,
            path,
            response.status().as_u16(),
            start.elapsed().as_millis()
        );
        Ok(response)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut base = Url::parse(raw)
        .map_err(|e| ApiError::Transport(format!("Invalid base URL {}: {}", raw, e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Read a body as JSON regardless of status, like `fetch().json()`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        ApiError::Transport(format!("Unexpected response (HTTP {}): {}", status, e))
    })
}

fn file_part(file: &StagedFile) -> Result<Part, ApiError> {
    Part::bytes(file.content.clone())
        .file_name(file.name.clone())
        .mime_str(&file.mime_type())
        .map_err(ApiError::from)
}

fn action_failure(status: StatusCode, error: Option<String>) -> ApiError {
    ApiError::Application(
        error.unwrap_or_else(|| format!("Request failed with status {}", status.as_u16())),
    )
}

#[async_trait]
impl GrimoireApi for HttpApi {
    async fn upload_document(&self, file: &StagedFile) -> Result<UploadedDocument, ApiError> {
        let form = Form::new().part(FILE_FIELD, file_part(file)?);
        let url = self.endpoint("api/upload")?;
        let response = self
            .send(self.client.post(url).multipart(form), "POST", "api/upload")
            .await?;
        let status = response.status();

        let result: UploadResult = decode(response).await?;
        result
            .into_document(&file.name)
            .map_err(|error| action_failure(status, error))
    }

    async fn upload_batch(&self, files: &[StagedFile]) -> Result<Option<String>, ApiError> {
        let mut form = Form::new();
        for file in files {
            form = form.part(FILE_FIELD, file_part(file)?);
        }
        let url = self.endpoint("upload")?;
        let response = self
            .send(self.client.post(url).multipart(form), "POST", "upload")
            .await?;
        let status = response.status();

        if status.is_success() {
            // The confirmation text is optional; a body we cannot read is
            // still a successful upload.
            let body: Option<BatchUploadResponse> = decode(response).await.ok();
            return Ok(body.and_then(|b| b.message));
        }

        match decode::<BatchUploadResponse>(response).await {
            Ok(BatchUploadResponse {
                error: Some(error), ..
            }) => Err(ApiError::Application(error)),
            _ => Err(ApiError::Transport(format!("HTTP {}", status))),
        }
    }

    async fn extract_text(&self, id: DocumentId) -> Result<String, ApiError> {
        let path = format!("api/extract-text/{}", id);
        let url = self.endpoint(&path)?;
        let response = self.send(self.client.post(url), "POST", &path).await?;
        let status = response.status();

        let body: ActionResponse = decode(response).await?;
        if body.success {
            Ok(body.text.unwrap_or_default())
        } else {
            Err(action_failure(status, body.error))
        }
    }

    async fn summarize(&self, id: DocumentId) -> Result<String, ApiError> {
        let path = format!("api/summarize/{}", id);
        let url = self.endpoint(&path)?;
        let response = self.send(self.client.post(url), "POST", &path).await?;
        let status = response.status();

        let body: ActionResponse = decode(response).await?;
        if body.success {
            Ok(body.summary.unwrap_or_default())
        } else {
            Err(action_failure(status, body.error))
        }
    }

    async fn semantic_search(&self, query: &str) -> Result<Vec<SemanticHit>, ApiError> {
        #[derive(Serialize)]
        struct QueryBody<'a> {
            query: &'a str,
        }

        let response = self.post_json("api/search", &QueryBody { query }).await?;
        let status = response.status();

        let body: SemanticSearchResponse = decode(response).await?;
        match body.results {
            Some(results) => Ok(results),
            None => Err(action_failure(status, body.error)),
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponsePage, ApiError> {
        let response = self.post_json("api/search", request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("HTTP {}", status)));
        }

        let body: SearchResponseBody = decode(response).await?;
        Ok(body.into())
    }

    async fn quick_search(&self, query: &str) -> Result<Vec<QuickHit>, ApiError> {
        let path = format!("api/buscar?q={}", urlencoding::encode(query));
        let url = self.endpoint(&path)?;
        let response = self.send(self.client.get(url), "GET", "api/buscar").await?;
        decode(response).await
    }

    async fn list_files(&self) -> Result<FileListing, ApiError> {
        let url = self.endpoint("read-files")?;
        let response = self.send(self.client.get(url), "GET", "read-files").await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }
        decode(response).await
    }
}
