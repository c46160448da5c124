// ============================================================================
// File: src/api_client.rs
// HTTP client for the document backend (/upload and /search)
// ============================================================================

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::error::ClientError;
use crate::models::{ErrorBody, SearchRequest, SearchResponse, SelectedFile, UploadResponse};

/// The two backend calls the controllers depend on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// POST one file as multipart field `file`.
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ClientError>;

    /// POST a query and decode whichever answer shape comes back.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError>;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read the body once; non-2xx becomes a rejection carrying `detail`
    /// when the body has one.
    async fn read_json(response: Response) -> Result<Value, ClientError> {
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail_text());
            tracing::warn!(%url, status = status.as_u16(), ?detail, "backend rejected request");
            return Err(ClientError::UpstreamRejection {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ClientError::Decode(format!(
                "{} (URL: {}, body starts: {})",
                e,
                url,
                Self::truncate(&body, 200)
            ))
        })
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        text.chars().take(max_chars).collect()
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ClientError> {
        let url = self.url("/upload");
        tracing::debug!(%url, file = %file.name, bytes = file.content.len(), "uploading file");

        let part = Part::bytes(file.content.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        let value = Self::read_json(response).await?;

        serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("malformed upload response: {}", e)))
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        let url = self.url("/search");
        tracing::debug!(%url, query = %request.query, top_k = request.top_k, "searching");

        let response = self.client.post(&url).json(request).send().await?;
        let value = Self::read_json(response).await?;

        SearchResponse::from_value(value)
    }
}
