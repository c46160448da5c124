// ============================================================================
// File: src/test_support.rs
// In-memory backend for controller tests
// ============================================================================

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::api_client::Backend;
use crate::error::ClientError;
use crate::models::{SearchRequest, SearchResponse, SelectedFile, UploadResponse};

/// What the fake answers for a given call
#[derive(Clone)]
pub enum Scripted<T> {
    Ok(T),
    Reject(Option<&'static str>),
    Broken,
    /// Never answers
    Pending,
}

impl<T: Clone> Scripted<T> {
    async fn play(&self) -> Result<T, ClientError> {
        match self {
            Scripted::Pending => std::future::pending().await,
            Scripted::Ok(value) => Ok(value.clone()),
            Scripted::Reject(detail) => Err(ClientError::UpstreamRejection {
                status: 400,
                detail: detail.map(str::to_string),
            }),
            Scripted::Broken => Err(ClientError::Decode("connection reset".to_string())),
        }
    }
}

/// Records every call; uploads answer per file name (success by default),
/// searches answer with `search`.
pub struct FakeBackend {
    pub uploads: HashMap<String, Scripted<UploadResponse>>,
    pub search: Scripted<SearchResponse>,
    pub uploaded: Mutex<Vec<String>>,
    pub searched: Mutex<Vec<SearchRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            uploads: HashMap::new(),
            search: Scripted::Ok(SearchResponse::CombinedAnswer(String::new())),
            uploaded: Mutex::new(Vec::new()),
            searched: Mutex::new(Vec::new()),
        }
    }

    pub fn with_upload(mut self, name: &str, outcome: Scripted<UploadResponse>) -> Self {
        self.uploads.insert(name.to_string(), outcome);
        self
    }

    pub fn with_search(mut self, outcome: Scripted<SearchResponse>) -> Self {
        self.search = outcome;
        self
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn searched(&self) -> Vec<SearchRequest> {
        self.searched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ClientError> {
        self.uploaded.lock().unwrap().push(file.name.clone());
        match self.uploads.get(&file.name) {
            Some(outcome) => outcome.play().await,
            None => Ok(UploadResponse {
                filename: Some(file.name.clone()),
                chunks_created: None,
                message: None,
            }),
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        self.searched.lock().unwrap().push(request.clone());
        self.search.play().await
    }
}
