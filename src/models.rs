// ============================================================================
// File: src/models.rs
// API request and response models
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::error::ClientError;

/// One file picked by the user, read fully into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// Files picked by the user, in selection order.
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    #[cfg(test)]
    pub fn new(files: Vec<SelectedFile>) -> Self {
        Self { files }
    }

    /// Read every path up front so the selection is fixed before any upload starts.
    pub async fn read_paths(paths: &[PathBuf]) -> Result<Self, ClientError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let content = tokio::fs::read(path)
                .await
                .map_err(|e| ClientError::Validation(format!("Could not read {}: {}", path.display(), e)))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload.bin")
                .to_string();
            files.push(SelectedFile { name, content });
        }
        Ok(Self { files })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectedFile> {
        self.files.iter()
    }
}

/// Success body of POST /upload. Backend versions disagree on which fields
/// they send, so everything is optional.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct UploadResponse {
    pub filename: Option<String>,
    pub chunks_created: Option<u64>,
    pub message: Option<String>,
}

/// Error body the backend sends with a non-2xx status
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// `detail` is usually a string, but validation errors carry a list.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Null => None,
            Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Outcome of one successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub file: String,
    pub server_filename: Option<String>,
    pub chunks: Option<u64>,
}

impl UploadResult {
    pub fn display_name(&self) -> &str {
        self.server_filename.as_deref().unwrap_or(&self.file)
    }
}

/// Request body for POST /search
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
}

/// A scored passage returned by /search
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ResultFragment {
    pub text: Option<String>,
    #[allow(dead_code)]
    pub score: Option<f64>,
    pub pdf_name: Option<String>,
    pub page: Option<Value>,
}

impl ResultFragment {
    /// "report.pdf (p. 4)", or None when the backend sent no source.
    pub fn source_label(&self) -> Option<String> {
        let name = self.pdf_name.as_deref().filter(|n| !n.is_empty())?;
        let page = match &self.page {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Some(match page {
            Some(page) => format!("{} (p. {})", name, page),
            None => name.to_string(),
        })
    }
}

/// Success body of POST /search, in whichever shape the backend sends
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResponse {
    ResultList(Vec<ResultFragment>),
    CombinedAnswer(String),
}

impl SearchResponse {
    /// Branch on the field that is present: a `results` array, then a
    /// `final_answer` string, then an `answer` string.
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        let Value::Object(mut map) = value else {
            return Err(ClientError::Decode("expected a JSON object".to_string()));
        };

        if let Some(results @ Value::Array(_)) = map.remove("results") {
            let fragments: Vec<ResultFragment> = serde_json::from_value(results)
                .map_err(|e| ClientError::Decode(format!("malformed results: {}", e)))?;
            return Ok(SearchResponse::ResultList(fragments));
        }

        for key in ["final_answer", "answer"] {
            if let Some(Value::String(answer)) = map.remove(key) {
                return Ok(SearchResponse::CombinedAnswer(answer));
            }
        }

        Err(ClientError::Decode(
            "response carried neither results nor an answer".to_string(),
        ))
    }

    /// Text of the assistant reply: passages joined by a blank line, or the
    /// combined answer as-is.
    pub fn answer_text(&self) -> String {
        match self {
            SearchResponse::ResultList(fragments) => {
                let texts: Vec<&str> = fragments
                    .iter()
                    .filter_map(|f| f.text.as_deref())
                    .filter(|t| !t.trim().is_empty())
                    .collect();
                if texts.is_empty() {
                    "No matching passages found.".to_string()
                } else {
                    texts.join("\n\n")
                }
            }
            SearchResponse::CombinedAnswer(answer) => answer.clone(),
        }
    }

    /// Distinct source labels of the passages, in result order
    pub fn sources(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        if let SearchResponse::ResultList(fragments) = self {
            for label in fragments
                .iter()
                .filter(|f| f.text.as_deref().is_some_and(|t| !t.trim().is_empty()))
                .filter_map(ResultFragment::source_label)
            {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }
        labels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Message structure for the chat transcript
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub sources: Vec<String>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into(), sources: Vec::new() }
    }

    pub fn assistant(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self { role: Role::Assistant, text: text.into(), sources }
    }
}
