use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::SearchResult;

/// The `{statusCode, headers, body}` envelope a gateway expects back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn empty(status_code: u16, headers: BTreeMap<String, String>) -> Self {
        Self {
            status_code,
            headers,
            body: String::new(),
        }
    }

    pub fn json<T: Serialize>(
        status_code: u16,
        mut headers: BTreeMap<String, String>,
        payload: &T,
    ) -> Self {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let body = serde_json::to_string(payload).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize response body: {}", e);
            r#"{"error":"Failed to serialize response"}"#.to_string()
        });
        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerBody {
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub trace: Trace,
    pub metadata: AnswerMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub kb_used: bool,
    pub web_used: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerMetadata {
    pub request_id: Uuid,
    pub model: String,
    pub web_results: usize,
    pub news_results: usize,
    pub duration_ms: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub web_search: bool,
    pub news_search: bool,
    pub model: String,
}
