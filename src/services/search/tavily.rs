use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{status_error, SearchProvider};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::models::{SearchHits, SearchResult, SourceKind};

#[derive(Clone)]
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    url: String,
    max_results: usize,
    timeout: Duration,
}

impl TavilySearch {
    pub fn new(client: reqwest::Client, api_key: String, config: &SearchConfig) -> Self {
        Self {
            client,
            api_key,
            url: config.tavily_url.clone(),
            max_results: config.web_max_results,
            timeout: Duration::from_secs(config.web_timeout_secs),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &'static str {
        "tavily"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Web
    }

    fn max_results(&self) -> usize {
        self.max_results
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchHits, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::NotConfigured("tavily"));
        }

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "search_depth": "advanced",
                "max_results": max_results,
                "include_answer": true,
                "include_images": false,
                "topic": "general",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let raw = response.json::<Value>().await?;
        parse_response(&raw)
    }
}

pub(crate) fn parse_response(raw: &Value) -> Result<SearchHits, SearchError> {
    if !raw.is_object() {
        return Err(SearchError::Malformed("expected a JSON object".to_string()));
    }

    let results = match raw.get("results") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(normalize).collect(),
        Some(_) => return Err(SearchError::Malformed("'results' is not an array".to_string())),
    };

    let answer = raw
        .get("answer")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(SearchHits { results, answer })
}

fn normalize(item: &Value) -> SearchResult {
    let url = str_field(item, "url").unwrap_or_default();
    let title = str_field(item, "title")
        .or_else(|| str_field(item, "url"))
        .unwrap_or("Source");
    let content = str_field(item, "content").unwrap_or_default();
    SearchResult::web(title, url, content)
}

fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
