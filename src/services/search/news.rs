use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{status_error, SearchProvider};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::models::{SearchHits, SearchResult, SourceKind};

#[derive(Clone)]
pub struct NewsApiSearch {
    client: reqwest::Client,
    api_key: String,
    url: String,
    max_results: usize,
    timeout: Duration,
}

impl NewsApiSearch {
    pub fn new(client: reqwest::Client, api_key: String, config: &SearchConfig) -> Self {
        Self {
            client,
            api_key,
            url: config.news_url.clone(),
            max_results: config.news_max_results,
            timeout: Duration::from_secs(config.news_timeout_secs),
        }
    }
}

#[async_trait]
impl SearchProvider for NewsApiSearch {
    fn name(&self) -> &'static str {
        "newsapi"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    fn max_results(&self) -> usize {
        self.max_results
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchHits, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::NotConfigured("newsapi"));
        }

        let page_size = max_results.to_string();
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .query(&[
                ("q", query),
                ("apiKey", self.api_key.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let raw = response.json::<Value>().await?;
        let mut hits = parse_response(&raw)?;
        hits.results.truncate(max_results);
        Ok(hits)
    }
}

pub(crate) fn parse_response(raw: &Value) -> Result<SearchHits, SearchError> {
    if raw.get("status").and_then(Value::as_str) == Some("error") {
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown NewsAPI error");
        return Err(SearchError::Malformed(message.to_string()));
    }

    let results = match raw.get("articles") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(articles)) => articles.iter().map(normalize).collect(),
        Some(_) => return Err(SearchError::Malformed("'articles' is not an array".to_string())),
    };

    Ok(SearchHits {
        results,
        answer: None,
    })
}

fn normalize(article: &Value) -> SearchResult {
    SearchResult::news(
        text(article, "title").unwrap_or("Article"),
        text(article, "url").unwrap_or_default(),
        text(article, "description").unwrap_or_default(),
        article
            .pointer("/source/name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown"),
        text(article, "publishedAt").unwrap_or_default(),
    )
}

fn text<'a>(article: &'a Value, key: &str) -> Option<&'a str> {
    article.get(key).and_then(Value::as_str)
}
