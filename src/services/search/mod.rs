
pub mod news;
pub mod tavily;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{SearchConfig, WebSearchBackend};
use crate::error::SearchError;
use crate::models::{SearchHits, SearchResult, SourceKind};

pub use news::NewsApiSearch;
pub use tavily::TavilySearch;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> SourceKind;

    fn max_results(&self) -> usize;

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchHits, SearchError>;
}

/// Sources gathered for one question, web results first.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub sources: Vec<SearchResult>,
    pub web_answer: Option<String>,
    pub web_results: usize,
    pub news_results: usize,
}

#[derive(Clone, Default)]
pub struct ContextRetriever {
    providers: Vec<Arc<dyn SearchProvider>>,
}

impl ContextRetriever {
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    /// Providers without a key are left out.
    pub fn from_config(config: &SearchConfig, client: reqwest::Client) -> Self {
        let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();

        match (config.provider, &config.tavily_api_key) {
            (WebSearchBackend::Tavily, Some(key)) => {
                providers.push(Arc::new(TavilySearch::new(client.clone(), key.clone(), config)));
            }
            (WebSearchBackend::Tavily, None) => {
                warn!("TAVILY_API_KEY not set - web search disabled");
            }
            (WebSearchBackend::None, _) => {
                info!("Web search disabled by SEARCH_PROVIDER");
            }
        }

        match &config.news_api_key {
            Some(key) => {
                providers.push(Arc::new(NewsApiSearch::new(client, key.clone(), config)));
            }
            None => warn!("NEWS_API_KEY not set - news search disabled"),
        }

        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn has_provider(&self, kind: SourceKind) -> bool {
        self.providers.iter().any(|p| p.kind() == kind)
    }

    pub async fn retrieve(&self, query: &str) -> RetrievedContext {
        let mut context = RetrievedContext::default();

        for provider in &self.providers {
            let limit = provider.max_results();
            let hits = match provider.search(query, limit).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(provider = provider.name(), "Search failed, continuing without it: {}", e);
                    SearchHits::empty()
                }
            };

            let mut results = hits.results;
            results.truncate(limit);
            info!(provider = provider.name(), count = results.len(), "Search completed");

            match provider.kind() {
                SourceKind::Web => {
                    context.web_results += results.len();
                    if context.web_answer.is_none() {
                        context.web_answer = hits.answer.filter(|a| !a.trim().is_empty());
                    }
                }
                SourceKind::News => context.news_results += results.len(),
            }
            context.sources.extend(results);
        }

        context
    }
}

pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> SearchError {
    SearchError::Status {
        status: status.as_u16(),
        message: crate::utils::truncate_chars(body, 300),
    }
}

/// Answers exactly one HTTP request on a loopback port with a canned reply.
#[cfg(test)]
pub(crate) fn serve_once(status: u16, body: &'static str) -> String {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
        }
        let reply = format!(
            "HTTP/1.1 {} Error\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(reply.as_bytes()).unwrap();
    });
    format!("http://{}", addr)
}
