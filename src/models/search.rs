use serde::{Deserialize, Serialize};

use crate::utils::truncate_chars;

pub const WEB_SNIPPET_CHARS: usize = 400;
pub const NEWS_SNIPPET_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Web,
    News,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl SearchResult {
    pub fn web(title: impl Into<String>, url: impl Into<String>, snippet: &str) -> Self {
        Self {
            kind: SourceKind::Web,
            title: title.into(),
            url: url.into(),
            snippet: truncate_chars(snippet, WEB_SNIPPET_CHARS),
            source: None,
            published: None,
        }
    }

    pub fn news(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: &str,
        source: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            kind: SourceKind::News,
            title: title.into(),
            url: url.into(),
            snippet: truncate_chars(snippet, NEWS_SNIPPET_CHARS),
            source: Some(source.into()),
            published: Some(published.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub results: Vec<SearchResult>,
    /// Provider-generated short answer, if it offers one.
    pub answer: Option<String>,
}

impl SearchHits {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn web_result_serializes_without_news_fields() {
        let result = SearchResult::web("Rust", "https://www.rust-lang.org", "A language");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "web",
                "title": "Rust",
                "url": "https://www.rust-lang.org",
                "snippet": "A language"
            })
        );
    }

    #[test]
    fn snippets_are_truncated_per_kind() {
        let long = "x".repeat(1000);
        assert_eq!(SearchResult::web("t", "u", &long).snippet.chars().count(), 400);
        assert_eq!(
            SearchResult::news("t", "u", &long, "s", "p").snippet.chars().count(),
            300
        );
    }
}
