#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};
use std::sync::Arc;

use study_buddy_api::config::Config;
use study_buddy_api::error::{InferenceError, SearchError};
use study_buddy_api::models::{SearchHits, SearchResult, SourceKind};
use study_buddy_api::services::{
    AnswerService, ContextRetriever, InferenceClient, SearchProvider,
};

mock! {
    pub Inference {}

    #[async_trait]
    impl InferenceClient for Inference {
        fn model_id(&self) -> String;
        async fn invoke(&self, prompt: &str) -> Result<Value, InferenceError>;
    }
}

mock! {
    pub Search {}

    #[async_trait]
    impl SearchProvider for Search {
        fn name(&self) -> &'static str;
        fn kind(&self) -> SourceKind;
        fn max_results(&self) -> usize;
        async fn search(&self, query: &str, max_results: usize) -> Result<SearchHits, SearchError>;
    }
}

pub const MODEL: &str = "test-model";

pub fn text_response(text: &str) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
}

/// An inference mock answering every prompt with `text`.
pub fn answering(text: &'static str) -> MockInference {
    let mut inference = MockInference::new();
    inference.expect_model_id().return_const(MODEL.to_string());
    inference
        .expect_invoke()
        .returning(move |_| Ok(text_response(text)));
    inference
}

pub fn web_results(count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| {
            SearchResult::web(
                format!("Web result {}", i),
                format!("https://web.example/{}", i),
                &format!("web snippet {}", i),
            )
        })
        .collect()
}

pub fn news_results(count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| {
            SearchResult::news(
                format!("News result {}", i),
                format!("https://news.example/{}", i),
                &format!("news snippet {}", i),
                "Daily Example",
                "2024-05-01T10:00:00Z",
            )
        })
        .collect()
}

pub fn provider(
    name: &'static str,
    kind: SourceKind,
    max: usize,
    outcome: Result<SearchHits, &'static str>,
) -> MockSearch {
    let mut search = MockSearch::new();
    search.expect_name().return_const(name);
    search.expect_kind().return_const(kind);
    search.expect_max_results().return_const(max);
    search.expect_search().returning(move |_, _| match &outcome {
        Ok(hits) => Ok(hits.clone()),
        Err(message) => Err(SearchError::Malformed(message.to_string())),
    });
    search
}

pub fn service_with(
    config: &Config,
    providers: Vec<Arc<dyn SearchProvider>>,
    inference: MockInference,
) -> AnswerService {
    AnswerService::new(config, ContextRetriever::new(providers), Arc::new(inference))
}
