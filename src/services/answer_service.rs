use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{InferenceError, RequestError};
use crate::middleware::CorsPolicy;
use crate::models::{AnswerBody, AnswerMetadata, ApiEvent, ApiResponse, ErrorResponse, Trace};
use crate::services::{
    connect, extract_text, ContextRetriever, InferenceClient, QueryExtractor, RetrievedContext,
};
use crate::utils::generate_answer_prompt;

pub const NO_ANSWER: &str = "I couldn't find enough reliable information to answer that.";

/// The request handler: event in, `{statusCode, headers, body}` out.
#[derive(Clone)]
pub struct AnswerService {
    cors: Arc<CorsPolicy>,
    extractor: QueryExtractor,
    retriever: ContextRetriever,
    inference: Arc<dyn InferenceClient>,
}

#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    pub text: String,
    pub context: RetrievedContext,
}

impl AnswerService {
    pub fn new(
        config: &Config,
        retriever: ContextRetriever,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        Self {
            cors: Arc::new(CorsPolicy::new(&config.cors)),
            extractor: QueryExtractor::new(&config.request),
            retriever,
            inference,
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retriever = ContextRetriever::from_config(&config.search, client.clone());
        let inference = connect(client, &config.inference).await;
        info!(
            model = %inference.model_id(),
            backend = ?config.inference.backend(),
            providers = ?retriever.provider_names(),
            "Answer service configured"
        );

        Ok(Self::new(config, retriever, inference))
    }

    pub fn cors_policy(&self) -> Arc<CorsPolicy> {
        self.cors.clone()
    }

    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    pub fn model_id(&self) -> String {
        self.inference.model_id()
    }

    pub async fn handle(&self, event: &ApiEvent) -> ApiResponse {
        debug!(method = %event.method, origin = ?event.origin(), "Event received");
        let headers = self.cors.headers(event.origin());

        if event.is_preflight() {
            info!("Handling OPTIONS preflight request");
            return ApiResponse::empty(200, headers);
        }

        let started = Instant::now();
        let request_id = Uuid::new_v4();

        let question = match self.extractor.extract(event.body.as_deref()) {
            Ok(question) => question,
            Err(e) => {
                warn!(%request_id, "Rejected request: {}", e);
                return ApiResponse::json(400, headers, &request_error_body(&e));
            }
        };
        info!(%request_id, question = %question.text, "Answering question");

        match self.answer(&question.text).await {
            Ok(generated) => {
                info!(
                    %request_id,
                    answer_chars = generated.text.chars().count(),
                    sources = generated.context.sources.len(),
                    "Generated answer"
                );
                let body = AnswerBody {
                    answer: generated.text,
                    trace: Trace {
                        kb_used: false,
                        web_used: !generated.context.sources.is_empty(),
                    },
                    metadata: AnswerMetadata {
                        request_id,
                        model: self.inference.model_id(),
                        web_results: generated.context.web_results,
                        news_results: generated.context.news_results,
                        duration_ms: started.elapsed().as_millis() as u64,
                        generated_at: Utc::now(),
                    },
                    sources: generated.context.sources,
                };
                ApiResponse::json(200, headers, &body)
            }
            Err(e) => {
                error!(%request_id, "Inference error: {}", e);
                ApiResponse::json(
                    500,
                    headers,
                    &ErrorResponse::with_details("Failed to generate answer", e.to_string()),
                )
            }
        }
    }

    /// Only an inference failure is an error.
    pub async fn answer(&self, question: &str) -> Result<GeneratedAnswer, InferenceError> {
        let context = self.retriever.retrieve(question).await;
        let prompt = generate_answer_prompt(question, &context.sources);

        let raw = self.inference.invoke(&prompt).await?;
        let extracted = extract_text(&raw);
        let extracted = extracted.trim();

        let text = if extracted.is_empty() || extracted == "{}" {
            context
                .web_answer
                .clone()
                .unwrap_or_else(|| NO_ANSWER.to_string())
        } else {
            extracted.to_string()
        };

        Ok(GeneratedAnswer { text, context })
    }
}

fn request_error_body(e: &RequestError) -> ErrorResponse {
    match e.details() {
        Some(details) => ErrorResponse::with_details(e.to_string(), details),
        None => ErrorResponse::new(e.to_string()),
    }
}
