use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{InferenceBackend, InferenceConfig};
use crate::error::InferenceError;
use crate::utils::truncate_chars;

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

const DUMP_CHARS: usize = 1200;

#[async_trait]
pub trait InferenceClient: Send + Sync {
    fn model_id(&self) -> String;

    async fn invoke(&self, prompt: &str) -> Result<Value, InferenceError>;
}

#[derive(Clone)]
pub struct BedrockClient {
    client: reqwest::Client,
    endpoint: String,
    model_id: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl BedrockClient {
    pub fn new(client: reqwest::Client, config: &InferenceConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint_url(),
            model_id: config.selected_model().to_string(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn invoke_url(&self) -> Result<reqwest::Url, InferenceError> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| InferenceError::Endpoint(format!("{}: {}", self.endpoint, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| InferenceError::Endpoint(self.endpoint.clone()))?;
            // Model ids may be ARNs containing '/', which must stay inside one segment.
            segments
                .pop_if_empty()
                .push("model")
                .push(&self.model_id)
                .push("invoke");
        }
        Ok(url)
    }

    pub fn build_payload(&self, prompt: &str) -> Value {
        messages_body(prompt, self.max_tokens, self.temperature)
    }
}

fn messages_body(prompt: &str, max_tokens: u32, temperature: f32) -> Value {
    json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "messages": [
            {
                "role": "user",
                "content": [{"type": "text", "text": prompt}],
            }
        ],
    })
}

/// Message reported for a non-2xx runtime response: the JSON `message` field
/// when present, else the start of the raw body.
pub fn status_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| truncate_chars(body, 300))
}

#[async_trait]
impl InferenceClient for BedrockClient {
    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn invoke(&self, prompt: &str) -> Result<Value, InferenceError> {
        let url = self.invoke_url()?;
        info!(model = %self.model_id, prompt_chars = prompt.chars().count(), "Invoking model");

        let mut request = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.build_payload(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                message: status_message(&body),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// `InvokeModel` signed with the default AWS credential chain.
#[derive(Clone)]
pub struct SdkBedrockClient {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
    max_tokens: u32,
    temperature: f32,
}

impl SdkBedrockClient {
    pub async fn from_config(config: &InferenceConfig) -> Self {
        let timeouts = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(config.timeout_secs))
            .build();
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .timeout_config(timeouts)
            .load()
            .await;

        let resolved = match sdk_config.credentials_provider() {
            Some(provider) => provider.provide_credentials().await.map_err(|e| e.to_string()),
            None => Err("no credentials provider".to_string()),
        };
        if let Err(e) = resolved {
            warn!(
                region = %config.region,
                "No AWS credentials resolved, model calls will fail until some are available: {}",
                e
            );
        }

        Self {
            client: aws_sdk_bedrockruntime::Client::new(&sdk_config),
            model_id: config.selected_model().to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl InferenceClient for SdkBedrockClient {
    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn invoke(&self, prompt: &str) -> Result<Value, InferenceError> {
        info!(model = %self.model_id, prompt_chars = prompt.chars().count(), "Invoking model via SDK");

        let body = serde_json::to_vec(&messages_body(prompt, self.max_tokens, self.temperature))?;
        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| InferenceError::Sdk(DisplayErrorContext(&e).to_string()))?;

        Ok(serde_json::from_slice(output.body().as_ref())?)
    }
}

pub async fn connect(
    http: reqwest::Client,
    config: &InferenceConfig,
) -> Arc<dyn InferenceClient> {
    match config.backend() {
        InferenceBackend::ApiKey => {
            if config.api_key.is_none() {
                warn!(
                    endpoint = %config.endpoint_url(),
                    "No Bedrock API key set, sending unauthenticated requests to custom endpoint"
                );
            }
            Arc::new(BedrockClient::new(http, config))
        }
        InferenceBackend::CredentialChain => {
            info!(region = %config.region, "No Bedrock API key set, using the AWS credential chain");
            Arc::new(SdkBedrockClient::from_config(config).await)
        }
    }
}

/// Tries `output.content[]`, `content[]`, then `message.content[]`.
pub fn extract_text(payload: &Value) -> String {
    let candidates = [
        payload.pointer("/output/content"),
        payload.get("content"),
        payload.pointer("/message/content"),
    ];

    for blocks in candidates.into_iter().flatten() {
        if let Some(text) = first_text_block(blocks) {
            return text.to_string();
        }
    }

    truncate_chars(&payload.to_string(), DUMP_CHARS)
}

fn first_text_block(blocks: &Value) -> Option<&str> {
    blocks.as_array()?.iter().find_map(|block| {
        match block.get("type").and_then(Value::as_str) {
            Some("text") | None => block.get("text").and_then(Value::as_str),
            Some(_) => None,
        }
    })
}
