use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-3-5-sonnet-20241022-v2:0";
pub const DEFAULT_PROMPT: &str = "Explain recursion in simple steps.";
pub const PRIMARY_ORIGIN: &str = "https://smart-study-buddy-tnef.vercel.app";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub search: SearchConfig,
    pub cors: CorsConfig,
    pub request: RequestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_json_payload_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub model_id: String,
    /// Operator routing override. Takes precedence over `model_id` when set.
    pub inference_profile_arn: Option<String>,
    pub region: String,
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// How inference requests are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceBackend {
    ApiKey,
    CredentialChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebSearchBackend {
    Tavily,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub provider: WebSearchBackend,
    #[serde(skip_serializing)]
    pub tavily_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub news_api_key: Option<String>,
    pub tavily_url: String,
    pub news_url: String,
    pub web_max_results: usize,
    pub news_max_results: usize,
    pub web_timeout_secs: u64,
    pub news_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub wildcard_suffix: String,
    pub fallback_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Substitute `{}` for unparseable bodies and the default prompt for a
    /// missing question instead of answering 400.
    pub lenient_body: bool,
    pub default_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
                max_json_payload_size: 65_536, // 64KB
            },
            inference: InferenceConfig {
                model_id: DEFAULT_MODEL_ID.to_string(),
                inference_profile_arn: None,
                region: "us-east-1".to_string(),
                endpoint: None,
                api_key: None,
                max_tokens: 1500,
                temperature: 0.7,
                timeout_secs: 60,
            },
            search: SearchConfig {
                provider: WebSearchBackend::Tavily,
                tavily_api_key: None,
                news_api_key: None,
                tavily_url: "https://api.tavily.com/search".to_string(),
                news_url: "https://newsapi.org/v2/everything".to_string(),
                web_max_results: 5,
                news_max_results: 3,
                web_timeout_secs: 20,
                news_timeout_secs: 10,
            },
            cors: CorsConfig {
                allowed_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                    PRIMARY_ORIGIN.to_string(),
                    "https://smart-study-buddy-lemon.vercel.app".to_string(),
                    "https://smart-study-buddy-tan.vercel.app".to_string(),
                ],
                wildcard_suffix: ".vercel.app".to_string(),
                fallback_origin: PRIMARY_ORIGIN.to_string(),
            },
            request: RequestConfig {
                lenient_body: false,
                default_prompt: DEFAULT_PROMPT.to_string(),
            },
        }
    }
}

impl InferenceConfig {
    pub fn selected_model(&self) -> &str {
        self.inference_profile_arn
            .as_deref()
            .filter(|arn| !arn.trim().is_empty())
            .unwrap_or(&self.model_id)
    }

    pub fn backend(&self) -> InferenceBackend {
        if self.api_key.is_some() || self.endpoint.is_some() {
            InferenceBackend::ApiKey
        } else {
            InferenceBackend::CredentialChain
        }
    }

    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Config::default();

        // Server configuration
        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.server.port = port.parse()?;
        }
        if let Ok(workers) = env::var("WORKERS") {
            config.server.workers = workers.parse()?;
        }
        if let Ok(max_json_payload_size) = env::var("MAX_JSON_PAYLOAD_SIZE") {
            config.server.max_json_payload_size = max_json_payload_size.parse()?;
        }

        // Inference configuration
        if let Ok(model_id) = env::var("BEDROCK_MODEL_ID") {
            config.inference.model_id = model_id.trim().to_string();
        }
        config.inference.inference_profile_arn = non_blank("INFERENCE_PROFILE_ARN");
        if let Ok(region) = env::var("AWS_REGION") {
            config.inference.region = region.trim().to_string();
        }
        config.inference.endpoint = non_blank("BEDROCK_ENDPOINT");
        config.inference.api_key = non_blank("AWS_BEARER_TOKEN_BEDROCK");
        if let Ok(max_tokens) = env::var("MAX_TOKENS") {
            config.inference.max_tokens = max_tokens.parse()?;
        }
        if let Ok(temperature) = env::var("TEMPERATURE") {
            config.inference.temperature = temperature.parse()?;
        }
        if let Ok(timeout) = env::var("INFERENCE_TIMEOUT_SECS") {
            config.inference.timeout_secs = timeout.parse()?;
        }

        // Search configuration
        if let Ok(provider) = env::var("SEARCH_PROVIDER") {
            config.search.provider = parse_search_backend(&provider);
        }
        config.search.tavily_api_key = non_blank("TAVILY_API_KEY");
        config.search.news_api_key = non_blank("NEWS_API_KEY");
        if let Ok(web_max_results) = env::var("WEB_MAX_RESULTS") {
            config.search.web_max_results = web_max_results.parse()?;
        }
        if let Ok(news_max_results) = env::var("NEWS_MAX_RESULTS") {
            config.search.news_max_results = news_max_results.parse()?;
        }
        if let Ok(timeout) = env::var("WEB_TIMEOUT_SECS") {
            config.search.web_timeout_secs = timeout.parse()?;
        }
        if let Ok(timeout) = env::var("NEWS_TIMEOUT_SECS") {
            config.search.news_timeout_secs = timeout.parse()?;
        }

        // CORS configuration
        if let Ok(allowed_origins) = env::var("ALLOWED_ORIGINS") {
            config.cors.allowed_origins = allowed_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(suffix) = env::var("CORS_WILDCARD_SUFFIX") {
            config.cors.wildcard_suffix = suffix.trim().to_string();
        }
        if let Some(fallback) = non_blank("CORS_FALLBACK_ORIGIN") {
            config.cors.fallback_origin = fallback;
        }

        // Request handling
        if let Ok(lenient) = env::var("LENIENT_BODY") {
            config.request.lenient_body = parse_flag("LENIENT_BODY", &lenient);
        }
        if let Some(prompt) = non_blank("DEFAULT_PROMPT") {
            config.request.default_prompt = prompt;
        }

        Ok(config)
    }
}

fn non_blank(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_search_backend(value: &str) -> WebSearchBackend {
    match value.trim().to_lowercase().as_str() {
        "tavily" => WebSearchBackend::Tavily,
        "none" | "" => WebSearchBackend::None,
        other => {
            warn!("Unsupported SEARCH_PROVIDER '{}', web search disabled", other);
            WebSearchBackend::None
        }
    }
}

fn parse_flag(key: &str, value: &str) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" | "" => false,
        other => {
            warn!("Unrecognised value '{}' for {}, treating as false", other, key);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn profile_arn_overrides_pinned_model() {
        let mut inference = Config::default().inference;
        assert_eq!(inference.selected_model(), DEFAULT_MODEL_ID);

        inference.inference_profile_arn =
            Some("arn:aws:bedrock:us-east-1:123456789012:inference-profile/demo".to_string());
        assert_eq!(
            inference.selected_model(),
            "arn:aws:bedrock:us-east-1:123456789012:inference-profile/demo"
        );

        inference.inference_profile_arn = Some("   ".to_string());
        assert_eq!(inference.selected_model(), DEFAULT_MODEL_ID);
    }

    #[test]
    fn endpoint_defaults_to_regional_runtime() {
        let mut inference = Config::default().inference;
        assert_eq!(
            inference.endpoint_url(),
            "https://bedrock-runtime.us-east-1.amazonaws.com"
        );

        inference.endpoint = Some("http://localhost:4000/".to_string());
        assert_eq!(inference.endpoint_url(), "http://localhost:4000");
    }

    #[test]
    fn api_key_or_custom_endpoint_selects_bearer_transport() {
        let mut inference = Config::default().inference;
        assert_eq!(inference.backend(), InferenceBackend::CredentialChain);

        inference.api_key = Some("key".to_string());
        assert_eq!(inference.backend(), InferenceBackend::ApiKey);

        inference.api_key = None;
        inference.endpoint = Some("http://localhost:4000".to_string());
        assert_eq!(inference.backend(), InferenceBackend::ApiKey);
    }

    #[rstest]
    #[case("tavily", WebSearchBackend::Tavily)]
    #[case(" Tavily ", WebSearchBackend::Tavily)]
    #[case("none", WebSearchBackend::None)]
    #[case("", WebSearchBackend::None)]
    #[case("bing", WebSearchBackend::None)]
    fn search_provider_parsing_never_fails(#[case] value: &str, #[case] expected: WebSearchBackend) {
        assert_eq!(parse_search_backend(value), expected);
    }

    #[rstest]
    #[case("1", true)]
    #[case("true", true)]
    #[case("YES", true)]
    #[case("on", true)]
    #[case("0", false)]
    #[case("false", false)]
    #[case("maybe", false)]
    fn lenient_flag_accepts_common_spellings(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(parse_flag("LENIENT_BODY", value), expected);
    }
}
