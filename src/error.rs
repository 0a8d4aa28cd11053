use thiserror::Error;

/// Problems with the inbound request. Always answered with 400.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid JSON body")]
    MalformedBody(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing 'prompt' or 'query' in request body")]
    MissingQuestion,

    #[error("Invalid request")]
    Validation(String),
}

impl RequestError {
    pub fn details(&self) -> Option<String> {
        match self {
            RequestError::MalformedBody(details) | RequestError::Validation(details) => {
                Some(details.clone())
            }
            RequestError::NotAnObject | RequestError::MissingQuestion => None,
        }
    }
}

/// Search provider failures. Logged and degraded to an empty result set.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Inference endpoint failures. Fatal to the request.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid inference endpoint: {0}")]
    Endpoint(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("model endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("bedrock runtime error: {0}")]
    Sdk(String),

    #[error("invalid model response: {0}")]
    Decode(#[from] serde_json::Error),
}
