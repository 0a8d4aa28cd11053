use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::collections::HashMap;

/// Header names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiEvent {
    pub method: String,
    headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl ApiEvent {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn origin(&self) -> Option<&str> {
        self.header("origin")
    }

    pub fn is_preflight(&self) -> bool {
        self.method.eq_ignore_ascii_case("OPTIONS")
    }

    /// Accepts both `requestContext.http.method` and `httpMethod` events.
    pub fn from_gateway(event: &Value) -> Self {
        let method = event
            .pointer("/requestContext/http/method")
            .and_then(Value::as_str)
            .or_else(|| event.get("httpMethod").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();

        let headers: HashMap<String, String> = event
            .get("headers")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(name, value)| {
                        value
                            .as_str()
                            .map(|value| (name.to_ascii_lowercase(), value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let encoded = event
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let body = match event.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) if encoded => Some(decode_base64_body(raw)),
            Some(Value::String(raw)) => Some(raw.clone()),
            // Direct invocations sometimes pass the body as an already-parsed object.
            Some(other) => Some(other.to_string()),
        };

        Self {
            method,
            headers,
            body,
        }
    }
}

fn decode_base64_body(raw: &str) -> String {
    match STANDARD.decode(raw.trim()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!("Failed to decode base64 request body: {}", e);
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use serde_json::json;

    #[test]
    fn reads_http_api_shape() {
        let event = ApiEvent::from_gateway(&json!({
            "requestContext": {"http": {"method": "OPTIONS"}},
            "headers": {"Origin": "http://localhost:5173"}
        }));
        assert!(event.is_preflight());
        assert_eq!(event.origin(), Some("http://localhost:5173"));
        assert_eq!(event.body, None);
    }

    #[test]
    fn reads_rest_api_shape_with_encoded_body() {
        let event = ApiEvent::from_gateway(&json!({
            "httpMethod": "POST",
            "headers": {"content-type": "application/json"},
            "isBase64Encoded": true,
            "body": STANDARD.encode(r#"{"prompt":"hi"}"#)
        }));
        assert_eq!(event.method, "POST");
        assert_eq!(event.header("Content-Type"), Some("application/json"));
        assert_eq!(event.body.as_deref(), Some(r#"{"prompt":"hi"}"#));
    }

    #[test]
    fn object_body_is_reserialized() {
        let event = ApiEvent::from_gateway(&json!({
            "httpMethod": "POST",
            "body": {"query": "what is rust"}
        }));
        let parsed: Value = serde_json::from_str(event.body.as_deref().unwrap()).unwrap();
        assert_eq!(parsed, json!({"query": "what is rust"}));
    }

    #[test]
    fn undecodable_base64_body_is_kept_raw() {
        assert_eq!(decode_base64_body("not base64 at all!"), "not base64 at all!");

        let event = ApiEvent::from_gateway(&json!({
            "httpMethod": "POST",
            "isBase64Encoded": true,
            "body": r#"{"prompt":"hi"}"#
        }));
        assert_eq!(event.body.as_deref(), Some(r#"{"prompt":"hi"}"#));
    }
}
