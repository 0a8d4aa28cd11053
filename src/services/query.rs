use serde_json::{Map, Value};
use tracing::warn;
use validator::Validate;

use crate::config::RequestConfig;
use crate::error::RequestError;

/// Body fields that may carry the question, in priority order.
pub const QUESTION_FIELDS: [&str; 3] = ["prompt", "query", "question"];

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Question {
    #[validate(length(min = 1, max = 4000))]
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct QueryExtractor {
    lenient: bool,
    default_prompt: String,
}

impl QueryExtractor {
    pub fn new(config: &RequestConfig) -> Self {
        Self {
            lenient: config.lenient_body,
            default_prompt: config.default_prompt.clone(),
        }
    }

    pub fn extract(&self, body: Option<&str>) -> Result<Question, RequestError> {
        let fields = self.parse_body(body)?;

        let text = match find_question(&fields) {
            Some(text) => text,
            None if self.lenient => self.default_prompt.clone(),
            None => return Err(RequestError::MissingQuestion),
        };

        let question = Question { text };
        question
            .validate()
            .map_err(|e| RequestError::Validation(e.to_string()))?;
        Ok(question)
    }

    fn parse_body(&self, body: Option<&str>) -> Result<Map<String, Value>, RequestError> {
        let raw = match body.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw,
            None => return Ok(Map::new()),
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(_) if self.lenient => Ok(Map::new()),
            Ok(_) => Err(RequestError::NotAnObject),
            Err(e) if self.lenient => {
                warn!("Unparseable request body, continuing with defaults: {}", e);
                Ok(Map::new())
            }
            Err(e) => Err(RequestError::MalformedBody(e.to_string())),
        }
    }
}

fn find_question(fields: &Map<String, Value>) -> Option<String> {
    QUESTION_FIELDS.iter().find_map(|field| {
        fields
            .get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rstest::rstest;

    fn strict() -> QueryExtractor {
        QueryExtractor::new(&Config::default().request)
    }

    fn lenient() -> QueryExtractor {
        let mut config = Config::default().request;
        config.lenient_body = true;
        QueryExtractor::new(&config)
    }

    #[rstest]
    #[case(r#"{"prompt": "  What is Rust?  "}"#, "What is Rust?")]
    #[case(r#"{"query": "What is Rust?"}"#, "What is Rust?")]
    #[case(r#"{"question": "What is Rust?"}"#, "What is Rust?")]
    #[case(r#"{"prompt": "first", "query": "second"}"#, "first")]
    #[case(r#"{"prompt": "   ", "query": "second"}"#, "second")]
    #[case(r#"{"prompt": 42, "query": "second"}"#, "second")]
    fn picks_first_usable_field(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(strict().extract(Some(body)).unwrap().text, expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("{}"))]
    #[case(Some(r#"{"message": "hi"}"#))]
    #[case(Some(r#"{"prompt": ""}"#))]
    fn strict_mode_rejects_missing_question(#[case] body: Option<&str>) {
        assert!(matches!(
            strict().extract(body),
            Err(RequestError::MissingQuestion)
        ));
    }

    #[test]
    fn strict_mode_rejects_bad_json() {
        assert!(matches!(
            strict().extract(Some("{not json")),
            Err(RequestError::MalformedBody(_))
        ));
        assert!(matches!(
            strict().extract(Some(r#"["prompt"]"#)),
            Err(RequestError::NotAnObject)
        ));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("{not json"))]
    #[case(Some("[1, 2, 3]"))]
    #[case(Some(r#"{"prompt": "  "}"#))]
    fn lenient_mode_falls_back_to_default(#[case] body: Option<&str>) {
        assert_eq!(
            lenient().extract(body).unwrap().text,
            crate::config::DEFAULT_PROMPT
        );
    }

    #[test]
    fn overlong_question_is_rejected() {
        let body = serde_json::json!({ "prompt": "a".repeat(4001) }).to_string();
        assert!(matches!(
            strict().extract(Some(&body)),
            Err(RequestError::Validation(_))
        ));
    }
}
