//! OpenAI chat-completions client.
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::ai::{ChatRequest, CompletionClient, ResponseFormat};
use crate::common::error::{Error, Result};
use crate::config::AiConfig;

/// Blocking client for the `/v1/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, config: &AiConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::MissingCredential);
        }

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            api_key,
            base_url: config.base_url.clone(),
        })
    }

    /// Build the request body for the API
    fn build_request_body(request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(tokens) = request.max_completion_tokens {
            body["max_completion_tokens"] = serde_json::json!(tokens);
        }
        if let ResponseFormat::JsonSchema { name, schema } = &request.response_format {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": name,
                    "strict": true,
                    "schema": schema,
                }
            });
        }

        body
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = Self::build_request_body(request);
        debug!(model = %request.model, "sending chat completion");

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let body_text = response.text()?;
        if !status.is_success() {
            return Err(Error::Ai(format!("HTTP {}: {}", status.as_u16(), body_text)));
        }

        let parsed: ChatResponse = serde_json::from_str(&body_text)
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse response: {}", e)))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| Error::MalformedResponse("response has no message content".to_string()))
    }
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_missing_credential() {
        assert!(matches!(
            OpenAiClient::new("  ", &AiConfig::default()),
            Err(Error::MissingCredential)
        ));
    }

    #[test]
    fn test_request_body_with_schema() {
        let request = ChatRequest::new("gpt-4o-mini")
            .system("You are helpful.")
            .user("Pick one")
            .json_schema("selection", serde_json::json!({"type": "object"}));
        let body = OpenAiClient::build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Pick one");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "selection");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_request_body_for_lookup() {
        let request = ChatRequest::new("gpt-5-mini").user("3?").max_completion_tokens(5000);
        let body = OpenAiClient::build_request_body(&request);
        assert_eq!(body["max_completion_tokens"], 5000);
        assert!(body.get("response_format").is_none());

        let request = ChatRequest::new("gpt-4o-mini").user("3?").temperature(0.0);
        let body = OpenAiClient::build_request_body(&request);
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn test_parse_response_shape() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"2"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.choices[0].message.as_ref().and_then(|m| m.content.as_deref()),
            Some("2")
        );
    }
}
