//! Chat-completion boundary.
//!
//! Everything that talks to a language model goes through
//! [`CompletionClient`]; the OpenAI implementation lives in [`openai`] and the
//! prompt texts in [`prompts`].
pub mod openai;
pub mod prompts;

use serde::Serialize;

use crate::common::error::Result;

pub use openai::OpenAiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Shape of the reply the model is asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    Text,
    /// A JSON document matching `schema`
    JsonSchema { name: String, schema: serde_json::Value },
}

/// One chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_completion_tokens: Option<u32>,
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_completion_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: Role::System,
            content: content.into(),
        });
        self
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.into(),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_completion_tokens(mut self, tokens: u32) -> Self {
        self.max_completion_tokens = Some(tokens);
        self
    }

    pub fn json_schema(mut self, name: impl Into<String>, schema: serde_json::Value) -> Self {
        self.response_format = ResponseFormat::JsonSchema {
            name: name.into(),
            schema,
        };
        self
    }

    /// Content of the last user message.
    pub fn user_prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map_or("", |m| m.content.as_str())
    }
}

/// A blocking chat-completion service.
pub trait CompletionClient {
    /// Send `request` and return the text of the first choice.
    fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Parse a "reply with only the number" answer into a zero-based index.
///
/// Anything other than an integer in `1..=count` is `None`.
pub fn parse_choice(reply: &str, count: usize) -> Option<usize> {
    let n: usize = reply.trim().parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted [`CompletionClient`] for tests.
    use std::cell::RefCell;

    use super::{ChatRequest, CompletionClient};
    use crate::common::error::Result;

    type Responder = Box<dyn Fn(&ChatRequest) -> Result<String>>;

    /// Answers each request with a closure and records what it was asked.
    pub struct ScriptedClient {
        responder: Responder,
        requests: RefCell<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        pub fn new(responder: impl Fn(&ChatRequest) -> Result<String> + 'static) -> Self {
            Self {
                responder: Box::new(responder),
                requests: RefCell::new(Vec::new()),
            }
        }

        /// Always replies with `reply`.
        pub fn constant(reply: &str) -> Self {
            let reply = reply.to_string();
            Self::new(move |_| Ok(reply.clone()))
        }

        pub fn requests(&self) -> Vec<ChatRequest> {
            self.requests.borrow().clone()
        }
    }

    impl CompletionClient for ScriptedClient {
        fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.requests.borrow_mut().push(request.clone());
            (self.responder)(request)
        }
    }
}
