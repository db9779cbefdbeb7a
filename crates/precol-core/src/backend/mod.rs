mod ollama;

pub use ollama::OllamaBackend;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Model service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Malformed service response: {0}")]
    MalformedResponse(String),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters; fixed low values keep answers reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodingOptions {
    pub temperature: f32,
    pub top_p: f32,
}

impl From<&ModelConfig> for DecodingOptions {
    fn from(config: &ModelConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// One structured-output chat call: system instruction, user content, JSON-only answer.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub json_output: bool,
    pub options: DecodingOptions,
}

impl ChatRequest {
    pub fn structured(system: &str, user: &str, options: DecodingOptions) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(user)],
            json_output: true,
            options,
        }
    }
}

/// A language model service able to answer a chat request with raw text.
#[async_trait::async_trait]
pub trait ModelBackend: Send + Sync {
    fn model(&self) -> &str;

    async fn chat(&self, request: &ChatRequest) -> BackendResult<String>;
}
