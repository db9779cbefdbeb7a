use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{BackendError, BackendResult, ChatRequest, ModelBackend};
use crate::config::ModelConfig;

/// Chat client for an Ollama service (`/api/chat`, non-streaming).
pub struct OllamaBackend {
    client: Client,
    chat_url: Url,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl OllamaBackend {
    pub fn new(config: &ModelConfig) -> BackendResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let chat_url = Url::parse(&format!(
            "{}/api/chat",
            config.endpoint.trim_end_matches('/')
        ))?;

        Ok(Self {
            client: builder.build()?,
            chat_url,
            model: config.model.clone(),
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    fn request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
            "options": {
                "temperature": request.options.temperature,
                "top_p": request.options.top_p,
            },
        });
        if request.json_output {
            body["format"] = json!("json");
        }
        body
    }
}

#[async_trait::async_trait]
impl ModelBackend for OllamaBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> BackendResult<String> {
        debug!("Ollama request to {} ({})", self.chat_url, self.model);

        let response = self
            .client
            .post(self.chat_url.clone())
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map_or(text, |body| body.error);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| BackendError::MalformedResponse("missing message.content".into()))
    }
}
