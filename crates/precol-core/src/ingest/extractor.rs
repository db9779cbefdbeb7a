use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::chunker::Chunk;
use super::normalizer::RawObject;
use crate::backend::{BackendError, ChatRequest, DecodingOptions, ModelBackend};
use crate::config::Config;

/// Longest slice of a raw model answer written to the debug log.
const RESPONSE_LOG_CHARS: usize = 4_000;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Model backend failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Response is neither an object nor a list: {0}")]
    UnexpectedShape(&'static str),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Decodes a model answer into a list of JSON objects.
///
/// A lone object is wrapped in a list; non-object list elements are dropped.
pub fn decode_response(raw: &str) -> ExtractionResult<Vec<RawObject>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(object) => Ok(vec![object]),
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(object) => Some(object),
                _ => None,
            })
            .collect()),
        Value::Null => Err(ExtractionError::UnexpectedShape("null")),
        Value::Bool(_) => Err(ExtractionError::UnexpectedShape("boolean")),
        Value::Number(_) => Err(ExtractionError::UnexpectedShape("number")),
        Value::String(_) => Err(ExtractionError::UnexpectedShape("string")),
    }
}

/// Sends gated chunks to a structured-output model.
pub struct LlmExtractor {
    backend: Arc<dyn ModelBackend>,
    system_prompt: String,
    options: DecodingOptions,
}

impl LlmExtractor {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        system_prompt: impl Into<String>,
        options: DecodingOptions,
    ) -> Self {
        Self {
            backend,
            system_prompt: system_prompt.into(),
            options,
        }
    }

    pub fn from_config(backend: Arc<dyn ModelBackend>, config: &Config) -> Self {
        Self::new(
            backend,
            config.system_prompt.clone(),
            DecodingOptions::from(&config.model),
        )
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub async fn try_extract(&self, text: &str) -> ExtractionResult<Vec<RawObject>> {
        let request = ChatRequest::structured(&self.system_prompt, text, self.options);
        let raw = self.backend.chat(&request).await?;

        debug!(
            "Response received ({} chars):\n{}",
            raw.chars().count(),
            raw.chars().take(RESPONSE_LOG_CHARS).collect::<String>()
        );

        decode_response(&raw)
    }

    /// Never fails: any problem with this chunk is logged and yields no objects.
    pub async fn extract(&self, chunk: &Chunk<'_>) -> Vec<RawObject> {
        match self.try_extract(chunk.content).await {
            Ok(objects) => objects,
            Err(ExtractionError::Backend(e)) => {
                error!("   → model error on chunk {}: {e}", chunk.index);
                Vec::new()
            }
            Err(ExtractionError::InvalidJson(e)) => {
                warn!("   → invalid JSON on chunk {}: {e}", chunk.index);
                Vec::new()
            }
            Err(e @ ExtractionError::UnexpectedShape(_)) => {
                warn!("   → discarding chunk {}: {e}", chunk.index);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Reply, ScriptedBackend};

    fn chunk(content: &str) -> Chunk<'_> {
        Chunk {
            index: 0,
            offset: 0,
            content,
        }
    }

    fn extractor(backend: ScriptedBackend) -> (LlmExtractor, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let ex = LlmExtractor::from_config(backend.clone(), &Config::default());
        (ex, backend)
    }

    #[test]
    fn test_decode_object_is_wrapped() {
        let out = decode_response(r#"{"especie_cientifica": "Zea mays"}"#).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["especie_cientifica"], "Zea mays");
    }

    #[test]
    fn test_decode_filters_non_objects() {
        let out = decode_response(r#"[{"a": 1}, 3, "x", null, {"b": 2}]"#).unwrap();
        assert_eq!(out.len(), 2);

        let out = decode_response("[42]").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(matches!(
            decode_response("\"solo texto\""),
            Err(ExtractionError::UnexpectedShape("string"))
        ));
        assert!(matches!(
            decode_response("17"),
            Err(ExtractionError::UnexpectedShape("number"))
        ));
        assert!(matches!(
            decode_response("Aquí tienes las especies:"),
            Err(ExtractionError::InvalidJson(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_sends_chunk_as_user_content() {
        let (ex, backend) = extractor(ScriptedBackend::texts(&[
            r#"[{"especie_cientifica": "Zea mays", "uso_precolombino": "Alimentación"}]"#,
        ]));

        let out = ex.extract(&chunk("Zea mays alimento")).await;
        assert_eq!(out.len(), 1);
        assert_eq!(backend.seen(), vec!["Zea mays alimento".to_string()]);
    }

    #[tokio::test]
    async fn test_extract_fails_soft() {
        let (ex, _) = extractor(ScriptedBackend::new(vec![
            Reply::Text("no es json".into()),
            Reply::Text("[1, 2, 3]".into()),
            Reply::Text("true".into()),
            Reply::Fail(500, "model crashed".into()),
        ]));

        for _ in 0..4 {
            assert!(ex.extract(&chunk("Zea mays alimento")).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_try_extract_surfaces_backend_error() {
        let (ex, _) = extractor(ScriptedBackend::new(vec![Reply::Fail(404, "no model".into())]));

        let err = ex.try_extract("texto").await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Backend(BackendError::Api { status: 404, .. })
        ));
    }
}
