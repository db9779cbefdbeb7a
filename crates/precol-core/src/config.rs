use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ingest::SYSTEM_PROMPT;

pub const ENV_INPUT_DIR: &str = "PRECOL_INPUT_DIR";
pub const ENV_OUTPUT_DIR: &str = "PRECOL_OUTPUT_DIR";
pub const ENV_MODEL: &str = "PRECOL_MODEL";
pub const ENV_ENDPOINT: &str = "PRECOL_ENDPOINT";
pub const ENV_CHUNK_SIZE: &str = "PRECOL_CHUNK_SIZE";

const LOG_FILE_NAME: &str = "precol.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("Temperature {0} is outside [0, 2]")]
    Temperature(f32),
    #[error("top_p {0} is outside (0, 1]")]
    TopP(f32),
    #[error("Invalid model endpoint {0:?}: {1}")]
    Endpoint(String, String),
    #[error("System prompt is empty")]
    EmptyPrompt,
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Language model connection and decoding parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the Ollama-compatible chat service
    pub endpoint: String,
    /// Model identifier as known to the service
    pub model: String,
    pub temperature: f32,
    /// Nucleus sampling mass
    pub top_p: f32,
    /// No timeout when unset; model calls block until the service answers
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "olmo2:7b".to_string(),
            temperature: 0.0,
            top_p: 0.1,
            request_timeout_seconds: None,
        }
    }
}

/// OCR fallback for scanned documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language list
    pub language: String,
    /// Render resolution for page images
    pub dpi: u32,
    /// Text layers this short (after trimming) are treated as missing
    pub min_text_chars: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "spa+eng".to_string(),
            dpi: 300,
            min_text_chars: 100,
        }
    }
}

/// Process-level configuration, passed explicitly into each component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Spreadsheet name, relative to `output_dir`
    pub output_file: String,
    /// Window size in characters
    pub chunk_size: usize,
    pub model: ModelConfig,
    pub ocr: OcrConfig,
    pub system_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data_pdf"),
            output_dir: PathBuf::from("outputs"),
            output_file: "especies_precolombinas.xlsx".to_string(),
            chunk_size: 4_000,
            model: ModelConfig::default(),
            ocr: OcrConfig::default(),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("precol").join("config.json"))
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Explicit file first, then the per-user config file, then defaults.
    pub fn discover(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_INPUT_DIR) {
            self.input_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_MODEL) {
            self.model.model = v;
        }
        if let Some(v) = lookup(ENV_ENDPOINT) {
            self.model.endpoint = v;
        }
        if let Some(v) = lookup(ENV_CHUNK_SIZE) {
            self.chunk_size = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_CHUNK_SIZE.to_string(),
                value: v.clone(),
            })?;
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(LOG_FILE_NAME)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Temperature(self.model.temperature));
        }
        if !(self.model.top_p > 0.0 && self.model.top_p <= 1.0) {
            return Err(ConfigError::TopP(self.model.top_p));
        }
        let endpoint = url::Url::parse(&self.model.endpoint)
            .map_err(|e| ConfigError::Endpoint(self.model.endpoint.clone(), e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Endpoint(
                self.model.endpoint.clone(),
                format!("unsupported scheme {}", endpoint.scheme()),
            ));
        }
        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::EmptyPrompt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 4_000);
        assert_eq!(config.model.temperature, 0.0);
        assert_eq!(config.model.top_p, 0.1);
        assert_eq!(config.ocr.language, "spa+eng");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_paths() {
        let config = Config {
            output_dir: PathBuf::from("out"),
            ..Default::default()
        };
        assert_eq!(config.output_path(), PathBuf::from("out/especies_precolombinas.xlsx"));
        assert_eq!(config.log_path(), PathBuf::from("out/precol.log"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_MODEL, "llama3:8b"),
            (ENV_CHUNK_SIZE, "2500"),
            (ENV_INPUT_DIR, "/corpus"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.model.model, "llama3:8b");
        assert_eq!(config.chunk_size, 2500);
        assert_eq!(config.input_dir, PathBuf::from("/corpus"));
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_bad_chunk_size_override() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| (k == ENV_CHUNK_SIZE).then(|| "big".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validation_failures() {
        let config = Config {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroChunkSize)));

        let mut config = Config::default();
        config.model.top_p = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::TopP(_))));

        let mut config = Config::default();
        config.model.endpoint = "ftp://models.local".into();
        assert!(matches!(config.validate(), Err(ConfigError::Endpoint(..))));

        let config = Config {
            system_prompt: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPrompt)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"chunk_size": 1000, "model": {"model": "qwen2:7b"}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.model.model, "qwen2:7b");
        assert_eq!(config.model.endpoint, "http://localhost:11434");
        assert_eq!(config.system_prompt, SYSTEM_PROMPT);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::discover(Some(Path::new("/nonexistent/precol.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.chunk_size, parsed.chunk_size);
        assert_eq!(config.model.model, parsed.model.model);
    }
}
