#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod error;
pub mod ingest;
pub mod record;
pub mod sink;

pub use backend::{BackendError, ChatRequest, DecodingOptions, ModelBackend, OllamaBackend};
pub use config::{Config, ConfigError, ModelConfig, OcrConfig};
pub use error::{Error, Result};
pub use ingest::{
    Chunk, ChunkGate, ChunkSelector, ExtractionPipeline, LlmExtractor, RecordNormalizer,
    RunSummary, TextCleaner,
};
pub use record::{CanonicalRecord, ResultSet, SpeciesUse};
pub use sink::{MemorySink, SinkError, TableSink, TabularSink, XlsxSink};
