use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::chunker::{ChunkGate, ChunkSelector};
use super::cleaner::TextCleaner;
use super::extractor::LlmExtractor;
use super::normalizer::RecordNormalizer;
use super::parser::{CompositeParser, DocumentFormat, Parser, TextOrigin};
use crate::backend::ModelBackend;
use crate::config::Config;
use crate::record::{CanonicalRecord, ResultSet};
use crate::sink::{SinkError, TabularSink};

/// Width of the chunk preview written to the debug log.
const PREVIEW_CHARS: usize = 120;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Cannot read input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Output error: {0}")]
    Sink(#[from] SinkError),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// What one document contributed to the run.
#[derive(Debug)]
pub enum DocumentOutcome {
    Extracted {
        origin: TextOrigin,
        chunks_admitted: usize,
        records: Vec<CanonicalRecord>,
    },
    /// Text extraction and OCR both came back empty.
    NoText,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub documents_without_text: usize,
    pub chunks_admitted: usize,
    pub records_before_dedup: usize,
    /// Rows handed to the sink
    pub records: usize,
    pub per_document: Vec<(String, usize)>,
}

/// Drives documents through cleaning, chunk gating, model extraction and
/// record normalization, one document and one chunk at a time.
pub struct ExtractionPipeline {
    parser: Box<dyn Parser>,
    cleaner: TextCleaner,
    selector: ChunkSelector,
    extractor: LlmExtractor,
    normalizer: RecordNormalizer,
}

impl ExtractionPipeline {
    pub fn new(
        parser: Box<dyn Parser>,
        cleaner: TextCleaner,
        selector: ChunkSelector,
        extractor: LlmExtractor,
    ) -> Self {
        Self {
            parser,
            cleaner,
            selector,
            extractor,
            normalizer: RecordNormalizer::new(),
        }
    }

    pub fn from_config(config: &Config, backend: Arc<dyn ModelBackend>) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Box::new(CompositeParser::from_config(config)),
            TextCleaner::new()?,
            ChunkSelector::new(config.chunk_size, ChunkGate::new()?),
            LlmExtractor::from_config(backend, config),
        ))
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    /// PDF files directly inside `dir`, sorted by name.
    pub async fn discover_documents(dir: &Path) -> IngestResult<Vec<PathBuf>> {
        let io_err = |source| IngestError::InputDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;

        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.is_file() && DocumentFormat::of_path(&path) == Some(DocumentFormat::Pdf) {
                found.push(path);
            }
        }

        found.sort();
        Ok(found)
    }

    /// Raw text of a document, or `None` when nothing usable could be read.
    async fn extract_text(&self, path: &Path) -> Option<(TextOrigin, String)> {
        match self.parser.parse_file(path).await {
            Ok(doc) if !doc.full_text.trim().is_empty() => Some((doc.origin, doc.full_text)),
            Ok(_) => {
                warn!("   → no text recovered from {}", path.display());
                None
            }
            Err(e) => {
                error!("   → text extraction failed for {}: {e}", path.display());
                None
            }
        }
    }

    /// Cleans raw text and runs its admitted chunks through the model.
    pub async fn process_text(&self, name: &str, raw: &str) -> (usize, Vec<CanonicalRecord>) {
        let text = self.cleaner.clean(raw);
        self.process_cleaned(name, &text).await
    }

    async fn process_cleaned(&self, name: &str, text: &str) -> (usize, Vec<CanonicalRecord>) {
        let mut admitted = 0;
        let mut records = Vec::new();

        for chunk in self.selector.select(text) {
            admitted += 1;
            debug!(
                "   → CHUNK {admitted} (window {}) [{} chars]: {}",
                chunk.index,
                chunk.char_len(),
                chunk.preview(PREVIEW_CHARS)
            );

            let objects = self.extractor.extract(&chunk).await;
            records.extend(
                self.normalizer
                    .normalize(&objects)
                    .into_iter()
                    .map(|r| r.with_source(name)),
            );
        }

        (admitted, records)
    }

    pub async fn process_document(&self, path: &Path) -> DocumentOutcome {
        let name = document_name(path);

        let Some((origin, raw)) = self.extract_text(path).await else {
            return DocumentOutcome::NoText;
        };
        let text = self.cleaner.clean(&raw);
        if text.is_empty() {
            warn!("   → {name} has no usable text after cleaning");
            return DocumentOutcome::NoText;
        }

        let (chunks_admitted, records) = self.process_cleaned(&name, &text).await;
        DocumentOutcome::Extracted {
            origin,
            chunks_admitted,
            records,
        }
    }

    /// Processes every document, then deduplicates and writes the rows to `sink`.
    ///
    /// The sink is left untouched when there is nothing to write.
    pub async fn run(
        &self,
        documents: &[PathBuf],
        sink: &mut dyn TabularSink,
    ) -> IngestResult<RunSummary> {
        let mut summary = RunSummary::default();

        if documents.is_empty() {
            error!("No PDF documents to process.");
            return Ok(summary);
        }

        info!(
            "Extracting from {} documents with model {}",
            documents.len(),
            self.extractor.model()
        );

        let mut results = ResultSet::new();

        for (i, path) in documents.iter().enumerate() {
            let name = document_name(path);
            info!("[{}/{}] Processing {name}", i + 1, documents.len());
            summary.documents += 1;

            match self.process_document(path).await {
                DocumentOutcome::Extracted {
                    origin,
                    chunks_admitted,
                    records,
                } => {
                    debug!("   → {chunks_admitted} chunks admitted ({origin:?})");
                    summary.chunks_admitted += chunks_admitted;
                    results.extend(records);
                }
                DocumentOutcome::NoText => summary.documents_without_text += 1,
            }

            let count = results.count_for(&name);
            info!("   → {count} valid records in {name}");
            summary.per_document.push((name, count));
        }

        if results.is_empty() {
            warn!("No species found.");
            return Ok(summary);
        }

        summary.records_before_dedup = results.len();
        let rows = results.deduplicated();
        summary.records = rows.len();

        sink.write(&rows)?;
        info!(
            "Saved {} rows ({} before deduplication)",
            summary.records, summary.records_before_dedup
        );

        Ok(summary)
    }
}

/// Identifier recorded in `archivo_origen`.
pub fn document_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}
