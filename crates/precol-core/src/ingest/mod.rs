mod chunker;
mod cleaner;
mod extractor;
mod normalizer;
mod ocr;
mod parser;
mod pipeline;
mod prompt;

pub use chunker::{Chunk, ChunkGate, ChunkSelector, Chunks, USE_KEYWORD_ROOTS};
pub use cleaner::{fold, TextCleaner, PALYNOLOGY_STOPWORDS};
pub use extractor::{decode_response, ExtractionError, ExtractionResult, LlmExtractor};
pub use normalizer::{
    RawObject, RecordNormalizer, RecordShape, COMMON_NAME_KEY, JUSTIFICATION_KEY, SPECIES_KEY,
    USAGE_KEY,
};
pub use ocr::OcrEngine;
pub use parser::{
    CompositeParser, DocumentFormat, ParseError, ParseResult, ParsedDocument, Parser, PdfParser,
    PlainTextParser, TextOrigin,
};
pub use pipeline::{
    document_name, DocumentOutcome, ExtractionPipeline, IngestError, IngestResult, RunSummary,
};
pub use prompt::SYSTEM_PROMPT;
