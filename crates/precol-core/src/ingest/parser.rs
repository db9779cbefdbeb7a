use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use super::ocr::OcrEngine;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR failed: {0}")]
    Ocr(String),
    #[error("Required tool not found on PATH: {0}")]
    ToolMissing(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Pdf,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn of_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Where the text of a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    Plain,
    TextLayer,
    Ocr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub format: DocumentFormat,
    pub origin: TextOrigin,
    pub full_text: String,
}

impl ParsedDocument {
    #[must_use]
    pub fn new(format: DocumentFormat, origin: TextOrigin, full_text: String) -> Self {
        Self {
            format,
            origin,
            full_text,
        }
    }
}

/// Source of raw document text.
#[async_trait::async_trait]
pub trait Parser: Send + Sync {
    fn supported_formats(&self) -> &[DocumentFormat];

    fn can_parse(&self, format: DocumentFormat) -> bool {
        self.supported_formats().contains(&format)
    }

    async fn parse_file(&self, path: &Path) -> ParseResult<ParsedDocument>;
}

pub struct PlainTextParser;

impl PlainTextParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Parser for PlainTextParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::PlainText]
    }

    async fn parse_file(&self, path: &Path) -> ParseResult<ParsedDocument> {
        let data = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&data).into_owned();
        Ok(ParsedDocument::new(DocumentFormat::PlainText, TextOrigin::Plain, text))
    }
}

/// Reads the digital text layer and falls back to OCR when it is missing or too short.
pub struct PdfParser {
    ocr: OcrEngine,
    min_text_chars: usize,
}

impl PdfParser {
    pub fn new(ocr: OcrEngine, min_text_chars: usize) -> Self {
        Self {
            ocr,
            min_text_chars,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(OcrEngine::from_config(&config.ocr), config.ocr.min_text_chars)
    }

    fn is_usable(&self, text: &str) -> bool {
        text.trim().chars().count() > self.min_text_chars
    }
}

#[async_trait::async_trait]
impl Parser for PdfParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pdf]
    }

    async fn parse_file(&self, path: &Path) -> ParseResult<ParsedDocument> {
        let data = tokio::fs::read(path).await?;

        // pdf-extract is synchronous and may panic on damaged files.
        match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data)).await
        {
            Ok(Ok(text)) if self.is_usable(&text) => {
                debug!("   → digital text layer OK");
                return Ok(ParsedDocument::new(
                    DocumentFormat::Pdf,
                    TextOrigin::TextLayer,
                    text,
                ));
            }
            Ok(Ok(_)) => debug!("   → text layer too short; OCR…"),
            Ok(Err(e)) => warn!("   → text layer failed ({e}); OCR…"),
            Err(e) => warn!("   → text layer extraction aborted ({e}); OCR…"),
        }

        let text = self.ocr.recognize(path).await?;
        debug!("   → OCR finished");
        Ok(ParsedDocument::new(DocumentFormat::Pdf, TextOrigin::Ocr, text))
    }
}

pub struct CompositeParser {
    parsers: Vec<Box<dyn Parser>>,
}

impl CompositeParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parsers.push(parser);
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_parser(Box::new(PdfParser::from_config(config)))
            .with_parser(Box::new(PlainTextParser::new()))
    }

    fn find_parser(&self, format: DocumentFormat) -> Option<&dyn Parser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(format))
            .map(|p| p.as_ref())
    }
}

impl Default for CompositeParser {
    fn default() -> Self {
        Self::new().with_parser(Box::new(PlainTextParser::new()))
    }
}

#[async_trait::async_trait]
impl Parser for CompositeParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::PlainText, DocumentFormat::Pdf]
    }

    fn can_parse(&self, format: DocumentFormat) -> bool {
        self.find_parser(format).is_some()
    }

    async fn parse_file(&self, path: &Path) -> ParseResult<ParsedDocument> {
        let format = DocumentFormat::of_path(path)
            .ok_or_else(|| ParseError::UnsupportedFormat(path.display().to_string()))?;

        let parser = self
            .find_parser(format)
            .ok_or_else(|| ParseError::UnsupportedFormat(format!("{format:?}")))?;

        parser.parse_file(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("txt"), Some(DocumentFormat::PlainText));
        assert_eq!(DocumentFormat::from_extension("docx"), None);
        assert_eq!(
            DocumentFormat::of_path(Path::new("corpus/Informe.Pdf")),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(DocumentFormat::of_path(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_plain_text_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notas.txt");
        std::fs::write(&path, "Zea mays, alimento").unwrap();

        let doc = CompositeParser::default().parse_file(&path).await.unwrap();
        assert_eq!(doc.full_text, "Zea mays, alimento");
        assert_eq!(doc.origin, TextOrigin::Plain);
    }

    #[tokio::test]
    async fn test_composite_rejects_unknown_format() {
        let parser = CompositeParser::default();
        assert!(!parser.can_parse(DocumentFormat::Pdf));

        let err = parser.parse_file(Path::new("informe.pdf")).await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));

        let err = parser.parse_file(Path::new("tabla.xlsx")).await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_unreadable_pdf_without_ocr_tools_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        let ocr = OcrEngine::from_config(&crate::config::OcrConfig::default())
            .with_tools("precol-no-such-renderer", "precol-no-such-recognizer");
        let err = PdfParser::new(ocr, 100).parse_file(&path).await.unwrap_err();
        assert!(matches!(err, ParseError::ToolMissing(_)));
    }

    #[test]
    fn test_text_layer_threshold() {
        let parser = PdfParser::from_config(&Config::default());
        assert!(!parser.is_usable(&" ".repeat(500)));
        assert!(!parser.is_usable(&"a".repeat(100)));
        assert!(parser.is_usable(&"a".repeat(101)));
    }
}
