use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use super::parser::{ParseError, ParseResult};
use crate::config::OcrConfig;

/// OCR through the poppler and tesseract command line tools.
pub struct OcrEngine {
    language: String,
    dpi: u32,
    renderer: String,
    recognizer: String,
}

impl OcrEngine {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            dpi: config.dpi,
            renderer: "pdftoppm".to_string(),
            recognizer: "tesseract".to_string(),
        }
    }

    #[must_use]
    pub fn with_tools(mut self, renderer: &str, recognizer: &str) -> Self {
        self.renderer = renderer.to_string();
        self.recognizer = recognizer.to_string();
        self
    }

    pub fn check_tools(&self) -> ParseResult<()> {
        for tool in [&self.renderer, &self.recognizer] {
            which::which(tool).map_err(|_| ParseError::ToolMissing(tool.clone()))?;
        }
        Ok(())
    }

    /// Renders every page of `pdf` and returns the recognized text in page order.
    pub async fn recognize(&self, pdf: &Path) -> ParseResult<String> {
        self.check_tools()?;

        let workdir = tempfile::tempdir()?;
        let prefix = workdir.path().join("page");

        let output = Command::new(&self.renderer)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix)
            .output()
            .await?;
        if !output.status.success() {
            return Err(ParseError::Ocr(format!(
                "{} failed: {}",
                self.renderer,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let pages = rendered_pages(workdir.path()).await?;
        debug!("   → OCR over {} rendered pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for page in &pages {
            let output = Command::new(&self.recognizer)
                .arg(page)
                .arg("stdout")
                .arg("-l")
                .arg(&self.language)
                .output()
                .await?;
            if !output.status.success() {
                return Err(ParseError::Ocr(format!(
                    "{} failed on {}: {}",
                    self.recognizer,
                    page.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
            texts.push(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        Ok(texts.join("\n"))
    }
}

/// Page images in `dir`. pdftoppm zero-pads page numbers, so name order is page order.
async fn rendered_pages(dir: &Path) -> ParseResult<Vec<PathBuf>> {
    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("png")) {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rendered_pages_are_ordered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-02.png", "page-01.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pages = rendered_pages(dir.path()).await.unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["page-01.png", "page-02.png", "page-10.png"]);
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let engine = OcrEngine::from_config(&OcrConfig::default())
            .with_tools("precol-no-such-renderer", "precol-no-such-recognizer");

        let err = engine.recognize(Path::new("scan.pdf")).await.unwrap_err();
        assert!(matches!(err, ParseError::ToolMissing(tool) if tool == "precol-no-such-renderer"));
    }
}
