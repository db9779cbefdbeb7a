use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Palynology jargon that never names a use and only dilutes chunks.
pub const PALYNOLOGY_STOPWORDS: &[&str] = &[
    "granos",
    "polínico",
    "trilete",
    "monolete",
    "exina",
    "ornamentación",
    "pólenes",
    "fóveado",
    "estomatita",
    "tricolpado",
];

/// Cleans raw extracted text before chunking.
pub struct TextCleaner {
    whitespace: Regex,
    page_marker: Regex,
    table_marker: Regex,
    numeric_range: Regex,
    separators: Regex,
    multi_space: Regex,
    stopwords: HashSet<String>,
}

impl TextCleaner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            page_marker: Regex::new(r"(?i)\b(?:pa\p{Mn}?gina|página|page)\s*\d+\b")?,
            table_marker: Regex::new(r"(?i)\b(?:tabla|table)\s*\d+(?:\.\d+)?\b")?,
            numeric_range: Regex::new(r"\b\d+\s*(?:x|–|—)\s*\d+\b")?,
            separators: Regex::new(r"[_•·●■◆►▪\-]{2,}")?,
            multi_space: Regex::new(r" {2,}")?,
            stopwords: PALYNOLOGY_STOPWORDS.iter().map(|w| fold(w)).collect(),
        })
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(&fold(token))
    }

    pub fn clean(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let text: String = raw.nfkd().collect();
        let text = self.whitespace.replace_all(&text, " ");
        let text = self.page_marker.replace_all(&text, " ");
        let text = self.table_marker.replace_all(&text, " ");
        let text = self.numeric_range.replace_all(&text, " ");
        let text = self.separators.replace_all(&text, " ");

        let kept = text
            .split_whitespace()
            .filter(|token| !self.is_stopword(token))
            .collect::<Vec<_>>()
            .join(" ");

        self.multi_space.replace_all(&kept, " ").trim().to_string()
    }
}

/// Lowercase with combining marks stripped, for accent-insensitive comparison.
pub fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
