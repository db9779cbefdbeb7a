use regex::Regex;

/// Roots that signal a human use: food, edible, timber, medicine, ritual,
/// dye, textile, aroma, colorant.
pub const USE_KEYWORD_ROOTS: &[&str] = &[
    "aliment", "comest", "madera", "medicin", "ritual", "tinte", "textil", "aroma", "colorant",
];

/// A contiguous window of cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of the window in the document partition
    pub index: usize,
    /// Offset of the first character, counted in chars
    pub offset: usize,
    pub content: &'a str,
}

impl Chunk<'_> {
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Single-line preview for logs, cut to `width` chars with a trailing ellipsis.
    pub fn preview(&self, width: usize) -> String {
        if self.char_len() <= width {
            return self.content.to_string();
        }
        let mut out: String = self.content.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Relevance filter: a window must hold a binomial-looking name and a use keyword.
///
/// This only sees one window at a time, so a use described without an
/// explicit keyword in the same window as the species is missed.
pub struct ChunkGate {
    binomial: Regex,
    use_keyword: Regex,
}

impl ChunkGate {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // Capitalized genus, then a lowercase epithet of two or more letters.
            // Marks are allowed because cleaned text is NFKD-decomposed.
            binomial: Regex::new(r"\p{Lu}\p{Mn}*(?:\p{Ll}\p{Mn}*)+ (?:\p{Ll}\p{Mn}*){2,}")?,
            use_keyword: Regex::new(&format!(r"(?i)\b(?:{})", USE_KEYWORD_ROOTS.join("|")))?,
        })
    }

    pub fn has_binomial(&self, text: &str) -> bool {
        self.binomial.is_match(text)
    }

    pub fn has_use_keyword(&self, text: &str) -> bool {
        self.use_keyword.is_match(text)
    }

    pub fn admits(&self, text: &str) -> bool {
        self.has_binomial(text) && self.has_use_keyword(text)
    }
}

/// Splits cleaned text into fixed-size windows and keeps the gated ones.
pub struct ChunkSelector {
    size: usize,
    gate: ChunkGate,
}

impl ChunkSelector {
    /// `size` is in characters and must be non-zero.
    #[must_use]
    pub fn new(size: usize, gate: ChunkGate) -> Self {
        Self {
            size: size.max(1),
            gate,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn gate(&self) -> &ChunkGate {
        &self.gate
    }

    /// Admitted windows, in document order.
    pub fn select<'a>(&'a self, text: &'a str) -> Chunks<'a> {
        Chunks::new(text, self.size, Some(&self.gate))
    }

    /// Every window of the partition, admitted or not.
    pub fn windows<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks::new(text, self.size, None)
    }
}

pub struct Chunks<'a> {
    text: &'a str,
    size: usize,
    gate: Option<&'a ChunkGate>,
    byte_pos: usize,
    char_pos: usize,
    index: usize,
}

impl<'a> Chunks<'a> {
    fn new(text: &'a str, size: usize, gate: Option<&'a ChunkGate>) -> Self {
        Self {
            text,
            size,
            gate,
            byte_pos: 0,
            char_pos: 0,
            index: 0,
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        while self.byte_pos < self.text.len() {
            let rest = &self.text[self.byte_pos..];
            let end = rest
                .char_indices()
                .nth(self.size)
                .map_or(rest.len(), |(i, _)| i);
            let window = &rest[..end];

            let chunk = Chunk {
                index: self.index,
                offset: self.char_pos,
                content: window,
            };

            self.byte_pos += end;
            self.char_pos += chunk.char_len();
            self.index += 1;

            if self.gate.is_none_or(|g| g.admits(window)) {
                return Some(chunk);
            }
        }
        None
    }
}
