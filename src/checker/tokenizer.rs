use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

lazy_static! {
    // Maximal runs of alphanumerics and underscores.
    static ref WORD: Regex = Regex::new(r"\w+").expect("word pattern compiles");
}

/// Half-open range of character (not byte) offsets into the analyzed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "span must not be empty");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub word: String,
    pub span: Span,
    /// Byte range of the word, for slicing the source `&str`.
    pub bytes: Range<usize>,
}

/// Split text into words, left to right, each with its own position.
///
/// Repeated words are located independently: the search for the next word
/// always resumes after the end of the previous match.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for m in WORD.find_iter(text) {
        char_cursor += text[byte_cursor..m.start()].chars().count();
        let start = char_cursor;
        char_cursor += m.as_str().chars().count();
        byte_cursor = m.end();

        tokens.push(Token {
            word: m.as_str().to_string(),
            span: Span::new(start, char_cursor),
            bytes: m.range(),
        });
    }

    tokens
}

/// 1-based line and column of a character offset.
pub fn line_column(text: &str, char_offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for ch in text.chars().take(char_offset) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}
