// Token — Lexical tokens of the edgeflow language
//
// Tokens fall into these categories:
//
//   1. Keywords      — node, edge, output, true, false, type, int, double, string
//   2. Punctuation   — { } ( ) : , > = + - * / %
//   3. Numbers       — raw numeric lexemes, validated later by the parser
//   4. Strings       — '...' or "..." with the raw contents kept verbatim
//   5. Identifiers   — user-defined names
//   6. Unknown       — anything the lexer could not classify
//
// Each token keeps its source text and a Span for diagnostics.

use serde::Serialize;
use std::fmt;

/// Byte-level location in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// Byte offset from the start of the source.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based, in bytes).
    pub col: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize, line: usize, col: usize) -> Self {
        Self {
            offset,
            len,
            line,
            col,
        }
    }

    /// Byte offset one past the end of this span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Keyword,
    Punctuation,
    Number,
    StringLiteral,
    Identifier,
    EndOfInput,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Number => "number",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::EndOfInput => "end of input",
            TokenKind::Unknown => "unknown character",
        };
        f.write_str(s)
    }
}

/// A token with its kind, source text, and location.
///
/// For string literals `text` holds the contents between the quotes.
/// `EndOfInput` always has empty text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }

    /// True for a keyword token with exactly this text.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// True for a punctuation token with exactly this text.
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == p
    }

    /// True for `node` or `edge`, the tokens that start a declaration.
    pub fn starts_declaration(&self) -> bool {
        self.is_keyword("node") || self.is_keyword("edge")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "<eof>"),
            TokenKind::StringLiteral => write!(f, "\"{}\"", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// Reserved words. Matched before identifiers, and only on a word boundary.
pub const KEYWORDS: [&str; 9] = [
    "node", "edge", "output", "true", "false", "type", "int", "double", "string",
];

/// Single-character punctuation set.
pub const PUNCTUATION: &[u8] = b"{}():,>=+-*/%";

/// Look up a keyword from a word.
/// Returns None if the word is a plain identifier.
pub fn keyword_lookup(word: &str) -> Option<&'static str> {
    KEYWORDS.iter().copied().find(|k| *k == word)
}
