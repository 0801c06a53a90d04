// Lexer — Converts edgeflow source text into a stream of Tokens
//
// The lexer is a hand-written scanner. It walks the source one byte at a
// time and never fails: anything it cannot classify becomes an Unknown
// token that the parser rejects later.
//
// RULES, checked in this order at each position:
//
//   1. Whitespace is skipped.
//   2. `//` starts a comment running to end of line.
//   3. A word that is exactly a keyword becomes a Keyword token. Words
//      are [A-Za-z0-9_] runs, so `nodeX` and `node_a` stay identifiers.
//   4. `-` directly followed by a digit starts a Number.
//   5. Single-character punctuation: { } ( ) : , > = + - * / %
//   6. Numbers: a digit followed by any run of digits and dots. The lexeme
//      is not validated here; `1.` and `1.2.3` are single Number tokens.
//   7. Strings: '...' or "..." with no escape processing. An unterminated
//      string becomes one Unknown token holding the rest of the input.
//   8. Identifiers: [A-Za-z_][A-Za-z0-9_]*
//   9. Anything else is a single-character Unknown token.

use crate::token::{keyword_lookup, Span, Token, TokenKind, PUNCTUATION};

/// Lexer state over a source string.
pub struct Lexer<'src> {
    src: &'src str,
    bytes: &'src [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenize the entire source, returning a Vec of Tokens.
    /// The last token is always EndOfInput.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.is_eof();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tracing::trace!(count = tokens.len(), "tokenized source");
        tokens
    }

    /// Read the next token.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.pos >= self.bytes.len() {
            return Token::new(TokenKind::EndOfInput, "", self.span(0));
        }

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let ch = self.bytes[self.pos];

        //  Keyword or identifier
        if ch.is_ascii_alphabetic() || ch == b'_' {
            return self.lex_word(start_pos, start_line, start_col);
        }

        //  Negative number
        if ch == b'-' && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            return self.lex_number(start_pos, start_line, start_col);
        }

        //  Punctuation
        if PUNCTUATION.contains(&ch) {
            self.advance();
            return self.token_from(TokenKind::Punctuation, start_pos, start_line, start_col);
        }

        //  Number literal
        if ch.is_ascii_digit() {
            return self.lex_number(start_pos, start_line, start_col);
        }

        //  String literal
        if ch == b'\'' || ch == b'"' {
            return self.lex_string(ch, start_pos, start_line, start_col);
        }

        //  Unknown: one whole character, never a split UTF-8 sequence
        let width = self.src[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        for _ in 0..width {
            self.advance();
        }
        self.token_from(TokenKind::Unknown, start_pos, start_line, start_col)
    }

    // Helpers

    fn advance(&mut self) {
        if self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn span(&self, len: usize) -> Span {
        Span::new(self.pos, len, self.line, self.col)
    }

    /// Build a token covering `start_pos..self.pos`.
    fn token_from(
        &self,
        kind: TokenKind,
        start_pos: usize,
        start_line: usize,
        start_col: usize,
    ) -> Token {
        Token::new(
            kind,
            &self.src[start_pos..self.pos],
            Span::new(start_pos, self.pos - start_pos, start_line, start_col),
        )
    }

    /// Skip whitespace and `//` line comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
                self.advance();
            }

            if self.peek_at(0) == Some(b'/') && self.peek_at(1) == Some(b'/') {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.advance();
                }
                continue;
            }

            break;
        }
    }

    /// Lex a string literal delimited by `quote`.
    fn lex_string(
        &mut self,
        quote: u8,
        start_pos: usize,
        start_line: usize,
        start_col: usize,
    ) -> Token {
        self.advance(); // opening quote
        let content_start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != quote {
            self.advance();
        }

        if self.pos >= self.bytes.len() {
            // Unterminated: hand the parser everything from the quote on.
            return self.token_from(TokenKind::Unknown, start_pos, start_line, start_col);
        }

        let content = &self.src[content_start..self.pos];
        self.advance(); // closing quote
        Token::new(
            TokenKind::StringLiteral,
            content,
            Span::new(start_pos, self.pos - start_pos, start_line, start_col),
        )
    }

    /// Lex a number lexeme: optional `-`, a digit, then digits and dots.
    fn lex_number(&mut self, start_pos: usize, start_line: usize, start_col: usize) -> Token {
        self.advance(); // leading digit or '-'
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_digit() || self.bytes[self.pos] == b'.')
        {
            self.advance();
        }
        self.token_from(TokenKind::Number, start_pos, start_line, start_col)
    }

    /// Lex an identifier or keyword.
    fn lex_word(&mut self, start_pos: usize, start_line: usize, start_col: usize) -> Token {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'_')
        {
            self.advance();
        }
        let word = &self.src[start_pos..self.pos];
        let kind = if keyword_lookup(word).is_some() {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.token_from(kind, start_pos, start_line, start_col)
    }
}

/// Tokenize a whole source string. Total: never fails.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
