// Parser — Recursive descent parser for the edgeflow language
//
// The parser consumes a Vec<Token> (from the Lexer) and fills a Program
// with node and edge declarations:
//
//   program   := (nodeDecl | edgeDecl)*
//   nodeDecl  := "node" "{" (field ","?)* "}"
//   edgeDecl  := "edge" "{" (field ","?)* "}"
//   field     := IDENT ":" VALUE
//
// ERROR RECOVERY: the parser is best-effort and never stops early.
//
//   - A stray top-level token is reported and skipped.
//   - A syntax error inside a block (missing `{`, `:`, or value, or a block
//     that runs into end of input or the next declaration) drops the whole
//     declaration and skips ahead to the next `node`/`edge` keyword.
//   - A bad field value (unknown type, unparsable literal, value before
//     type, ...) is reported, and the rest of the block is still used.
//
// Every top-level iteration consumes at least one token.

use crate::error::{ParseDiagnostic, ParseErrorKind};
use crate::graph::{Edge, Node, Program};
use crate::token::{Span, Token, TokenKind};
use crate::value::{Value, ValueType};

/// Outcome of a block-level parse. Err drops the declaration.
type BlockResult<T> = std::result::Result<T, ParseDiagnostic>;

/// One `key: value` pair from inside a block.
#[derive(Debug, Clone)]
struct Field {
    key: Token,
    value: Token,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    program: Program,
    diagnostics: Vec<ParseDiagnostic>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens.last().map_or(Span::default(), |t| {
                Span::new(t.span.end(), 0, t.span.line, t.span.col + t.span.len)
            });
            tokens.push(Token::new(TokenKind::EndOfInput, "", end));
        }
        Self {
            tokens,
            pos: 0,
            program: Program::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Parse the full program.
    pub fn parse_program(mut self) -> (Program, Vec<ParseDiagnostic>) {
        while !self.at_eof() {
            self.parse_top_level();
        }
        tracing::debug!(
            nodes = self.program.node_count(),
            edges = self.program.edge_count(),
            diagnostics = self.diagnostics.len(),
            "parsed program"
        );
        (self.program, self.diagnostics)
    }

    // Top-level dispatch

    fn parse_top_level(&mut self) {
        let result = if self.peek().is_keyword("node") {
            self.parse_node()
        } else if self.peek().is_keyword("edge") {
            self.parse_edge()
        } else {
            let tok = self.advance();
            self.report(ParseDiagnostic::new(
                ParseErrorKind::UnexpectedToken(tok.text.clone()),
                tok.span,
                tok.text,
            ));
            Ok(())
        };

        if let Err(diag) = result {
            self.report(diag);
            self.synchronize();
        }
    }

    /// Skip to the next `node`/`edge` keyword or end of input.
    fn synchronize(&mut self) {
        while !self.at_eof() && !self.peek().starts_declaration() {
            self.advance();
        }
    }

    // node { name: n, type: int, value: 1, is_output: true }

    fn parse_node(&mut self) -> BlockResult<()> {
        let keyword = self.peek().clone();
        let fields = self.parse_block(false)?;

        let mut name: Option<Token> = None;
        let mut declared: Option<ValueType> = None;
        let mut value: Option<Value> = None;
        let mut is_output = false;

        for Field { key, value: tok } in fields {
            match key.text.as_str() {
                "name" => {
                    if tok.kind == TokenKind::Identifier {
                        name = Some(tok);
                    } else {
                        self.report_at(
                            &tok,
                            ParseErrorKind::InvalidName {
                                field: key.text.clone(),
                                got: tok.text.clone(),
                            },
                        );
                    }
                }
                "type" => match ValueType::from_keyword(&tok.text) {
                    Some(ty) if tok.kind == TokenKind::Keyword => declared = Some(ty),
                    _ => self.report_at(&tok, ParseErrorKind::UnknownType(tok.text.clone())),
                },
                "value" => {
                    let Some(ty) = declared else {
                        self.report_at(&tok, ParseErrorKind::TypeBeforeValue);
                        continue;
                    };
                    if matches!(tok.kind, TokenKind::Punctuation | TokenKind::Unknown) {
                        self.report_at(&tok, ParseErrorKind::NotALiteral(tok.text.clone()));
                        continue;
                    }
                    match Value::from_token(ty, &tok) {
                        Ok(v) => value = Some(v),
                        Err(e) => self.report_at(&tok, e.into()),
                    }
                }
                "is_output" => {
                    if tok.is_keyword("true") {
                        is_output = true;
                    } else if tok.is_keyword("false") {
                        is_output = false;
                    } else {
                        self.report_at(&tok, ParseErrorKind::InvalidBool(tok.text.clone()));
                    }
                }
                _ => self.report_at(
                    &key,
                    ParseErrorKind::UnknownField {
                        block: "node".to_string(),
                        field: key.text.clone(),
                    },
                ),
            }
        }

        let Some(name) = name else {
            self.report_at(&keyword, ParseErrorKind::MissingNodeName);
            return Ok(());
        };

        let value = value.unwrap_or_else(|| Value::zero(declared.unwrap_or(ValueType::Int)));
        let node = Node::new(name.text.clone(), value).with_output(is_output);
        match self.program.insert_node(node) {
            Ok(()) => tracing::debug!(node = %name.text, "declared node"),
            Err(dup) => self.report_at(&name, ParseErrorKind::DuplicateNode(dup.name)),
        }
        Ok(())
    }

    // edge { from: a, to: b, op: + }

    fn parse_edge(&mut self) -> BlockResult<()> {
        let keyword = self.peek().clone();
        let fields = self.parse_block(true)?;

        let mut from: Option<String> = None;
        let mut to: Option<String> = None;
        let mut op: Option<String> = None;

        for Field { key, value: tok } in fields {
            match key.text.as_str() {
                "from" | "to" => {
                    if tok.kind != TokenKind::Identifier {
                        self.report_at(
                            &tok,
                            ParseErrorKind::InvalidName {
                                field: key.text.clone(),
                                got: tok.text.clone(),
                            },
                        );
                    } else if key.text == "from" {
                        from = Some(tok.text);
                    } else {
                        to = Some(tok.text);
                    }
                }
                "op" => op = Some(tok.text),
                _ => self.report_at(
                    &key,
                    ParseErrorKind::UnknownField {
                        block: "edge".to_string(),
                        field: key.text.clone(),
                    },
                ),
            }
        }

        match (from, to, op) {
            (Some(from), Some(to), Some(op)) => {
                let edge = Edge::new(from, to, &op);
                tracing::debug!(edge = %edge, "declared edge");
                self.program.push_edge(edge);
            }
            _ => self.report_at(&keyword, ParseErrorKind::IncompleteEdge),
        }
        Ok(())
    }

    // Shared block syntax: KEYWORD { (key : value ,?)* }

    fn parse_block(&mut self, operator_values: bool) -> BlockResult<Vec<Field>> {
        let keyword = self.advance();

        let open = self.peek().clone();
        if !open.is_punct("{") {
            return Err(ParseDiagnostic::new(
                ParseErrorKind::ExpectedBlock(keyword.text, open.to_string()),
                open.span,
                open.text,
            ));
        }
        self.advance();

        let mut fields = Vec::new();
        loop {
            let key = self.peek().clone();
            if key.is_punct("}") {
                self.advance();
                return Ok(fields);
            }
            if key.is_eof() || key.starts_declaration() {
                return Err(ParseDiagnostic::new(
                    ParseErrorKind::UnterminatedBlock(keyword.text.clone()),
                    keyword.span,
                    keyword.text,
                ));
            }
            if !matches!(key.kind, TokenKind::Identifier | TokenKind::Keyword) {
                return Err(ParseDiagnostic::new(
                    ParseErrorKind::ExpectedFieldName(key.text.clone()),
                    key.span,
                    key.text,
                ));
            }
            self.advance();

            let colon = self.peek().clone();
            if !colon.is_punct(":") {
                return Err(ParseDiagnostic::new(
                    ParseErrorKind::ExpectedColon(key.text, colon.to_string()),
                    colon.span,
                    colon.text,
                ));
            }
            self.advance();

            let value = self.parse_field_value(&key, operator_values && key.text == "op")?;
            fields.push(Field { key, value });

            if self.peek().is_punct(",") {
                self.advance();
            }
        }
    }

    /// Consume the token after `key :`. Operator values may span two
    /// adjacent punctuation tokens (`++`, `--`, `==`).
    fn parse_field_value(&mut self, key: &Token, operator: bool) -> BlockResult<Token> {
        let tok = self.peek().clone();
        if tok.is_eof() || tok.is_punct("}") || tok.is_punct(",") || tok.starts_declaration() {
            return Err(ParseDiagnostic::new(
                ParseErrorKind::MissingValue(key.text.clone()),
                tok.span,
                tok.text,
            ));
        }
        self.advance();

        if operator && tok.kind == TokenKind::Punctuation {
            let next = self.peek();
            if next.kind == TokenKind::Punctuation && next.span.offset == tok.span.end() {
                let joined = format!("{}{}", tok.text, next.text);
                if matches!(joined.as_str(), "++" | "--" | "==") {
                    let span = Span::new(tok.span.offset, joined.len(), tok.span.line, tok.span.col);
                    self.advance();
                    return Ok(Token::new(TokenKind::Punctuation, joined, span));
                }
            }
        }
        Ok(tok)
    }

    // Diagnostics

    fn report(&mut self, diag: ParseDiagnostic) {
        tracing::warn!(%diag, "parse diagnostic");
        self.diagnostics.push(diag);
    }

    fn report_at(&mut self, tok: &Token, kind: ParseErrorKind) {
        self.report(ParseDiagnostic::new(kind, tok.span, tok.text.clone()));
    }

    // Token stream helpers

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }
}

// Public convenience function

/// Parse a token stream into a Program plus every diagnostic found.
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<ParseDiagnostic>) {
    Parser::new(tokens).parse_program()
}
