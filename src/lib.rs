//! # edgeflow
//!
//! Lexer, parser, and replay engine for the edgeflow dataflow-graph language.
//!
//! An edgeflow program declares typed nodes and the edges between them.
//! Each edge names an operation that reads its source node and overwrites
//! its target node.
//
//   source text ──► Lexer ──► Tokens ──► Parser ──► Program ──► Engine
//                                           │                     │
//                                  Vec<ParseDiagnostic>   Vec<ExecDiagnostic>
//
// No phase aborts. Bad declarations and bad edges are reported and skipped,
// and the caller gets every diagnostic back.
//
// USAGE:
//   let (mut program, parse_diags) = edgeflow::compile(source);
//   let exec_diags = edgeflow::run(&mut program);
//   let b = edgeflow::lookup(&program, "b");

pub mod error;
pub mod exec;
pub mod graph;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod token;
pub mod value;

pub use error::{ExecDiagnostic, ExecErrorKind, ParseDiagnostic, ParseErrorKind, ValueError};
pub use exec::{execute, Engine};
pub use graph::{Edge, Node, Operation, Program};
pub use lexer::tokenize;
pub use options::Options;
pub use parser::parse;
pub use token::{Span, Token, TokenKind};
pub use value::{Value, ValueType};

/// Tokenize and parse source text into a fresh Program.
pub fn compile(source: &str) -> (Program, Vec<ParseDiagnostic>) {
    parse(tokenize(source))
}

/// Execute every edge of `program` once with default options.
pub fn run(program: &mut Program) -> Vec<ExecDiagnostic> {
    execute(program)
}

/// Execute every edge of `program` once with the given options.
pub fn run_with(program: &mut Program, options: &Options) -> Vec<ExecDiagnostic> {
    Engine::new(options.clone()).execute(program)
}

/// Current value of the named node.
pub fn lookup<'p>(program: &'p Program, name: &str) -> Option<&'p Value> {
    program.value(name)
}
