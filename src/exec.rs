// Exec — Replays a Program's edges against its node table
//
// Execution is a single linear pass over the edges in declaration order.
// There is no dependency scheduling, no fixed point, and no cycle check: a
// node may be the source and target of many edges and is overwritten each
// time an edge targeting it runs.
//
// For each edge:
//
//   1. Resolve `from` and `to` by name. A missing node skips the edge.
//   2. Read both operands, compute the result, then write the target.
//      A self-edge therefore sees the target's old value on both sides.
//
// TYPING RULES:
//
//   +   text on either side → text(from) ++ text(to)
//   *   text on one side    → that text repeated trunc(other) times
//   - / % ++ -- ==          → text on either side is an error
//
//   Integer ⊕ Integer stays Integer (64-bit, wrapping). Any Double operand
//   widens the result to Double, except % and == which always yield
//   Integer. Division and modulo by zero yield zero.

use crate::error::{ExecDiagnostic, ExecErrorKind};
use crate::graph::{Edge, Node, Operation, Program};
use crate::options::Options;
use crate::value::{truncate, Value};
use indexmap::IndexMap;

/// An operation the engine can apply. `Operation::Unknown` has no
/// counterpart and is rejected before any operand is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Equals,
}

impl Arith {
    fn of(operation: Operation) -> Option<Self> {
        match operation {
            Operation::Add => Some(Arith::Add),
            Operation::Sub => Some(Arith::Sub),
            Operation::Mul => Some(Arith::Mul),
            Operation::Div => Some(Arith::Div),
            Operation::Mod => Some(Arith::Mod),
            Operation::Inc => Some(Arith::Inc),
            Operation::Dec => Some(Arith::Dec),
            Operation::Equals => Some(Arith::Equals),
            Operation::Unknown => None,
        }
    }
}

/// Two numeric operands, widened to a common representation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numbers {
    Ints { from: i64, to: i64 },
    Doubles { from: f64, to: f64 },
}

/// Operand pair classified by tag.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operands<'v> {
    Numeric(Numbers),
    /// One side is text, the other a number truncated to a repeat count.
    TextAndCount { text: &'v str, count: i64 },
    BothText,
}

impl<'v> Operands<'v> {
    fn classify(from: &'v Value, to: &'v Value) -> Self {
        use Value::{Double, Integer, Text};
        match (from, to) {
            (Integer(f), Integer(t)) => Operands::Numeric(Numbers::Ints { from: *f, to: *t }),
            (Integer(f), Double(t)) => Operands::Numeric(Numbers::Doubles {
                from: *f as f64,
                to: *t,
            }),
            (Double(f), Integer(t)) => Operands::Numeric(Numbers::Doubles {
                from: *f,
                to: *t as f64,
            }),
            (Double(f), Double(t)) => Operands::Numeric(Numbers::Doubles { from: *f, to: *t }),
            (Text(text), Integer(n)) | (Integer(n), Text(text)) => Operands::TextAndCount {
                text: text.as_str(),
                count: *n,
            },
            (Text(text), Double(d)) | (Double(d), Text(text)) => Operands::TextAndCount {
                text: text.as_str(),
                count: truncate(*d),
            },
            (Text(_), Text(_)) => Operands::BothText,
        }
    }
}

/// The execution engine. Holds only configuration, so one Engine can run
/// any number of programs.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: Options,
}

impl Engine {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Run every edge once, in declaration order. Returns one diagnostic per
    /// skipped edge.
    pub fn execute(&self, program: &mut Program) -> Vec<ExecDiagnostic> {
        let (edges, nodes) = program.edges_and_nodes_mut();
        let mut diagnostics = Vec::new();
        for (index, edge) in edges.iter().enumerate() {
            if let Err(kind) = self.step(edge, index, nodes) {
                let diag = ExecDiagnostic {
                    edge: index,
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    kind,
                };
                tracing::warn!(%diag, "skipped edge");
                diagnostics.push(diag);
            }
        }
        diagnostics
    }

    /// Execute a single edge.
    fn step(
        &self,
        edge: &Edge,
        index: usize,
        nodes: &mut IndexMap<String, Node>,
    ) -> Result<(), ExecErrorKind> {
        let from = nodes
            .get_index_of(&edge.from)
            .ok_or_else(|| ExecErrorKind::NodeNotFound(edge.from.clone()))?;
        let to = nodes
            .get_index_of(&edge.to)
            .ok_or_else(|| ExecErrorKind::NodeNotFound(edge.to.clone()))?;

        let result = self.apply(
            edge.operation,
            &edge.raw_operator,
            &nodes[from].value,
            &nodes[to].value,
        )?;
        tracing::debug!(
            edge = index,
            op = %edge.operation,
            result = %result.value_type(),
            "applied edge"
        );
        nodes[to].value = result;
        Ok(())
    }

    /// Compute the new target value for one operation.
    pub fn apply(
        &self,
        operation: Operation,
        raw_operator: &str,
        from: &Value,
        to: &Value,
    ) -> Result<Value, ExecErrorKind> {
        let Some(arith) = Arith::of(operation) else {
            return Err(ExecErrorKind::UnknownOperation(raw_operator.to_string()));
        };
        match (arith, Operands::classify(from, to)) {
            (arith, Operands::Numeric(numbers)) => Ok(arithmetic(arith, numbers)),
            (Arith::Add, _) => self.concat(from, to),
            (Arith::Mul, Operands::TextAndCount { text, count }) => self.repeat(text, count),
            (Arith::Mul, Operands::BothText) => Err(ExecErrorKind::TextRepeatCount),
            _ => Err(ExecErrorKind::NumericOnText(raw_operator.to_string())),
        }
    }

    /// `text(from) ++ text(to)`, checked against the limit before rendering.
    fn concat(&self, from: &Value, to: &Value) -> Result<Value, ExecErrorKind> {
        let precision = self.options.float_precision;
        self.check_text_len(from.text_len(precision).saturating_add(to.text_len(precision)))?;
        Ok(Value::Text(from.to_text(precision) + &to.to_text(precision)))
    }

    /// `text` repeated `count` times. A count of zero or less is empty.
    fn repeat(&self, text: &str, count: i64) -> Result<Value, ExecErrorKind> {
        let Ok(count) = usize::try_from(count) else {
            return Ok(Value::Text(String::new()));
        };
        self.check_text_len(text.len().saturating_mul(count))?;
        Ok(Value::Text(text.repeat(count)))
    }

    fn check_text_len(&self, len: usize) -> Result<(), ExecErrorKind> {
        let limit = self.options.max_text_len;
        if len > limit {
            return Err(ExecErrorKind::TextTooLong { len, limit });
        }
        Ok(())
    }
}

/// Numeric semantics shared by every operation.
fn arithmetic(arith: Arith, numbers: Numbers) -> Value {
    match numbers {
        Numbers::Ints { from, to } => Value::Integer(match arith {
            Arith::Add => to.wrapping_add(from),
            Arith::Sub => to.wrapping_sub(from),
            Arith::Mul => to.wrapping_mul(from),
            Arith::Div if from == 0 => 0,
            Arith::Div => to.wrapping_div(from),
            Arith::Mod if from == 0 => 0,
            Arith::Mod => to.wrapping_rem(from),
            Arith::Inc => to.wrapping_add(1),
            Arith::Dec => to.wrapping_sub(1),
            Arith::Equals => i64::from(to == from),
        }),
        Numbers::Doubles { from, to } => match arith {
            Arith::Add => Value::Double(to + from),
            Arith::Sub => Value::Double(to - from),
            Arith::Mul => Value::Double(to * from),
            Arith::Div if from == 0.0 => Value::Double(0.0),
            Arith::Div => Value::Double(to / from),
            Arith::Mod => {
                let (from, to) = (truncate(from), truncate(to));
                Value::Integer(if from == 0 { 0 } else { to.wrapping_rem(from) })
            }
            Arith::Inc => Value::Double(to + 1.0),
            Arith::Dec => Value::Double(to - 1.0),
            Arith::Equals => Value::Integer(i64::from(to == from)),
        },
    }
}

/// Run a program with default options.
pub fn execute(program: &mut Program) -> Vec<ExecDiagnostic> {
    Engine::default().execute(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: &str, from: Value, to: Value) -> Result<Value, ExecErrorKind> {
        Engine::default().apply(Operation::from_lexeme(op), op, &from, &to)
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert_eq!(apply("+", Value::Integer(2), Value::Integer(3)), Ok(Value::Integer(5)));
        assert_eq!(apply("-", Value::Integer(2), Value::Integer(3)), Ok(Value::Integer(1)));
        assert_eq!(apply("*", Value::Integer(2), Value::Integer(3)), Ok(Value::Integer(6)));
        assert_eq!(apply("/", Value::Integer(2), Value::Integer(7)), Ok(Value::Integer(3)));
        assert_eq!(apply("%", Value::Integer(4), Value::Integer(7)), Ok(Value::Integer(3)));
        assert_eq!(apply("++", Value::Integer(0), Value::Integer(7)), Ok(Value::Integer(8)));
        assert_eq!(apply("--", Value::Integer(0), Value::Integer(7)), Ok(Value::Integer(6)));
        assert_eq!(apply("==", Value::Integer(7), Value::Integer(7)), Ok(Value::Integer(1)));
        assert_eq!(apply("==", Value::Integer(6), Value::Integer(7)), Ok(Value::Integer(0)));
    }

    #[test]
    fn test_mixed_arithmetic_widens() {
        assert_eq!(apply("+", Value::Double(0.5), Value::Integer(1)), Ok(Value::Double(1.5)));
        assert_eq!(apply("-", Value::Integer(1), Value::Double(2.5)), Ok(Value::Double(1.5)));
        assert_eq!(apply("/", Value::Double(2.0), Value::Integer(5)), Ok(Value::Double(2.5)));
        assert_eq!(apply("++", Value::Double(9.0), Value::Integer(1)), Ok(Value::Double(2.0)));
    }

    #[test]
    fn test_mod_and_equals_force_integer() {
        assert_eq!(apply("%", Value::Double(2.9), Value::Double(7.5)), Ok(Value::Integer(1)));
        assert_eq!(apply("==", Value::Double(1.0), Value::Integer(1)), Ok(Value::Integer(1)));
    }

    #[test]
    fn test_division_and_modulo_by_zero_yield_zero() {
        assert_eq!(apply("/", Value::Integer(0), Value::Integer(9)), Ok(Value::Integer(0)));
        assert_eq!(apply("/", Value::Double(0.0), Value::Double(9.0)), Ok(Value::Double(0.0)));
        assert_eq!(apply("%", Value::Integer(0), Value::Integer(9)), Ok(Value::Integer(0)));
        assert_eq!(apply("%", Value::Double(0.4), Value::Integer(9)), Ok(Value::Integer(0)));
    }

    #[test]
    fn test_integer_overflow_wraps() {
        assert_eq!(
            apply("+", Value::Integer(1), Value::Integer(i64::MAX)),
            Ok(Value::Integer(i64::MIN))
        );
        assert_eq!(
            apply("/", Value::Integer(-1), Value::Integer(i64::MIN)),
            Ok(Value::Integer(i64::MIN))
        );
    }

    #[test]
    fn test_text_concatenation_order() {
        assert_eq!(
            apply("+", Value::Text("a".into()), Value::Integer(1)),
            Ok(Value::Text("a1".into()))
        );
        assert_eq!(
            apply("+", Value::Double(0.5), Value::Text("x".into())),
            Ok(Value::Text("0.500000x".into()))
        );
    }

    #[test]
    fn test_float_precision_option() {
        let engine = Engine::new(Options::default().with_float_precision(2));
        assert_eq!(
            engine.apply(
                Operation::Add,
                "+",
                &Value::Double(3.14159),
                &Value::Text("!".into())
            ),
            Ok(Value::Text("3.14!".into()))
        );
    }

    #[test]
    fn test_mul_on_every_numeric_pair() {
        assert_eq!(apply("*", Value::Integer(4), Value::Integer(3)), Ok(Value::Integer(12)));
        assert_eq!(apply("*", Value::Integer(4), Value::Double(0.5)), Ok(Value::Double(2.0)));
        assert_eq!(apply("*", Value::Double(0.5), Value::Integer(4)), Ok(Value::Double(2.0)));
        assert_eq!(apply("*", Value::Double(1.5), Value::Double(2.0)), Ok(Value::Double(3.0)));
    }

    #[test]
    fn test_widest_precision_renders() {
        let engine = Engine::new(Options::default().with_float_precision(u16::MAX));
        let Ok(Value::Text(text)) = engine.apply(
            Operation::Add,
            "+",
            &Value::Double(0.5),
            &Value::Text(String::new()),
        ) else {
            panic!("expected text");
        };
        assert_eq!(text.len(), 2 + usize::from(u16::MAX));
        assert!(text.starts_with("0.5000"));
    }

    #[test]
    fn test_precision_counts_against_text_limit() {
        let engine = Engine::new(
            Options::default()
                .with_float_precision(1000)
                .with_max_text_len(100),
        );
        assert_eq!(
            engine.apply(
                Operation::Add,
                "+",
                &Value::Double(0.5),
                &Value::Text("x".into())
            ),
            Err(ExecErrorKind::TextTooLong {
                len: 1003,
                limit: 100
            })
        );
    }

    #[test]
    fn test_self_edge_reads_before_write() {
        let mut program = Program::new();
        program
            .insert_node(Node::new("n", Value::Integer(5)))
            .unwrap();
        program.push_edge(Edge::new("n", "n", "*"));
        program.push_edge(Edge::new("n", "ghost", "+"));
        let diags = execute(&mut program);
        assert_eq!(program.value("n"), Some(&Value::Integer(25)));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, ExecErrorKind::NodeNotFound("ghost".into()));
    }

    #[test]
    fn test_text_repeat() {
        assert_eq!(
            apply("*", Value::Text("ab".into()), Value::Integer(3)),
            Ok(Value::Text("ababab".into()))
        );
        assert_eq!(
            apply("*", Value::Double(2.9), Value::Text("xy".into())),
            Ok(Value::Text("xyxy".into()))
        );
        assert_eq!(
            apply("*", Value::Integer(-4), Value::Text("xy".into())),
            Ok(Value::Text(String::new()))
        );
        assert_eq!(
            apply("*", Value::Text("a".into()), Value::Text("b".into())),
            Err(ExecErrorKind::TextRepeatCount)
        );
    }

    #[test]
    fn test_text_limit() {
        let engine = Engine::new(Options::default().with_max_text_len(4));
        assert_eq!(
            engine.apply(
                Operation::Mul,
                "*",
                &Value::Text("abc".into()),
                &Value::Integer(2)
            ),
            Err(ExecErrorKind::TextTooLong { len: 6, limit: 4 })
        );
        assert_eq!(
            engine.apply(
                Operation::Add,
                "+",
                &Value::Text("ab".into()),
                &Value::Text("cd".into())
            ),
            Ok(Value::Text("abcd".into()))
        );
    }

    #[test]
    fn test_numeric_only_ops_reject_text() {
        for op in ["-", "/", "%", "++", "--", "=="] {
            assert_eq!(
                apply(op, Value::Text("a".into()), Value::Integer(1)),
                Err(ExecErrorKind::NumericOnText(op.to_string())),
                "{op}"
            );
        }
    }

    #[test]
    fn test_unknown_operation() {
        assert_eq!(
            apply("**", Value::Integer(1), Value::Integer(1)),
            Err(ExecErrorKind::UnknownOperation("**".into()))
        );
    }
}
