// Graph — Node table and edge list of a parsed edgeflow program
//
// A Program is two ordered collections:
//
//   - nodes, keyed by unique name, in declaration order
//   - edges, in declaration order
//
// Edges refer to nodes by name. Names are resolved against the node table
// only when the edge executes, so an edge may mention a node declared
// further down the source.

use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

// Operations

/// The action an edge performs on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Equals,
    Unknown,
}

impl Operation {
    /// Map an operator lexeme by exact match. Anything else is Unknown.
    pub fn from_lexeme(s: &str) -> Self {
        match s {
            "+" => Operation::Add,
            "-" => Operation::Sub,
            "*" => Operation::Mul,
            "/" => Operation::Div,
            "%" => Operation::Mod,
            "++" => Operation::Inc,
            "--" => Operation::Dec,
            "==" => Operation::Equals,
            _ => Operation::Unknown,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
            Operation::Mod => "%",
            Operation::Inc => "++",
            Operation::Dec => "--",
            Operation::Equals => "==",
            Operation::Unknown => "?",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// Nodes and edges

/// A named container for one typed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub value: Value,
    pub is_output: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
            is_output: false,
        }
    }

    pub fn with_output(mut self, is_output: bool) -> Self {
        self.is_output = is_output;
        self
    }
}

/// A declared operation flowing from one node into another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub operation: Operation,
    /// The operator exactly as written, kept for diagnostics.
    pub raw_operator: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, raw_operator: &str) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            operation: Operation::from_lexeme(raw_operator),
            raw_operator: raw_operator.to_string(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.from, self.raw_operator, self.to)
    }
}

// Program

/// Node table plus edge list. Each compile produces a fresh Program; nothing
/// is shared between instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. If the name is taken, the table is left unchanged and the
    /// rejected node is handed back.
    pub fn insert_node(&mut self, node: Node) -> Result<(), Node> {
        if self.nodes.contains_key(&node.name) {
            return Err(node);
        }
        self.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Edge list alongside a mutable node table, for the engine's replay.
    pub(crate) fn edges_and_nodes_mut(&mut self) -> (&[Edge], &mut IndexMap<String, Node>) {
        (&self.edges, &mut self.nodes)
    }

    /// Current value of a node, if it exists.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.node(name).map(|n| &n.value)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Nodes declared with `is_output: true`, in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_output)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Human-readable listing of nodes and edges.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for node in self.nodes.values() {
            let marker = if node.is_output { " [output]" } else { "" };
            out.push_str(&format!(
                "node {}: {} = {}{}\n",
                node.name,
                node.value.value_type(),
                node.value,
                marker
            ));
        }
        for (i, edge) in self.edges.iter().enumerate() {
            out.push_str(&format!("edge #{i}: {edge}\n"));
        }
        out
    }
}
