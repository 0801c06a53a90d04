// Options — Execution settings for the Engine
//
// Options are plain data with serde support, so an embedding can load them
// from whatever configuration format it already uses. Every field has a
// default and unknown fields are rejected.
//
// float_precision is a u16, the widest precision the formatter accepts.

use crate::value::DEFAULT_FLOAT_PRECISION;
use serde::{Deserialize, Serialize};

/// Default cap on the byte length of a text value produced by an edge.
pub const DEFAULT_MAX_TEXT_LEN: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Fractional digits when a double is concatenated onto text.
    pub float_precision: u16,
    /// Longest text (in bytes) that `+` or `*` may produce. Edges that
    /// would go past it are skipped with a diagnostic.
    pub max_text_len: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            float_precision: DEFAULT_FLOAT_PRECISION,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
        }
    }
}

impl Options {
    pub fn with_float_precision(mut self, digits: u16) -> Self {
        self.float_precision = digits;
        self
    }

    pub fn with_max_text_len(mut self, bytes: usize) -> Self {
        self.max_text_len = bytes;
        self
    }
}
