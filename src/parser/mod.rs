//! Output parser registry.
//!
//! Device CLI output is heterogeneous text; a parser turns one command's
//! raw output into structured records. Parsers are plain functions keyed
//! by a kind string (`vendor.command`), registered once at startup, and
//! looked up read-only during execution.

pub mod vendors;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::ParseError;

/// One structured record extracted from raw output, tagged with the
/// kind of parser that produced it. Field order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    /// The parser kind that produced this record.
    pub kind: String,

    /// Extracted fields in extraction order.
    pub fields: IndexMap<String, String>,
}

impl ParsedRecord {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: IndexMap::new(),
        }
    }

    /// Insert a field, keeping insertion order.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A parsing function from raw text to structured records.
pub type ParseFn =
    Box<dyn Fn(&str) -> Result<Vec<ParsedRecord>, ParseError> + Send + Sync>;

/// Registry mapping output kinds to parsing functions.
///
/// Registration happens once at process start; during execution the
/// registry is shared read-only, so lookups need no locking.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, ParseFn>,
}

impl ParserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in vendor parsers registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        vendors::register_builtins(&mut registry);
        registry
    }

    /// Register a parser for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: impl Into<String>, parse: F)
    where
        F: Fn(&str) -> Result<Vec<ParsedRecord>, ParseError> + Send + Sync + 'static,
    {
        self.parsers.insert(kind.into(), Box::new(parse));
    }

    /// Parse `text` with the parser registered for `kind`.
    pub fn parse(&self, kind: &str, text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
        let parse = self
            .parsers
            .get(kind)
            .ok_or_else(|| ParseError::UnknownKind {
                kind: kind.to_string(),
            })?;
        parse(text)
    }

    /// Whether a parser is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.parsers.contains_key(kind)
    }

    /// All registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }
}
