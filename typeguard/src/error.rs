//! Error types for schema compilation and validation.
//!
//! Compilation is the only fallible stage: [`CompileError`] is returned
//! once, at build time, for schema constructs the compiler cannot
//! translate. Checking a value never fails with an `Err` — validators
//! return a boolean plus zero or more [`ValidationError`] records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::NodeId;

/// Result type alias for schema compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Error raised while compiling a schema graph into a validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A primitive node named a kind the runtime cannot check.
    #[error("unknown primitive type `{name}`")]
    UnknownPrimitive { name: String },

    /// A node id was dangling, or reserved but never filled.
    #[error("schema node {} does not exist in this graph", id.0)]
    MissingNode { id: NodeId },

    /// A union with no members can never match anything.
    #[error("union has no members")]
    EmptyUnion,

    /// An intersection with no non-annotation members has no type to check.
    #[error("intersection has no non-annotation members")]
    EmptyIntersection,

    /// An annotation node outside an intersection has nothing to annotate.
    #[error("annotation `{key}` appears outside an intersection")]
    DanglingAnnotation { key: String },
}

/// Kind of a structured validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// A required property was absent.
    MissingProperty,
    /// A value did not match its declared type.
    InvalidType,
}

/// One step in the path from the checked root down to a failing value:
/// a property name or an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A structured validation error.
///
/// Wire shape:
/// `{"kind": "missing-property" | "invalid-type", "target": "...", "path": [...]}`
/// with path segments serialized as bare strings and integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// What went wrong.
    pub kind: ErrorKind,

    /// The missing property name, or the type name the value failed.
    pub target: String,

    /// Where it went wrong, from the checked root down.
    pub path: Vec<PathSegment>,
}

impl ValidationError {
    /// Create a `missing-property` error.
    pub fn missing_property(target: impl Into<String>, path: Vec<PathSegment>) -> Self {
        Self {
            kind: ErrorKind::MissingProperty,
            target: target.into(),
            path,
        }
    }

    /// Create an `invalid-type` error.
    pub fn invalid_type(target: impl Into<String>, path: Vec<PathSegment>) -> Self {
        Self {
            kind: ErrorKind::InvalidType,
            target: target.into(),
            path,
        }
    }
}
