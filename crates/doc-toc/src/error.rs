use thiserror::Error;

use crate::model::toc::KeyPath;

pub use anyhow::{Error, Result};

/// A table of contents that failed to parse or did not match the expected shape.
///
/// Every failure carries the key path of the offending node so consuming tools can
/// point the author at the exact entry to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct SchemaError {
    pub path: KeyPath,
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    pub fn new(path: KeyPath, kind: SchemaErrorKind) -> Self {
        Self { path, kind }
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    /// The input was not well-formed JSON.
    #[error("malformed JSON: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    /// Well-formed input nested past what the JSON parser will recurse into.
    #[error("nested deeper than the JSON parser's limit of {limit} levels (line {line}, column {column})")]
    NestingTooDeep {
        limit: usize,
        line: usize,
        column: usize,
    },
    #[error("the table of contents must be an object, found {found}")]
    RootNotObject { found: &'static str },
    #[error("expected a section object, found {found}")]
    ExpectedSection { found: &'static str },
    #[error("missing `name`")]
    MissingName,
    #[error("`name` must be a string, found {found}")]
    InvalidName { found: &'static str },
    #[error("`children` must be an object, found {found}")]
    InvalidChildren { found: &'static str },
    #[error("a child must be a string or a section object, found {found}")]
    InvalidChild { found: &'static str },
    #[error("duplicate key `{0}`")]
    DuplicateKey(String),
    #[error("keys must not be empty")]
    EmptyKey,
    #[error("key `{0}` must not contain `/`, slugs are single URL segments")]
    SlashInKey(String),
    #[error("unknown field `{0}`, expected `name` or `children`")]
    UnknownField(String),
    #[error("nested deeper than the allowed {max} level(s)")]
    DepthExceeded { max: usize },
}
