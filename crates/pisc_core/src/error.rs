//! Error types for classification and encoding.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::{r#match::MatchKind, schema::FieldKind, value::SubKind};

/// Result type for encoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which half of a table entry a list of literals belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Match,
    Action,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Match => write!(f, "match key"),
            Side::Action => write!(f, "action value"),
        }
    }
}

/// Every error aborts the whole entry, nothing is partially encoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The number of literals differs from the number of schema fields.
    #[error("expected {expected} {side}s, received {got}")]
    ArityMismatch {
        side: Side,
        expected: usize,
        got: usize,
    },

    /// The literal matches none of the accepted grammars.
    #[error("unrecognized value {literal:?} at position {position} (field {field})")]
    UnclassifiableValue {
        field: String,
        position: usize,
        literal: String,
    },

    /// Both halves of a mask pair parse, but not as the same kind of value.
    #[error("mask pair {literal:?} of field {field} mixes {left} and {right}")]
    HeterogeneousMaskPair {
        field: String,
        literal: String,
        left: SubKind,
        right: SubKind,
    },

    /// A decimal value does not fit in the declared bit width of its field.
    #[error("value {literal} of field {field} overflows, allowed maximum is {max}")]
    OverflowValue {
        field: String,
        literal: String,
        max: u128,
    },

    /// The match kind is recognized but has no encoding.
    #[error("{kind} match of field {field} is not supported")]
    UnsupportedMatchKind { field: String, kind: MatchKind },

    /// The schema metadata itself cannot be used.
    #[error("malformed schema: {0}")]
    MalformedSchema(String),

    /// The literal was classified, but its kind is not legal for the field.
    #[error("unexpected value for {kind} of field {field}: {literal}")]
    UnexpectedValue {
        field: String,
        kind: FieldKind,
        literal: String,
    },
}

impl Error {
    /// Creates a malformed schema error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSchema(msg.into())
    }
}
