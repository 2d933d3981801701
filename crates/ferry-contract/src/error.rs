//! Contract violations
//!
//! Every variant is raised before the offending transformation is invoked.

use crate::tag::{Position, TypeTag};

/// A transformation is incompatible with the value it would be applied to
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// The supplied transformation is not function-like
    #[error("transformation should be a function, but got a value of type {actual}")]
    NotCallable { actual: TypeTag },

    /// Parameter or return count differs from the expected count
    #[error("the number of {position} values should be {expected}, but got {actual}")]
    Arity {
        position: Position,
        expected: usize,
        actual: usize,
    },

    /// A single parameter or return type differs
    #[error("the {position} type at {index} should be {expected}, but got {actual}")]
    TypeMismatch {
        position: Position,
        index: usize,
        expected: TypeTag,
        actual: TypeTag,
    },

    /// Sequence semantics were requested on a scalar
    #[error("a value of type {actual} is not a sequence")]
    NotASequence { actual: TypeTag },
}

impl ContractError {
    /// Side of the signature the violation refers to, if any
    #[inline]
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Arity { position, .. } | Self::TypeMismatch { position, .. } => Some(*position),
            Self::NotCallable { .. } | Self::NotASequence { .. } => None,
        }
    }

    /// Check if the violation is about a single mismatched type
    #[inline]
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}
