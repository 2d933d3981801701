//! Error types for pipelines

use crate::operation::Operation;
use ferry_contract::{ContractError, TypeTag};

/// Pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Transformation rejected before it ran
    #[error("{operation} rejected transformation: {source}")]
    Contract {
        operation: Operation,
        source: ContractError,
    },

    /// Transformation accepted but its invocation could not complete
    #[error("{operation} failed during invocation: {source}")]
    Invocation {
        operation: Operation,
        source: ContractError,
    },

    /// Typed extraction asked for the wrong type
    #[error("cannot extract {expected}: pipeline holds {actual}")]
    Extract { expected: TypeTag, actual: TypeTag },

    /// Named transformation is not registered
    #[error("unknown transformation: {0}")]
    UnknownTransform(String),
}

impl PipelineError {
    /// Operation the error arose in, if any
    #[inline]
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Contract { operation, .. } | Self::Invocation { operation, .. } => {
                Some(*operation)
            }
            Self::Extract { .. } | Self::UnknownTransform(_) => None,
        }
    }

    /// Underlying contract error, if any
    #[inline]
    #[must_use]
    pub fn contract(&self) -> Option<&ContractError> {
        match self {
            Self::Contract { source, .. } | Self::Invocation { source, .. } => Some(source),
            Self::Extract { .. } | Self::UnknownTransform(_) => None,
        }
    }

    /// Check if the transformation was rejected before running
    ///
    /// A caller can retry with a corrected transformation.
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Contract { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_error_accessors() {
        let err = PipelineError::Contract {
            operation: Operation::Map,
            source: ContractError::NotASequence {
                actual: TypeTag::of::<i32>(),
            },
        };
        assert!(err.is_contract_violation());
        assert_eq!(err.operation(), Some(Operation::Map));
        assert!(matches!(
            err.contract(),
            Some(ContractError::NotASequence { .. })
        ));
        assert_eq!(
            err.to_string(),
            "map rejected transformation: a value of type i32 is not a sequence"
        );
    }

    #[test]
    fn extract_error_has_no_operation() {
        let err = PipelineError::Extract {
            expected: TypeTag::of::<String>(),
            actual: TypeTag::of::<i64>(),
        };
        assert_eq!(err.operation(), None);
        assert!(err.contract().is_none());
        assert!(!err.is_contract_violation());
    }
}
