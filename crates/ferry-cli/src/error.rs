//! CLI error types

use ferry_pipeline::{PipelineError, TypeTag, UnknownOperation};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or running a plan
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported plan format: {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("invalid TOML plan: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid step '{step}': {reason}")]
    InvalidStep { step: String, reason: String },

    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),

    #[error("no input given")]
    MissingInput,

    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("cannot render a value of type {0}")]
    Unrenderable(TypeTag),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl PlanError {
    pub(crate) fn invalid_step(step: &str, reason: impl Into<String>) -> Self {
        Self::InvalidStep {
            step: step.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this error came from a rejected transformation
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Pipeline(e) if e.is_contract_violation())
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
