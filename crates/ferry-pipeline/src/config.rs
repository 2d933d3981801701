//! Pipeline configuration

use serde::{Deserialize, Serialize};

/// Pipeline configuration
///
/// Carried unchanged from one pipeline to the next along a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Label attached to log events
    pub name: Option<String>,
    /// Emit a trace event for every element visited
    pub trace_elements: bool,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With per-element tracing
    #[inline]
    #[must_use]
    pub fn with_trace_elements(mut self, enabled: bool) -> Self {
        self.trace_elements = enabled;
        self
    }

    /// Label used in log events
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("pipeline")
    }
}
