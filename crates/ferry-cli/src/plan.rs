//! Pipeline plans
//!
//! A [`Plan`] is an input, an ordered list of [`Step`]s and a
//! [`PipelineConfig`]. Plans are written as TOML or JSON:
//!
//! ```toml
//! input = "1,2,3,4,5"
//! steps = ["filter:even", "map:double", "fold:0:sum"]
//!
//! [config]
//! name = "evens"
//! ```

use crate::data::{parse_input, parse_literal};
use crate::error::{PlanError, Result};
use ferry_pipeline::{Operation, Pipeline, PipelineConfig, TransformRegistry, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One operation applied with a named transformation
///
/// Written as `op:name`, or `fold:init:name` for folds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Step {
    operation: Operation,
    transform: String,
    initial: Option<String>,
}

impl Step {
    /// Create a non-fold step
    #[must_use]
    pub fn new(operation: Operation, transform: impl Into<String>) -> Self {
        Self {
            operation,
            transform: transform.into(),
            initial: None,
        }
    }

    /// Create a fold step
    #[must_use]
    pub fn fold(initial: impl Into<String>, transform: impl Into<String>) -> Self {
        Self {
            operation: Operation::Fold,
            transform: transform.into(),
            initial: Some(initial.into()),
        }
    }

    #[inline]
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &str {
        &self.transform
    }

    /// Apply this step to a pipeline
    ///
    /// # Errors
    /// Returns an error if the transformation is unknown or rejected
    pub fn apply(&self, pipeline: Pipeline, registry: &TransformRegistry) -> Result<Pipeline> {
        let f = registry.resolve(&self.transform)?;
        tracing::debug!(step = %self, "applying step");

        let next = match self.operation {
            Operation::Reshape => pipeline.reshape(f),
            Operation::SideEffect => pipeline.side_effect(f),
            Operation::ForEachElement => pipeline.for_each_element(f),
            Operation::Map => pipeline.map(f),
            Operation::Filter => pipeline.filter(f),
            Operation::Fold => {
                let initial = parse_literal(self.initial.as_deref().unwrap_or_default());
                pipeline.fold_value(initial, f)
            }
        };
        Ok(next?)
    }
}

impl FromStr for Step {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        let (op, rest) = s
            .split_once(':')
            .ok_or_else(|| PlanError::invalid_step(s, "expected op:name"))?;
        let operation: Operation = op.trim().parse()?;

        if operation == Operation::Fold {
            let (initial, transform) = rest
                .rsplit_once(':')
                .ok_or_else(|| PlanError::invalid_step(s, "expected fold:init:name"))?;
            if transform.is_empty() {
                return Err(PlanError::invalid_step(s, "missing transformation name"));
            }
            return Ok(Self::fold(initial, transform));
        }

        if rest.is_empty() || rest.contains(':') {
            return Err(PlanError::invalid_step(s, "expected op:name"));
        }
        Ok(Self::new(operation, rest))
    }
}

impl TryFrom<String> for Step {
    type Error = PlanError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Step> for String {
    fn from(step: Step) -> Self {
        step.to_string()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.initial {
            Some(initial) => write!(f, "{}:{}:{}", self.operation, initial, self.transform),
            None => write!(f, "{}:{}", self.operation, self.transform),
        }
    }
}

/// Input, steps and configuration for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    /// Input in CSV or JSON form
    pub input: Option<String>,
    pub steps: Vec<Step>,
    pub config: PipelineConfig,
}

impl Plan {
    /// Load a plan, choosing the format by file extension
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(toml::from_str(&text)?),
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Err(PlanError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// With input
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// With steps, replacing any loaded ones
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    /// Run every step over the parsed input
    ///
    /// # Errors
    /// Returns the first input, lookup or contract error
    pub fn run(&self, registry: &TransformRegistry) -> Result<Value> {
        let input = self.input.as_deref().ok_or(PlanError::MissingInput)?;
        let mut pipeline = Pipeline::from_value(parse_input(input)?).with_config(self.config.clone());

        tracing::info!(
            pipeline = self.config.label(),
            steps = self.steps.len(),
            "running plan"
        );
        for step in &self.steps {
            pipeline = step.apply(pipeline, registry)?;
        }
        Ok(pipeline.extract())
    }
}
