//! Operation kinds
//!
//! Used for log fields, error context and plan files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of pipeline operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Replace the whole value with a function of it
    Reshape,

    /// Run a function on the whole value for its effect
    SideEffect,

    /// Run a function on each element for its effect
    ForEachElement,

    /// Replace each element with a function of it
    Map,

    /// Keep elements satisfying a predicate
    Filter,

    /// Left-fold elements into an accumulator
    Fold,
}

impl Operation {
    /// All operations, in declaration order
    pub const ALL: [Operation; 6] = [
        Self::Reshape,
        Self::SideEffect,
        Self::ForEachElement,
        Self::Map,
        Self::Filter,
        Self::Fold,
    ];

    /// Short name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reshape => "reshape",
            Self::SideEffect => "side_effect",
            Self::ForEachElement => "for_each",
            Self::Map => "map",
            Self::Filter => "filter",
            Self::Fold => "fold",
        }
    }

    /// Whether the operation requires a sequence
    #[inline]
    #[must_use]
    pub fn needs_sequence(&self) -> bool {
        matches!(
            self,
            Self::ForEachElement | Self::Map | Self::Filter | Self::Fold
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognised operation name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reshape" | "let" => Ok(Self::Reshape),
            "side_effect" | "sideeffect" | "apply" => Ok(Self::SideEffect),
            "for_each" | "foreach" | "each" => Ok(Self::ForEachElement),
            "map" => Ok(Self::Map),
            "filter" => Ok(Self::Filter),
            "fold" | "inject" | "reduce" => Ok(Self::Fold),
            _ => Err(UnknownOperation(s.to_string())),
        }
    }
}
