//! Ferry command-line runner
//!
//! Builds a pipeline from a [`Plan`] (file and/or `--step` flags), runs it
//! with the built-in [`TransformRegistry`] and renders the result.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod data;
pub mod error;
pub mod plan;

pub use error::{PlanError, Result};
pub use plan::{Plan, Step};

use ferry_pipeline::{DynFn, TransformRegistry};

/// Registry used by the CLI: the library defaults plus logging sinks
///
/// `trace`, `trace_f` and `trace_s` emit one `info` event per call for
/// `i64`, `f64` and `String` values, for use with `foreach` and
/// `side_effect` steps.
#[must_use]
pub fn registry() -> TransformRegistry {
    let mut registry = TransformRegistry::with_defaults();
    registry.register("trace", DynFn::sink(|x: i64| tracing::info!(value = x, "visit")));
    registry.register("trace_f", DynFn::sink(|x: f64| tracing::info!(value = x, "visit")));
    registry.register(
        "trace_s",
        DynFn::sink(|x: String| tracing::info!(value = %x, "visit")),
    );
    registry
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
