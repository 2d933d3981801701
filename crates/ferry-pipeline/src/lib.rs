//! Ferry Pipeline
//!
//! Fluent, contract-checked transformations over one carried value.
//!
//! # Core Concepts
//!
//! - [`Pipeline`]: Chainable handle owning one [`Value`]
//! - [`create`]: Entry point wrapping any [`Carry`] value
//! - Operations: `reshape`, `side_effect`, `for_each_element`, `map`,
//!   `filter`, `fold`; each checks the transformation before running it
//! - [`Typed<T>`]: Statically typed counterpart with no run-time checks
//! - [`TransformRegistry`]: Named transformations for configuration-driven use
//!
//! # Example
//!
//! ```rust
//! use ferry_pipeline::{create, DynFn};
//!
//! let total = create(vec![1_i64, 2, 3, 4, 5])
//!     .filter(DynFn::unary(|x: i64| x % 2 == 0))?
//!     .map(DynFn::unary(|x: i64| x * 2))?
//!     .fold(0_i64, DynFn::binary(|acc: i64, x: i64| acc + x))?
//!     .extract_as::<i64>()?;
//!
//! assert_eq!(total, 12);
//! # Ok::<(), ferry_pipeline::PipelineError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod config;
mod error;
mod operation;
mod pipeline;
mod registry;
mod typed;

// Re-exports
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use operation::{Operation, UnknownOperation};
pub use pipeline::{create, Pipeline};
pub use registry::TransformRegistry;
pub use typed::{Elementwise, Typed};

pub use ferry_contract::{Candidate, Carry, ContractError, DynFn, Shared, TypeTag, Value};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building pipelines
    pub use crate::{
        create, Candidate, Carry, DynFn, Pipeline, PipelineConfig, PipelineError, Shared, Typed,
        Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
