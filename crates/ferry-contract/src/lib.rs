//! Ferry Contract Layer
//!
//! Run-time type vocabulary and contract checks for transformation
//! callables whose element types are only known when an operation runs.
//!
//! # Core Concepts
//!
//! - [`Value`]: Owned, type-erased box around one carried value
//! - [`Carry`]: Trait for types a box may hold (scalars, `Vec<T>`, [`Shared<T>`])
//! - [`Shared<T>`]: Indirect reference to a value owned elsewhere
//! - [`DynFn`]: Erased callable with an introspectable [`Signature`]
//! - [`check`]: Pure contract checks raising [`ContractError`]
//!
//! # Example
//!
//! ```rust
//! use ferry_contract::{check, Candidate, DynFn, TypeTag, Value};
//!
//! let value = Value::new(vec![1_i64, 2, 3]);
//! let element = value.element_tag().unwrap();
//!
//! let candidate = Candidate::from(DynFn::unary(|x: i64| x * 2));
//! let f = check::check_callable_inputs(&candidate, &[element]).unwrap();
//! assert_eq!(f.signature().outputs(), &[TypeTag::of::<i64>()]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod callable;
mod error;
mod shared;
mod tag;
mod value;

/// Contract checks
pub mod check;

// Re-exports
pub use callable::{Candidate, DynFn};
pub use error::ContractError;
pub use shared::Shared;
pub use tag::{Position, Signature, TypeTag};
pub use value::{collect_vec, Carry, Elements, Value};

/// Object-safe plumbing behind [`Carry`].
/// **Note:** Implemented automatically; never implement it by hand.
#[doc(hidden)]
pub mod __private {
    pub use super::value::private::CarryBase;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn element_type_drives_check() {
        let value = Value::new(Shared::new(vec![1.5_f64, 2.5]));
        let element = value.element_tag().unwrap();

        let good = Candidate::from(DynFn::unary(|x: f64| x > 2.0));
        let bad = Candidate::from(DynFn::unary(|x: i64| x > 2));

        assert!(check::check_signature(&good, &[element], &[TypeTag::of::<bool>()]).is_ok());
        assert!(check::check_callable_inputs(&bad, &[element])
            .unwrap_err()
            .is_type_mismatch());
    }

    #[test]
    fn checked_callable_runs_on_elements() {
        let value = Value::new(vec!["a".to_string(), "bc".to_string()]);
        let elements = value.elements().unwrap();

        let candidate = Candidate::from(DynFn::unary(|s: String| s.len()));
        let f = check::check_callable_inputs(&candidate, &[elements.element_tag()]).unwrap();

        let outputs: Vec<Value> = elements
            .into_values()
            .into_iter()
            .map(|v| f.call(vec![v]).unwrap().unwrap())
            .collect();
        let lengths = f.collect(outputs, 2).unwrap();
        assert_eq!(lengths.downcast::<Vec<usize>>().unwrap(), vec![1, 2]);
    }
}
