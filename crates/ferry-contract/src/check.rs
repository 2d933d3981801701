//! Contract checks
//!
//! Pure validation of a candidate transformation against an expected
//! signature. None of these functions invoke the candidate.

use crate::callable::{Candidate, DynFn};
use crate::error::ContractError;
use crate::tag::{Position, TypeTag};

/// Fail unless the candidate is function-like
///
/// # Errors
/// Returns `NotCallable` for opaque values
pub fn check_callable(candidate: &Candidate) -> Result<&DynFn, ContractError> {
    match candidate {
        Candidate::Callable(f) => Ok(f),
        Candidate::Opaque(value) => Err(ContractError::NotCallable {
            actual: value.type_tag(),
        }),
    }
}

/// Fail unless the parameter types equal `expected`, element for element
///
/// # Errors
/// Returns `Arity` on a count mismatch, otherwise `TypeMismatch` at the
/// first differing position
pub fn check_inputs(f: &DynFn, expected: &[TypeTag]) -> Result<(), ContractError> {
    check_side(Position::Input, f.signature().inputs(), expected)
}

/// Fail unless the return types equal `expected`, element for element
///
/// # Errors
/// Returns `Arity` on a count mismatch, otherwise `TypeMismatch` at the
/// first differing position
pub fn check_outputs(f: &DynFn, expected: &[TypeTag]) -> Result<(), ContractError> {
    check_side(Position::Output, f.signature().outputs(), expected)
}

/// Fail unless the callable returns exactly `expected` values of any type
///
/// # Errors
/// Returns `Arity` on a count mismatch
pub fn check_output_arity(f: &DynFn, expected: usize) -> Result<(), ContractError> {
    let actual = f.signature().outputs().len();
    if actual != expected {
        return Err(ContractError::Arity {
            position: Position::Output,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Callable check followed by an input check
///
/// # Errors
/// See [`check_callable`] and [`check_inputs`]
pub fn check_callable_inputs<'a>(
    candidate: &'a Candidate,
    inputs: &[TypeTag],
) -> Result<&'a DynFn, ContractError> {
    let f = check_callable(candidate)?;
    check_inputs(f, inputs)?;
    Ok(f)
}

/// Callable check followed by an output check
///
/// # Errors
/// See [`check_callable`] and [`check_outputs`]
pub fn check_callable_outputs<'a>(
    candidate: &'a Candidate,
    outputs: &[TypeTag],
) -> Result<&'a DynFn, ContractError> {
    let f = check_callable(candidate)?;
    check_outputs(f, outputs)?;
    Ok(f)
}

/// Callable, input and output checks, in that order
///
/// # Errors
/// The first violation found
pub fn check_signature<'a>(
    candidate: &'a Candidate,
    inputs: &[TypeTag],
    outputs: &[TypeTag],
) -> Result<&'a DynFn, ContractError> {
    let f = check_callable_inputs(candidate, inputs)?;
    check_outputs(f, outputs)?;
    Ok(f)
}

fn check_side(
    position: Position,
    actual: &[TypeTag],
    expected: &[TypeTag],
) -> Result<(), ContractError> {
    if actual.len() != expected.len() {
        return Err(ContractError::Arity {
            position,
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    match actual
        .iter()
        .zip(expected)
        .position(|(actual, expected)| actual != expected)
    {
        Some(index) => Err(ContractError::TypeMismatch {
            position,
            index,
            expected: expected[index],
            actual: actual[index],
        }),
        None => Ok(()),
    }
}
