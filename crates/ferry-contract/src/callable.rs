//! Erased callables
//!
//! [`DynFn`] wraps an ordinary Rust closure behind a uniform
//! `Vec<Value> -> Option<Value>` calling convention while keeping its
//! declared parameter and return types as a [`Signature`] that can be
//! inspected without invoking it.

use crate::error::ContractError;
use crate::tag::{Position, Signature, TypeTag};
use crate::value::{collect_vec, Carry, Value};
use std::fmt;
use std::sync::Arc;

type Invoke = dyn Fn(Vec<Value>) -> Result<Option<Value>, ContractError> + Send + Sync;
type Collect = fn(Vec<Value>, usize) -> Result<Value, ContractError>;

/// Type-erased callable with an introspectable signature
///
/// # Example
/// ```rust
/// use ferry_contract::{DynFn, TypeTag, Value};
///
/// let double = DynFn::unary(|x: i64| x * 2).named("double");
/// assert_eq!(double.signature().inputs(), &[TypeTag::of::<i64>()]);
///
/// let out = double.call(vec![Value::new(21_i64)]).unwrap().unwrap();
/// assert_eq!(out.downcast::<i64>().unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct DynFn {
    name: Option<String>,
    signature: Signature,
    invoke: Arc<Invoke>,
    collect: Option<Collect>,
}

impl DynFn {
    /// Wrap `Fn() -> R`
    pub fn nullary<R, F>(f: F) -> Self
    where
        R: Carry + Clone,
        F: Fn() -> R + Send + Sync + 'static,
    {
        let invoke = move |args: Vec<Value>| -> Result<Option<Value>, ContractError> {
            let [] = take_args::<0>(args)?;
            Ok(Some(Value::new(f())))
        };
        Self::build(vec![], Some(TypeTag::of::<R>()), Arc::new(invoke), Some(collect_vec::<R>))
    }

    /// Wrap `Fn(A) -> R`
    pub fn unary<A, R, F>(f: F) -> Self
    where
        A: Carry,
        R: Carry + Clone,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let invoke = move |args: Vec<Value>| -> Result<Option<Value>, ContractError> {
            let [a] = take_args::<1>(args)?;
            let a = downcast_arg::<A>(a, 0)?;
            Ok(Some(Value::new(f(a))))
        };
        Self::build(
            vec![TypeTag::of::<A>()],
            Some(TypeTag::of::<R>()),
            Arc::new(invoke),
            Some(collect_vec::<R>),
        )
    }

    /// Wrap `Fn(A, B) -> R`
    pub fn binary<A, B, R, F>(f: F) -> Self
    where
        A: Carry,
        B: Carry,
        R: Carry + Clone,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        let invoke = move |args: Vec<Value>| -> Result<Option<Value>, ContractError> {
            let [a, b] = take_args::<2>(args)?;
            let a = downcast_arg::<A>(a, 0)?;
            let b = downcast_arg::<B>(b, 1)?;
            Ok(Some(Value::new(f(a, b))))
        };
        Self::build(
            vec![TypeTag::of::<A>(), TypeTag::of::<B>()],
            Some(TypeTag::of::<R>()),
            Arc::new(invoke),
            Some(collect_vec::<R>),
        )
    }

    /// Wrap `Fn(A)` with no return value
    pub fn sink<A, F>(f: F) -> Self
    where
        A: Carry,
        F: Fn(A) + Send + Sync + 'static,
    {
        let invoke = move |args: Vec<Value>| -> Result<Option<Value>, ContractError> {
            let [a] = take_args::<1>(args)?;
            f(downcast_arg::<A>(a, 0)?);
            Ok(None)
        };
        Self::build(vec![TypeTag::of::<A>()], None, Arc::new(invoke), None)
    }

    /// Wrap `Fn(A, B)` with no return value
    pub fn sink2<A, B, F>(f: F) -> Self
    where
        A: Carry,
        B: Carry,
        F: Fn(A, B) + Send + Sync + 'static,
    {
        let invoke = move |args: Vec<Value>| -> Result<Option<Value>, ContractError> {
            let [a, b] = take_args::<2>(args)?;
            f(downcast_arg::<A>(a, 0)?, downcast_arg::<B>(b, 1)?);
            Ok(None)
        };
        Self::build(
            vec![TypeTag::of::<A>(), TypeTag::of::<B>()],
            None,
            Arc::new(invoke),
            None,
        )
    }

    fn build(
        inputs: Vec<TypeTag>,
        output: Option<TypeTag>,
        invoke: Arc<Invoke>,
        collect: Option<Collect>,
    ) -> Self {
        Self {
            name: None,
            signature: Signature::new(inputs, output.into_iter().collect()),
            invoke,
            collect,
        }
    }

    /// Attach a readable name
    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Readable name, if any
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared parameter and return types
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke with boxed arguments
    ///
    /// Returns the single output, or `None` for callables without a return.
    ///
    /// # Errors
    /// Returns `Arity` or `TypeMismatch` if the arguments do not fit the
    /// signature; the wrapped closure is not run in that case
    pub fn call(&self, args: Vec<Value>) -> Result<Option<Value>, ContractError> {
        (self.invoke)(args)
    }

    /// Gather outputs of this callable into a direct `Vec` of its return type
    ///
    /// # Errors
    /// Returns `Arity` if the callable has no return value, or
    /// `TypeMismatch` if an output is not of the return type
    pub fn collect(&self, outputs: Vec<Value>, capacity: usize) -> Result<Value, ContractError> {
        match self.collect {
            Some(collect) => collect(outputs, capacity),
            None => Err(ContractError::Arity {
                position: Position::Output,
                expected: 1,
                actual: self.signature.outputs().len(),
            }),
        }
    }
}

impl fmt::Debug for DynFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynFn")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

fn take_args<const N: usize>(args: Vec<Value>) -> Result<[Value; N], ContractError> {
    <[Value; N]>::try_from(args).map_err(|args| ContractError::Arity {
        position: Position::Input,
        expected: N,
        actual: args.len(),
    })
}

fn downcast_arg<A: Carry>(arg: Value, index: usize) -> Result<A, ContractError> {
    arg.downcast::<A>().map_err(|other| ContractError::TypeMismatch {
        position: Position::Input,
        index,
        expected: TypeTag::of::<A>(),
        actual: other.type_tag(),
    })
}

/// A transformation as handed to a pipeline operation
///
/// Anything that is not a [`DynFn`] is `Opaque` and fails the callable check.
#[derive(Debug, Clone)]
pub enum Candidate {
    /// Function-like value
    Callable(DynFn),

    /// Any other value
    Opaque(Value),
}

impl Candidate {
    /// Wrap a non-function value
    #[inline]
    #[must_use]
    pub fn opaque<T: Carry>(value: T) -> Self {
        Self::Opaque(Value::new(value))
    }

    /// Tag of the candidate itself
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Callable(_) => TypeTag::of::<DynFn>(),
            Self::Opaque(value) => value.type_tag(),
        }
    }
}

impl From<DynFn> for Candidate {
    fn from(f: DynFn) -> Self {
        Self::Callable(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn unary_signature_and_call() {
        let f = DynFn::unary(|s: String| s.len());
        assert_eq!(f.signature().to_string(), "fn(alloc::string::String) -> usize");
        let out = f.call(vec![Value::new("four".to_string())]).unwrap().unwrap();
        assert_eq!(out.downcast::<usize>().unwrap(), 4);
    }

    #[test]
    fn sink_has_no_outputs() {
        let f = DynFn::sink(|_: i32| {});
        assert!(f.signature().outputs().is_empty());
        assert!(f.call(vec![Value::new(1_i32)]).unwrap().is_none());
    }

    #[test]
    fn binary_passes_arguments_in_order() {
        let f = DynFn::binary(|a: i64, b: i64| a - b);
        let out = f
            .call(vec![Value::new(10_i64), Value::new(3_i64)])
            .unwrap()
            .unwrap();
        assert_eq!(out.downcast::<i64>().unwrap(), 7);
    }

    #[test]
    fn nullary_and_sink2_signatures() {
        assert!(DynFn::nullary(|| 1_u8).signature().inputs().is_empty());
        assert_eq!(DynFn::sink2(|_: u8, _: bool| {}).signature().inputs().len(), 2);
    }

    #[test]
    fn wrong_argument_count_never_runs_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let f = DynFn::unary(move |x: i32| {
            seen.fetch_add(1, Ordering::SeqCst);
            x
        });

        let err = f.call(vec![]).unwrap_err();
        assert_eq!(
            err,
            ContractError::Arity {
                position: Position::Input,
                expected: 1,
                actual: 0,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wrong_argument_type_is_reported() {
        let f = DynFn::binary(|a: i32, b: i32| a + b);
        let err = f
            .call(vec![Value::new(1_i32), Value::new(2.0_f64)])
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::TypeMismatch {
                position: Position::Input,
                index: 1,
                expected: TypeTag::of::<i32>(),
                actual: TypeTag::of::<f64>(),
            }
        );
    }

    #[test]
    fn collect_builds_vec_of_return_type() {
        let f = DynFn::unary(|x: i32| x > 0);
        let out = f
            .collect(vec![Value::new(true), Value::new(false)], 2)
            .unwrap();
        assert_eq!(out.downcast::<Vec<bool>>().unwrap(), vec![true, false]);
    }

    #[test]
    fn collect_on_sink_is_arity_error() {
        let f = DynFn::sink(|_: i32| {});
        assert!(matches!(
            f.collect(vec![], 0),
            Err(ContractError::Arity {
                position: Position::Output,
                expected: 1,
                actual: 0,
            })
        ));
    }

    #[test]
    fn candidate_tags() {
        let callable = Candidate::from(DynFn::nullary(|| 0_i32));
        assert_eq!(callable.type_tag(), TypeTag::of::<DynFn>());
        assert_eq!(Candidate::opaque(3_u8).type_tag(), TypeTag::of::<u8>());
    }

    #[test]
    fn debug_shows_name_and_signature() {
        let f = DynFn::unary(|x: u8| x).named("id");
        let text = format!("{f:?}");
        assert!(text.contains("id"));
        assert!(text.contains("fn(u8) -> u8"));
    }
}
