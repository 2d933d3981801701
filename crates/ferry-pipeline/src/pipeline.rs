//! Pipeline handle and operation executor
//!
//! A [`Pipeline`] owns exactly one [`Value`]. Every operation consumes the
//! pipeline, checks the supplied transformation against a signature derived
//! from the held value, and only then invokes it. The result is a new
//! pipeline; a failed check returns an error and the transformation never
//! runs.
//!
//! # Indirect references
//!
//! When the held value is a [`Shared`](ferry_contract::Shared) handle,
//! sequence operations read the referent's elements, and `side_effect`
//! passes a clone of the handle. Mutations made through that handle are
//! visible to every other holder of it.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::operation::Operation;
use ferry_contract::check::{check_callable_inputs, check_output_arity, check_signature};
use ferry_contract::{Candidate, Carry, ContractError, DynFn, Position, TypeTag, Value};
use std::sync::Arc;

/// Wrap a value in a new pipeline
#[inline]
#[must_use]
pub fn create<T: Carry>(value: T) -> Pipeline {
    Pipeline::new(value)
}

/// Chainable handle around one carried value
#[derive(Debug, Clone)]
pub struct Pipeline {
    value: Value,
    config: Arc<PipelineConfig>,
}

impl Pipeline {
    /// Create pipeline around a value
    #[inline]
    #[must_use]
    pub fn new<T: Carry>(value: T) -> Self {
        Self::from_value(Value::new(value))
    }

    /// Create pipeline around an already boxed value
    #[inline]
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            config: Arc::new(PipelineConfig::default()),
        }
    }

    /// Replace configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Borrow the held value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Unwrap the held value
    #[inline]
    #[must_use]
    pub fn extract(self) -> Value {
        self.value
    }

    /// Unwrap the held value as `T`
    ///
    /// # Errors
    /// Returns `Extract` if the held value is not a `T`
    pub fn extract_as<T: Carry>(self) -> Result<T> {
        self.value
            .downcast::<T>()
            .map_err(|held| PipelineError::Extract {
                expected: TypeTag::of::<T>(),
                actual: held.type_tag(),
            })
    }

    /// Replace the whole value with `transform(value)`
    ///
    /// `transform` takes the whole held type, even for sequences, and
    /// returns one value of any type.
    ///
    /// # Errors
    /// Returns `Contract` if the transformation does not fit
    pub fn reshape(self, transform: impl Into<Candidate>) -> Result<Self> {
        let op = Operation::Reshape;
        let candidate = transform.into();
        let whole = self.start(op);

        let f = check_callable_inputs(&candidate, &[whole])
            .and_then(|f| check_output_arity(f, 1).map(|()| f))
            .map_err(|e| self.reject(op, e))?;

        let Self { value, config } = self;
        let reshaped = invoke_returning(op, f, vec![value])?;
        Ok(Self {
            value: reshaped,
            config,
        })
    }

    /// Run `transform(value)` for its effect and keep the value
    ///
    /// The argument is a clone of the held value. For an indirect
    /// reference that clone is another handle to the same referent, so
    /// mutation through it is observable by the caller and by the
    /// returned pipeline.
    ///
    /// # Errors
    /// Returns `Contract` if the transformation does not fit
    pub fn side_effect(self, transform: impl Into<Candidate>) -> Result<Self> {
        let op = Operation::SideEffect;
        let candidate = transform.into();
        let whole = self.start(op);

        let f = check_signature(&candidate, &[whole], &[]).map_err(|e| self.reject(op, e))?;

        invoke(op, f, vec![self.value.clone()])?;
        Ok(self)
    }

    /// Run `transform(element)` for every element, in index order
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence or the
    /// transformation does not fit
    pub fn for_each_element(self, transform: impl Into<Candidate>) -> Result<Self> {
        let op = Operation::ForEachElement;
        let candidate = transform.into();
        self.start(op);
        let element = self.element_tag(op)?;

        let f =
            check_signature(&candidate, &[element], &[]).map_err(|e| self.reject(op, e))?;

        for (index, item) in self.elements(op)?.into_values().into_iter().enumerate() {
            self.trace(op, index);
            invoke(op, f, vec![item])?;
        }
        Ok(self)
    }

    /// Replace the sequence with `transform` applied to each element
    ///
    /// The result is always a direct `Vec` of the transformation's return
    /// type with the same length as the source.
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence or the
    /// transformation does not fit
    pub fn map(self, transform: impl Into<Candidate>) -> Result<Self> {
        let op = Operation::Map;
        let candidate = transform.into();
        self.start(op);
        let element = self.element_tag(op)?;

        let f = check_callable_inputs(&candidate, &[element])
            .and_then(|f| check_output_arity(f, 1).map(|()| f))
            .map_err(|e| self.reject(op, e))?;

        let elements = self.elements(op)?;
        let capacity = elements.capacity();
        let mut outputs = Vec::with_capacity(elements.len());
        for (index, item) in elements.into_values().into_iter().enumerate() {
            self.trace(op, index);
            outputs.push(invoke_returning(op, f, vec![item])?);
        }

        let mapped = f
            .collect(outputs, capacity)
            .map_err(|source| PipelineError::Invocation {
                operation: op,
                source,
            })?;
        Ok(self.replace(mapped))
    }

    /// Keep the elements for which `transform` returns `true`
    ///
    /// Order and element type are preserved; the result is a direct `Vec`
    /// sized with the source's capacity.
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence or the
    /// transformation is not `fn(element) -> bool`
    pub fn filter(self, transform: impl Into<Candidate>) -> Result<Self> {
        let op = Operation::Filter;
        let candidate = transform.into();
        self.start(op);
        let element = self.element_tag(op)?;

        let f = check_signature(&candidate, &[element], &[TypeTag::of::<bool>()])
            .map_err(|e| self.reject(op, e))?;

        let elements = self.elements(op)?;
        let mut kept = Vec::with_capacity(elements.len());
        for (index, item) in elements.iter().enumerate() {
            self.trace(op, index);
            let verdict = invoke_returning(op, f, vec![item.clone()])?;
            if as_bool(op, verdict)? {
                kept.push(item.clone());
            }
        }

        let filtered = elements
            .rebuild(kept)
            .map_err(|source| PipelineError::Invocation {
                operation: op,
                source,
            })?;
        Ok(self.replace(filtered))
    }

    /// Left-fold the elements into `initial`
    ///
    /// `transform` must be `fn(A, element) -> A` where `A` is the type of
    /// `initial`. An empty sequence yields `initial` unchanged.
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence or the
    /// transformation does not fit
    pub fn fold<A: Carry>(self, initial: A, transform: impl Into<Candidate>) -> Result<Self> {
        self.fold_value(Value::new(initial), transform)
    }

    /// [`fold`](Self::fold) with an already boxed initial value
    ///
    /// # Errors
    /// See [`fold`](Self::fold)
    pub fn fold_value(self, initial: Value, transform: impl Into<Candidate>) -> Result<Self> {
        let op = Operation::Fold;
        let candidate = transform.into();
        self.start(op);
        let element = self.element_tag(op)?;
        let accumulator = initial.type_tag();

        let f = check_signature(&candidate, &[accumulator, element], &[accumulator])
            .map_err(|e| self.reject(op, e))?;

        let mut acc = initial;
        for (index, item) in self.elements(op)?.into_values().into_iter().enumerate() {
            self.trace(op, index);
            acc = invoke_returning(op, f, vec![acc, item])?;
        }
        Ok(self.replace(acc))
    }

    fn replace(self, value: Value) -> Self {
        Self {
            value,
            config: self.config,
        }
    }

    fn start(&self, op: Operation) -> TypeTag {
        let held = self.value.type_tag();
        let element = if op.needs_sequence() {
            self.value.element_tag()
        } else {
            None
        };
        tracing::debug!(
            pipeline = self.config.label(),
            operation = %op,
            held = %held,
            element = ?element,
            indirect = self.value.is_indirect(),
            "running operation"
        );
        held
    }

    fn element_tag(&self, op: Operation) -> Result<TypeTag> {
        self.value.element_tag().ok_or_else(|| {
            self.reject(
                op,
                ContractError::NotASequence {
                    actual: self.value.type_tag(),
                },
            )
        })
    }

    fn elements(&self, op: Operation) -> Result<ferry_contract::Elements> {
        self.value.elements().ok_or_else(|| {
            self.reject(
                op,
                ContractError::NotASequence {
                    actual: self.value.type_tag(),
                },
            )
        })
    }

    fn reject(&self, op: Operation, source: ContractError) -> PipelineError {
        tracing::warn!(
            pipeline = self.config.label(),
            operation = %op,
            held = %self.value.type_tag(),
            error = %source,
            "transformation rejected"
        );
        PipelineError::Contract {
            operation: op,
            source,
        }
    }

    fn trace(&self, op: Operation, index: usize) {
        if self.config.trace_elements {
            tracing::trace!(pipeline = self.config.label(), operation = %op, index, "element");
        }
    }
}

fn invoke(op: Operation, f: &DynFn, args: Vec<Value>) -> Result<Option<Value>> {
    f.call(args).map_err(|source| PipelineError::Invocation {
        operation: op,
        source,
    })
}

fn invoke_returning(op: Operation, f: &DynFn, args: Vec<Value>) -> Result<Value> {
    invoke(op, f, args)?.ok_or_else(|| PipelineError::Invocation {
        operation: op,
        source: ContractError::Arity {
            position: Position::Output,
            expected: 1,
            actual: 0,
        },
    })
}

fn as_bool(op: Operation, verdict: Value) -> Result<bool> {
    verdict
        .downcast::<bool>()
        .map_err(|other| PipelineError::Invocation {
            operation: op,
            source: ContractError::TypeMismatch {
                position: Position::Output,
                index: 0,
                expected: TypeTag::of::<bool>(),
                actual: other.type_tag(),
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_contract::Shared;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_then_extract_is_identity() {
        assert_eq!(create(2.5_f64).extract_as::<f64>().unwrap(), 2.5);
        assert!(!create(false).extract_as::<bool>().unwrap());
    }

    #[test]
    fn extract_as_wrong_type() {
        let err = create(1_i32).extract_as::<String>().unwrap_err();
        assert!(matches!(err, PipelineError::Extract { .. }));
    }

    #[test]
    fn reshape_doubles_scalar() {
        let out = create(32_i64)
            .reshape(DynFn::unary(|x: i64| x * 2))
            .unwrap()
            .extract_as::<i64>()
            .unwrap();
        assert_eq!(out, 64);
    }

    #[test]
    fn reshape_may_change_type() {
        let out = create("101".to_string())
            .reshape(DynFn::unary(|s: String| s.parse::<i64>().unwrap_or(0)))
            .unwrap()
            .extract_as::<i64>()
            .unwrap();
        assert_eq!(out, 101);
    }

    #[test]
    fn reshape_sees_sequence_as_whole() {
        let out = create(vec![1_i32, 2, 3])
            .reshape(DynFn::unary(|v: Vec<i32>| v.len()))
            .unwrap()
            .extract_as::<usize>()
            .unwrap();
        assert_eq!(out, 3);
    }

    #[test]
    fn reshape_rejects_sink() {
        let err = create(1_i32)
            .reshape(DynFn::sink(|_: i32| {}))
            .unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(err.contract().unwrap().position(), Some(Position::Output));
    }

    #[test]
    fn side_effect_mutates_through_shared() {
        let data = Shared::new(32_i64);
        let out = create(data.clone())
            .side_effect(DynFn::sink(|it: Shared<i64>| it.update(|v| *v *= 2)))
            .unwrap()
            .extract_as::<Shared<i64>>()
            .unwrap();
        assert!(out.ptr_eq(&data));
        assert_eq!(data.get(), 64);
    }

    #[test]
    fn side_effect_rejects_returning_function() {
        let data = Shared::new(32_i64);
        let err = create(data.clone())
            .side_effect(DynFn::unary(|it: Shared<i64>| it.get() * 2))
            .unwrap_err();
        assert!(matches!(
            err.contract(),
            Some(ContractError::Arity {
                position: Position::Output,
                ..
            })
        ));
        assert_eq!(data.get(), 32);
    }

    #[test]
    fn map_over_shared_sequence_yields_direct_vec() {
        let data = Shared::new(vec![1_i32, 2, 3]);
        let pipeline = create(data)
            .map(DynFn::unary(|x: i32| x * 10))
            .unwrap();
        assert!(!pipeline.value().is_indirect());
        assert_eq!(pipeline.extract_as::<Vec<i32>>().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn map_on_scalar_is_not_a_sequence() {
        let err = create(1_i32)
            .map(DynFn::unary(|x: i32| x * 2))
            .unwrap_err();
        assert!(matches!(
            err.contract(),
            Some(ContractError::NotASequence { .. })
        ));
    }

    #[test]
    fn filter_keeps_order_and_type() {
        let out = create(vec![5_u8, 2, 8, 1, 4])
            .filter(DynFn::unary(|x: u8| x % 2 == 0))
            .unwrap()
            .extract_as::<Vec<u8>>()
            .unwrap();
        assert_eq!(out, vec![2, 8, 4]);
    }

    #[test]
    fn filter_requires_bool_return() {
        let err = create(vec![1_i32])
            .filter(DynFn::unary(|x: i32| x))
            .unwrap_err();
        assert!(err.contract().unwrap().is_type_mismatch());
    }

    #[test]
    fn fold_sums() {
        let out = create(vec![1_i64, 2, 3])
            .fold(0_i64, DynFn::binary(|acc: i64, x: i64| acc + x))
            .unwrap()
            .extract_as::<i64>()
            .unwrap();
        assert_eq!(out, 6);
    }

    #[test]
    fn fold_accumulator_may_differ_from_element() {
        let out = create(vec!["a".to_string(), "bcd".to_string()])
            .fold(0_usize, DynFn::binary(|acc: usize, s: String| acc + s.len()))
            .unwrap()
            .extract_as::<usize>()
            .unwrap();
        assert_eq!(out, 4);
    }

    #[test]
    fn fold_rejects_mismatched_accumulator() {
        let err = create(vec![1_i64])
            .fold(0_i32, DynFn::binary(|acc: i64, x: i64| acc + x))
            .unwrap_err();
        assert!(matches!(
            err.contract(),
            Some(ContractError::TypeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn opaque_transform_is_not_callable() {
        let err = create(vec![1_i32])
            .for_each_element(Candidate::opaque(7_i32))
            .unwrap_err();
        assert!(matches!(
            err.contract(),
            Some(ContractError::NotCallable { .. })
        ));
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn start_event_names_element_type() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            create(vec![1_u16])
                .map(DynFn::unary(|x: u16| x + 1))
                .unwrap();
        });

        let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("running operation"), "{logs}");
        assert!(logs.contains("element=Some(TypeTag(u16))"), "{logs}");
    }

    #[test]
    fn config_is_carried_along_chain() {
        let config = PipelineConfig::new().with_name("chain");
        let pipeline = create(vec![1_i32])
            .with_config(config.clone())
            .map(DynFn::unary(|x: i32| x + 1))
            .unwrap();
        assert_eq!(pipeline.config(), &config);
    }
}
