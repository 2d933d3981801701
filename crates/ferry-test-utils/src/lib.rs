//! Testing utilities for the Ferry workspace
//!
//! Call recorders that build [`DynFn`] transformations and remember every
//! invocation, plus sample sequences shared across test suites.

#![allow(missing_docs)]

use ferry_contract::{Carry, DynFn, Shared};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records the arguments a transformation was invoked with
///
/// Cloning a recorder yields another handle to the same log.
#[derive(Debug)]
pub struct CallRecorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for CallRecorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for CallRecorder<T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Carry + Clone> CallRecorder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `fn(T)` that records its argument
    pub fn sink(&self) -> DynFn {
        let calls = Arc::clone(&self.calls);
        DynFn::sink(move |x: T| calls.lock().push(x))
    }

    /// `fn(T) -> R` that records its argument and returns `f(arg)`
    pub fn unary<R, F>(&self, f: F) -> DynFn
    where
        R: Carry + Clone,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        DynFn::unary(move |x: T| {
            calls.lock().push(x.clone());
            f(x)
        })
    }

    /// `fn(A, T) -> A` that records the element and returns `f(acc, element)`
    pub fn folder<A, F>(&self, f: F) -> DynFn
    where
        A: Carry + Clone,
        F: Fn(A, T) -> A + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        DynFn::binary(move |acc: A, x: T| {
            calls.lock().push(x.clone());
            f(acc, x)
        })
    }

    /// Recorded arguments, in call order
    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn was_called(&self) -> bool {
        self.count() > 0
    }
}

pub fn sample_ints() -> Vec<i64> {
    vec![1, 2, 3, 4, 5]
}

pub fn sample_words() -> Vec<String> {
    ["ferry", "", "pipeline", "map"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn shared_ints() -> Shared<Vec<i64>> {
    Shared::new(sample_ints())
}
