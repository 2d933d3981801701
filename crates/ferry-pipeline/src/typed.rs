//! Statically typed pipelines
//!
//! When the carried type is known at compile time the contract checks are
//! redundant: [`Typed<T>`] offers the same operation set with the contract
//! enforced by the type system. [`Pipeline::typed`] moves from the erased
//! form to the typed one through an explicit downcast that yields an
//! error instead of failing at run time.
//!
//! The `*_with` methods on [`Pipeline`] are a middle ground: they take
//! plain closures, erase them, and go through the checked executor.

use crate::error::Result;
use crate::pipeline::Pipeline;
use ferry_contract::{Carry, DynFn, Shared, TypeTag};

/// Uniform read access to the elements of a sequence
///
/// Implemented for direct `Vec<T>` and for `Shared<Vec<T>>`. The shared
/// form hands `f` a copy taken under a short read lock, so `f` may write
/// to the same referent.
pub trait Elementwise {
    /// Element type
    type Item;

    /// Borrow the current elements for the duration of `f`
    fn with_items<R>(&self, f: impl FnOnce(&[Self::Item]) -> R) -> R;

    /// Capacity hint
    fn capacity_hint(&self) -> usize;
}

impl<T> Elementwise for Vec<T> {
    type Item = T;

    fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self)
    }

    fn capacity_hint(&self) -> usize {
        self.capacity()
    }
}

impl<T: Clone> Elementwise for Shared<Vec<T>> {
    type Item = T;

    fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let items = self.read().clone();
        f(&items)
    }

    fn capacity_hint(&self) -> usize {
        self.read().capacity()
    }
}

/// Pipeline whose carried type is known statically
#[derive(Debug, Clone, PartialEq)]
pub struct Typed<T> {
    value: T,
}

impl<T> Typed<T> {
    /// Wrap a value
    #[inline]
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Borrow the held value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Unwrap the held value
    #[inline]
    #[must_use]
    pub fn extract(self) -> T {
        self.value
    }

    /// Replace the whole value with `f(value)`
    #[inline]
    #[must_use]
    pub fn reshape<R>(self, f: impl FnOnce(T) -> R) -> Typed<R> {
        Typed::new(f(self.value))
    }

    /// Run `f` on the whole value for its effect
    #[inline]
    #[must_use]
    pub fn side_effect(self, f: impl FnOnce(&T)) -> Self {
        f(&self.value);
        self
    }

    /// Return to the erased, checked form
    #[inline]
    #[must_use]
    pub fn erase(self) -> Pipeline
    where
        T: Carry,
    {
        Pipeline::new(self.value)
    }
}

impl<S: Elementwise> Typed<S> {
    /// Run `f` on each element in index order
    #[must_use]
    pub fn for_each_element(self, mut f: impl FnMut(&S::Item)) -> Self {
        self.value.with_items(|items| items.iter().for_each(&mut f));
        self
    }

    /// Replace the sequence with `f` applied to each element
    #[must_use]
    pub fn map<R>(self, f: impl FnMut(&S::Item) -> R) -> Typed<Vec<R>> {
        let capacity = self.value.capacity_hint();
        let mapped = self.value.with_items(|items| {
            let mut out = Vec::with_capacity(capacity.max(items.len()));
            out.extend(items.iter().map(f));
            out
        });
        Typed::new(mapped)
    }

    /// Keep elements for which `keep` returns `true`
    #[must_use]
    pub fn filter(self, mut keep: impl FnMut(&S::Item) -> bool) -> Typed<Vec<S::Item>>
    where
        S::Item: Clone,
    {
        let capacity = self.value.capacity_hint();
        let kept = self.value.with_items(|items| {
            let mut out = Vec::with_capacity(capacity);
            out.extend(items.iter().filter(|item| keep(*item)).cloned());
            out
        });
        Typed::new(kept)
    }

    /// Left-fold the elements into `initial`
    #[must_use]
    pub fn fold<A>(self, initial: A, f: impl FnMut(A, &S::Item) -> A) -> Typed<A> {
        Typed::new(self.value.with_items(|items| items.iter().fold(initial, f)))
    }
}

impl Pipeline {
    /// Downcast into a statically typed pipeline
    ///
    /// # Errors
    /// Returns `Extract` if the held value is not a `T`; the pipeline is
    /// consumed either way
    pub fn typed<T: Carry>(self) -> Result<Typed<T>> {
        self.extract_as::<T>().map(Typed::new)
    }

    /// [`reshape`](Self::reshape) with a plain closure
    ///
    /// # Errors
    /// Returns `Contract` if `A` is not the held type
    pub fn reshape_with<A, R, F>(self, f: F) -> Result<Self>
    where
        A: Carry,
        R: Carry + Clone,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.reshape(DynFn::unary(f))
    }

    /// [`side_effect`](Self::side_effect) with a plain closure
    ///
    /// # Errors
    /// Returns `Contract` if `A` is not the held type
    pub fn side_effect_with<A, F>(self, f: F) -> Result<Self>
    where
        A: Carry,
        F: Fn(A) + Send + Sync + 'static,
    {
        self.side_effect(DynFn::sink(f))
    }

    /// [`for_each_element`](Self::for_each_element) with a plain closure
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence of `A`
    pub fn for_each_with<A, F>(self, f: F) -> Result<Self>
    where
        A: Carry,
        F: Fn(A) + Send + Sync + 'static,
    {
        self.for_each_element(DynFn::sink(f))
    }

    /// [`map`](Self::map) with a plain closure
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence of `A`
    pub fn map_with<A, R, F>(self, f: F) -> Result<Self>
    where
        A: Carry,
        R: Carry + Clone,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.map(DynFn::unary(f))
    }

    /// [`filter`](Self::filter) with a plain closure
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence of `A`
    pub fn filter_with<A, F>(self, f: F) -> Result<Self>
    where
        A: Carry,
        F: Fn(A) -> bool + Send + Sync + 'static,
    {
        self.filter(DynFn::unary(f))
    }

    /// [`fold`](Self::fold) with a plain closure
    ///
    /// # Errors
    /// Returns `Contract` if the value is not a sequence of `E`
    pub fn fold_with<Acc, E, F>(self, initial: Acc, f: F) -> Result<Self>
    where
        Acc: Carry + Clone,
        E: Carry,
        F: Fn(Acc, E) -> Acc + Send + Sync + 'static,
    {
        self.fold(initial, DynFn::binary(f))
    }

    /// Check whether the held value is a `T`
    #[inline]
    #[must_use]
    pub fn holds<T: Carry>(&self) -> bool {
        self.value().type_tag() == TypeTag::of::<T>()
    }
}
