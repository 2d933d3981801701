//! Indirect references
//!
//! [`Shared<T>`] is the "refers to externally-owned value" kind of box.
//! Clones share one referent, so a mutation made through one handle is
//! visible through every other handle. Pipelines read through it with a
//! short read lock and never hold a lock while caller code runs.

use crate::tag::TypeTag;
use crate::value::{Carry, Elements};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Shared, mutable handle to a value owned elsewhere
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wrap a value in a new shared handle
    #[inline]
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Lock for reading
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Lock for writing
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Replace the referent
    #[inline]
    pub fn set(&self, value: T) {
        *self.0.write() = value;
    }

    /// Mutate the referent in place
    #[inline]
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.write())
    }

    /// Check whether two handles refer to the same referent
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to the referent
    #[inline]
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl<T: Clone> Shared<T> {
    /// Clone the referent out
    #[inline]
    #[must_use]
    pub fn get(&self) -> T {
        self.0.read().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(guard) => f.debug_tuple("Shared").field(&*guard).finish(),
            None => f.write_str("Shared(<locked>)"),
        }
    }
}

impl<T: Carry> Carry for Shared<T> {
    fn element_tag(&self) -> Option<TypeTag> {
        self.0.read().element_tag()
    }

    fn elements(&self) -> Option<Elements> {
        self.0.read().elements()
    }

    fn is_indirect(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn clones_share_referent() {
        let a = Shared::new(vec![1, 2, 3]);
        let b = a.clone();
        b.update(|v| v.push(4));
        assert_eq!(a.get(), vec![1, 2, 3, 4]);
        assert!(a.ptr_eq(&b));
        assert_eq!(a.handle_count(), 2);
    }

    #[test]
    fn shared_sequence_reports_referent_elements() {
        let value = Value::new(Shared::new(vec!["a".to_string(), "b".to_string()]));
        assert!(value.is_indirect());
        assert_eq!(value.type_tag(), TypeTag::of::<Shared<Vec<String>>>());
        assert_eq!(value.element_tag(), Some(TypeTag::of::<String>()));
        assert_eq!(value.elements().unwrap().len(), 2);
    }

    #[test]
    fn shared_scalar_is_not_a_sequence() {
        let value = Value::new(Shared::new(11_i32));
        assert!(value.is_indirect());
        assert!(value.element_tag().is_none());
    }

    #[test]
    fn boxed_clone_keeps_identity() {
        let shared = Shared::new(5_u32);
        let value = Value::new(shared.clone());
        let copy = value.clone().downcast::<Shared<u32>>().unwrap();
        copy.set(6);
        assert_eq!(shared.get(), 6);
    }

    #[test]
    fn debug_shows_referent() {
        assert_eq!(format!("{:?}", Shared::new(3)), "Shared(3)");
        let shared = Shared::new(3);
        let _guard = shared.write();
        assert_eq!(format!("{shared:?}"), "Shared(<locked>)");
    }
}
