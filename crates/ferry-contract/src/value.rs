//! Carried values
//!
//! A pipeline box holds exactly one [`Value`]: an owned, type-erased
//! container around anything implementing [`Carry`]. Sequences are
//! recognised through [`Carry::element_tag`] and read uniformly through
//! [`Elements`], whether the box owns a `Vec<T>` directly or refers to one
//! through a [`Shared`](crate::Shared) handle.

use crate::error::ContractError;
use crate::tag::{Position, TypeTag};
use std::any::Any;
use std::fmt;

/// Trait for values a pipeline can carry
///
/// Scalars implement it with an empty body. Implementors must be
/// `Clone`; cloning is reached through the hidden [`private::CarryBase`]
/// supertrait so that `dyn Carry` stays object safe.
///
/// # Example
/// ```rust
/// use ferry_contract::{Carry, Value};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Carry for Point {}
///
/// let value = Value::new(Point { x: 1, y: 2 });
/// assert_eq!(value.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
/// ```
pub trait Carry: private::CarryBase + fmt::Debug + Send + Sync + 'static {
    /// Element type if this value is a sequence
    ///
    /// For an indirect reference this is the element type of the referent.
    #[inline]
    fn element_tag(&self) -> Option<TypeTag> {
        None
    }

    /// Cloned view of the current elements if this value is a sequence
    #[inline]
    fn elements(&self) -> Option<Elements> {
        None
    }

    /// Whether this value refers to data owned elsewhere
    #[inline]
    fn is_indirect(&self) -> bool {
        false
    }
}

/// Object-safe plumbing for [`Carry`]
#[doc(hidden)]
pub mod private {
    use super::Carry;
    use crate::tag::TypeTag;
    use std::any::Any;

    /// Implemented for every `Carry + Clone` type; not meant to be named
    pub trait CarryBase {
        /// Clone behind a fresh box
        fn clone_carry(&self) -> Box<dyn Carry>;

        /// Borrow as `Any`
        fn as_any(&self) -> &dyn Any;

        /// Convert into `Any`
        fn into_any(self: Box<Self>) -> Box<dyn Any>;

        /// Tag of the concrete type
        fn carry_tag(&self) -> TypeTag;
    }

    impl<T: Carry + Clone> CarryBase for T {
        fn clone_carry(&self) -> Box<dyn Carry> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }

        fn carry_tag(&self) -> TypeTag {
            TypeTag::of::<T>()
        }
    }
}

macro_rules! scalar_carry {
    ($($ty:ty),* $(,)?) => {
        $(impl Carry for $ty {})*
    };
}

scalar_carry!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, &'static str, (),
);

impl<T: Carry + Clone> Carry for Option<T> {}

impl<T: Carry + Clone> Carry for Vec<T> {
    fn element_tag(&self) -> Option<TypeTag> {
        Some(TypeTag::of::<T>())
    }

    fn elements(&self) -> Option<Elements> {
        Some(Elements::of(self, self.capacity()))
    }
}

/// Owned, type-erased box around one carried value
///
/// The dynamic type of a `Value` never changes; operations that change
/// type produce a new `Value`.
pub struct Value(Box<dyn Carry>);

impl Value {
    /// Box a value
    #[inline]
    #[must_use]
    pub fn new<T: Carry>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Tag of the held value's concrete type
    #[inline]
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        (*self.0).carry_tag()
    }

    /// Check whether the held value is a `T`
    #[inline]
    #[must_use]
    pub fn is<T: Carry>(&self) -> bool {
        (*self.0).as_any().is::<T>()
    }

    /// Whether the held value refers to data owned elsewhere
    #[inline]
    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.0.is_indirect()
    }

    /// Element type if the held value is a sequence
    #[inline]
    #[must_use]
    pub fn element_tag(&self) -> Option<TypeTag> {
        self.0.element_tag()
    }

    /// Cloned elements if the held value is a sequence
    #[inline]
    #[must_use]
    pub fn elements(&self) -> Option<Elements> {
        self.0.elements()
    }

    /// Borrow the held value as `T`
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Carry>(&self) -> Option<&T> {
        (*self.0).as_any().downcast_ref::<T>()
    }

    /// Take the held value out as `T`
    ///
    /// # Errors
    /// Returns the untouched value if it is not a `T`
    pub fn downcast<T: Carry>(self) -> Result<T, Value> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.0.into_any().downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(_) => unreachable!("type checked before downcast"),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self((*self.0).clone_carry())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Cloned snapshot of a sequence's elements
///
/// Produced by [`Carry::elements`]. Remembers how to rebuild a direct
/// `Vec<T>` of the original element type, so element-preserving
/// operations (filter) do not need to know `T` statically.
pub struct Elements {
    element: TypeTag,
    items: Vec<Value>,
    capacity: usize,
    rebuild: fn(Vec<Value>, usize) -> Result<Value, ContractError>,
}

impl Elements {
    /// Snapshot a slice, remembering a capacity hint
    #[must_use]
    pub fn of<T: Carry + Clone>(items: &[T], capacity: usize) -> Self {
        Self {
            element: TypeTag::of::<T>(),
            items: items.iter().cloned().map(Value::new).collect(),
            capacity: capacity.max(items.len()),
            rebuild: collect_vec::<T>,
        }
    }

    /// Element type
    #[inline]
    #[must_use]
    pub fn element_tag(&self) -> TypeTag {
        self.element
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no elements
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Capacity hint of the source sequence
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over elements in index order
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Take the elements
    #[inline]
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.items
    }

    /// Build a direct `Vec` of the source element type
    ///
    /// The result keeps the source capacity hint.
    ///
    /// # Errors
    /// Returns `TypeMismatch` if a value is not of the element type
    pub fn rebuild(&self, kept: Vec<Value>) -> Result<Value, ContractError> {
        (self.rebuild)(kept, self.capacity)
    }
}

impl fmt::Debug for Elements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elements")
            .field("element", &self.element)
            .field("items", &self.items)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Collect boxed values into a direct `Vec<T>`
///
/// # Errors
/// Returns `TypeMismatch` at the first value that is not a `T`
pub fn collect_vec<T: Carry + Clone>(
    values: Vec<Value>,
    capacity: usize,
) -> Result<Value, ContractError> {
    let mut out: Vec<T> = Vec::with_capacity(capacity.max(values.len()));
    for (index, value) in values.into_iter().enumerate() {
        let item = value
            .downcast::<T>()
            .map_err(|other| ContractError::TypeMismatch {
                position: Position::Output,
                index,
                expected: TypeTag::of::<T>(),
                actual: other.type_tag(),
            })?;
        out.push(item);
    }
    Ok(Value::new(out))
}
