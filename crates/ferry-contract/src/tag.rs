//! Run-time type identity
//!
//! [`TypeTag`] names a concrete Rust type at run time. [`Signature`] is the
//! ordered parameter/return description of a callable, recomputed from its
//! tags every time a contract is checked.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Run-time identity of a concrete type
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for
/// diagnostics and is not guaranteed to be stable across compilers.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for `T`
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying type id
    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Readable type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether this tag names `T`
    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Which side of a signature a check refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Parameter list
    Input,

    /// Return list
    Output,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("argument"),
            Self::Output => f.write_str("return"),
        }
    }
}

/// Ordered parameter and return types of a callable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    inputs: Vec<TypeTag>,
    outputs: Vec<TypeTag>,
}

impl Signature {
    /// Create signature
    #[inline]
    #[must_use]
    pub fn new(inputs: Vec<TypeTag>, outputs: Vec<TypeTag>) -> Self {
        Self { inputs, outputs }
    }

    /// Parameter types in order
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &[TypeTag] {
        &self.inputs
    }

    /// Return types in order
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &[TypeTag] {
        &self.outputs
    }

    /// Types on one side of the signature
    #[inline]
    #[must_use]
    pub fn side(&self, position: Position) -> &[TypeTag] {
        match position {
            Position::Input => &self.inputs,
            Position::Output => &self.outputs,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, tag) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str(")")?;
        match self.outputs.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {single}"),
            many => {
                f.write_str(" -> (")?;
                for (i, tag) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{tag}")?;
                }
                f.write_str(")")
            }
        }
    }
}
