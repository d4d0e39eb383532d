//! The primitive type system: attribute values, type names and null rules.

use std::fmt;
use std::hash::{Hash, Hasher};

use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::UnknownTypeError;

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                                TypeName                               ║
║                                ¯¯¯¯¯¯¯¯                               ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// One of the primitive attribute types.
///
/// Schemas may declare attributes with user-facing synonyms; those are
/// carried as opaque strings on the [`Attribute`](crate::metaclass::Attribute)
/// and resolved here only where a default value or null check is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeName {
    Boolean,
    Integer,
    Real,
    String,
    UniqueId,
}

impl TypeName {
    /// Resolves a declared type spelling to a primitive.
    ///
    /// # Errors
    /// Returns [`UnknownTypeError`] when the spelling is not one of the
    /// primitive type names.
    pub fn resolve(name: &str) -> Result<Self, UnknownTypeError> {
        name.trim().parse().map_err(|_| UnknownTypeError {
            name: name.to_string(),
        })
    }
}

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                                UniqueId                               ║
║                                ¯¯¯¯¯¯¯¯                               ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// A `UNIQUE_ID` value.
///
/// The zero id is a reserved sentinel meaning null across the whole runtime;
/// generators never emit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UniqueId(u128);

impl UniqueId {
    /// The reserved null id.
    pub const NULL: UniqueId = UniqueId(0);

    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u128> for UniqueId {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl From<u64> for UniqueId {
    fn from(raw: u64) -> Self {
        Self(u128::from(raw))
    }
}

impl From<Uuid> for UniqueId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.as_u128())
    }
}

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                                 Value                                 ║
║                                 ¯¯¯¯¯                                 ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// An attribute value.
#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    UniqueId(UniqueId),
}

impl Value {
    /// The primitive type this value belongs to.
    #[must_use]
    pub fn type_name(&self) -> TypeName {
        match self {
            Value::Boolean(_) => TypeName::Boolean,
            Value::Integer(_) => TypeName::Integer,
            Value::Real(_) => TypeName::Real,
            Value::String(_) => TypeName::String,
            Value::UniqueId(_) => TypeName::UniqueId,
        }
    }

    /// The null representation of a primitive type.
    ///
    /// `BOOLEAN`, `INTEGER` and `REAL` have no null representation; their
    /// zero values double as the reserved default.
    #[must_use]
    pub fn null_of(ty: TypeName) -> Value {
        match ty {
            TypeName::Boolean => Value::Boolean(false),
            TypeName::Integer => Value::Integer(0),
            TypeName::Real => Value::Real(0.0),
            TypeName::String => Value::String(String::new()),
            TypeName::UniqueId => Value::UniqueId(UniqueId::NULL),
        }
    }

    /// Whether this value is null under the rules of the declared type:
    /// the zero `UNIQUE_ID` and the empty `STRING` are null, everything
    /// else is always populated.
    #[must_use]
    pub fn is_null(&self, ty: TypeName) -> bool {
        match (ty, self) {
            (TypeName::UniqueId, Value::UniqueId(id)) => id.is_null(),
            (TypeName::UniqueId, Value::Integer(n)) => *n == 0,
            (TypeName::String, Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }

    /// Nudges a value toward the declared type of the attribute it is bound
    /// for. Integers widen to `REAL` and narrow into `UNIQUE_ID` so loaders
    /// can hand over plain numbers for id-typed attributes.
    #[must_use]
    pub(crate) fn coerce(self, ty: TypeName) -> Value {
        match (ty, self) {
            #[allow(clippy::cast_sign_loss)]
            (TypeName::UniqueId, Value::Integer(n)) if n >= 0 => {
                Value::UniqueId(UniqueId::from(n as u128))
            }
            #[allow(clippy::cast_precision_loss)]
            (TypeName::Real, Value::Integer(n)) => Value::Real(n as f64),
            (_, value) => value,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::UniqueId(a), Value::UniqueId(b)) => a == b,
            _ => false,
        }
    }
}

// Reals take part in query-cache keys; equality is IEEE with the caveat that
// a NaN-valued predicate never hits the cache.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Boolean(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Real(r) => {
                // normalize -0.0 so bit-hashing agrees with IEEE equality
                let r = if *r == 0.0 { 0.0 } else { *r };
                r.to_bits().hash(state);
            }
            Value::String(s) => s.hash(state),
            Value::UniqueId(id) => id.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => fmt::Display::fmt(b, f),
            Value::Integer(n) => fmt::Display::fmt(n, f),
            Value::Real(r) => fmt::Display::fmt(r, f),
            Value::String(s) => write!(f, "'{s}'"),
            Value::UniqueId(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<UniqueId> for Value {
    fn from(id: UniqueId) -> Self {
        Value::UniqueId(id)
    }
}

impl From<Uuid> for Value {
    fn from(uuid: Uuid) -> Self {
        Value::UniqueId(uuid.into())
    }
}
