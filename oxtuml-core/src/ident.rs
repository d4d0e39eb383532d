//! Identifier handling.
//!
//! Every identifier in a metamodel (class kinds, attribute names, relation
//! ids, phrases and unique-identifier names) compares case-insensitively.
//! The canonical spelling is whatever the schema introduced; lookups fold to
//! upper case.

use std::fmt;

/// Folds an identifier to its upper-case lookup form.
#[must_use]
pub(crate) fn fold(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// The symbolic id naming one association, normalized to `R<n>`.
///
/// Accepts integers as well as `R7`/`r7` spellings. Non-numeric ids are kept
/// verbatim, folded to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelId(String);

impl RelId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn normalize(raw: &str) -> String {
        let raw = raw.trim();
        if let Some(digits) = raw.strip_prefix(['R', 'r']) {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return format!("R{digits}");
            }
        }
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return format!("R{raw}");
        }
        fold(raw)
    }
}

impl fmt::Display for RelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelId {
    fn from(raw: &str) -> Self {
        Self(Self::normalize(raw))
    }
}

impl From<String> for RelId {
    fn from(raw: String) -> Self {
        Self(Self::normalize(&raw))
    }
}

impl From<&RelId> for RelId {
    fn from(rel: &RelId) -> Self {
        rel.clone()
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for RelId {
            fn from(n: $ty) -> Self {
                Self(format!("R{n}"))
            }
        })*
    };
}
impl_from_int!(u16, u32, u64, usize, i16, i32, i64);

/// The name of a unique identifier on a class, normalized to `I<n>` when
/// given as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexName(String);

impl IndexName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn folded(&self) -> String {
        fold(&self.0)
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IndexName {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }
}

impl From<String> for IndexName {
    fn from(raw: String) -> Self {
        Self(raw.trim().to_string())
    }
}

macro_rules! impl_index_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for IndexName {
            fn from(n: $ty) -> Self {
                Self(format!("I{n}"))
            }
        })*
    };
}
impl_index_from_int!(u16, u32, u64, usize, i16, i32, i64);
