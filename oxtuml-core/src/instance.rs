//! Instance records and the borrowed instance view.

use std::fmt;

use indexmap::IndexMap;
use slotmap::new_key_type;

use crate::model::MetaModel;
use crate::value::Value;

new_key_type! {
    /// A unique, generational identifier for an instance in a metamodel's
    /// arena. Keys of deleted instances never resolve again.
    pub struct InstanceKey;
}

/// The stored record of one instance: the folded kind of its metaclass and
/// the raw attribute values, keyed by folded attribute name.
///
/// Referential attributes are usually not present here — the link edges are
/// the truth and reads are computed views. A raw entry for a referential
/// attribute only exists when the value was assigned before the attribute
/// was formalized; `relate`/`unrelate` clear such leftovers.
#[derive(Debug, Clone)]
pub(crate) struct Instance {
    pub(crate) kind: String,
    values: IndexMap<String, Value>,
}

impl Instance {
    pub(crate) fn new(kind: String) -> Self {
        Self {
            kind,
            values: IndexMap::new(),
        }
    }

    pub(crate) fn raw(&self, folded: &str) -> Option<&Value> {
        self.values.get(folded)
    }

    pub(crate) fn set_raw(&mut self, folded: String, value: Value) {
        self.values.insert(folded, value);
    }

    pub(crate) fn clear_raw(&mut self, folded: &str) -> Option<Value> {
        self.values.shift_remove(folded)
    }
}

/// A borrowed view of an instance, resolving attribute reads through the
/// metamodel so referential attributes follow their links.
#[derive(Clone, Copy)]
pub struct InstanceRef<'m> {
    model: &'m MetaModel,
    key: InstanceKey,
}

impl<'m> InstanceRef<'m> {
    pub(crate) fn new(model: &'m MetaModel, key: InstanceKey) -> Self {
        Self { model, key }
    }

    #[must_use]
    pub fn key(self) -> InstanceKey {
        self.key
    }

    /// The declared kind of the instance's metaclass.
    #[must_use]
    pub fn kind(self) -> &'m str {
        self.model.kind_of(self.key).unwrap_or("")
    }

    /// The current value of an attribute, case-insensitive. `None` when the
    /// name is not an attribute of the class and carries no raw value.
    #[must_use]
    pub fn attr(self, name: &str) -> Option<Value> {
        self.model.attr(self.key, name)
    }

    /// Whether an attribute currently holds the null representation of its
    /// type.
    #[must_use]
    pub fn is_null(self, name: &str) -> bool {
        self.model.attr_is_null(self.key, name)
    }
}

impl fmt::Display for InstanceRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind())?;
        if let Ok(metaclass) = self.model.metaclass(self.kind()) {
            let mut first = true;
            for attribute in metaclass.attributes() {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                match self.attr(&attribute.name) {
                    Some(value) => write!(f, "{}={value}", attribute.name)?,
                    None => write!(f, "{}=<absent>", attribute.name)?,
                }
            }
        }
        write!(f, ")")
    }
}

impl fmt::Debug for InstanceRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
