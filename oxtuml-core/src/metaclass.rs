//! Metaclasses: per-kind schema, link table, instance pool and query cache.

use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};

use crate::error::UnknownTypeError;
use crate::ident::{fold, RelId};
use crate::instance::InstanceKey;
use crate::link::{Link, LinkKey};
use crate::query::{Query, QueryKey};
use crate::value::TypeName;

/// One attribute of a metaclass: its declared name and declared type
/// spelling. The spelling is kept verbatim so schema synonyms survive a
/// round-trip; [`Attribute::resolve`] maps it to a primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub ty: String,
}

impl Attribute {
    /// Resolves the declared type spelling to a primitive [`TypeName`].
    ///
    /// # Errors
    /// Returns [`UnknownTypeError`] for spellings outside the type system.
    pub fn resolve(&self) -> Result<TypeName, UnknownTypeError> {
        TypeName::resolve(&self.ty)
    }
}

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                               MetaClass                               ║
║                               ¯¯¯¯¯¯¯¯¯                               ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// A metaclass holds the metadata for one kind of instance — the ordered
/// attribute list, unique identifiers and outgoing links — along with the
/// kind's instance pool and query cache.
#[derive(Debug, Clone)]
pub struct MetaClass {
    kind: String,
    attributes: Vec<Attribute>,
    referential_attributes: IndexSet<String>,
    identifying_attributes: IndexSet<String>,
    indices: IndexMap<String, Vec<String>>,
    links: IndexMap<LinkKey, Link>,
    pool: Vec<InstanceKey>,
    cache: AHashMap<QueryKey, Query>,
}

impl MetaClass {
    pub(crate) fn new(kind: String) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            referential_attributes: IndexSet::new(),
            identifying_attributes: IndexSet::new(),
            indices: IndexMap::new(),
            links: IndexMap::new(),
            pool: Vec::new(),
            cache: AHashMap::new(),
        }
    }

    /// The declared kind (key letter) of the class.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The attributes in schema order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// An ordered list of all attribute names.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Finds an attribute by name, case-insensitive.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        let folded = fold(name);
        self.attributes.iter().find(|a| fold(&a.name) == folded)
    }

    /// The declared type of an attribute, case-insensitive.
    #[must_use]
    pub fn attribute_type(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.ty.as_str())
    }

    /// Appends an attribute at the end of the list of attributes.
    ///
    /// Schema edits are meaningful only before instances exist; existing
    /// instances fall back to the type's null value for the new attribute.
    pub fn append_attribute(&mut self, name: impl Into<String>, ty: impl Into<String>) {
        self.attributes.push(Attribute {
            name: name.into(),
            ty: ty.into(),
        });
    }

    /// Inserts an attribute at some position in the list of attributes.
    pub fn insert_attribute(
        &mut self,
        index: usize,
        name: impl Into<String>,
        ty: impl Into<String>,
    ) {
        let index = index.min(self.attributes.len());
        self.attributes.insert(
            index,
            Attribute {
                name: name.into(),
                ty: ty.into(),
            },
        );
    }

    /// Deletes an attribute by name; returns whether one was removed.
    pub fn delete_attribute(&mut self, name: &str) -> bool {
        let folded = fold(name);
        match self.attributes.iter().position(|a| fold(&a.name) == folded) {
            Some(index) => {
                self.attributes.remove(index);
                true
            }
            None => false,
        }
    }

    /// Registers an outgoing link under its (to-kind, rel id, phrase) key.
    /// A duplicate key overwrites the previous link.
    pub(crate) fn add_link(
        &mut self,
        to_kind: String,
        rel_id: RelId,
        phrase: String,
        conditional: bool,
        many: bool,
    ) -> &mut Link {
        let link = Link::new(
            self.kind.clone(),
            rel_id,
            to_kind,
            phrase,
            conditional,
            many,
        );
        let key = link.lookup_key();
        self.links.insert(key.clone(), link);
        &mut self.links[&key]
    }

    /// Finds a link with a given rel id and phrase that yields instances of
    /// some kind.
    #[must_use]
    pub fn find_link(&self, kind: &str, rel_id: impl Into<RelId>, phrase: &str) -> Option<&Link> {
        let key = (fold(kind), rel_id.into(), fold(phrase));
        self.links.get(&key)
    }

    pub(crate) fn link(&self, key: &LinkKey) -> Option<&Link> {
        self.links.get(key)
    }

    pub(crate) fn link_mut(&mut self, key: &LinkKey) -> Option<&mut Link> {
        self.links.get_mut(key)
    }

    /// The outgoing links in definition order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// The named unique identifiers: identifier name to the ordered tuple
    /// of attribute names that compose it.
    #[must_use]
    pub fn indices(&self) -> &IndexMap<String, Vec<String>> {
        &self.indices
    }

    pub(crate) fn add_index(&mut self, name: String, attributes: Vec<String>) {
        for attribute in &attributes {
            self.identifying_attributes.insert(fold(attribute));
        }
        self.indices.insert(name, attributes);
    }

    /// Folded names of attributes that mirror an identifying attribute on
    /// the other side of some association.
    pub fn referential_attributes(&self) -> impl Iterator<Item = &str> {
        self.referential_attributes.iter().map(String::as_str)
    }

    /// Folded names of attributes taking part in some unique identifier or
    /// formalized association.
    pub fn identifying_attributes(&self) -> impl Iterator<Item = &str> {
        self.identifying_attributes.iter().map(String::as_str)
    }

    pub(crate) fn is_referential(&self, folded: &str) -> bool {
        self.referential_attributes.contains(folded)
    }

    pub(crate) fn mark_referential(&mut self, folded: String) {
        self.referential_attributes.insert(folded);
    }

    pub(crate) fn mark_identifying(&mut self, folded: String) {
        self.identifying_attributes.insert(folded);
    }

    /// The instance pool in insertion order.
    #[must_use]
    pub fn instances(&self) -> &[InstanceKey] {
        &self.pool
    }

    pub(crate) fn pool_mut(&mut self) -> &mut Vec<InstanceKey> {
        &mut self.pool
    }

    /// Drops every cached query. Called on any mutation of the pool or of
    /// an instance attribute.
    pub(crate) fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub(crate) fn take_cached(&mut self, key: &QueryKey) -> Option<Query> {
        self.cache.remove(key)
    }

    pub(crate) fn store_cached(&mut self, key: QueryKey, query: Query) {
        self.cache.insert(key, query);
    }

    /// Picks the link a referential attribute reads through: the first
    /// outgoing link whose key map covers the attribute, preferring
    /// unconditional links the way formalization binds them.
    pub(crate) fn referential_link(&self, folded: &str) -> Option<(&Link, &str)> {
        let covering = |link: &&Link| {
            link.key_map()
                .iter()
                .any(|(from, _)| from == folded)
        };
        fn mapped<'a>(link: &'a Link, folded: &str) -> Option<&'a str> {
            link.key_map()
                .iter()
                .find(|(from, _)| from == folded)
                .map(|(_, to)| to.as_str())
        }
        if let Some(link) = self.links.values().filter(covering).find(|l| !l.conditional()) {
            return mapped(link, folded).map(|to| (link, to));
        }
        let link = self.links.values().find(covering)?;
        mapped(link, folded).map(|to| (link, to))
    }
}
