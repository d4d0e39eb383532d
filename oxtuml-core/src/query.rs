//! Predicate queries, the per-metaclass query cache and ordered result
//! sets.

use std::fmt;
use std::ops::{Add, Sub};

use indexmap::IndexSet;

use crate::ident::fold;
use crate::instance::{InstanceKey, InstanceRef};
use crate::model::MetaModel;
use crate::value::Value;

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                                 Query                                 ║
║                                 ¯¯¯¯¯                                 ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// The frozen, order-independent form of a predicate map. Names are folded
/// and sorted so repeated identical predicates share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct QueryKey(Vec<(String, Value)>);

impl QueryKey {
    pub(crate) fn new(normalized: &[(String, Value)]) -> Self {
        Self(normalized.to_vec())
    }
}

/// Normalizes a predicate map: folds names, sorts by name and keeps the
/// last value of a repeated name.
pub(crate) fn normalize_items(items: &[(String, Value)]) -> Vec<(String, Value)> {
    let mut normalized: Vec<(String, Value)> = Vec::with_capacity(items.len());
    for (name, value) in items {
        let folded = fold(name);
        match normalized.iter_mut().find(|(n, _)| *n == folded) {
            Some(slot) => slot.1 = value.clone(),
            None => normalized.push((folded, value.clone())),
        }
    }
    normalized.sort_by(|a, b| a.0.cmp(&b.0));
    normalized
}

/// A lazy, resumable query over a metaclass's instance pool.
///
/// An instance matches iff every named attribute equals the expected value
/// and is not null. The query keeps a materialized prefix of matches and a
/// cursor into the pool; executing again replays the prefix, then resumes
/// the scan. Pool mutation invalidates the cache entry holding the query,
/// so a resumed scan never observes a mutated pool.
#[derive(Debug, Clone)]
pub(crate) struct Query {
    items: Vec<(String, Value)>,
    matched: Vec<InstanceKey>,
    cursor: usize,
    exhausted: bool,
}

impl Query {
    pub(crate) fn new(items: Vec<(String, Value)>) -> Self {
        Self {
            items,
            matched: Vec::new(),
            cursor: 0,
            exhausted: false,
        }
    }

    /// Replays matched instances, then resumes evaluation over `pool`.
    /// Stops early once `limit` results have been produced, leaving the
    /// tail un-evaluated.
    pub(crate) fn execute(
        &mut self,
        model: &MetaModel,
        pool: &[InstanceKey],
        limit: Option<usize>,
    ) -> Vec<InstanceKey> {
        let mut out = Vec::new();
        let full = |out: &Vec<InstanceKey>| limit.is_some_and(|n| out.len() >= n);

        for &key in &self.matched {
            if full(&out) {
                return out;
            }
            out.push(key);
        }
        while !self.exhausted && !full(&out) {
            let Some(&key) = pool.get(self.cursor) else {
                self.exhausted = true;
                break;
            };
            self.cursor += 1;
            if self.matches(model, key) {
                self.matched.push(key);
                out.push(key);
            }
        }
        out
    }

    fn matches(&self, model: &MetaModel, key: InstanceKey) -> bool {
        self.items
            .iter()
            .all(|(name, expected)| model.predicate_matches(key, name, expected))
    }
}

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                                QuerySet                               ║
║                                ¯¯¯¯¯¯¯¯                               ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// An ordered set of instances, the result type of many-valued selection
/// and navigation. Preserves first-encounter order under union (`+`) and
/// difference (`-`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySet {
    items: IndexSet<InstanceKey>,
}

impl QuerySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The first element in the set.
    #[must_use]
    pub fn first(&self) -> Option<InstanceKey> {
        self.items.first().copied()
    }

    /// The last element in the set.
    #[must_use]
    pub fn last(&self) -> Option<InstanceKey> {
        self.items.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: InstanceKey) -> bool {
        self.items.contains(&key)
    }

    pub fn insert(&mut self, key: InstanceKey) -> bool {
        self.items.insert(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.items.iter().copied()
    }
}

impl FromIterator<InstanceKey> for QuerySet {
    fn from_iter<I: IntoIterator<Item = InstanceKey>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<InstanceKey> for QuerySet {
    fn extend<I: IntoIterator<Item = InstanceKey>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl IntoIterator for QuerySet {
    type Item = InstanceKey;
    type IntoIter = indexmap::set::IntoIter<InstanceKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuerySet {
    type Item = &'a InstanceKey;
    type IntoIter = indexmap::set::Iter<'a, InstanceKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Add for QuerySet {
    type Output = QuerySet;

    fn add(mut self, rhs: QuerySet) -> QuerySet {
        self.items.extend(rhs.items);
        self
    }
}

impl Sub for QuerySet {
    type Output = QuerySet;

    fn sub(mut self, rhs: QuerySet) -> QuerySet {
        self.items.retain(|key| !rhs.items.contains(key));
        self
    }
}

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                                 Where                                 ║
║                                 ¯¯¯¯¯                                 ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// A where-clause for selection.
///
/// Map predicates ([`Where::Eq`]) go through the per-metaclass query cache;
/// function predicates scan the pool directly, as in an action language
/// `where` expression.
pub enum Where<'a> {
    /// No filtering; every instance of the kind is selected.
    Any,
    /// Attribute-equality predicate: matches when each named attribute
    /// equals the value and is not null.
    Eq(Vec<(String, Value)>),
    /// An arbitrary predicate over an instance view.
    Pred(&'a dyn Fn(InstanceRef<'_>) -> bool),
}

impl fmt::Debug for Where<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Where::Any => f.write_str("Any"),
            Where::Eq(items) => f.debug_tuple("Eq").field(items).finish(),
            Where::Pred(_) => f.write_str("Pred(..)"),
        }
    }
}

impl From<Vec<(String, Value)>> for Where<'_> {
    fn from(items: Vec<(String, Value)>) -> Self {
        Where::Eq(items)
    }
}
