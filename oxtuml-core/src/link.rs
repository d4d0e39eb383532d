//! Directed halves of associations.
//!
//! A link connects one metaclass to another in a single direction and is
//! named for the side it yields: navigating a link produces instances of its
//! `to` metaclass. The phrase disambiguates direction when the association
//! is reflexive; cardinality constraints are carried as the `many` and
//! `conditional` flags.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::ident::{fold, RelId};
use crate::instance::InstanceKey;

/// The composite lookup key of a link on its owning metaclass:
/// (to-kind, relation id, phrase), folded.
pub(crate) type LinkKey = (String, RelId, String);

/// A unidirectional connector between two metaclasses.
///
/// Its state is a multimap from instances of the owning (`from`) metaclass
/// to the ordered set of their neighbors in the `to` metaclass. Neighbor
/// order is `connect` order.
#[derive(Debug, Clone)]
pub struct Link {
    from_kind: String,
    to_kind: String,
    rel_id: RelId,
    phrase: String,
    conditional: bool,
    many: bool,
    key_map: Vec<(String, String)>,
    neighbors: IndexMap<InstanceKey, IndexSet<InstanceKey>>,
}

impl Link {
    pub(crate) fn new(
        from_kind: String,
        rel_id: RelId,
        to_kind: String,
        phrase: String,
        conditional: bool,
        many: bool,
    ) -> Self {
        Self {
            from_kind,
            to_kind,
            rel_id,
            phrase,
            conditional,
            many,
            key_map: Vec::new(),
            neighbors: IndexMap::new(),
        }
    }

    /// The declared kind of the metaclass this link is registered on.
    #[must_use]
    pub fn from_kind(&self) -> &str {
        &self.from_kind
    }

    /// The resulting kind when the link is navigated.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.to_kind
    }

    #[must_use]
    pub fn rel_id(&self) -> &RelId {
        &self.rel_id
    }

    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    #[must_use]
    pub fn conditional(&self) -> bool {
        self.conditional
    }

    #[must_use]
    pub fn many(&self) -> bool {
        self.many
    }

    /// The cardinality string, for diagnostics and schema round-trips.
    ///
    /// `'1'` for exactly one, `'1C'` for at most one, `'M'` for one or more
    /// and `'MC'` for any number of instances.
    #[must_use]
    pub fn cardinality(&self) -> String {
        let mut s = String::from(if self.many { "M" } else { "1" });
        if self.conditional {
            s.push('C');
        }
        s
    }

    /// The formalized key map as folded (from-attribute, to-attribute)
    /// pairs, where *from* is the owning side.
    #[must_use]
    pub fn key_map(&self) -> &[(String, String)] {
        &self.key_map
    }

    pub(crate) fn set_key_map(&mut self, pairs: Vec<(String, String)>) {
        self.key_map = pairs;
    }

    pub(crate) fn lookup_key(&self) -> LinkKey {
        (
            fold(&self.to_kind),
            self.rel_id.clone(),
            fold(&self.phrase),
        )
    }

    /// Adds `b` to `a`'s neighbor set. Idempotent when `b` is already
    /// present. With `check` enabled the call is rejected (returns `false`)
    /// when the link is not many and `a` already has a neighbor.
    pub(crate) fn connect(&mut self, a: InstanceKey, b: InstanceKey, check: bool) -> bool {
        let set = self.neighbors.entry(a).or_default();
        if set.contains(&b) {
            return true;
        }
        if !set.is_empty() && !self.many && check {
            return false;
        }
        set.insert(b);
        true
    }

    /// Removes `b` from `a`'s neighbor set; returns whether anything
    /// changed.
    pub(crate) fn disconnect(&mut self, a: InstanceKey, b: InstanceKey) -> bool {
        match self.neighbors.get_mut(&a) {
            Some(set) => set.shift_remove(&b),
            None => false,
        }
    }

    /// Yields `a`'s current neighbors in connect order.
    pub fn navigate(&self, a: InstanceKey) -> impl Iterator<Item = InstanceKey> + '_ {
        self.neighbors
            .get(&a)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub(crate) fn first_neighbor(&self, a: InstanceKey) -> Option<InstanceKey> {
        self.neighbors.get(&a).and_then(|set| set.first().copied())
    }

    pub(crate) fn neighbor_count(&self, a: InstanceKey) -> usize {
        self.neighbors.get(&a).map_or(0, IndexSet::len)
    }

    pub(crate) fn contains(&self, a: InstanceKey, b: InstanceKey) -> bool {
        self.neighbors.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// All (from, to) edges currently held by the link.
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (InstanceKey, InstanceKey)> + '_ {
        self.neighbors
            .iter()
            .flat_map(|(&a, set)| set.iter().map(move |&b| (a, b)))
    }

    pub(crate) fn remove_from(&mut self, a: InstanceKey) {
        self.neighbors.shift_remove(&a);
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.phrase.is_empty() {
            write!(f, "{}->{}[{}]", self.from_kind, self.to_kind, self.rel_id)
        } else {
            write!(
                f,
                "{}->{}[{}, '{}']",
                self.from_kind, self.to_kind, self.rel_id, self.phrase
            )
        }
    }
}
