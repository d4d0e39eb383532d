//! Associations: pairs of opposing links plus their formalization.

use crate::ident::RelId;
use crate::link::LinkKey;

/// The address of a link: the folded kind of the metaclass it is registered
/// on, and its lookup key there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkId {
    pub(crate) owner: String,
    pub(crate) key: LinkKey,
}

/// An association connects two metaclasses to each other via two directed
/// links.
///
/// The *source* side is the dependent one: its referential attributes
/// (`source_keys`) mirror the identifying attributes (`target_keys`) on the
/// independent *target* side. The source link is registered on the target
/// metaclass and yields source instances; the target link is the opposite.
#[derive(Debug, Clone)]
pub struct Association {
    pub(crate) rel_id: RelId,
    pub(crate) source_keys: Vec<String>,
    pub(crate) target_keys: Vec<String>,
    pub(crate) source_link: LinkId,
    pub(crate) target_link: LinkId,
}

impl Association {
    #[must_use]
    pub fn rel_id(&self) -> &RelId {
        &self.rel_id
    }

    /// Referential attribute names on the dependent side, declared case.
    #[must_use]
    pub fn source_keys(&self) -> &[String] {
        &self.source_keys
    }

    /// Identifying attribute names on the independent side, declared case.
    #[must_use]
    pub fn target_keys(&self) -> &[String] {
        &self.target_keys
    }

    /// An association is reflexive iff both ends are the same metaclass.
    #[must_use]
    pub fn is_reflexive(&self) -> bool {
        self.source_link.owner == self.target_link.owner
    }
}

/// One end of an association under definition: the kind, its key list, the
/// cardinality flags and the phrase of the link *toward* that end.
#[derive(Debug, Clone)]
pub struct AssociationEnd {
    pub(crate) kind: String,
    pub(crate) keys: Vec<String>,
    pub(crate) many: bool,
    pub(crate) conditional: bool,
    pub(crate) phrase: String,
}

impl AssociationEnd {
    pub fn new<K, I, S>(kind: K, keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            many: false,
            conditional: false,
            phrase: String::new(),
        }
    }

    /// Marks the end as many-valued (`M` cardinality).
    #[must_use]
    pub fn many(mut self) -> Self {
        self.many = true;
        self
    }

    /// Marks the end as conditional (`C` suffix).
    #[must_use]
    pub fn conditional(mut self) -> Self {
        self.conditional = true;
        self
    }

    /// Sets the phrase naming this end of a reflexive association.
    #[must_use]
    pub fn phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrase = phrase.into();
        self
    }
}
