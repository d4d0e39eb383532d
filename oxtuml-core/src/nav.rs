//! Navigation chains over association links.
//!
//! A chain initializes a navigation from one or more instances and steps
//! across (kind, rel id, phrase) triples, shaped after the action-language
//! `select one other related by inst->Other[R4]` idiom. Two equivalent
//! surface forms are provided: the explicit [`NavChain::nav`] and the
//! builder pair [`NavChain::to`] / [`NavChain::across`].

use crate::error::UnknownLinkError;
use crate::ident::{fold, RelId};
use crate::instance::{InstanceKey, InstanceRef};
use crate::model::MetaModel;
use crate::query::QuerySet;

/// The starting handle of a navigation: an instance, a set of instances,
/// or absent.
#[derive(Debug, Clone, Default)]
pub enum Handle {
    #[default]
    None,
    One(InstanceKey),
    Many(Vec<InstanceKey>),
}

impl From<InstanceKey> for Handle {
    fn from(key: InstanceKey) -> Self {
        Handle::One(key)
    }
}

impl From<Option<InstanceKey>> for Handle {
    fn from(key: Option<InstanceKey>) -> Self {
        key.map_or(Handle::None, Handle::One)
    }
}

impl From<Vec<InstanceKey>> for Handle {
    fn from(keys: Vec<InstanceKey>) -> Self {
        Handle::Many(keys)
    }
}

impl From<QuerySet> for Handle {
    fn from(set: QuerySet) -> Self {
        Handle::Many(set.iter().collect())
    }
}

impl From<&QuerySet> for Handle {
    fn from(set: &QuerySet) -> Self {
        Handle::Many(set.iter().collect())
    }
}

/// A link selector for [`NavChain::across`]: a rel id, optionally paired
/// with a phrase for reflexive associations.
#[derive(Debug, Clone)]
pub struct LinkSpec {
    pub rel_id: RelId,
    pub phrase: String,
}

macro_rules! impl_link_spec_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LinkSpec {
                fn from(rel: $ty) -> Self {
                    Self {
                        rel_id: rel.into(),
                        phrase: String::new(),
                    }
                }
            }
            impl From<($ty, &str)> for LinkSpec {
                fn from((rel, phrase): ($ty, &str)) -> Self {
                    Self {
                        rel_id: rel.into(),
                        phrase: phrase.to_string(),
                    }
                }
            }
        )*
    };
}
impl_link_spec_from!(u16, u32, u64, usize, i16, i32, i64, &str, RelId);

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                                NavChain                               ║
║                                ¯¯¯¯¯¯¯¯                               ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// A composable navigation pipeline over a metamodel.
///
/// Terminate with [`one`](NavChain::one) (or [`any`](NavChain::any)) for a
/// single instance, or [`many`](NavChain::many) for a [`QuerySet`]
/// preserving first-encounter order.
#[derive(Debug, Clone)]
pub struct NavChain<'m> {
    model: &'m MetaModel,
    handle: Vec<InstanceKey>,
    kind: Option<String>,
}

impl<'m> NavChain<'m> {
    pub fn new(model: &'m MetaModel, handle: impl Into<Handle>) -> Self {
        let handle = match handle.into() {
            Handle::None => Vec::new(),
            Handle::One(key) => vec![key],
            Handle::Many(keys) => keys,
        };
        Self {
            model,
            handle,
            kind: None,
        }
    }

    /// Steps across a link, keeping encounter order. Duplicates are kept;
    /// the `many` terminal folds them into set order.
    ///
    /// # Errors
    /// Returns [`UnknownLinkError`] when the (kind, rel id, phrase) triple
    /// is not registered on some instance's class, e.g. when the phrase is
    /// omitted for a reflexive association.
    pub fn nav(
        mut self,
        kind: &str,
        rel_id: impl Into<RelId>,
        phrase: &str,
    ) -> Result<Self, UnknownLinkError> {
        let rel = rel_id.into();
        let mut next = Vec::new();
        for inst in &self.handle {
            next.extend(self.model.navigate(*inst, kind, rel.clone(), phrase)?);
        }
        self.handle = next;
        self.kind = None;
        Ok(self)
    }

    /// Selects the kind for the next step, e.g. `chain.to("Person")`.
    #[must_use]
    pub fn to(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    /// Steps across the link named by a rel id, optionally with a phrase:
    /// `chain.to("Person").across(1)` or `.across((2, "parent"))`.
    ///
    /// # Errors
    /// Returns [`UnknownLinkError`] like [`NavChain::nav`].
    ///
    /// # Panics
    /// Panics when no kind was selected with [`NavChain::to`].
    pub fn across(self, link: impl Into<LinkSpec>) -> Result<Self, UnknownLinkError> {
        let spec = link.into();
        let kind = self
            .kind
            .clone()
            .expect("no kind selected for navigation step");
        self.nav(&kind, spec.rel_id, &spec.phrase)
    }

    /// The first instance reached, or `None`.
    #[must_use]
    pub fn one(self) -> Option<InstanceKey> {
        self.handle.into_iter().next()
    }

    /// Alias of [`NavChain::one`], for one-to-many reads where any element
    /// will do.
    #[must_use]
    pub fn any(self) -> Option<InstanceKey> {
        self.one()
    }

    /// The first instance satisfying a where-clause, or `None`.
    #[must_use]
    pub fn one_where(self, pred: impl Fn(InstanceRef<'_>) -> bool) -> Option<InstanceKey> {
        let model = self.model;
        self.handle
            .into_iter()
            .find(|&key| pred(InstanceRef::new(model, key)))
    }

    /// Every instance reached, as an ordered set.
    #[must_use]
    pub fn many(self) -> QuerySet {
        self.handle.into_iter().collect()
    }

    /// Every instance satisfying a where-clause, as an ordered set.
    #[must_use]
    pub fn many_where(self, pred: impl Fn(InstanceRef<'_>) -> bool) -> QuerySet {
        let model = self.model;
        self.handle
            .into_iter()
            .filter(|&key| pred(InstanceRef::new(model, key)))
            .collect()
    }
}

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                          subtype / reflexive                          ║
║                          ¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯                          ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// Navigates from a supertype instance to its subtype across a rel id.
/// Every link on the supertype's class with a matching rel id is tried in
/// definition order; the first resulting instance wins.
///
/// # Errors
/// Returns [`UnknownLinkError`] when a candidate link cannot be navigated
/// without a phrase; sub/supertype associations never carry one.
pub fn navigate_subtype(
    model: &MetaModel,
    supertype: impl Into<Option<InstanceKey>>,
    rel_id: impl Into<RelId>,
) -> Result<Option<InstanceKey>, UnknownLinkError> {
    let Some(supertype) = supertype.into() else {
        return Ok(None);
    };
    let Some(record) = model.instance(supertype) else {
        return Ok(None);
    };
    let rel = rel_id.into();
    let metaclass = match model.metaclass(record.kind()) {
        Ok(metaclass) => metaclass,
        Err(_) => return Ok(None),
    };
    let kinds: Vec<String> = metaclass
        .links()
        .filter(|link| link.rel_id() == &rel)
        .map(|link| link.kind().to_string())
        .collect();
    for kind in kinds {
        let subtype = NavChain::new(model, supertype)
            .nav(&kind, rel.clone(), "")?
            .one();
        if subtype.is_some() {
            return Ok(subtype);
        }
    }
    Ok(None)
}

/// Sequences a set of instances in the order they appear across a
/// conditional, reflexive association. The first instance of the result is
/// not associated to anything across the given phrase; a fully cyclic set
/// starts from its first element and yields every element exactly once.
///
/// # Errors
/// Returns [`UnknownLinkError`] when the class has no opposing link for
/// the rel id and phrase.
pub fn sort_reflexive(
    model: &MetaModel,
    set: &QuerySet,
    rel_id: impl Into<RelId>,
    phrase: &str,
) -> Result<QuerySet, UnknownLinkError> {
    let Some(first) = set.first() else {
        return Ok(QuerySet::new());
    };
    let Some(record) = model.instance(first) else {
        return Ok(QuerySet::new());
    };
    let kind = record.kind().to_string();
    let rel = rel_id.into();
    let metaclass = model.metaclass(&kind).map_err(|_| UnknownLinkError {
        from_kind: kind.clone(),
        to_kind: kind.clone(),
        rel_id: rel.clone(),
        phrase: phrase.to_string(),
    })?;

    // the phrase in the other direction
    let folded_kind = fold(&kind);
    let folded_phrase = fold(phrase);
    let other_phrase = metaclass
        .links()
        .find(|link| {
            fold(link.kind()) == folded_kind
                && link.rel_id() == &rel
                && fold(link.phrase()) != folded_phrase
        })
        .map(|link| link.phrase().to_string())
        .ok_or_else(|| UnknownLinkError {
            from_kind: kind.clone(),
            to_kind: kind.clone(),
            rel_id: rel.clone(),
            phrase: phrase.to_string(),
        })?;

    let mut heads = Vec::new();
    for inst in set.iter() {
        if model.navigate(inst, &kind, rel.clone(), phrase)?.is_empty() {
            heads.push(inst);
        }
    }
    if heads.is_empty() {
        // the instance sequence is cyclic, start anywhere
        heads.push(first);
    }

    let mut ordered = QuerySet::new();
    for head in heads {
        let mut cursor = Some(head);
        while let Some(inst) = cursor {
            ordered.insert(inst);
            cursor = model
                .navigate(inst, &kind, rel.clone(), &other_phrase)?
                .first()
                .copied();
            if cursor == Some(head) {
                break;
            }
        }
    }
    Ok(ordered)
}
