//! The metamodel: metaclasses, associations, the instance arena and every
//! operation that crosses class boundaries.
//!
//! A metamodel is built by defining classes, unique identifiers and
//! associations, then populated with instances and mutated through
//! `relate`/`unrelate`. All identifiers — kinds, attribute names,
//! association ids, phrases — are case insensitive.

use indexmap::{IndexMap, IndexSet};
use slotmap::SlotMap;

use crate::association::{Association, AssociationEnd, LinkId};
use crate::check;
use crate::error::{
    DeleteError, DuplicateClassError, Error, RelateError, UnknownClassError, UnknownLinkError,
    UnrelateError,
};
use crate::id::{IdGenerator, UuidGenerator};
use crate::ident::{fold, IndexName, RelId};
use crate::instance::{Instance, InstanceKey, InstanceRef};
use crate::link::{Link, LinkKey};
use crate::metaclass::{Attribute, MetaClass};
use crate::query::{normalize_items, Query, QueryKey, QuerySet, Where};
use crate::value::{TypeName, Value};

use either::Either;

/*
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
╔═══════════════════════════════════════════════════════════════════════╗
║                               MetaModel                               ║
║                               ¯¯¯¯¯¯¯¯¯                               ║
╚═══════════════════════════════════════════════════════════════════════╝
░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
*/

/// A metamodel contains metaclasses with associations between them, and
/// owns the arena every instance lives in.
#[derive(Debug, Clone)]
pub struct MetaModel {
    metaclasses: IndexMap<String, MetaClass>,
    associations: Vec<Association>,
    instances: SlotMap<InstanceKey, Instance>,
    id_generator: Box<dyn IdGenerator>,
}

impl Default for MetaModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaModel {
    /// Creates a new, empty metamodel backed by the default UUID id
    /// generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(UuidGenerator))
    }

    /// Creates a new, empty metamodel with a caller-provided id generator.
    #[must_use]
    pub fn with_id_generator(id_generator: Box<dyn IdGenerator>) -> Self {
        Self {
            metaclasses: IndexMap::new(),
            associations: Vec::new(),
            instances: SlotMap::with_key(),
            id_generator,
        }
    }

    /*
    ───────────────────────────── schema ─────────────────────────────
    */

    /// Defines a new class in the metamodel and returns its metaclass.
    ///
    /// # Errors
    /// Returns [`DuplicateClassError`] when a class of the kind already
    /// exists, folding case.
    pub fn define_class<N, T>(
        &mut self,
        kind: &str,
        attributes: impl IntoIterator<Item = (N, T)>,
    ) -> Result<&mut MetaClass, DuplicateClassError>
    where
        N: Into<String>,
        T: Into<String>,
    {
        let folded = fold(kind);
        if self.metaclasses.contains_key(&folded) {
            return Err(DuplicateClassError {
                kind: kind.to_string(),
            });
        }
        let mut metaclass = MetaClass::new(kind.to_string());
        for (name, ty) in attributes {
            metaclass.append_attribute(name, ty);
        }
        self.metaclasses.insert(folded.clone(), metaclass);
        Ok(&mut self.metaclasses[&folded])
    }

    /// Finds a metaclass of some kind.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when the kind is not registered.
    pub fn metaclass(&self, kind: &str) -> Result<&MetaClass, UnknownClassError> {
        self.metaclasses
            .get(&fold(kind))
            .ok_or_else(|| UnknownClassError {
                kind: kind.to_string(),
            })
    }

    /// Mutable access to a metaclass, for schema edits.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when the kind is not registered.
    pub fn metaclass_mut(&mut self, kind: &str) -> Result<&mut MetaClass, UnknownClassError> {
        self.metaclasses
            .get_mut(&fold(kind))
            .ok_or_else(|| UnknownClassError {
                kind: kind.to_string(),
            })
    }

    /// The metaclasses in definition order.
    pub fn metaclasses(&self) -> impl Iterator<Item = &MetaClass> {
        self.metaclasses.values()
    }

    /// The associations in definition order.
    #[must_use]
    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Resolves an association's (source, target) link pair.
    #[must_use]
    pub fn association_links(&self, association: &Association) -> (&Link, &Link) {
        (
            self.link_by_id(&association.source_link),
            self.link_by_id(&association.target_link),
        )
    }

    /// Defines a unique identifier for some kind of class based on named
    /// attributes. An empty attribute list is a no-op.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when the kind is not registered.
    pub fn define_unique_identifier(
        &mut self,
        kind: &str,
        name: impl Into<IndexName>,
        attributes: &[&str],
    ) -> Result<(), UnknownClassError> {
        if attributes.is_empty() {
            return Ok(());
        }
        let folded = self.ensure_class(kind)?;
        let name = name.into();
        self.metaclasses
            .get_mut(&folded)
            .unwrap()
            .add_index(name.folded(), attributes.iter().map(ToString::to_string).collect());
        Ok(())
    }

    /// Defines an association between two kinds of classes.
    ///
    /// The `source` end is the dependent one: its key attributes become
    /// referential and mirror the `target` end's identifying keys. Both
    /// links are registered, the key maps are formalized and a batch-relate
    /// pass reconciles any instances that were loaded before the
    /// association existed.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when either kind is not registered.
    pub fn define_association(
        &mut self,
        rel_id: impl Into<RelId>,
        source: AssociationEnd,
        target: AssociationEnd,
    ) -> Result<&Association, UnknownClassError> {
        let rel = rel_id.into();
        let source_fold = self.ensure_class(&source.kind)?;
        let target_fold = self.ensure_class(&target.kind)?;
        let source_decl = self.metaclasses[&source_fold].kind().to_string();
        let target_decl = self.metaclasses[&target_fold].kind().to_string();

        // The source link lives on the target class and yields source
        // instances; its key map runs target keys -> source keys.
        let source_key = {
            let metaclass = self.metaclasses.get_mut(&target_fold).unwrap();
            let link = metaclass.add_link(
                source_decl.clone(),
                rel.clone(),
                source.phrase.clone(),
                source.conditional,
                source.many,
            );
            link.set_key_map(
                target
                    .keys
                    .iter()
                    .zip(&source.keys)
                    .map(|(t, s)| (fold(t), fold(s)))
                    .collect(),
            );
            link.lookup_key()
        };
        let target_key = {
            let metaclass = self.metaclasses.get_mut(&source_fold).unwrap();
            let link = metaclass.add_link(
                target_decl,
                rel.clone(),
                target.phrase.clone(),
                target.conditional,
                target.many,
            );
            link.set_key_map(
                source
                    .keys
                    .iter()
                    .zip(&target.keys)
                    .map(|(s, t)| (fold(s), fold(t)))
                    .collect(),
            );
            link.lookup_key()
        };

        {
            let metaclass = self.metaclasses.get_mut(&source_fold).unwrap();
            for key in &source.keys {
                metaclass.mark_referential(fold(key));
            }
        }
        {
            let metaclass = self.metaclasses.get_mut(&target_fold).unwrap();
            for key in &target.keys {
                metaclass.mark_identifying(fold(key));
            }
        }

        self.associations.push(Association {
            rel_id: rel,
            source_keys: source.keys,
            target_keys: target.keys,
            source_link: LinkId {
                owner: target_fold,
                key: source_key,
            },
            target_link: LinkId {
                owner: source_fold,
                key: target_key,
            },
        });
        let index = self.associations.len() - 1;
        self.batch_relate(index);
        Ok(&self.associations[index])
    }

    /// Connects every pre-existing source instance to the target instances
    /// its referential values resolve to. Cardinality is not checked here;
    /// the integrity checker reports loads that violate it.
    fn batch_relate(&mut self, index: usize) {
        let association = self.associations[index].clone();
        let key_pairs: Vec<(String, String)> = association
            .source_keys
            .iter()
            .zip(&association.target_keys)
            .map(|(s, t)| (fold(s), fold(t)))
            .collect();
        let source_pool: Vec<InstanceKey> = self.metaclasses[&association.target_link.owner]
            .instances()
            .to_vec();

        for inst in source_pool {
            let mut lookup: Vec<(String, Value)> = Vec::with_capacity(key_pairs.len());
            for (source_key, target_key) in &key_pairs {
                let Some(value) = self.attr(inst, source_key) else {
                    lookup.clear();
                    break;
                };
                lookup.push((target_key.clone(), value));
            }
            if lookup.is_empty() {
                continue;
            }
            let matches = self.query_folded(&association.source_link.owner, &lookup, None);
            for other in matches {
                self.link_by_id_mut(&association.source_link)
                    .connect(other, inst, false);
                self.link_by_id_mut(&association.target_link)
                    .connect(inst, other, false);
            }
        }
        self.invalidate(&association.source_link.owner);
        self.invalidate(&association.target_link.owner);
    }

    /*
    ──────────────────────────── instances ────────────────────────────
    */

    /// Creates and returns a new instance of some kind.
    ///
    /// Non-referential attributes receive their primitive defaults (fresh
    /// ids for `UNIQUE_ID`). Positional values bind to attributes in schema
    /// order, named values follow. Values for referential attributes are
    /// deferred and realized by relating the new instance to every matching
    /// partner; a value that cannot be realized is logged as a warning, not
    /// an error.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] for an unknown kind, [`UnknownTypeError`]
    /// (via [`Error`]) when a defaulted attribute has an unresolvable type,
    /// and [`RelateError`] when a deferred referential value would violate
    /// cardinality.
    pub fn new_instance(
        &mut self,
        kind: &str,
        positional: Vec<Value>,
        named: Vec<(String, Value)>,
    ) -> Result<InstanceKey, Error> {
        let folded = fold(kind);
        if !self.metaclasses.contains_key(&folded) {
            return Err(UnknownClassError {
                kind: kind.to_string(),
            }
            .into());
        }
        let key = self.instances.insert(Instance::new(folded.clone()));
        {
            let metaclass = self.metaclasses.get_mut(&folded).unwrap();
            metaclass.invalidate();
            metaclass.pool_mut().push(key);
        }
        match self.init_instance(key, &folded, positional, named) {
            Ok(()) => Ok(key),
            Err(err) => {
                let _ = self.delete(key);
                Err(err)
            }
        }
    }

    fn init_instance(
        &mut self,
        key: InstanceKey,
        folded_kind: &str,
        positional: Vec<Value>,
        named: Vec<(String, Value)>,
    ) -> Result<(), Error> {
        let attributes: Vec<Attribute> = self.metaclasses[folded_kind].attributes().to_vec();
        let referential: IndexSet<String> = {
            let metaclass = &self.metaclasses[folded_kind];
            attributes
                .iter()
                .map(|a| fold(&a.name))
                .filter(|folded| metaclass.is_referential(folded))
                .collect()
        };

        for attribute in &attributes {
            let folded = fold(&attribute.name);
            if referential.contains(&folded) {
                continue;
            }
            let ty = attribute.resolve()?;
            let value = match ty {
                TypeName::UniqueId => Value::UniqueId(self.id_generator.next_id()),
                other => Value::null_of(other),
            };
            self.instances[key].set_raw(folded, value);
        }

        let mut deferred: IndexMap<String, Value> = IndexMap::new();
        for (attribute, value) in attributes.iter().zip(positional) {
            let folded = fold(&attribute.name);
            if referential.contains(&folded) {
                deferred.insert(folded, value);
            } else {
                let value = match attribute.resolve() {
                    Ok(ty) => value.coerce(ty),
                    Err(_) => value,
                };
                self.instances[key].set_raw(folded, value);
            }
        }
        for (name, value) in named {
            let folded = fold(&name);
            if referential.contains(&folded) {
                deferred.insert(folded, value);
            } else {
                let ty = attributes
                    .iter()
                    .find(|a| fold(&a.name) == folded)
                    .and_then(|a| a.resolve().ok());
                let value = match ty {
                    Some(ty) => value.coerce(ty),
                    None => value,
                };
                self.instances[key].set_raw(folded, value);
            }
        }

        if deferred.is_empty() {
            return Ok(());
        }

        // Batch-relate across every link whose key map is fully covered by
        // the supplied referential values.
        let snapshots: Vec<(RelId, String, String, Vec<(String, String)>)> = self.metaclasses
            [folded_kind]
            .links()
            .map(|link| {
                (
                    link.rel_id().clone(),
                    link.phrase().to_string(),
                    fold(link.kind()),
                    link.key_map().to_vec(),
                )
            })
            .collect();
        for (rel, phrase, to_kind, key_map) in snapshots {
            if key_map.is_empty() {
                continue;
            }
            if key_map.iter().any(|(from, _)| !deferred.contains_key(from)) {
                continue;
            }
            let lookup: Vec<(String, Value)> = key_map
                .iter()
                .map(|(from, to)| (to.clone(), deferred[from].clone()))
                .collect();
            for other in self.query_folded(&to_kind, &lookup, None) {
                self.relate(other, key, rel.clone(), &phrase)
                    .map_err(Error::from)?;
            }
        }

        for (name, supplied) in &deferred {
            let expected = match self.declared_type(key, name) {
                Some(ty) => supplied.clone().coerce(ty),
                None => supplied.clone(),
            };
            if self.attr(key, name).as_ref() != Some(&expected) {
                tracing::warn!(
                    attribute = %name,
                    instance = %InstanceRef::new(self, key),
                    "unable to assign referential value"
                );
            }
        }
        Ok(())
    }

    /// Creates a shallow clone of an instance. The clone copies attribute
    /// by attribute through the computed views, so a related original
    /// yields a clone related to the same partners.
    ///
    /// # Errors
    /// Returns [`DeleteError`] (via [`Error`]) for a stale key, and
    /// whatever [`MetaModel::new_instance`] can raise.
    pub fn clone_instance(&mut self, original: InstanceKey) -> Result<InstanceKey, Error> {
        let Some(record) = self.instances.get(original) else {
            return Err(DeleteError.into());
        };
        let folded = record.kind.clone();
        let metaclass = &self.metaclasses[&folded];
        let kind = metaclass.kind().to_string();
        let names: Vec<String> = metaclass
            .attributes()
            .iter()
            .map(|a| a.name.clone())
            .collect();
        let named: Vec<(String, Value)> = names
            .iter()
            .filter_map(|name| self.attr(original, name).map(|value| (name.clone(), value)))
            .collect();
        self.new_instance(&kind, Vec::new(), named)
    }

    /// Deletes an instance from its metaclass's pool and scrubs every edge
    /// it takes part in.
    ///
    /// # Errors
    /// Returns [`DeleteError`] when the instance is not in the pool.
    pub fn delete(&mut self, key: InstanceKey) -> Result<(), DeleteError> {
        let Some(record) = self.instances.get(key) else {
            return Err(DeleteError);
        };
        let folded = record.kind.clone();
        let Some(metaclass) = self.metaclasses.get(&folded) else {
            return Err(DeleteError);
        };
        let Some(position) = metaclass.instances().iter().position(|&k| k == key) else {
            return Err(DeleteError);
        };

        let link_keys: Vec<LinkKey> = metaclass.links().map(Link::lookup_key).collect();
        for link_key in link_keys {
            let neighbors: Vec<InstanceKey> = self.metaclasses[&folded]
                .link(&link_key)
                .unwrap()
                .navigate(key)
                .collect();
            let own = LinkId {
                owner: folded.clone(),
                key: link_key.clone(),
            };
            if let Some(opposing) = self.opposing_link(&own) {
                for neighbor in neighbors {
                    self.link_by_id_mut(&opposing).disconnect(neighbor, key);
                }
                self.invalidate(&opposing.owner);
            }
            self.metaclasses
                .get_mut(&folded)
                .unwrap()
                .link_mut(&link_key)
                .unwrap()
                .remove_from(key);
        }

        let metaclass = self.metaclasses.get_mut(&folded).unwrap();
        metaclass.pool_mut().remove(position);
        metaclass.invalidate();
        self.instances.remove(key);
        Ok(())
    }

    /// A borrowed view of an instance, or `None` for a stale key.
    #[must_use]
    pub fn instance(&self, key: InstanceKey) -> Option<InstanceRef<'_>> {
        self.instances.get(key).map(|_| InstanceRef::new(self, key))
    }

    #[must_use]
    pub fn contains(&self, key: InstanceKey) -> bool {
        self.instances.contains_key(key)
    }

    /// Every instance in the metamodel: class definition order, then pool
    /// order.
    pub fn instances(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.metaclasses
            .values()
            .flat_map(|metaclass| metaclass.instances().iter().copied())
    }

    /// The declared kind of an instance's metaclass.
    #[must_use]
    pub fn kind_of(&self, key: InstanceKey) -> Option<&str> {
        let record = self.instances.get(key)?;
        self.metaclasses.get(&record.kind).map(MetaClass::kind)
    }

    /*
    ──────────────────────────── attributes ────────────────────────────
    */

    /// The current value of an instance attribute, case-insensitive.
    ///
    /// Referential attributes are computed views: the read follows the
    /// formalized link to the neighbor's identifying attribute, resolving
    /// recursively through chained associations. An unlinked referential
    /// attribute falls back to a value assigned before formalization, and
    /// finally to the null representation of its type.
    #[must_use]
    pub fn attr(&self, key: InstanceKey, name: &str) -> Option<Value> {
        let record = self.instances.get(key)?;
        let folded = fold(name);
        let Some(metaclass) = self.metaclasses.get(&record.kind) else {
            return record.raw(&folded).cloned();
        };
        let Some(attribute) = metaclass.attribute(&folded) else {
            return record.raw(&folded).cloned();
        };
        if metaclass.is_referential(&folded) {
            if let Some((link, to_attr)) = metaclass.referential_link(&folded) {
                if let Some(neighbor) = link.first_neighbor(key) {
                    let to_attr = to_attr.to_string();
                    return self.attr(neighbor, &to_attr);
                }
            }
            if let Some(raw) = record.raw(&folded) {
                return Some(raw.clone());
            }
            return attribute.resolve().ok().map(Value::null_of);
        }
        match record.raw(&folded) {
            Some(value) => Some(value.clone()),
            None => attribute.resolve().ok().map(Value::null_of),
        }
    }

    /// Whether an attribute currently holds the null representation of its
    /// declared type. Absent values are null.
    #[must_use]
    pub fn attr_is_null(&self, key: InstanceKey, name: &str) -> bool {
        let Some(value) = self.attr(key, name) else {
            return true;
        };
        match self.declared_type(key, name) {
            Some(ty) => value.is_null(ty),
            None => false,
        }
    }

    /// Assigns an instance attribute, case-insensitive; returns whether the
    /// write was applied (`false` only for a stale key).
    ///
    /// Writing a linked referential attribute writes through to the
    /// neighbor's identifying attribute. Every applied write to a schema
    /// attribute clears the affected query caches before returning.
    pub fn set_attr(&mut self, key: InstanceKey, name: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let folded = fold(name);
        let Some(record) = self.instances.get(key) else {
            return false;
        };
        let kind_fold = record.kind.clone();
        let Some(metaclass) = self.metaclasses.get(&kind_fold) else {
            self.instances[key].set_raw(folded, value);
            return true;
        };
        let Some(attribute) = metaclass.attribute(&folded) else {
            // not a schema attribute; stored, no cache impact
            self.instances[key].set_raw(folded, value);
            return true;
        };
        let ty = attribute.resolve().ok();
        if metaclass.is_referential(&folded) {
            if let Some((link, to_attr)) = metaclass.referential_link(&folded) {
                if let Some(neighbor) = link.first_neighbor(key) {
                    let to_attr = to_attr.to_string();
                    self.invalidate(&kind_fold);
                    return self.set_attr(neighbor, &to_attr, value);
                }
            }
        }
        let value = match ty {
            Some(ty) => value.coerce(ty),
            None => value,
        };
        self.instances[key].set_raw(folded, value);
        self.invalidate(&kind_fold);
        true
    }

    fn declared_type(&self, key: InstanceKey, name: &str) -> Option<TypeName> {
        let record = self.instances.get(key)?;
        self.metaclasses
            .get(&record.kind)?
            .attribute(name)
            .and_then(|a| a.resolve().ok())
    }

    /*
    ───────────────────────── relate / unrelate ─────────────────────────
    */

    /// Relates two instances across an association. For reflexive
    /// associations a phrase indicating the direction must be provided.
    ///
    /// Returns `false` without error when either handle is absent. Relating
    /// an already-related pair is a no-op that returns `true`.
    ///
    /// # Errors
    /// [`RelateError::UnknownLink`] when no association matches, and
    /// [`RelateError::AlreadyRelated`] when cardinality would be violated.
    /// A rejected relate leaves no half-connected edge behind.
    pub fn relate(
        &mut self,
        a: impl Into<Option<InstanceKey>>,
        b: impl Into<Option<InstanceKey>>,
        rel_id: impl Into<RelId>,
        phrase: &str,
    ) -> Result<bool, RelateError> {
        let (Some(a), Some(b)) = (a.into(), b.into()) else {
            return Ok(false);
        };
        if !self.instances.contains_key(a) || !self.instances.contains_key(b) {
            return Ok(false);
        }
        let rel = rel_id.into();
        let (x, y, index) = self.find_association(a, b, &rel, phrase)?;
        let association = self.associations[index].clone();

        if !self.link_by_id_mut(&association.source_link).connect(x, y, true) {
            return Err(RelateError::AlreadyRelated { rel_id: rel });
        }
        if !self.link_by_id_mut(&association.target_link).connect(y, x, true) {
            self.link_by_id_mut(&association.source_link).disconnect(x, y);
            return Err(RelateError::AlreadyRelated { rel_id: rel });
        }

        // The edge is now the truth; stale pre-formalization copies on the
        // dependent side would shadow it.
        for source_key in &association.source_keys {
            self.instances[y].clear_raw(&fold(source_key));
        }
        self.invalidate(&association.source_link.owner);
        self.invalidate(&association.target_link.owner);
        Ok(true)
    }

    /// Unrelates two instances across an association; the inverse of
    /// [`MetaModel::relate`]. Referential attributes on the dependent side
    /// read as null afterwards.
    ///
    /// Returns `false` without error when either handle is absent.
    ///
    /// # Errors
    /// [`UnrelateError::UnknownLink`] when no association matches, and
    /// [`UnrelateError::NotRelated`] when the pair is not related.
    pub fn unrelate(
        &mut self,
        a: impl Into<Option<InstanceKey>>,
        b: impl Into<Option<InstanceKey>>,
        rel_id: impl Into<RelId>,
        phrase: &str,
    ) -> Result<bool, UnrelateError> {
        let (Some(a), Some(b)) = (a.into(), b.into()) else {
            return Ok(false);
        };
        if !self.instances.contains_key(a) || !self.instances.contains_key(b) {
            return Ok(false);
        }
        let rel = rel_id.into();
        let (x, y, index) = self.find_association(a, b, &rel, phrase)?;
        let association = self.associations[index].clone();

        if !self.link_by_id_mut(&association.source_link).disconnect(x, y) {
            return Err(UnrelateError::NotRelated { rel_id: rel });
        }
        if !self.link_by_id_mut(&association.target_link).disconnect(y, x) {
            return Err(UnrelateError::NotRelated { rel_id: rel });
        }
        for source_key in &association.source_keys {
            self.instances[y].clear_raw(&fold(source_key));
        }
        self.invalidate(&association.source_link.owner);
        self.invalidate(&association.target_link.owner);
        Ok(true)
    }

    /// Orients `(a, b)` against an association with the given rel id whose
    /// directional (from-kind, to-kind, phrase) tuple matches either side.
    fn find_association(
        &self,
        a: InstanceKey,
        b: InstanceKey,
        rel: &RelId,
        phrase: &str,
    ) -> Result<(InstanceKey, InstanceKey, usize), UnknownLinkError> {
        let kind_a = self.instances[a].kind.clone();
        let kind_b = self.instances[b].kind.clone();
        let phrase_fold = fold(phrase);

        for (index, association) in self.associations.iter().enumerate() {
            if association.rel_id != *rel {
                continue;
            }
            let source = self.link_by_id(&association.source_link);
            let target = self.link_by_id(&association.target_link);
            if fold(source.from_kind()) == kind_a
                && fold(source.kind()) == kind_b
                && fold(target.phrase()) == phrase_fold
            {
                return Ok((a, b, index));
            }
            if fold(target.from_kind()) == kind_a
                && fold(target.kind()) == kind_b
                && fold(source.phrase()) == phrase_fold
            {
                return Ok((b, a, index));
            }
        }
        Err(UnknownLinkError {
            from_kind: self.kind_of(a).unwrap_or_default().to_string(),
            to_kind: self.kind_of(b).unwrap_or_default().to_string(),
            rel_id: rel.clone(),
            phrase: phrase.to_string(),
        })
    }

    /*
    ──────────────────────── selection and queries ────────────────────────
    */

    /// Selects a single instance of some kind: the first pool element, the
    /// first predicate match, or the first (lazily evaluated) map-query
    /// match.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when the kind is not registered.
    pub fn select_one(
        &mut self,
        kind: &str,
        clause: Where<'_>,
    ) -> Result<Option<InstanceKey>, UnknownClassError> {
        if let Where::Eq(items) = &clause {
            let folded = self.ensure_class(kind)?;
            return Ok(self.query_folded(&folded, items, Some(1)).first().copied());
        }
        let model: &MetaModel = self;
        let pool = model.metaclass(kind)?.instances();
        Ok(match &clause {
            Where::Any => pool.first().copied(),
            Where::Pred(pred) => pool
                .iter()
                .copied()
                .find(|&key| pred(InstanceRef::new(model, key))),
            Where::Eq(_) => unreachable!(),
        })
    }

    /// Selects instances of some kind into a [`QuerySet`], in pool order.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when the kind is not registered.
    pub fn select_many(
        &mut self,
        kind: &str,
        clause: Where<'_>,
    ) -> Result<QuerySet, UnknownClassError> {
        if let Where::Eq(items) = &clause {
            let folded = self.ensure_class(kind)?;
            return Ok(self.query_folded(&folded, items, None).into_iter().collect());
        }
        let model: &MetaModel = self;
        let pool = model.metaclass(kind)?.instances();
        let selected = match &clause {
            Where::Any => Either::Left(pool.iter().copied()),
            Where::Pred(pred) => Either::Right(
                pool.iter()
                    .copied()
                    .filter(|&key| pred(InstanceRef::new(model, key))),
            ),
            Where::Eq(_) => unreachable!(),
        };
        Ok(selected.collect())
    }

    /// Deprecated alias of [`MetaModel::select_one`].
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when the kind is not registered.
    #[deprecated(note = "use `select_one`")]
    pub fn select_any(
        &mut self,
        kind: &str,
        clause: Where<'_>,
    ) -> Result<Option<InstanceKey>, UnknownClassError> {
        self.select_one(kind, clause)
    }

    /// Queries a kind's pool for instances whose attributes match the map.
    /// Results come from the per-metaclass query cache; repeated identical
    /// predicates resume the same lazily evaluated query.
    ///
    /// # Errors
    /// Returns [`UnknownClassError`] when the kind is not registered.
    pub fn query(
        &mut self,
        kind: &str,
        items: Vec<(String, Value)>,
    ) -> Result<Vec<InstanceKey>, UnknownClassError> {
        let folded = self.ensure_class(kind)?;
        Ok(self.query_folded(&folded, &items, None))
    }

    pub(crate) fn query_folded(
        &mut self,
        folded_kind: &str,
        items: &[(String, Value)],
        limit: Option<usize>,
    ) -> Vec<InstanceKey> {
        let normalized = normalize_items(items);
        let cache_key = QueryKey::new(&normalized);
        let Some(metaclass) = self.metaclasses.get_mut(folded_kind) else {
            return Vec::new();
        };
        let mut query = metaclass
            .take_cached(&cache_key)
            .unwrap_or_else(|| Query::new(normalized));
        let out = query.execute(self, self.metaclasses[folded_kind].instances(), limit);
        self.metaclasses
            .get_mut(folded_kind)
            .unwrap()
            .store_cached(cache_key, query);
        out
    }

    /// One predicate-pair evaluation: the attribute equals the expected
    /// value (coerced to the attribute's declared type) and is not null.
    pub(crate) fn predicate_matches(
        &self,
        key: InstanceKey,
        folded_name: &str,
        expected: &Value,
    ) -> bool {
        let Some(value) = self.attr(key, folded_name) else {
            return false;
        };
        let ty = self.declared_type(key, folded_name);
        let expected = match ty {
            Some(ty) => expected.clone().coerce(ty),
            None => expected.clone(),
        };
        if value != expected {
            return false;
        }
        match ty {
            Some(ty) => !value.is_null(ty),
            None => true,
        }
    }

    /*
    ───────────────────────────── navigation ─────────────────────────────
    */

    /// Navigates from an instance across a link with some rel id and
    /// phrase that yields instances of some kind, in connect order.
    ///
    /// # Errors
    /// Returns [`UnknownLinkError`] when the (kind, rel id, phrase) triple
    /// is not registered on the instance's class — in particular when the
    /// phrase is omitted on a reflexive association.
    pub fn navigate(
        &self,
        inst: InstanceKey,
        kind: &str,
        rel_id: impl Into<RelId>,
        phrase: &str,
    ) -> Result<Vec<InstanceKey>, UnknownLinkError> {
        let rel = rel_id.into();
        let Some(record) = self.instances.get(inst) else {
            return Ok(Vec::new());
        };
        let Some(metaclass) = self.metaclasses.get(&record.kind) else {
            return Ok(Vec::new());
        };
        match metaclass.find_link(kind, rel.clone(), phrase) {
            Some(link) => Ok(link.navigate(inst).collect()),
            None => Err(UnknownLinkError {
                from_kind: metaclass.kind().to_string(),
                to_kind: kind.to_string(),
                rel_id: rel,
                phrase: phrase.to_string(),
            }),
        }
    }

    /*
    ───────────────────────────── integrity ─────────────────────────────
    */

    /// Checks the metamodel for integrity violations: true iff both the
    /// uniqueness and the association-consistency pass come back clean.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        check::check_association_integrity(self).is_empty()
            && check::check_uniqueness_constraint(self).is_empty()
    }

    /*
    ───────────────────────────── internals ─────────────────────────────
    */

    fn ensure_class(&self, kind: &str) -> Result<String, UnknownClassError> {
        let folded = fold(kind);
        if self.metaclasses.contains_key(&folded) {
            Ok(folded)
        } else {
            Err(UnknownClassError {
                kind: kind.to_string(),
            })
        }
    }

    pub(crate) fn link_by_id(&self, id: &LinkId) -> &Link {
        self.metaclasses[&id.owner].link(&id.key).unwrap()
    }

    fn link_by_id_mut(&mut self, id: &LinkId) -> &mut Link {
        self.metaclasses
            .get_mut(&id.owner)
            .unwrap()
            .link_mut(&id.key)
            .unwrap()
    }

    fn opposing_link(&self, id: &LinkId) -> Option<LinkId> {
        for association in &self.associations {
            if association.source_link == *id {
                return Some(association.target_link.clone());
            }
            if association.target_link == *id {
                return Some(association.source_link.clone());
            }
        }
        None
    }

    fn invalidate(&mut self, folded_kind: &str) {
        if let Some(metaclass) = self.metaclasses.get_mut(folded_kind) {
            metaclass.invalidate();
        }
    }
}
