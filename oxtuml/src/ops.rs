//! The action-language façade: free functions over a metamodel shaped
//! after `select ... related by ...` statements.

use oxtuml_core::error::{DeleteError, RelateError, UnrelateError};
use oxtuml_core::{Handle, InstanceKey, MetaModel, NavChain, RelId};

/// Initializes a navigation from one instance to another across a
/// one-to-one association; the chain's `one()` terminal returns an
/// instance or `None`.
///
/// The syntax is somewhat similar to the action language used in
/// BridgePoint. What BridgePoint writes as
///
/// ```text
/// select any inst from instances of My_Modeled_Class;
/// select one other related by inst->Some_Other_Class[R4];
/// ```
///
/// reads here as
///
/// ```text
/// let inst = m.select_one("My_Modeled_Class", Where::Any)?;
/// let other = navigate_one(&m, inst).to("Some_Other_Class").across(4)?.one();
/// ```
///
/// If the navigated association is reflexive, a phrase must be provided:
/// `.across((4, "some phrase"))`.
pub fn navigate_one<'m>(model: &'m MetaModel, handle: impl Into<Handle>) -> NavChain<'m> {
    navigate_any(model, handle)
}

/// Initializes a navigation from an instance, or a set of instances,
/// across a one-to-many or many-to-many association, selecting any single
/// resulting instance.
pub fn navigate_any<'m>(model: &'m MetaModel, handle: impl Into<Handle>) -> NavChain<'m> {
    NavChain::new(model, handle)
}

/// Initializes a navigation from an instance, or a set of instances, whose
/// `many()` terminal returns a [`QuerySet`](oxtuml_core::QuerySet).
pub fn navigate_many<'m>(model: &'m MetaModel, handle: impl Into<Handle>) -> NavChain<'m> {
    NavChain::new(model, handle)
}

/// Relates two instances across an association. For reflexive associations
/// a phrase indicating the direction must be provided.
///
/// Returns `false` without error when either handle is absent.
///
/// # Errors
/// See [`MetaModel::relate`].
pub fn relate(
    model: &mut MetaModel,
    from: impl Into<Option<InstanceKey>>,
    to: impl Into<Option<InstanceKey>>,
    rel_id: impl Into<RelId>,
    phrase: &str,
) -> Result<bool, RelateError> {
    model.relate(from, to, rel_id, phrase)
}

/// Unrelates two instances across an association; the inverse of
/// [`relate`].
///
/// # Errors
/// See [`MetaModel::unrelate`].
pub fn unrelate(
    model: &mut MetaModel,
    from: impl Into<Option<InstanceKey>>,
    to: impl Into<Option<InstanceKey>>,
    rel_id: impl Into<RelId>,
    phrase: &str,
) -> Result<bool, UnrelateError> {
    model.unrelate(from, to, rel_id, phrase)
}

/// Deletes an instance from its metaclass's instance pool.
///
/// # Errors
/// See [`MetaModel::delete`].
pub fn delete(model: &mut MetaModel, instance: InstanceKey) -> Result<(), DeleteError> {
    model.delete(instance)
}
