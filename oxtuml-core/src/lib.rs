//! Core engine of an in-memory xtUML metamodel runtime.
//!
//! A [`MetaModel`] holds metaclasses with associations between them and the
//! arena every instance lives in. Clients define classes, unique
//! identifiers and associations, create instances, wire them together with
//! `relate`/`unrelate` and read them back through selections and
//! navigation chains.
//!
//! All identifiers — class kinds (key letters), attribute names,
//! association ids and phrases — are case **insensitive**.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::return_self_not_must_use,
    clippy::float_cmp,
    clippy::enum_glob_use
)]
#![cfg_attr(test, allow(clippy::too_many_lines))]

pub mod association;
pub mod check;
pub mod error;
pub mod id;
mod ident;
pub mod instance;
pub mod link;
pub mod metaclass;
pub mod model;
pub mod nav;
pub mod query;
pub mod value;

pub use association::{Association, AssociationEnd};
pub use error::{
    DeleteError, DuplicateClassError, Error, RelateError, UnknownClassError, UnknownLinkError,
    UnknownTypeError, UnrelateError,
};
pub use id::{IdGenerator, SequentialGenerator, UuidGenerator};
pub use ident::{IndexName, RelId};
pub use instance::{InstanceKey, InstanceRef};
pub use link::Link;
pub use metaclass::{Attribute, MetaClass};
pub use model::MetaModel;
pub use nav::{navigate_subtype, sort_reflexive, Handle, LinkSpec, NavChain};
pub use query::{QuerySet, Where};
pub use value::{TypeName, UniqueId, Value};
