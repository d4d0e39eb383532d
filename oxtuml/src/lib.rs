//! An in-memory xtUML metamodel runtime with an action-language style
//! query API.
//!
//! A [`MetaModel`] stores populations of typed instances and maintains the
//! associations between them. The free functions in this crate mirror the
//! OAL/RSL idiom:
//!
//! ```
//! use oxtuml::{navigate_one, where_eq, AssociationEnd, MetaModel, Value};
//!
//! let mut m = MetaModel::new();
//! m.define_class("Person", [("id", "UNIQUE_ID"), ("name", "STRING")])
//!     .unwrap();
//! m.define_class("Dog", [("name", "STRING"), ("owner_id", "UNIQUE_ID")])
//!     .unwrap();
//! m.define_unique_identifier("Person", 1, &["id"]).unwrap();
//! m.define_association(
//!     1,
//!     AssociationEnd::new("Dog", ["owner_id"]).conditional(),
//!     AssociationEnd::new("Person", ["id"]),
//! )
//! .unwrap();
//!
//! let p = m
//!     .new_instance("Person", vec![], vec![("name".into(), "A".into())])
//!     .unwrap();
//! let d = m
//!     .new_instance("Dog", vec![Value::from("Rex")], vec![])
//!     .unwrap();
//! oxtuml::relate(&mut m, d, p, 1, "").unwrap();
//!
//! // select one owner related by d->Person[R1];
//! let owner = navigate_one(&m, d).to("Person").across(1).unwrap().one();
//! assert_eq!(owner, Some(p));
//! let rex = m.select_one("Dog", where_eq!(name: "Rex")).unwrap();
//! assert_eq!(rex, Some(d));
//! ```

#[doc(no_inline)]
pub use oxtuml_core::{
    check, error, Association, AssociationEnd, Attribute, DeleteError, DuplicateClassError, Error,
    Handle, IdGenerator, IndexName, InstanceKey, InstanceRef, Link, LinkSpec, MetaClass, MetaModel,
    NavChain, QuerySet, RelId, RelateError, SequentialGenerator, TypeName, UniqueId, UnknownClassError,
    UnknownLinkError, UnknownTypeError, UnrelateError, UuidGenerator, Value, Where,
};

pub use oxtuml_core::{navigate_subtype, sort_reflexive};

mod macros;
mod ops;

pub use ops::{delete, navigate_any, navigate_many, navigate_one, relate, unrelate};
