//! Declarative helpers for building predicate maps and named attribute
//! lists from keyword-style arguments.

/// Builds a [`Where`](crate::Where) equality clause from keyword
/// arguments:
///
/// ```
/// # use oxtuml::{where_eq, Where};
/// let clause = where_eq!(name: "Rex", age: 3);
/// # let _: Where = clause;
/// ```
#[macro_export]
macro_rules! where_eq {
    ($($name:ident : $value:expr),+ $(,)?) => {
        $crate::Where::Eq(vec![
            $((stringify!($name).to_string(), $crate::Value::from($value))),+
        ])
    };
}

/// Builds a named attribute-value list for
/// [`MetaModel::new_instance`](crate::MetaModel::new_instance):
///
/// ```
/// # use oxtuml::{values, MetaModel};
/// # let mut m = MetaModel::new();
/// # m.define_class("Person", [("id", "UNIQUE_ID"), ("name", "STRING")]).unwrap();
/// let p = m.new_instance("Person", vec![], values!(name: "A")).unwrap();
/// ```
#[macro_export]
macro_rules! values {
    () => { Vec::new() };
    ($($name:ident : $value:expr),+ $(,)?) => {
        vec![
            $((stringify!($name).to_string(), $crate::Value::from($value))),+
        ]
    };
}
