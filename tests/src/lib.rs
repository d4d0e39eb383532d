//! Shared model fixtures for the integration suites.

use oxtuml::{AssociationEnd, MetaModel, SequentialGenerator};

/// `Dog(name STRING, owner_id UNIQUE_ID)` and
/// `Person(id UNIQUE_ID, name STRING)`, with R1: Dog 1C — owned by —
/// 1 Person and key map `owner_id` ↔ `id`.
#[must_use]
pub fn dog_person() -> MetaModel {
    let mut m = MetaModel::with_id_generator(Box::new(SequentialGenerator::default()));
    m.define_class("Dog", [("name", "STRING"), ("owner_id", "UNIQUE_ID")])
        .unwrap();
    m.define_class("Person", [("id", "UNIQUE_ID"), ("name", "STRING")])
        .unwrap();
    m.define_unique_identifier("Person", 1, &["id"]).unwrap();
    m.define_association(
        1,
        AssociationEnd::new("Dog", ["owner_id"]).conditional(),
        AssociationEnd::new("Person", ["id"]),
    )
    .unwrap();
    m
}

/// Like [`dog_person`], but a person may own any number of dogs
/// (R1: Dog MC — 1 Person).
#[must_use]
pub fn dog_pack() -> MetaModel {
    let mut m = MetaModel::with_id_generator(Box::new(SequentialGenerator::default()));
    m.define_class("Dog", [("name", "STRING"), ("owner_id", "UNIQUE_ID")])
        .unwrap();
    m.define_class("Person", [("id", "UNIQUE_ID"), ("name", "STRING")])
        .unwrap();
    m.define_unique_identifier("Person", 1, &["id"]).unwrap();
    m.define_association(
        1,
        AssociationEnd::new("Dog", ["owner_id"]).many().conditional(),
        AssociationEnd::new("Person", ["id"]),
    )
    .unwrap();
    m
}

/// A reflexive parent/child chain on `Person` across R2 (1C — 1C).
///
/// `relate(parent, child, 2, "parent")` makes navigating `"parent"` from
/// the child yield the parent, and `"child"` from the parent yield the
/// child.
#[must_use]
pub fn family() -> MetaModel {
    let mut m = MetaModel::with_id_generator(Box::new(SequentialGenerator::default()));
    m.define_class(
        "Person",
        [
            ("id", "UNIQUE_ID"),
            ("name", "STRING"),
            ("parent_id", "UNIQUE_ID"),
        ],
    )
    .unwrap();
    m.define_unique_identifier("Person", 1, &["id"]).unwrap();
    m.define_association(
        2,
        AssociationEnd::new("Person", ["parent_id"])
            .conditional()
            .phrase("child"),
        AssociationEnd::new("Person", ["id"])
            .conditional()
            .phrase("parent"),
    )
    .unwrap();
    m
}

/// A sub/supertype arrangement: `Shape` with `Circle` and `Square`
/// subtypes, both across R3.
#[must_use]
pub fn shapes() -> MetaModel {
    let mut m = MetaModel::with_id_generator(Box::new(SequentialGenerator::default()));
    m.define_class("Shape", [("id", "UNIQUE_ID")]).unwrap();
    m.define_class("Circle", [("shape_id", "UNIQUE_ID"), ("radius", "REAL")])
        .unwrap();
    m.define_class("Square", [("shape_id", "UNIQUE_ID"), ("side", "REAL")])
        .unwrap();
    m.define_unique_identifier("Shape", 1, &["id"]).unwrap();
    m.define_association(
        3,
        AssociationEnd::new("Circle", ["shape_id"]).conditional(),
        AssociationEnd::new("Shape", ["id"]),
    )
    .unwrap();
    m.define_association(
        3,
        AssociationEnd::new("Square", ["shape_id"]).conditional(),
        AssociationEnd::new("Shape", ["id"]),
    )
    .unwrap();
    m
}
