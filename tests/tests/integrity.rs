//! The integrity checker: uniqueness and association consistency.

use oxtuml::check::{check_association_integrity, check_uniqueness_constraint, Problem};
use oxtuml::{relate, values, AssociationEnd, MetaModel, SequentialGenerator};
use tests::dog_person;

#[test]
fn an_unrelated_dependent_violates_an_unconditional_link() {
    let mut m = dog_person();
    let p = m
        .new_instance("Person", vec![], values!(id: 1, name: "A"))
        .unwrap();
    let d = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();

    let findings = check_association_integrity(&m);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, "Dog");
    assert_eq!(findings[0].problem, Problem::Unfulfilled);
    assert!(!m.is_consistent());

    relate(&mut m, d, p, 1, "").unwrap();
    assert!(check_association_integrity(&m).is_empty());
    assert!(m.is_consistent());
}

#[test]
fn shared_identifier_tuples_are_reported_once_per_group() {
    let mut m = dog_person();
    let _p1 = m
        .new_instance("Person", vec![], values!(id: 42, name: "A"))
        .unwrap();
    let _p2 = m
        .new_instance("Person", vec![], values!(id: 42, name: "B"))
        .unwrap();

    let findings = check_uniqueness_constraint(&m);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, "Person");
    assert_eq!(findings[0].index, "I1");
    assert_eq!(findings[0].instances.len(), 2);
}

#[test]
fn null_identifier_tuples_are_exempt_from_uniqueness() {
    let mut m = dog_person();
    let _p1 = m
        .new_instance("Person", vec![], values!(id: 0, name: "A"))
        .unwrap();
    let _p2 = m
        .new_instance("Person", vec![], values!(id: 0, name: "B"))
        .unwrap();
    assert!(check_uniqueness_constraint(&m).is_empty());
}

#[test]
fn orphan_referential_values_surface_as_unfulfilled_links() {
    let mut m = MetaModel::with_id_generator(Box::new(SequentialGenerator::default()));
    m.define_class("Dog", [("name", "STRING"), ("owner_id", "UNIQUE_ID")])
        .unwrap();
    m.define_class("Person", [("id", "UNIQUE_ID"), ("name", "STRING")])
        .unwrap();
    m.define_unique_identifier("Person", 1, &["id"]).unwrap();

    // loaded before the association exists, pointing at nobody
    let d = m
        .new_instance("Dog", vec![], values!(name: "Rex", owner_id: 7))
        .unwrap();
    m.define_association(
        1,
        AssociationEnd::new("Dog", ["owner_id"]).conditional(),
        AssociationEnd::new("Person", ["id"]),
    )
    .unwrap();

    let findings = check_association_integrity(&m);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].instance, d);
    assert_eq!(findings[0].problem, Problem::Unfulfilled);
}

#[test]
fn associations_defined_after_the_population_are_reconciled() {
    let mut m = MetaModel::with_id_generator(Box::new(SequentialGenerator::default()));
    m.define_class("Dog", [("name", "STRING"), ("owner_id", "UNIQUE_ID")])
        .unwrap();
    m.define_class("Person", [("id", "UNIQUE_ID"), ("name", "STRING")])
        .unwrap();
    m.define_unique_identifier("Person", 1, &["id"]).unwrap();

    let p = m
        .new_instance("Person", vec![], values!(id: 7, name: "A"))
        .unwrap();
    let d = m
        .new_instance("Dog", vec![], values!(name: "Rex", owner_id: 7))
        .unwrap();
    m.define_association(
        1,
        AssociationEnd::new("Dog", ["owner_id"]).conditional(),
        AssociationEnd::new("Person", ["id"]),
    )
    .unwrap();

    let owner = oxtuml::navigate_one(&m, d).to("Person").across(1).unwrap().one();
    assert_eq!(owner, Some(p));
    assert!(m.is_consistent());
}

#[test]
fn deleting_an_instance_scrubs_its_edges() {
    let mut m = dog_person();
    let p = m
        .new_instance("Person", vec![], values!(id: 1, name: "A"))
        .unwrap();
    let d = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();
    relate(&mut m, d, p, 1, "").unwrap();

    oxtuml::delete(&mut m, d).unwrap();
    let dogs = oxtuml::navigate_many(&m, p).to("Dog").across(1).unwrap().many();
    assert!(dogs.is_empty());
    assert!(m.is_consistent());

    // deleting again is an error; the key is stale
    assert!(oxtuml::delete(&mut m, d).is_err());
}
