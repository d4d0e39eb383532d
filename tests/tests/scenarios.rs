//! End-to-end scenarios over the dog/person and family schemas.

use oxtuml::{
    navigate_many, navigate_one, relate, sort_reflexive, unrelate, values, where_eq, QuerySet,
    RelateError, UniqueId, Value, Where,
};
use tests::{dog_pack, dog_person, family};

#[test]
fn relate_navigate_and_read_referential() {
    let mut m = dog_person();
    let p = m
        .new_instance("Person", vec![], values!(id: 42, name: "A"))
        .unwrap();
    let d = m
        .new_instance("Dog", vec![Value::from("Rex")], vec![])
        .unwrap();

    assert!(relate(&mut m, d, p, 1, "").unwrap());
    let owner = navigate_one(&m, d).to("Person").across(1).unwrap().one();
    assert_eq!(owner, Some(p));
    assert_eq!(
        m.attr(d, "owner_id"),
        Some(Value::UniqueId(UniqueId::from(42u64)))
    );

    assert!(unrelate(&mut m, d, p, 1, "").unwrap());
    assert_eq!(
        m.attr(d, "owner_id"),
        Some(Value::UniqueId(UniqueId::NULL))
    );
    assert!(m.attr_is_null(d, "owner_id"));
}

#[test]
fn construction_batch_relates_referential_values() {
    let mut m = dog_person();
    let p = m
        .new_instance("Person", vec![], values!(id: 42, name: "A"))
        .unwrap();
    let d2 = m
        .new_instance("Dog", vec![], values!(name: "Spot", owner_id: 42))
        .unwrap();

    let owner = navigate_one(&m, d2).to("Person").across(1).unwrap().one();
    assert_eq!(owner, Some(p));
    assert_eq!(
        m.attr(d2, "owner_id"),
        Some(Value::UniqueId(UniqueId::from(42u64)))
    );
}

#[test]
fn reflexive_chain_sorts_predecessor_first() {
    let mut m = family();
    let p1 = m.new_instance("Person", vec![], values!(name: "p1")).unwrap();
    let p2 = m.new_instance("Person", vec![], values!(name: "p2")).unwrap();
    let p3 = m.new_instance("Person", vec![], values!(name: "p3")).unwrap();
    relate(&mut m, p1, p2, 2, "parent").unwrap();
    relate(&mut m, p2, p3, 2, "parent").unwrap();

    let set: QuerySet = [p3, p1, p2].into_iter().collect();
    let ordered: Vec<_> = sort_reflexive(&m, &set, 2, "parent")
        .unwrap()
        .iter()
        .collect();
    assert_eq!(ordered, vec![p1, p2, p3]);
}

#[test]
fn deletion_is_reflected_by_selection() {
    let mut m = dog_person();
    let d = m
        .new_instance("Dog", vec![], values!(name: "Rex"))
        .unwrap();

    let found = m.select_many("Dog", where_eq!(name: "Rex")).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found.contains(d));

    oxtuml::delete(&mut m, d).unwrap();
    let found = m.select_many("Dog", where_eq!(name: "Rex")).unwrap();
    assert!(found.is_empty());
}

#[test]
fn relating_twice_is_an_idempotent_no_op() {
    let mut m = dog_person();
    let p = m
        .new_instance("Person", vec![], values!(id: 42, name: "A"))
        .unwrap();
    let d = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();

    assert!(relate(&mut m, d, p, 1, "").unwrap());
    assert!(relate(&mut m, d, p, 1, "").unwrap());
    let dogs = navigate_many(&m, p).to("Dog").across(1).unwrap().many();
    assert_eq!(dogs.len(), 1);
}

#[test]
fn one_valued_navigation_takes_first_by_insertion_order() {
    let mut m = dog_pack();
    let p = m
        .new_instance("Person", vec![], values!(id: 7, name: "A"))
        .unwrap();
    let d1 = m.new_instance("Dog", vec![], values!(name: "a")).unwrap();
    let d2 = m.new_instance("Dog", vec![], values!(name: "b")).unwrap();
    let d3 = m.new_instance("Dog", vec![], values!(name: "c")).unwrap();
    relate(&mut m, d1, p, 1, "").unwrap();
    relate(&mut m, d2, p, 1, "").unwrap();
    relate(&mut m, d3, p, 1, "").unwrap();

    let first = navigate_one(&m, p).to("Dog").across(1).unwrap().one();
    assert_eq!(first, Some(d1));
    let all: Vec<_> = navigate_many(&m, p)
        .to("Dog")
        .across(1)
        .unwrap()
        .many()
        .iter()
        .collect();
    assert_eq!(all, vec![d1, d2, d3]);
}

#[test]
fn unassignable_referential_values_warn_but_do_not_fail() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut m = dog_person();
    // nobody with id 99 exists; construction succeeds and logs a warning
    let d = m
        .new_instance("Dog", vec![], values!(name: "Rex", owner_id: 99))
        .unwrap();
    assert!(m.attr_is_null(d, "owner_id"));
}

#[test]
fn absent_handles_relate_to_nothing() {
    let mut m = dog_person();
    let d = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();
    assert!(!relate(&mut m, None, d, 1, "").unwrap());
    assert!(!unrelate(&mut m, d, None, 1, "").unwrap());
}

#[test]
fn second_partner_across_a_one_link_is_rejected() {
    let mut m = dog_person();
    let p = m
        .new_instance("Person", vec![], values!(id: 1, name: "A"))
        .unwrap();
    let d1 = m.new_instance("Dog", vec![], values!(name: "a")).unwrap();
    let d2 = m.new_instance("Dog", vec![], values!(name: "b")).unwrap();

    relate(&mut m, d1, p, 1, "").unwrap();
    let err = relate(&mut m, d2, p, 1, "").unwrap_err();
    assert!(matches!(err, RelateError::AlreadyRelated { .. }));
    // the rejected relate left no half-connected edge behind
    let dogs = navigate_many(&m, p).to("Dog").across(1).unwrap().many();
    assert_eq!(dogs.len(), 1);
    let owner = navigate_one(&m, d2).to("Person").across(1).unwrap().one();
    assert_eq!(owner, None);
}

#[test]
fn select_one_without_clause_returns_first_of_pool() {
    let mut m = dog_person();
    let d1 = m.new_instance("Dog", vec![], values!(name: "a")).unwrap();
    let _d2 = m.new_instance("Dog", vec![], values!(name: "b")).unwrap();
    assert_eq!(m.select_one("Dog", Where::Any).unwrap(), Some(d1));
}

#[test]
fn clone_copies_attributes_and_partners() {
    let mut m = dog_pack();
    let p = m
        .new_instance("Person", vec![], values!(id: 42, name: "A"))
        .unwrap();
    let d = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();
    relate(&mut m, d, p, 1, "").unwrap();

    let c = m.clone_instance(d).unwrap();
    assert_ne!(c, d);
    assert_eq!(m.attr(c, "name"), Some(Value::from("Rex")));
    let owner = navigate_one(&m, c).to("Person").across(1).unwrap().one();
    assert_eq!(owner, Some(p));
}
