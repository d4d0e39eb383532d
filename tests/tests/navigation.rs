//! Navigation chains, subtype navigation and reflexive ordering.

use oxtuml::{
    navigate_many, navigate_one, navigate_subtype, relate, sort_reflexive, values, QuerySet,
    UnknownLinkError, Value,
};
use tests::{dog_pack, family, shapes};

#[test]
fn explicit_and_sugared_chains_are_equivalent() {
    let mut m = dog_pack();
    let p = m
        .new_instance("Person", vec![], values!(id: 1, name: "A"))
        .unwrap();
    let d = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();
    relate(&mut m, d, p, 1, "").unwrap();

    let explicit = navigate_one(&m, d).nav("Person", 1, "").unwrap().one();
    let sugared = navigate_one(&m, d).to("Person").across(1).unwrap().one();
    assert_eq!(explicit, sugared);
    assert_eq!(explicit, Some(p));
}

#[test]
fn chains_step_through_intermediate_kinds() {
    let mut m = family();
    let p1 = m.new_instance("Person", vec![], values!(name: "p1")).unwrap();
    let p2 = m.new_instance("Person", vec![], values!(name: "p2")).unwrap();
    let p3 = m.new_instance("Person", vec![], values!(name: "p3")).unwrap();
    relate(&mut m, p1, p2, 2, "parent").unwrap();
    relate(&mut m, p2, p3, 2, "parent").unwrap();

    // grandparent of p3
    let grandparent = navigate_one(&m, p3)
        .to("Person")
        .across((2, "parent"))
        .unwrap()
        .to("Person")
        .across((2, "parent"))
        .unwrap()
        .one();
    assert_eq!(grandparent, Some(p1));
}

#[test]
fn reflexive_navigation_without_a_phrase_is_an_unknown_link() {
    let mut m = family();
    let p1 = m.new_instance("Person", vec![], values!(name: "p1")).unwrap();
    let err: UnknownLinkError = navigate_one(&m, p1)
        .to("Person")
        .across(2)
        .unwrap_err();
    assert_eq!(err.to_string(), "Person->Person[R2]");
}

#[test]
fn where_clauses_filter_navigation_results() {
    let mut m = dog_pack();
    let p = m
        .new_instance("Person", vec![], values!(id: 1, name: "A"))
        .unwrap();
    let d1 = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();
    let d2 = m.new_instance("Dog", vec![], values!(name: "Spot")).unwrap();
    relate(&mut m, d1, p, 1, "").unwrap();
    relate(&mut m, d2, p, 1, "").unwrap();

    let spot = navigate_many(&m, p)
        .to("Dog")
        .across(1)
        .unwrap()
        .many_where(|dog| dog.attr("name") == Some(Value::from("Spot")));
    assert_eq!(spot.len(), 1);
    assert!(spot.contains(d2));
}

#[test]
fn navigation_from_sets_preserves_first_encounter_order() {
    let mut m = dog_pack();
    let p1 = m
        .new_instance("Person", vec![], values!(id: 1, name: "A"))
        .unwrap();
    let p2 = m
        .new_instance("Person", vec![], values!(id: 2, name: "B"))
        .unwrap();
    let d1 = m.new_instance("Dog", vec![], values!(name: "a")).unwrap();
    let d2 = m.new_instance("Dog", vec![], values!(name: "b")).unwrap();
    let d3 = m.new_instance("Dog", vec![], values!(name: "c")).unwrap();
    relate(&mut m, d1, p1, 1, "").unwrap();
    relate(&mut m, d2, p2, 1, "").unwrap();
    relate(&mut m, d3, p1, 1, "").unwrap();

    let people: QuerySet = [p2, p1].into_iter().collect();
    let dogs: Vec<_> = navigate_many(&m, &people)
        .to("Dog")
        .across(1)
        .unwrap()
        .many()
        .iter()
        .collect();
    assert_eq!(dogs, vec![d2, d1, d3]);
}

#[test]
fn subtype_navigation_tries_every_matching_link() {
    let mut m = shapes();
    let s1 = m.new_instance("Shape", vec![], values!(id: 1)).unwrap();
    let s2 = m.new_instance("Shape", vec![], values!(id: 2)).unwrap();
    let c = m
        .new_instance("Circle", vec![], values!(shape_id: 2, radius: 1.5))
        .unwrap();
    let q = m
        .new_instance("Square", vec![], values!(shape_id: 1, side: 2.0))
        .unwrap();

    assert_eq!(navigate_subtype(&m, s1, 3).unwrap(), Some(q));
    assert_eq!(navigate_subtype(&m, s2, 3).unwrap(), Some(c));
    assert_eq!(navigate_subtype(&m, None, 3).unwrap(), None);
}

#[test]
fn cyclic_reflexive_sort_yields_every_element_once() {
    let mut m = family();
    let p1 = m.new_instance("Person", vec![], values!(name: "p1")).unwrap();
    let p2 = m.new_instance("Person", vec![], values!(name: "p2")).unwrap();
    let p3 = m.new_instance("Person", vec![], values!(name: "p3")).unwrap();
    relate(&mut m, p1, p2, 2, "parent").unwrap();
    relate(&mut m, p2, p3, 2, "parent").unwrap();
    relate(&mut m, p3, p1, 2, "parent").unwrap();

    let set: QuerySet = [p2, p3, p1].into_iter().collect();
    let ordered = sort_reflexive(&m, &set, 2, "parent").unwrap();
    assert_eq!(ordered.len(), 3);
    assert_eq!(ordered.first(), Some(p2));
}

#[test]
fn sorting_an_empty_set_is_empty() {
    let m = family();
    let ordered = sort_reflexive(&m, &QuerySet::new(), 2, "parent").unwrap();
    assert!(ordered.is_empty());
}
