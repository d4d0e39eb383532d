//! Selection, query caching and cache coherence.

use oxtuml::{values, where_eq, Value, Where};
use tests::{dog_pack, dog_person};

#[test]
fn map_selection_skips_null_valued_attributes() {
    let mut m = dog_person();
    let _blank = m.new_instance("Dog", vec![], values!(name: "")).unwrap();
    let named = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();

    // an empty STRING is null and never matches, even against itself
    assert!(m
        .select_many("Dog", where_eq!(name: ""))
        .unwrap()
        .is_empty());
    let found = m.select_many("Dog", where_eq!(name: "Rex")).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found.contains(named));
}

#[test]
fn partial_evaluation_resumes_from_the_start() {
    let mut m = dog_pack();
    let r1 = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();
    let _s = m.new_instance("Dog", vec![], values!(name: "Spot")).unwrap();
    let r2 = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();

    // select_one evaluates lazily, stopping at the first match ...
    let first = m.select_one("Dog", where_eq!(name: "Rex")).unwrap();
    assert_eq!(first, Some(r1));
    // ... and the cached query replays the prefix before resuming
    let all: Vec<_> = m
        .select_many("Dog", where_eq!(name: "Rex"))
        .unwrap()
        .iter()
        .collect();
    assert_eq!(all, vec![r1, r2]);
}

#[test]
fn attribute_writes_invalidate_cached_queries() {
    let mut m = dog_person();
    let d = m.new_instance("Dog", vec![], values!(name: "Rex")).unwrap();

    assert_eq!(
        m.select_many("Dog", where_eq!(name: "Rex")).unwrap().len(),
        1
    );
    assert!(m.set_attr(d, "name", "Spot"));
    assert!(m
        .select_many("Dog", where_eq!(name: "Rex"))
        .unwrap()
        .is_empty());
    assert_eq!(
        m.select_many("Dog", where_eq!(name: "Spot")).unwrap().len(),
        1
    );
}

#[test]
fn predicate_order_does_not_split_the_cache() {
    let mut m = dog_person();
    let p = m
        .new_instance("Person", vec![], values!(id: 1, name: "A"))
        .unwrap();
    let a = m
        .select_many("Person", where_eq!(id: 1, name: "A"))
        .unwrap();
    let b = m
        .select_many("Person", where_eq!(name: "A", id: 1))
        .unwrap();
    assert_eq!(a, b);
    assert!(a.contains(p));
}

#[test]
fn function_predicates_read_through_instance_views() {
    let mut m = dog_person();
    let _a = m.new_instance("Dog", vec![], values!(name: "a")).unwrap();
    let b = m.new_instance("Dog", vec![], values!(name: "bb")).unwrap();

    let long_named = m
        .select_many(
            "Dog",
            Where::Pred(&|dog: oxtuml::InstanceRef<'_>| {
                matches!(dog.attr("name"), Some(Value::String(name)) if name.len() > 1)
            }),
        )
        .unwrap();
    assert_eq!(long_named.len(), 1);
    assert!(long_named.contains(b));
}

#[test]
fn selection_folds_case_everywhere() {
    let mut m = dog_person();
    let d = m.new_instance("dOG", vec![], values!(NAME: "Rex")).unwrap();
    assert_eq!(
        m.select_one("DOG", where_eq!(nAmE: "Rex")).unwrap(),
        Some(d)
    );
    assert_eq!(m.attr(d, "NaMe"), Some(Value::from("Rex")));
}
