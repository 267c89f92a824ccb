use bson::doc;
use queryrunner::store::MemoryStore;
use queryrunner::{CollectionHandle, Direction, Filter, connect_with};

fn sandy_steve_amy() -> CollectionHandle {
    connect_with(MemoryStore::with_docs(
        "dbtable",
        vec![doc! {"name": "Sandy"}, doc! {"name": "Steve"}, doc! {"name": "Amy"}],
    ))
}

fn names(h: &CollectionHandle, f: &Filter) -> Vec<String> {
    h.find(f)
        .unwrap()
        .map(|d| d.unwrap().get_str("name").unwrap().to_string())
        .collect()
}

#[test]
fn regex_prefix_find_yields_first_two_in_store_order() {
    let h = sandy_steve_amy();
    let f = queryrunner::parse_filter_json(r#"{"name":{"$regex":"^S"}}"#).unwrap();
    assert_eq!(names(&h, &f), vec!["Sandy", "Steve"]);
}

#[test]
fn delete_one_sandy_leaves_steve_and_amy() {
    let h = sandy_steve_amy();
    assert_eq!(h.delete_one(&Filter::equals("name", "Sandy")).unwrap(), 1);
    assert_eq!(names(&h, &Filter::all()), vec!["Steve", "Amy"]);
}

#[test]
fn delete_one_without_match_removes_nothing() {
    let h = sandy_steve_amy();
    assert_eq!(h.delete_one(&Filter::equals("name", "Zoe")).unwrap(), 0);
    assert_eq!(names(&h, &Filter::all()).len(), 3);
}

#[test]
fn delete_one_removes_exactly_one_of_several_matches() {
    let h = sandy_steve_amy();
    let f = Filter::prefix("name", "S");
    let before = h.find(&f).unwrap().count();
    assert_eq!(h.delete_one(&f).unwrap(), 1);
    assert_eq!(h.find(&f).unwrap().count(), before - 1);
}

#[test]
fn delete_many_then_find_is_empty() {
    let h = sandy_steve_amy();
    let f = Filter::prefix("name", "S");
    assert_eq!(h.delete_many(&f).unwrap(), 2);
    assert!(names(&h, &f).is_empty());
    assert_eq!(names(&h, &Filter::all()), vec!["Amy"]);
}

#[test]
fn sorted_find_orders_by_name_both_ways() {
    let h = sandy_steve_amy();
    let asc: Vec<String> = h
        .find_sorted(&Filter::all(), "name", Direction::Ascending)
        .unwrap()
        .map(|d| d.unwrap().get_str("name").unwrap().to_string())
        .collect();
    assert_eq!(asc, vec!["Amy", "Sandy", "Steve"]);
    let desc: Vec<String> = h
        .find_sorted(&Filter::all(), "name", Direction::Descending)
        .unwrap()
        .map(|d| d.unwrap().get_str("name").unwrap().to_string())
        .collect();
    assert_eq!(desc, vec!["Steve", "Sandy", "Amy"]);
}

#[test]
fn each_find_is_a_fresh_sequence() {
    let h = sandy_steve_amy();
    let first = h.find(&Filter::all()).unwrap().to_vec().unwrap();
    let second = h.find(&Filter::all()).unwrap().to_vec().unwrap();
    assert_eq!(first, second);
}

#[test]
fn insert_many_appends_in_natural_order() {
    let h = sandy_steve_amy();
    assert_eq!(h.insert_many(vec![doc! {"name": "Sam"}]).unwrap(), 1);
    assert_eq!(names(&h, &Filter::prefix("name", "S")), vec!["Sandy", "Steve", "Sam"]);
}
