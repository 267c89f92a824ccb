use bson::doc;
use queryrunner::{ConnectionTarget, Direction, Filter, RunnerError, connect};

fn scratch_target(tag: &str) -> ConnectionTarget {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    ConnectionTarget::new("localhost", 27017, "queryrunner_test", format!("{tag}_{nanos}"))
}

#[test]
#[ignore = "requires a running mongod on localhost:27017"]
fn live_find_sort_and_delete() {
    let t = scratch_target("live");
    let h = queryrunner::open(&t.host, t.port, &t.database, &t.collection).unwrap();
    h.insert_many(vec![doc! {"name": "Sandy"}, doc! {"name": "Steve"}, doc! {"name": "Amy"}])
        .unwrap();

    let s: Vec<_> = h.find(&Filter::prefix("name", "S")).unwrap().to_vec().unwrap();
    assert_eq!(s.len(), 2);

    let sorted = h.find_sorted(&Filter::all(), "name", Direction::Ascending).unwrap().to_vec().unwrap();
    assert_eq!(sorted[0].get_str("name").unwrap(), "Amy");

    assert_eq!(h.delete_one(&Filter::equals("name", "Sandy")).unwrap(), 1);
    assert_eq!(h.delete_many(&Filter::all()).unwrap(), 2);
    assert!(h.find(&Filter::all()).unwrap().to_vec().unwrap().is_empty());
}

#[test]
#[ignore = "requires a running mongod on localhost:27017"]
fn live_connect_with_target() {
    let h = connect(&scratch_target("target")).unwrap();
    assert!(h.describe().starts_with("mongodb://localhost:27017/queryrunner_test.target_"));
    assert_eq!(h.delete_many(&Filter::all()).unwrap(), 0);
}

#[test]
#[ignore = "waits for the driver's server selection timeout"]
fn unreachable_server_is_connection_error() {
    let t = ConnectionTarget::new("127.0.0.1", 1, "demo", "dbtable")
        .with_uri("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=500");
    assert!(matches!(connect(&t), Err(RunnerError::Connection(_))));
}

#[test]
#[ignore = "requires a running mongod on localhost:27017"]
fn live_alternation_matches_memory_store() {
    let docs = vec![doc! {"name": "Sandy"}, doc! {"name": "Amy"}, doc! {"name": "Bob A"}];
    let live = connect(&scratch_target("alt")).unwrap();
    live.insert_many(docs.clone()).unwrap();
    let local = queryrunner::connect_with(queryrunner::store::MemoryStore::with_docs("alt", docs));

    let f = queryrunner::parse_filter_json(r#"{"name":{"$regex":"^S|A"}}"#).unwrap();
    let names = |h: &queryrunner::CollectionHandle| -> Vec<String> {
        h.find_sorted(&f, "name", Direction::Ascending)
            .unwrap()
            .map(|d| d.unwrap().get_str("name").unwrap().to_string())
            .collect()
    };
    assert_eq!(names(&live), vec!["Amy", "Sandy"]);
    assert_eq!(names(&live), names(&local));
    live.delete_many(&Filter::all()).unwrap();
}
