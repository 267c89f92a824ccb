use bson::{Document, doc};
use proptest::prelude::*;
use queryrunner::query::{eval_filter, parse_filter_json};
use queryrunner::store::MemoryStore;
use queryrunner::{Direction, Filter, connect_with};

fn name_docs(names: &[String]) -> Vec<Document> {
    names.iter().map(|n| doc! {"name": n.as_str()}).collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    // Prefix filters agree with str::starts_with, metacharacters included.
    #[test]
    fn prop_prefix_matches_starts_with(s in ".{0,12}", p in ".{0,4}") {
        let f = Filter::prefix("name", &p);
        prop_assert_eq!(eval_filter(&doc! {"name": s.as_str()}, &f), s.starts_with(&p));
    }

    #[test]
    fn prop_find_returns_only_matches(names in proptest::collection::vec("[A-Za-z]{0,6}", 0..20), p in "[A-Z]{0,2}") {
        let h = connect_with(MemoryStore::with_docs("p", name_docs(&names)));
        let f = Filter::prefix("name", &p);
        let found = h.find(&f).unwrap().to_vec().unwrap();
        let expected = names.iter().filter(|n| n.starts_with(&p)).count();
        prop_assert_eq!(found.len(), expected);
        for d in &found {
            prop_assert!(d.get_str("name").unwrap().starts_with(&p));
        }
    }

    #[test]
    fn prop_sorted_is_non_decreasing(names in proptest::collection::vec("[a-z]{0,6}", 0..20)) {
        let h = connect_with(MemoryStore::with_docs("p", name_docs(&names)));
        let asc: Vec<String> = h.find_sorted(&Filter::all(), "name", Direction::Ascending).unwrap()
            .map(|d| d.unwrap().get_str("name").unwrap().to_string()).collect();
        prop_assert!(asc.windows(2).all(|w| w[0] <= w[1]));
        let mut desc: Vec<String> = h.find_sorted(&Filter::all(), "name", Direction::Descending).unwrap()
            .map(|d| d.unwrap().get_str("name").unwrap().to_string()).collect();
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn prop_delete_many_leaves_no_matches(names in proptest::collection::vec("[A-C][a-z]{0,3}", 0..20), p in "[A-C]") {
        let h = connect_with(MemoryStore::with_docs("p", name_docs(&names)));
        let f = Filter::prefix("name", &p);
        let matched = h.find(&f).unwrap().count() as u64;
        prop_assert_eq!(h.delete_many(&f).unwrap(), matched);
        prop_assert_eq!(h.find(&f).unwrap().count(), 0);
        prop_assert_eq!(h.find(&Filter::all()).unwrap().count() as u64, names.len() as u64 - matched);
    }

    #[test]
    fn prop_delete_one_removes_at_most_one(names in proptest::collection::vec("[A-C]", 0..10), target in "[A-C]") {
        let h = connect_with(MemoryStore::with_docs("p", name_docs(&names)));
        let f = Filter::equals("name", target.as_str());
        let before = h.find(&f).unwrap().count();
        let removed = h.delete_one(&f).unwrap();
        prop_assert_eq!(removed, u64::from(before > 0));
        prop_assert_eq!(h.find(&f).unwrap().count(), before - removed as usize);
    }

    // The regex sent to the server selects the same names as local evaluation,
    // including patterns with a top-level alternation.
    #[test]
    fn prop_wire_regex_agrees_with_local_eval(
        alts in proptest::collection::vec("[a-c]{0,2}", 1..4),
        names in proptest::collection::vec("[a-c]{0,4}", 0..12),
    ) {
        let json = serde_json::json!({"name": {"$regex": format!("^{}", alts.join("|"))}});
        let f = parse_filter_json(&json.to_string()).unwrap();
        let wire = f.to_document().get_document("name").unwrap().get_str("$regex").unwrap().to_string();
        let server = regex::Regex::new(&wire).unwrap();
        for n in &names {
            let local = eval_filter(&doc! {"name": n.as_str()}, &f);
            prop_assert_eq!(local, server.is_match(n), "name {:?} wire {:?}", n, wire);
            prop_assert_eq!(local, alts.iter().any(|a| n.starts_with(a.as_str())));
        }
    }
}
