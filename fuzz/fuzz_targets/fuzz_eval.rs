#![no_main]
use libfuzzer_sys::fuzz_target;
use queryrunner::store::{DocumentStore, MemoryStore};

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(filter) = queryrunner::query::parse_filter_json(s) {
            let store = MemoryStore::with_docs("fuzz", vec![
                bson::doc!{"a": 1, "b": 2, "name": "x"},
                bson::doc!{"a": 10, "b": -5, "name": "Sandy", "nested": {"z": 3}},
                bson::doc!{"active": true},
            ]);
            if let Ok(cur) = store.find(&filter, None) {
                for d in cur.flatten() {
                    assert!(queryrunner::query::eval_filter(&d, &filter));
                }
            }
            let _ = store.delete_many(&filter);
        }
    }
});
