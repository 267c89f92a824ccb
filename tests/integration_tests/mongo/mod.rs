// Require a mongod on localhost:27017; run with `cargo test --test all -- --ignored`.
#[path = "mod_live.rs"]
mod live_tests;
