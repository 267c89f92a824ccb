#[path = "mod_scenarios.rs"]
mod scenarios_tests;
