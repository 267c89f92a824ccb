// Aggregates per-module test suites mirroring src/
mod cli;
mod mongo;
mod runner;
