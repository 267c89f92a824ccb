//! Storage backends the runner executes against.
//!
//! `MongoStore` talks to a server through the blocking driver; `MemoryStore`
//! keeps an insertion-ordered collection in process and evaluates filters locally.
mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::errors::RunnerError;
use crate::query::{Cursor, Filter};
use crate::types::SortSpec;
use bson::Document as BsonDocument;

/// One collection that can be queried and pruned.
pub trait DocumentStore {
    /// Matching documents, in natural order unless `sort` is given.
    ///
    /// # Errors
    /// Returns a connection or query error from the backend.
    fn find(&self, filter: &Filter, sort: Option<&SortSpec>) -> Result<Cursor, RunnerError>;

    /// # Errors
    /// Returns a connection or query error from the backend.
    fn delete_many(&self, filter: &Filter) -> Result<u64, RunnerError>;

    /// Removes the first match in natural order; returns 0 or 1.
    ///
    /// # Errors
    /// Returns a connection or query error from the backend.
    fn delete_one(&self, filter: &Filter) -> Result<u64, RunnerError>;

    /// # Errors
    /// Returns a connection or query error from the backend.
    fn insert_many(&self, docs: Vec<BsonDocument>) -> Result<u64, RunnerError>;

    /// Short label for logs, e.g. `mongodb://localhost:27017/demo.dbtable`.
    fn describe(&self) -> String;
}
