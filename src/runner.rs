//! The query runner: open a collection, run one operation, hand back results.
//!
//! Every call is a single request against the store; nothing here retries or
//! caches. Errors propagate to the caller unchanged.

use bson::Document as BsonDocument;
use serde_json::json;
use std::time::Instant;

use crate::errors::RunnerError;
use crate::query::{Cursor, DeleteReport, Filter};
use crate::store::{DocumentStore, MongoStore};
use crate::types::{ConnectionTarget, Direction, SortSpec};

/// An open collection. Dropping it releases the connection.
pub struct CollectionHandle {
    store: Box<dyn DocumentStore>,
}

/// Which operation to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Find,
    FindSorted(SortSpec),
    DeleteMany,
    DeleteOne,
}

impl Operation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::FindSorted(_) => "find_sorted",
            Self::DeleteMany => "delete_many",
            Self::DeleteOne => "delete_one",
        }
    }
}

/// Result of `CollectionHandle::execute`.
#[derive(Debug)]
pub enum Outcome {
    Documents(Cursor),
    Deleted(DeleteReport),
}

/// Connects to the server named by `target` and opens its collection.
///
/// # Errors
/// Returns `RunnerError::Connection` if the server is unreachable.
pub fn connect(target: &ConnectionTarget) -> Result<CollectionHandle, RunnerError> {
    let start = Instant::now();
    let store = MongoStore::connect(target).inspect_err(|e| {
        log::error!(target: "queryrunner::connect", "connect {} failed: {e}", target.namespace());
    })?;
    let event = json!({
        "event": "connected",
        "server": target.display_uri(),
        "namespace": target.namespace(),
        "duration_ms": start.elapsed().as_millis(),
    });
    log::info!(target: "queryrunner::connect", "{event}");
    Ok(CollectionHandle::new(store))
}

/// Wraps an existing store, e.g. a `MemoryStore`.
pub fn connect_with<S: DocumentStore + 'static>(store: S) -> CollectionHandle {
    CollectionHandle::new(store)
}

impl CollectionHandle {
    pub fn new<S: DocumentStore + 'static>(store: S) -> Self {
        Self { store: Box::new(store) }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        self.store.describe()
    }

    /// Documents matching `filter`, in natural order. The empty filter matches all.
    ///
    /// # Errors
    /// Returns a connection or query error from the store.
    pub fn find(&self, filter: &Filter) -> Result<Cursor, RunnerError> {
        let start = Instant::now();
        let cur = self.store.find(filter, None)?;
        Ok(self.track_find(&Operation::Find, filter, cur, start))
    }

    /// Documents matching `filter`, ordered by `field`. Ties keep natural order.
    ///
    /// # Errors
    /// Returns a connection or query error from the store.
    pub fn find_sorted(
        &self,
        filter: &Filter,
        field: &str,
        direction: Direction,
    ) -> Result<Cursor, RunnerError> {
        let start = Instant::now();
        let spec = SortSpec::new(field, direction);
        let cur = self.store.find(filter, Some(&spec))?;
        Ok(self.track_find(&Operation::FindSorted(spec), filter, cur, start))
    }

    /// Removes every match and returns how many were removed (0 when none matched).
    ///
    /// # Errors
    /// Returns a connection or query error from the store.
    pub fn delete_many(&self, filter: &Filter) -> Result<u64, RunnerError> {
        let start = Instant::now();
        let n = self.store.delete_many(filter)?;
        self.log_delete(&Operation::DeleteMany, n, start);
        Ok(n)
    }

    /// Removes at most one match; returns 1 if a document was removed, else 0.
    ///
    /// # Errors
    /// Returns a connection or query error from the store.
    pub fn delete_one(&self, filter: &Filter) -> Result<u64, RunnerError> {
        let start = Instant::now();
        let n = self.store.delete_one(filter)?;
        self.log_delete(&Operation::DeleteOne, n, start);
        Ok(n)
    }

    /// # Errors
    /// Returns a connection or query error from the store.
    pub fn insert_many(&self, docs: Vec<BsonDocument>) -> Result<u64, RunnerError> {
        let n = self.store.insert_many(docs)?;
        log::debug!(target: "queryrunner::query", "inserted {n} documents into {}", self.describe());
        Ok(n)
    }

    /// Runs `op` with `filter`.
    ///
    /// # Errors
    /// Returns a connection or query error from the store.
    pub fn execute(&self, op: &Operation, filter: &Filter) -> Result<Outcome, RunnerError> {
        Ok(match op {
            Operation::Find => Outcome::Documents(self.find(filter)?),
            Operation::FindSorted(spec) => {
                Outcome::Documents(self.find_sorted(filter, &spec.field, spec.direction)?)
            }
            Operation::DeleteMany => {
                Outcome::Deleted(DeleteReport { deleted: self.delete_many(filter)? })
            }
            Operation::DeleteOne => {
                Outcome::Deleted(DeleteReport { deleted: self.delete_one(filter)? })
            }
        })
    }

    // The find event is logged once the caller has drained (or dropped) the
    // cursor, so it can carry the result count.
    fn track_find(&self, op: &Operation, filter: &Filter, cur: Cursor, start: Instant) -> Cursor {
        let op = op.name();
        let collection = self.describe();
        let kinds: Vec<&'static str> = filter.conditions().iter().map(|c| c.kind_name()).collect();
        cur.on_finish(move |count, drained| {
            let event = find_event(op, &collection, &kinds, count, drained, start);
            log::info!(target: "queryrunner::query", "{event}");
        })
    }

    fn log_delete(&self, op: &Operation, deleted: u64, start: Instant) {
        let event = json!({
            "op": op.name(),
            "collection": self.describe(),
            "deleted": deleted,
            "duration_ms": start.elapsed().as_millis(),
        });
        log::info!(target: "queryrunner::query", "{event}");
    }
}

fn find_event(
    op: &str,
    collection: &str,
    kinds: &[&str],
    result_count: usize,
    drained: bool,
    start: Instant,
) -> serde_json::Value {
    json!({
        "op": op,
        "collection": collection,
        "conditions": kinds,
        "result_count": result_count,
        "drained": drained,
        "duration_ms": start.elapsed().as_millis(),
    })
}
