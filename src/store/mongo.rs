use bson::{Document as BsonDocument, doc};
use mongodb::sync::{Client, Collection};

use super::DocumentStore;
use crate::errors::RunnerError;
use crate::query::{Cursor, Filter};
use crate::types::{ConnectionTarget, SortSpec};

/// A collection on a MongoDB server, accessed through the blocking driver API.
pub struct MongoStore {
    collection: Collection<BsonDocument>,
    label: String,
}

impl MongoStore {
    /// Opens a client for `target` and pings the server.
    ///
    /// The driver connects lazily, so the ping is what surfaces an unreachable
    /// target. Server selection uses the driver's default timeout.
    ///
    /// # Errors
    /// Returns `RunnerError::Connection` if the URI is invalid or the server cannot be reached.
    pub fn connect(target: &ConnectionTarget) -> Result<Self, RunnerError> {
        // the raw URI may carry a password; only the redacted form is reported
        let shown = target.display_uri();
        let client = Client::with_uri_str(target.connection_uri())
            .map_err(|e| RunnerError::Connection(format!("{shown}: {e}")))?;
        client
            .database(&target.database)
            .run_command(doc! {"ping": 1})
            .run()
            .map_err(|e| RunnerError::Connection(format!("{shown}: {e}")))?;
        let collection = client.database(&target.database).collection(&target.collection);
        Ok(Self { collection, label: format!("{shown}/{}", target.namespace()) })
    }
}

/// The query and sort documents sent for a find.
fn find_request(filter: &Filter, sort: Option<&SortSpec>) -> (BsonDocument, Option<BsonDocument>) {
    (filter.to_document(), sort.map(SortSpec::to_document))
}

impl DocumentStore for MongoStore {
    fn find(&self, filter: &Filter, sort: Option<&SortSpec>) -> Result<Cursor, RunnerError> {
        let (query, order) = find_request(filter, sort);
        let mut action = self.collection.find(query);
        if let Some(order) = order {
            action = action.sort(order);
        }
        let cursor = action.run()?;
        Ok(Cursor::new(cursor.map(|r| r.map_err(RunnerError::from))))
    }

    fn delete_many(&self, filter: &Filter) -> Result<u64, RunnerError> {
        Ok(self.collection.delete_many(filter.to_document()).run()?.deleted_count)
    }

    fn delete_one(&self, filter: &Filter) -> Result<u64, RunnerError> {
        Ok(self.collection.delete_one(filter.to_document()).run()?.deleted_count)
    }

    fn insert_many(&self, docs: Vec<BsonDocument>) -> Result<u64, RunnerError> {
        // the driver rejects empty batches
        if docs.is_empty() {
            return Ok(0);
        }
        let res = self.collection.insert_many(docs).run()?;
        Ok(res.inserted_ids.len() as u64)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
