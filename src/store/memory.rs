use bson::Document as BsonDocument;
use parking_lot::RwLock;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::DocumentStore;
use crate::errors::RunnerError;
use crate::query::{Cursor, Filter, Matcher, compare_docs, json_to_document};
use crate::types::SortSpec;

/// An in-process collection. Natural order is insertion order.
pub struct MemoryStore {
    name: String,
    docs: RwLock<Vec<BsonDocument>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), docs: RwLock::new(Vec::new()) }
    }

    #[must_use]
    pub fn with_docs(name: impl Into<String>, docs: Vec<BsonDocument>) -> Self {
        Self { name: name.into(), docs: RwLock::new(docs) }
    }

    /// Loads newline-delimited JSON objects. Blank lines are skipped.
    ///
    /// # Errors
    /// Returns an error naming the line number of the first record that fails to parse.
    pub fn from_ndjson<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, RunnerError> {
        let reader = BufReader::new(reader);
        let mut docs = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
                RunnerError::Io(format!("fixture line {}: {e}", idx + 1))
            })?;
            if !value.is_object() {
                return Err(RunnerError::Io(format!("fixture line {}: expected an object", idx + 1)));
            }
            docs.push(json_to_document(&value)?);
        }
        log::debug!("loaded {} fixture documents", docs.len());
        Ok(Self::with_docs(name, docs))
    }

    /// # Errors
    /// Returns an error if the file cannot be opened or parsed.
    pub fn open_ndjson<P: AsRef<Path>>(name: impl Into<String>, path: P) -> Result<Self, RunnerError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            RunnerError::Io(format!("open fixture {}: {e}", path.as_ref().display()))
        })?;
        Self::from_ndjson(name, file)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, filter: &Filter, sort: Option<&SortSpec>) -> Result<Cursor, RunnerError> {
        let matcher = Matcher::new(filter)?;
        let mut docs: Vec<BsonDocument> =
            self.docs.read().iter().filter(|d| matcher.matches(d)).cloned().collect();
        if let Some(spec) = sort {
            // stable: ties keep insertion order
            docs.sort_by(|a, b| compare_docs(a, b, spec));
        }
        Ok(Cursor::from_docs(docs))
    }

    fn delete_many(&self, filter: &Filter) -> Result<u64, RunnerError> {
        let matcher = Matcher::new(filter)?;
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|d| !matcher.matches(d));
        Ok((before - docs.len()) as u64)
    }

    fn delete_one(&self, filter: &Filter) -> Result<u64, RunnerError> {
        let matcher = Matcher::new(filter)?;
        let mut docs = self.docs.write();
        if let Some(pos) = docs.iter().position(|d| matcher.matches(d)) {
            docs.remove(pos);
            return Ok(1);
        }
        Ok(0)
    }

    fn insert_many(&self, docs: Vec<BsonDocument>) -> Result<u64, RunnerError> {
        let n = docs.len() as u64;
        self.docs.write().extend(docs);
        Ok(n)
    }

    fn describe(&self) -> String {
        format!("memory://{}", self.name)
    }
}
