use crate::errors::RunnerError;
use bson::Document as BsonDocument;

/// A forward-only cursor over query results.
///
/// Server cursors fetch batches lazily, so each item may carry a driver error.
pub struct Cursor {
    inner: Box<dyn Iterator<Item = Result<BsonDocument, RunnerError>>>,
    pos: usize,
    on_finish: Option<Box<dyn FnOnce(usize, bool)>>,
}

impl Cursor {
    pub fn new<I>(inner: I) -> Self
    where
        I: Iterator<Item = Result<BsonDocument, RunnerError>> + 'static,
    {
        Self { inner: Box::new(inner), pos: 0, on_finish: None }
    }

    /// Calls `f` once with the number of items yielded, either when the cursor
    /// runs dry (`true`) or when it is dropped early (`false`).
    #[must_use]
    pub fn on_finish<F>(mut self, f: F) -> Self
    where
        F: FnOnce(usize, bool) + 'static,
    {
        self.on_finish = Some(Box::new(f));
        self
    }

    fn finish(&mut self, drained: bool) {
        if let Some(f) = self.on_finish.take() {
            f(self.pos, drained);
        }
    }

    /// A cursor over already materialized documents.
    #[must_use]
    pub fn from_docs(docs: Vec<BsonDocument>) -> Self {
        Self::new(docs.into_iter().map(Ok))
    }

    /// Number of items yielded so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Drains the cursor, stopping at the first error.
    ///
    /// # Errors
    /// Returns the first error reported while fetching.
    pub fn to_vec(self) -> Result<Vec<BsonDocument>, RunnerError> {
        self.collect()
    }
}

impl Iterator for Cursor {
    type Item = Result<BsonDocument, RunnerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(item) = self.inner.next() else {
            self.finish(true);
            return None;
        };
        self.pos += 1;
        Some(item)
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.finish(false);
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("pos", &self.pos).finish_non_exhaustive()
    }
}
