pub mod cli;
pub mod config;
pub mod errors;
pub mod logger;
pub mod query;
pub mod runner;
pub mod store;
pub mod types;

pub use crate::errors::RunnerError;
pub use crate::query::{Condition, Cursor, Filter, parse_filter_json};
pub use crate::runner::{CollectionHandle, Operation, Outcome, connect, connect_with};
pub use crate::types::{ConnectionTarget, Direction, SortSpec};

/// Opens the collection named by the four connection parameters.
///
/// # Errors
/// Returns `RunnerError::Connection` if the server is unreachable.
pub fn open(
    host: &str,
    port: u16,
    database: &str,
    collection: &str,
) -> Result<CollectionHandle, RunnerError> {
    connect(&ConnectionTarget::new(host, port, database, collection))
}
