use crate::errors::RunnerError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type CollectionName = String;
pub type DatabaseName = String;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_DATABASE: &str = "demo";
pub const DEFAULT_COLLECTION: &str = "dbtable";

/// Where a query runs: one collection on one server.
///
/// Built per invocation and dropped with the handle; nothing pools or reuses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub database: DatabaseName,
    pub collection: CollectionName,
    /// Full connection string; when set it wins over `host`/`port`.
    #[serde(default)]
    pub uri: Option<String>,
}

impl ConnectionTarget {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            collection: collection.into(),
            uri: None,
        }
    }

    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn connection_uri(&self) -> String {
        self.uri.clone().unwrap_or_else(|| format!("mongodb://{}:{}", self.host, self.port))
    }

    /// Scheme and host list of `connection_uri`, without credentials, path or
    /// options. Safe to put in errors and logs.
    #[must_use]
    pub fn display_uri(&self) -> String {
        redact_uri(&self.connection_uri())
    }

    /// `database.collection`, used in log lines.
    #[must_use]
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }
}

fn redact_uri(uri: &str) -> String {
    let (scheme, rest) = match uri.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, uri),
    };
    let rest = rest.split('?').next().unwrap_or(rest);
    // userinfo ends at the last '@'; its password may hold an unescaped '/'
    let (creds, hosts) = match rest.rsplit_once('@') {
        Some((_, hosts)) => ("***@", hosts),
        None => ("", rest),
    };
    let hosts = hosts.split('/').next().unwrap_or(hosts);
    match scheme {
        Some(scheme) => format!("{scheme}://{creds}{hosts}"),
        None => format!("{creds}{hosts}"),
    }
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_DATABASE, DEFAULT_COLLECTION)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// Wire value for a sort document.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

impl FromStr for Direction {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "asc" | "ascending" => Ok(Self::Ascending),
            "-1" | "desc" | "descending" => Ok(Self::Descending),
            other => Err(RunnerError::Query(format!("invalid sort direction: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: Direction,
}

impl SortSpec {
    #[must_use]
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self { field: field.into(), direction }
    }

    #[must_use]
    pub fn to_document(&self) -> bson::Document {
        let mut d = bson::Document::new();
        d.insert(self.field.clone(), self.direction.as_i32());
        d
    }
}
