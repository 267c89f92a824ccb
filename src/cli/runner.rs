use bson::Document as BsonDocument;
use std::io::Write;
use std::str::FromStr;

use super::command::Command;
use crate::errors::RunnerError;
use crate::query::{self, Cursor, Filter};
use crate::runner::{CollectionHandle, Outcome};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum OutputMode {
    /// One document per line in BSON display form.
    #[default]
    Human,
    /// One compact JSON document per line.
    Plain,
    /// A single JSON value for the whole result.
    Json,
}

impl FromStr for OutputMode {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "plain" | "ndjson" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(RunnerError::Config(format!("unknown output format: {other}"))),
        }
    }
}

/// Runs `cmd` against `handle` and writes the result to `out`.
///
/// # Errors
/// Returns any parse, connection, query, or write error.
pub fn run_with_format(
    handle: &CollectionHandle,
    cmd: &Command,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), RunnerError> {
    let filter = query::parse_filter_json(cmd.filter_json())?;
    match handle.execute(&cmd.operation(), &filter)? {
        Outcome::Documents(cursor) => write_documents(cursor, mode, out)?,
        Outcome::Deleted(report) => {
            let remaining = if cmd.show_remaining() {
                Some(handle.find(&Filter::all())?)
            } else {
                None
            };
            match mode {
                OutputMode::Json => {
                    let mut json = serde_json::json!({"deleted": report.deleted});
                    if let Some(cur) = remaining {
                        json["remaining"] = docs_to_json(cur.to_vec()?)?;
                    }
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => {
                    writeln!(out, "{}", report.deleted)?;
                    if let Some(cur) = remaining {
                        write_documents(cur, mode, out)?;
                    }
                }
                OutputMode::Human => {
                    writeln!(out, "deleted {}", report.deleted)?;
                    if let Some(cur) = remaining {
                        write_documents(cur, mode, out)?;
                    }
                }
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn write_documents(cursor: Cursor, mode: OutputMode, out: &mut dyn Write) -> Result<(), RunnerError> {
    match mode {
        OutputMode::Json => {
            let json = docs_to_json(cursor.to_vec()?)?;
            writeln!(out, "{json}")?;
        }
        OutputMode::Plain => {
            for doc in cursor {
                writeln!(out, "{}", serde_json::to_string(&doc?)?)?;
            }
        }
        OutputMode::Human => {
            for doc in cursor {
                writeln!(out, "{}", doc?)?;
            }
        }
    }
    Ok(())
}

fn docs_to_json(docs: Vec<BsonDocument>) -> Result<serde_json::Value, RunnerError> {
    Ok(serde_json::Value::Array(
        docs.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?,
    ))
}
