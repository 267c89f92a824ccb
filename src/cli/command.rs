use crate::runner::Operation;
use crate::types::{Direction, SortSpec};

/// Programmatic form of the CLI subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Find {
        filter_json: String,
    },
    Sort {
        filter_json: String,
        field: String,
        direction: Direction,
    },
    DeleteMany {
        filter_json: String,
        /// Print the whole collection after deleting.
        show_remaining: bool,
    },
    DeleteOne {
        filter_json: String,
        show_remaining: bool,
    },
}

impl Command {
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Find { .. } => Operation::Find,
            Self::Sort { field, direction, .. } => {
                Operation::FindSorted(SortSpec::new(field.clone(), *direction))
            }
            Self::DeleteMany { .. } => Operation::DeleteMany,
            Self::DeleteOne { .. } => Operation::DeleteOne,
        }
    }

    #[must_use]
    pub fn filter_json(&self) -> &str {
        match self {
            Self::Find { filter_json }
            | Self::Sort { filter_json, .. }
            | Self::DeleteMany { filter_json, .. }
            | Self::DeleteOne { filter_json, .. } => filter_json,
        }
    }

    #[must_use]
    pub const fn show_remaining(&self) -> bool {
        match self {
            Self::DeleteMany { show_remaining, .. } | Self::DeleteOne { show_remaining, .. } => {
                *show_remaining
            }
            _ => false,
        }
    }
}
