// Submodules for separation of concerns
mod cursor;
mod eval;
mod parse;
mod types;

pub use cursor::Cursor;
pub use eval::{Matcher, bson_equal, compare_bson, compare_docs, eval_filter};
pub use parse::{json_to_document, parse_filter_json};
pub use types::{Condition, DeleteReport, Filter};
