use bson::{Bson, Document as BsonDocument};
use regex::Regex;
use std::cmp::Ordering;

use super::types::{Condition, Filter, MAX_CONDITIONS, MAX_PATH_DEPTH, anchored};
use crate::errors::RunnerError;
use crate::types::{Direction, SortSpec};

/// A filter with its prefix patterns compiled, for evaluating many documents.
#[derive(Debug)]
pub struct Matcher {
    preds: Vec<Pred>,
}

#[derive(Debug)]
enum Pred {
    Eq { path: String, value: Bson },
    Prefix { path: String, re: Regex },
}

impl Matcher {
    /// # Errors
    /// Returns `RunnerError::Query` when a pattern fails to compile or the filter is too large.
    pub fn new(filter: &Filter) -> Result<Self, RunnerError> {
        if filter.conditions().len() > MAX_CONDITIONS {
            return Err(RunnerError::Query(format!(
                "filter has too many conditions: {}",
                filter.conditions().len()
            )));
        }
        let preds = filter
            .conditions()
            .iter()
            .map(|c| match c {
                Condition::Equals { field, value } => {
                    Ok(Pred::Eq { path: field.clone(), value: value.clone() })
                }
                Condition::PrefixMatch { field, pattern } => Regex::new(&anchored(pattern))
                    .map(|re| Pred::Prefix { path: field.clone(), re })
                    .map_err(|e| RunnerError::Query(format!("invalid regex pattern: {e}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { preds })
    }

    #[must_use]
    pub fn matches(&self, doc: &BsonDocument) -> bool {
        self.preds.iter().all(|p| match p {
            Pred::Eq { path, value } => get_path(doc, path).is_some_and(|v| match v {
                // an array field matches as a whole or through any element
                Bson::Array(items) => {
                    bson_equal(v, value) || items.iter().any(|x| bson_equal(x, value))
                }
                _ => bson_equal(v, value),
            }),
            Pred::Prefix { path, re } => match get_path(doc, path) {
                Some(Bson::String(s)) => re.is_match(s),
                Some(Bson::Array(items)) => {
                    items.iter().any(|x| matches!(x, Bson::String(s) if re.is_match(s)))
                }
                _ => false,
            },
        })
    }
}

/// One-shot evaluation; prefer `Matcher` when testing many documents.
#[must_use]
pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    Matcher::new(filter).is_ok_and(|m| m.matches(doc))
}

/// Orders two documents by `sort.field`; documents missing the field come first.
///
/// Array values rank as arrays rather than by their smallest or largest
/// element, which is where this departs from the server's sort.
pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &SortSpec) -> Ordering {
    let ord = match (get_path(a, &sort.field), get_path(b, &sort.field)) {
        (Some(x), Some(y)) => compare_bson(x, y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    match sort.direction {
        Direction::Ascending => ord,
        Direction::Descending => ord.reverse(),
    }
}

pub(crate) fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').peekable();
    let mut segs = 0usize;
    while let Some(part) = parts.next() {
        segs += 1;
        if segs > MAX_PATH_DEPTH {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

fn is_num(x: &Bson) -> bool {
    matches!(x, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

#[allow(clippy::cast_precision_loss)]
fn as_f64_num(x: &Bson) -> f64 {
    match x {
        Bson::Int32(i) => f64::from(*i),
        Bson::Int64(i) => *i as f64,
        Bson::Double(f) => *f,
        Bson::Decimal128(d) => d.to_string().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Equality where `1`, `1i64`, `1.0` and decimal `1` are the same value, as the
/// server treats them. Decimals are compared through `f64`, so digits beyond its
/// precision are lost.
#[allow(clippy::float_cmp)]
pub fn bson_equal(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return as_f64_num(a) == as_f64_num(b);
    }
    a == b
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// Server sort order for mixed types.
const fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::DbPointer(_) => 12,
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => 13,
        Bson::MaxKey => 255,
    }
}
