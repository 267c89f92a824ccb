use crate::errors::RunnerError;
use bson::{Bson, Document as BsonDocument};

use super::types::{Condition, Filter, MAX_CONDITIONS, strip_anchor_group, validate_pattern};

/// Parses a filter written as JSON, e.g. `{"name": {"$regex": "^S"}}`.
///
/// # Errors
/// Returns an error if the text is not a JSON object or uses an unsupported operator.
pub fn parse_filter_json(json: &str) -> Result<Filter, RunnerError> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(Filter::all());
    }
    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    if !value.is_object() {
        return Err(RunnerError::Query(format!("filter must be an object, got {value}")));
    }
    let doc = json_to_document(&value)?;
    Filter::from_document(&doc)
}

/// Converts a JSON object into a BSON document. Integers become `Int64`.
///
/// # Errors
/// Returns `RunnerError::Bson` if the value is not an object or holds an out-of-range integer.
pub fn json_to_document(value: &serde_json::Value) -> Result<BsonDocument, RunnerError> {
    bson::serialize_to_document(value).map_err(|e| RunnerError::Bson(e.to_string()))
}

impl Filter {
    /// Builds a filter from a query document of literal values and `$regex` / `$eq` directives.
    ///
    /// # Errors
    /// Returns `RunnerError::Query` for operators other than `$eq`, `$regex` and `$and`,
    /// for regexes that are not anchored with `^`, and for patterns that do not compile.
    pub fn from_document(doc: &BsonDocument) -> Result<Self, RunnerError> {
        let mut conditions = Vec::with_capacity(doc.len());
        collect_conditions(doc, &mut conditions)?;
        if conditions.len() > MAX_CONDITIONS {
            return Err(RunnerError::Query(format!(
                "filter has too many conditions: {}",
                conditions.len()
            )));
        }
        Ok(Self::from_conditions(conditions))
    }
}

fn collect_conditions(doc: &BsonDocument, out: &mut Vec<Condition>) -> Result<(), RunnerError> {
    for (field, value) in doc {
        if field == "$and" {
            let Bson::Array(items) = value else {
                return Err(RunnerError::Query("$and expects an array".into()));
            };
            for item in items {
                let Bson::Document(d) = item else {
                    return Err(RunnerError::Query("$and items must be objects".into()));
                };
                collect_conditions(d, out)?;
            }
            continue;
        }
        if field.starts_with('$') {
            return Err(RunnerError::Query(format!("unsupported top-level operator: {field}")));
        }
        out.push(parse_condition(field, value)?);
    }
    Ok(())
}

fn parse_condition(field: &str, value: &Bson) -> Result<Condition, RunnerError> {
    match value {
        Bson::Document(ops) if ops.keys().any(|k| k.starts_with('$')) => {
            parse_operator(field, ops)
        }
        Bson::RegularExpression(_) => Err(RunnerError::Query(format!(
            "field {field}: use {{\"$regex\": \"^...\"}} for pattern matches"
        ))),
        literal => Ok(Condition::Equals { field: field.to_string(), value: literal.clone() }),
    }
}

fn parse_operator(field: &str, ops: &BsonDocument) -> Result<Condition, RunnerError> {
    if ops.len() != 1 {
        return Err(RunnerError::Query(format!(
            "field {field}: expected exactly one operator, got {}",
            ops.len()
        )));
    }
    let Some((op, arg)) = ops.iter().next() else {
        return Err(RunnerError::Query(format!("field {field}: empty operator document")));
    };
    match op.as_str() {
        "$eq" => Ok(Condition::Equals { field: field.to_string(), value: arg.clone() }),
        "$regex" => {
            let Bson::String(pattern) = arg else {
                return Err(RunnerError::Query(format!("field {field}: $regex expects a string")));
            };
            let Some(rest) = pattern.strip_prefix('^') else {
                return Err(RunnerError::Query(format!(
                    "field {field}: only prefix patterns anchored with ^ are supported"
                )));
            };
            let fragment = strip_anchor_group(rest);
            validate_pattern(fragment)?;
            Ok(Condition::PrefixMatch { field: field.to_string(), pattern: fragment.to_string() })
        }
        other => Err(RunnerError::Query(format!("field {field}: unsupported operator {other}"))),
    }
}
