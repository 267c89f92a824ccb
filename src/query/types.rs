use bson::{Bson, Document as BsonDocument};

use crate::errors::RunnerError;

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_CONDITIONS: usize = 64;
pub(crate) const MAX_PATTERN_LEN: usize = 1024;

/// One field-level predicate of a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the literal value.
    Equals { field: String, value: Bson },
    /// Field is a string whose beginning matches `pattern`.
    ///
    /// `pattern` is stored without the leading `^`; it is re-anchored when
    /// rendered for the server or compiled for local evaluation.
    PrefixMatch { field: String, pattern: String },
}

impl Condition {
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::PrefixMatch { field, .. } => field,
        }
    }

    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            Self::Equals { .. } => "$eq",
            Self::PrefixMatch { .. } => "$regex",
        }
    }
}

/// A conjunction of conditions. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Matches all documents.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Exact match on one field.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::all().and_equals(field, value)
    }

    /// Strings starting with the literal `prefix`; regex metacharacters are escaped.
    #[must_use]
    pub fn prefix(field: impl Into<String>, prefix: &str) -> Self {
        Self {
            conditions: vec![Condition::PrefixMatch {
                field: field.into(),
                pattern: regex::escape(prefix),
            }],
        }
    }

    /// Strings whose beginning matches the regex fragment `pattern`.
    ///
    /// # Errors
    /// Returns `RunnerError::Query` if the pattern does not compile.
    pub fn prefix_regex(field: impl Into<String>, pattern: &str) -> Result<Self, RunnerError> {
        Self::all().and_prefix_regex(field, pattern)
    }

    #[must_use]
    pub fn and_equals(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.conditions.push(Condition::Equals { field: field.into(), value: value.into() });
        self
    }

    /// # Errors
    /// Returns `RunnerError::Query` if the pattern does not compile.
    pub fn and_prefix_regex(
        mut self,
        field: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, RunnerError> {
        let pattern = strip_anchor_group(pattern.strip_prefix('^').unwrap_or(pattern));
        validate_pattern(pattern)?;
        self.conditions
            .push(Condition::PrefixMatch { field: field.into(), pattern: pattern.to_string() });
        Ok(self)
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Renders the filter as a server query document.
    #[must_use]
    pub fn to_document(&self) -> BsonDocument {
        let mut out = BsonDocument::new();
        let mut extra: Vec<Bson> = Vec::new();
        for c in &self.conditions {
            let (field, rendered) = match c {
                // A bare operator document or regex would be read as a query, not a value.
                Condition::Equals { field, value } if needs_eq_wrapper(value) => {
                    let mut eq = BsonDocument::new();
                    eq.insert("$eq", value.clone());
                    (field, Bson::Document(eq))
                }
                Condition::Equals { field, value } => (field, value.clone()),
                Condition::PrefixMatch { field, pattern } => {
                    let mut re = BsonDocument::new();
                    re.insert("$regex", anchored(pattern));
                    (field, Bson::Document(re))
                }
            };
            // Repeated fields cannot share one key; spill them into $and.
            if out.contains_key(field) {
                let mut d = BsonDocument::new();
                d.insert(field.clone(), rendered);
                extra.push(Bson::Document(d));
            } else {
                out.insert(field.clone(), rendered);
            }
        }
        if !extra.is_empty() {
            out.insert("$and", Bson::Array(extra));
        }
        out
    }

    pub(crate) fn from_conditions(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }
}

fn needs_eq_wrapper(value: &Bson) -> bool {
    match value {
        Bson::Document(d) => d.keys().any(|k| k.starts_with('$')),
        Bson::RegularExpression(_) => true,
        _ => false,
    }
}

/// Anchors a prefix fragment. The group keeps a top-level `|` under the `^`,
/// so the server and local evaluation agree on `S|A`.
pub(crate) fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})")
}

/// Undoes the group added by `anchored`, given the text after the `^`.
///
/// The group is only stripped when its contents compile on their own, which
/// rules out `(?:a)|(?:b)` where the first `)` closes early.
pub(crate) fn strip_anchor_group(rest: &str) -> &str {
    rest.strip_prefix("(?:")
        .and_then(|r| r.strip_suffix(')'))
        .filter(|inner| regex::Regex::new(inner).is_ok())
        .unwrap_or(rest)
}

/// The fragment must compile by itself; wrapping it first would let `a)|(b`
/// through as `^(?:a)|(b)`.
pub(crate) fn validate_pattern(pattern: &str) -> Result<(), RunnerError> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(RunnerError::Query(format!("regex pattern too long: {}", pattern.len())));
    }
    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| RunnerError::Query(format!("invalid regex pattern: {e}")))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: u64,
}
