//! Predicate tree types: the public form clients submit, and the
//! adapter-native compiled form the store evaluates.
//!
//! Modeled as a sealed variant with a match-based evaluator rather than
//! string-built queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relational operators available in the public predicate grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Exists,
    Like,
}

/// The public predicate tree clients submit for `upsertCondition` and for
/// filtered reads. Leaf paths are dotted field names into the `config`
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Predicate {
    Relational { lhs: String, op: RelOp, rhs: Value },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// The adapter-native predicate produced by the filter compiler. Leaf paths
/// are already split into document-path segments (leaf paths `x.y.z`
/// become storage path `config.x.y.z`).
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledPredicate {
    Relational {
        path: Vec<String>,
        op: RelOp,
        rhs: Value,
    },
    And(Vec<CompiledPredicate>),
    Or(Vec<CompiledPredicate>),
    Not(Box<CompiledPredicate>),
}

impl CompiledPredicate {
    /// Build a relational predicate directly over a top-level document
    /// field (e.g. `tenantId`), bypassing the `config.` rewrite the public
    /// filter compiler applies. Used internally for the latest-version
    /// batch read and for `deleteConfigs`, which operate over document
    /// identity fields rather than the opaque payload.
    pub fn field_eq(field: &str, value: Value) -> Self {
        Self::Relational {
            path: vec![field.to_string()],
            op: RelOp::Eq,
            rhs: value,
        }
    }

    pub fn and(children: Vec<CompiledPredicate>) -> Self {
        Self::And(children)
    }

    pub fn or(children: Vec<CompiledPredicate>) -> Self {
        Self::Or(children)
    }
}

fn resolve_path<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path {
        current = current.get(segment)?;
    }
    Some(current)
}

fn numeric(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn compare(lhs: &Value, rhs: &Value) -> Option<std::cmp::Ordering> {
    if let (Some(a), Some(b)) = (numeric(lhs), numeric(rhs)) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (lhs.as_str(), rhs.as_str()) {
        return Some(a.cmp(b));
    }
    None
}

/// Simple `%`/`_` glob matcher for the `LIKE` operator. `%` matches any run
/// of characters (including none), `_` matches exactly one character.
pub fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_match_inner(&text, &pattern)
}

fn like_match_inner(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => {
            like_match_inner(text, &pattern[1..])
                || (!text.is_empty() && like_match_inner(&text[1..], pattern))
        }
        Some('_') => !text.is_empty() && like_match_inner(&text[1..], &pattern[1..]),
        Some(c) => text.first() == Some(c) && like_match_inner(&text[1..], &pattern[1..]),
    }
}

/// Evaluate a compiled predicate against an encoded document.
///
/// Missing paths are treated as "not found" rather than SQL-style NULL:
/// `Eq`/`In`/`Like` are `false`, `Neq`/`NotIn` are `true`. `Exists` checks
/// both presence and non-null-ness, consistent with a `null` `config`
/// value being treated as "absent".
pub fn eval(pred: &CompiledPredicate, doc: &Value) -> bool {
    match pred {
        CompiledPredicate::And(children) => children.iter().all(|c| eval(c, doc)),
        CompiledPredicate::Or(children) => children.iter().any(|c| eval(c, doc)),
        CompiledPredicate::Not(child) => !eval(child, doc),
        CompiledPredicate::Relational { path, op, rhs } => {
            let found = resolve_path(doc, path);
            match op {
                RelOp::Exists => {
                    let exists = matches!(found, Some(v) if !v.is_null());
                    let expect_exists = rhs.as_bool().unwrap_or(true);
                    exists == expect_exists
                }
                RelOp::Eq => found.is_some_and(|v| v == rhs),
                RelOp::Neq => found.is_none_or(|v| v != rhs),
                RelOp::Lt => found
                    .and_then(|v| compare(v, rhs))
                    .is_some_and(|o| o.is_lt()),
                RelOp::Lte => found
                    .and_then(|v| compare(v, rhs))
                    .is_some_and(|o| o.is_le()),
                RelOp::Gt => found
                    .and_then(|v| compare(v, rhs))
                    .is_some_and(|o| o.is_gt()),
                RelOp::Gte => found
                    .and_then(|v| compare(v, rhs))
                    .is_some_and(|o| o.is_ge()),
                RelOp::In => {
                    let Some(v) = found else { return false };
                    rhs.as_array().is_some_and(|items| items.contains(v))
                }
                RelOp::NotIn => {
                    let Some(v) = found else { return true };
                    !rhs.as_array().is_some_and(|items| items.contains(v))
                }
                RelOp::Like => {
                    let (Some(text), Some(pattern)) = (found.and_then(Value::as_str), rhs.as_str())
                    else {
                        return false;
                    };
                    like_match(text, pattern)
                }
            }
        }
    }
}
