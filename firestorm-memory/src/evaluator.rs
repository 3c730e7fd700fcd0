//! Search predicate evaluation for the in-memory server.
//!
//! Mirrors the matching rules of a Firestorm server closely enough for tests: every
//! option of a search must match for a document to be returned.

use std::cmp::Ordering;

use serde::Deserialize;
use serde_json::Value;

use firestorm_core::options::Criteria;

/// A search option as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireSearchOption {
    pub field: String,
    pub criteria: Criteria,
    pub value: Value,
    #[serde(rename = "ignoreCase", default)]
    pub ignore_case: bool,
}

/// Ordered view of a JSON value. Integers and floats are compared as `f64`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(&'a [Value]),
    Other,
}

impl<'a> Comparable<'a> {
    fn new(value: &'a Value, ignore_case: bool) -> Self {
        match value {
            Value::Null => Comparable::Null,
            Value::Bool(b) => Comparable::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Comparable::Other, Comparable::Number),
            Value::String(s) if ignore_case => Comparable::String(s.to_lowercase()),
            Value::String(s) => Comparable::String(s.clone()),
            Value::Array(items) => Comparable::Array(items),
            Value::Object(_) => Comparable::Other,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

pub(crate) struct SearchEvaluator<'a> {
    document: &'a Value,
}

impl<'a> SearchEvaluator<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Returns `true` when every option matches.
    pub fn matches_all(&self, options: &[WireSearchOption]) -> bool {
        options.iter().all(|option| self.matches(option))
    }

    pub fn matches(&self, option: &WireSearchOption) -> bool {
        let Some(field_value) = self.document.get(&option.field) else {
            return false;
        };

        let left = Comparable::new(field_value, option.ignore_case);
        let right = Comparable::new(&option.value, option.ignore_case);

        match option.criteria {
            Criteria::Equal => left == right,
            Criteria::NotEqual => left != right,
            Criteria::Greater => left.partial_cmp(&right) == Some(Ordering::Greater),
            Criteria::GreaterOrEqual => matches!(
                left.partial_cmp(&right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Criteria::Less => left.partial_cmp(&right) == Some(Ordering::Less),
            Criteria::LessOrEqual => matches!(
                left.partial_cmp(&right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Criteria::In => match &option.value {
                Value::Array(values) => values
                    .iter()
                    .any(|v| Comparable::new(v, option.ignore_case) == left),
                _ => false,
            },
            Criteria::Includes => match (left, right) {
                (Comparable::String(l), Comparable::String(r)) => l.contains(&r),
                _ => false,
            },
            Criteria::StartsWith => match (left, right) {
                (Comparable::String(l), Comparable::String(r)) => l.starts_with(&r),
                _ => false,
            },
            Criteria::EndsWith => match (left, right) {
                (Comparable::String(l), Comparable::String(r)) => l.ends_with(&r),
                _ => false,
            },
            Criteria::ArrayContains => match field_value {
                Value::Array(items) => items
                    .iter()
                    .any(|item| Comparable::new(item, option.ignore_case) == right),
                _ => false,
            },
            Criteria::ArrayContainsAny => match (field_value, &option.value) {
                (Value::Array(items), Value::Array(values)) => items.iter().any(|item| {
                    let item = Comparable::new(item, option.ignore_case);
                    values
                        .iter()
                        .any(|v| Comparable::new(v, option.ignore_case) == item)
                }),
                _ => false,
            },
            Criteria::ArrayLengthEq
            | Criteria::ArrayLengthDf
            | Criteria::ArrayLengthGt
            | Criteria::ArrayLengthLt
            | Criteria::ArrayLengthGe
            | Criteria::ArrayLengthLe => match (field_value, option.value.as_i64()) {
                (Value::Array(items), Some(expected)) => {
                    length_matches(option.criteria, (items.len() as i64).cmp(&expected))
                }
                _ => false,
            },
        }
    }
}

fn length_matches(criteria: Criteria, ordering: Ordering) -> bool {
    match criteria {
        Criteria::ArrayLengthEq => ordering == Ordering::Equal,
        Criteria::ArrayLengthDf => ordering != Ordering::Equal,
        Criteria::ArrayLengthGt => ordering == Ordering::Greater,
        Criteria::ArrayLengthLt => ordering == Ordering::Less,
        Criteria::ArrayLengthGe => ordering != Ordering::Less,
        Criteria::ArrayLengthLe => ordering != Ordering::Greater,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(field: &str, criteria: Criteria, value: Value) -> WireSearchOption {
        WireSearchOption { field: field.into(), criteria, value, ignore_case: false }
    }

    #[test]
    fn comparisons_mix_integers_and_floats() {
        let doc = json!({ "age": 30 });
        let evaluator = SearchEvaluator::new(&doc);

        assert!(evaluator.matches(&option("age", Criteria::Equal, json!(30.0))));
        assert!(evaluator.matches(&option("age", Criteria::GreaterOrEqual, json!(30))));
        assert!(!evaluator.matches(&option("age", Criteria::Less, json!(18))));
        assert!(evaluator.matches(&option("age", Criteria::In, json!([1, 30]))));
    }

    #[test]
    fn strings_honor_ignore_case() {
        let doc = json!({ "name": "Alice" });
        let evaluator = SearchEvaluator::new(&doc);

        assert!(!evaluator.matches(&option("name", Criteria::StartsWith, json!("al"))));

        let mut insensitive = option("name", Criteria::StartsWith, json!("al"));
        insensitive.ignore_case = true;
        assert!(evaluator.matches(&insensitive));
    }

    #[test]
    fn array_criteria() {
        let doc = json!({ "tags": ["a", "b"] });
        let evaluator = SearchEvaluator::new(&doc);

        assert!(evaluator.matches(&option("tags", Criteria::ArrayContains, json!("a"))));
        assert!(evaluator.matches(&option("tags", Criteria::ArrayContainsAny, json!(["z", "b"]))));
        assert!(evaluator.matches(&option("tags", Criteria::ArrayLengthEq, json!(2))));
        assert!(evaluator.matches(&option("tags", Criteria::ArrayLengthLt, json!(3))));
        assert!(!evaluator.matches(&option("tags", Criteria::ArrayLengthDf, json!(2))));
    }

    #[test]
    fn missing_fields_never_match() {
        let doc = json!({});
        assert!(!SearchEvaluator::new(&doc).matches(&option("x", Criteria::NotEqual, json!(1))));
    }
}
