//! Option objects accepted by collection operations.
//!
//! # Search predicates
//!
//! [`SearchOption`] describes one predicate of a search. Options passed together are
//! combined by the server with a logical AND. Constructors exist for every criterion:
//!
//! ```ignore
//! use firestorm::options::SearchOption;
//!
//! let options = vec![
//!     SearchOption::eq("status", "active"),
//!     SearchOption::starts_with("name", "al").ignore_case(),
//!     SearchOption::is_in("age", vec![18, 19, 20]),
//! ];
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    document::Key,
    error::{FirestormError, FirestormResult},
};

/// Comparison criteria understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criteria {
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    /// Field value is one of the values in the given array.
    #[serde(rename = "in")]
    In,
    /// String field contains the given substring.
    #[serde(rename = "includes")]
    Includes,
    #[serde(rename = "startsWith")]
    StartsWith,
    #[serde(rename = "endsWith")]
    EndsWith,
    /// Array field contains the given value.
    #[serde(rename = "array-contains")]
    ArrayContains,
    /// Array field contains any of the values in the given array.
    #[serde(rename = "array-contains-any")]
    ArrayContainsAny,
    #[serde(rename = "array-length-eq")]
    ArrayLengthEq,
    #[serde(rename = "array-length-df")]
    ArrayLengthDf,
    #[serde(rename = "array-length-gt")]
    ArrayLengthGt,
    #[serde(rename = "array-length-lt")]
    ArrayLengthLt,
    #[serde(rename = "array-length-ge")]
    ArrayLengthGe,
    #[serde(rename = "array-length-le")]
    ArrayLengthLe,
}

/// One search predicate.
///
/// Serialized field names follow Rust conventions; the request shaper renames them to
/// the wire form (`ignore_case` becomes `ignoreCase`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOption {
    pub field: String,
    pub criteria: Criteria,
    pub value: Value,
    #[serde(default)]
    pub ignore_case: bool,
}

impl SearchOption {
    pub fn new(field: impl Into<String>, criteria: Criteria, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            criteria,
            value: value.into(),
            ignore_case: false,
        }
    }

    /// Makes string comparisons of this predicate case-insensitive.
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::Equal, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::NotEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::Greater, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::GreaterOrEqual, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::Less, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::LessOrEqual, value)
    }

    /// Matches documents whose field equals one of `values`.
    pub fn is_in(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::new(field, Criteria::In, values)
    }

    pub fn includes(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::Includes, value)
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::StartsWith, value)
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::EndsWith, value)
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Criteria::ArrayContains, value)
    }

    pub fn array_contains_any(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::new(field, Criteria::ArrayContainsAny, values)
    }

    /// Checks the shape constraints the server relies on.
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::InvalidArgument`] if the field is empty, the value is
    /// null, or the `in` criterion is given something other than an array.
    pub fn validate(&self) -> FirestormResult<()> {
        if self.field.is_empty() {
            return Err(FirestormError::invalid("search option field must not be empty"));
        }

        if self.value.is_null() {
            return Err(FirestormError::invalid(format!(
                "search option on field {} is missing a value",
                self.field
            )));
        }

        if self.criteria == Criteria::In && !self.value.is_array() {
            return Err(FirestormError::invalid(format!(
                "criteria \"in\" on field {} takes an array of values",
                self.field
            )));
        }

        Ok(())
    }
}

/// Field projection for `select`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub fields: Vec<String>,
}

impl SelectOption {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { fields: fields.into_iter().map(Into::into).collect() }
    }
}

/// Distinct-values query for `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueOption {
    pub field: String,
    /// When the field holds arrays, return their elements instead of the arrays.
    #[serde(default)]
    pub flatten: bool,
}

impl ValueOption {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into(), flatten: false }
    }

    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }
}

/// Field edit operations understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditOperation {
    Set,
    Remove,
    /// Appends a string to a string field.
    Append,
    Increment,
    Decrement,
    /// Inverts a boolean field.
    Invert,
    ArrayPush,
    ArrayDelete,
    ArraySplice,
}

/// An in-place edit of one field of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditFieldOption {
    pub id: Key,
    pub field: String,
    pub operation: EditOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl EditFieldOption {
    pub fn new(id: impl Into<Key>, field: impl Into<String>, operation: EditOperation) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            operation,
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Random ordering requested from `search`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchRandom {
    /// Results keep the server's order.
    #[default]
    Disabled,
    /// The server shuffles results with a seed of its choosing.
    Server,
    /// The server shuffles results with the given seed.
    Seed(i64),
}

impl From<bool> for SearchRandom {
    fn from(value: bool) -> Self {
        if value { SearchRandom::Server } else { SearchRandom::Disabled }
    }
}

impl From<i64> for SearchRandom {
    fn from(seed: i64) -> Self {
        SearchRandom::Seed(seed)
    }
}

impl From<Option<i64>> for SearchRandom {
    fn from(seed: Option<i64>) -> Self {
        seed.map_or(SearchRandom::Disabled, SearchRandom::Seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn in_requires_an_array() {
        assert!(SearchOption::is_in("age", 3).validate().is_err());
        assert!(SearchOption::is_in("age", vec![3, 4]).validate().is_ok());
    }

    #[test]
    fn null_values_and_empty_fields_are_rejected() {
        assert!(SearchOption::eq("name", Value::Null).validate().is_err());
        assert!(SearchOption::eq("", "x").validate().is_err());
    }

    #[test]
    fn criteria_and_operations_use_wire_names() {
        assert_eq!(to_value(Criteria::ArrayContainsAny).unwrap(), json!("array-contains-any"));
        assert_eq!(to_value(Criteria::StartsWith).unwrap(), json!("startsWith"));
        assert_eq!(to_value(EditOperation::ArrayPush).unwrap(), json!("array-push"));
    }

    #[test]
    fn edit_field_omits_missing_value() {
        let option = EditFieldOption::new("k", "count", EditOperation::Increment);
        assert_eq!(
            to_value(&option).unwrap(),
            json!({ "id": "k", "field": "count", "operation": "increment" })
        );
    }

    #[test]
    fn zero_is_a_seed() {
        assert_eq!(SearchRandom::from(0i64), SearchRandom::Seed(0));
        assert_eq!(SearchRandom::from(false), SearchRandom::Disabled);
        assert_eq!(SearchRandom::from(true), SearchRandom::Server);
    }
}
