//! Declarative parameter schemas.
//!
//! Every endpoint describes the parameters it accepts as a tree of `Rule`s.
//! A `key_set` rule is closed: keys that are not declared are rejected, and
//! required keys must be present. Validation runs before a request is built,
//! so a rejected parameter bag never reaches the network.

use chrono::NaiveDate;
use email_address::EmailAddress;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::Params;

/// Where and why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid parameter `{path}`: {reason}")]
pub struct ValidationError {
    /// Dotted/indexed location, e.g. `participants[0].email`.
    pub path: String,
    pub reason: String,
}

impl ValidationError {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        let path = if path.is_empty() { "value" } else { path };
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    String { non_empty: bool },
    IntMin(i64),
    Bool,
    Timestamp,
    Email,
    Date,
    Url,
    In(Vec<&'static str>),
    Equals(Value),
    Array(Option<Box<Rule>>),
    KeySet(Vec<KeyRule>),
    AnyOf(Vec<Rule>),
    OneOf(Vec<Rule>),
}

/// A key inside a `KeySet`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRule {
    pub name: &'static str,
    pub required: bool,
    pub rule: Rule,
}

pub fn key(name: &'static str, rule: Rule) -> KeyRule {
    KeyRule {
        name,
        required: true,
        rule,
    }
}

pub fn key_optional(name: &'static str, rule: Rule) -> KeyRule {
    KeyRule {
        name,
        required: false,
        rule,
    }
}

impl Rule {
    pub fn string() -> Self {
        Rule::String { non_empty: false }
    }

    pub fn non_empty_string() -> Self {
        Rule::String { non_empty: true }
    }

    pub fn int_min(min: i64) -> Self {
        Rule::IntMin(min)
    }

    pub fn boolean() -> Self {
        Rule::Bool
    }

    /// Unix timestamp in seconds.
    pub fn timestamp() -> Self {
        Rule::Timestamp
    }

    pub fn email() -> Self {
        Rule::Email
    }

    /// Calendar date in `YYYY-MM-DD` form.
    pub fn date() -> Self {
        Rule::Date
    }

    pub fn url() -> Self {
        Rule::Url
    }

    pub fn one_of_values(values: &[&'static str]) -> Self {
        Rule::In(values.to_vec())
    }

    pub fn equals(value: impl Into<Value>) -> Self {
        Rule::Equals(value.into())
    }

    pub fn array() -> Self {
        Rule::Array(None)
    }

    pub fn array_of(item: Rule) -> Self {
        Rule::Array(Some(Box::new(item)))
    }

    pub fn key_set(keys: Vec<KeyRule>) -> Self {
        Rule::KeySet(keys)
    }

    pub fn any_of(alternatives: Vec<Rule>) -> Self {
        Rule::AnyOf(alternatives)
    }

    /// Matches when exactly one alternative matches.
    pub fn exactly_one_of(alternatives: Vec<Rule>) -> Self {
        Rule::OneOf(alternatives)
    }

    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.check(value, "")
    }

    /// Validate a value that is reported under `name` on failure.
    pub fn validate_named(&self, name: &str, value: &Value) -> Result<(), ValidationError> {
        self.check(value, name)
    }

    /// Validate a parameter bag against a `KeySet` (or any object rule).
    pub fn validate_params(&self, params: &Params) -> Result<(), ValidationError> {
        match self {
            Rule::KeySet(keys) => check_key_set(keys, params, ""),
            _ => self.check(&Value::Object(params.clone()), ""),
        }
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        match self {
            Rule::String { non_empty } => match value.as_str() {
                Some(s) if *non_empty && s.trim().is_empty() => {
                    Err(ValidationError::new(path, "must not be empty"))
                }
                Some(_) => Ok(()),
                None => Err(ValidationError::new(path, "must be a string")),
            },
            Rule::IntMin(min) => match value.as_i64() {
                Some(n) if n >= *min => Ok(()),
                Some(_) => Err(ValidationError::new(
                    path,
                    format!("must be greater than or equal to {min}"),
                )),
                None => Err(ValidationError::new(path, "must be an integer")),
            },
            Rule::Bool => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(ValidationError::new(path, "must be a boolean")),
            },
            Rule::Timestamp => match value.as_u64() {
                Some(_) => Ok(()),
                None => Err(ValidationError::new(path, "must be a unix timestamp")),
            },
            Rule::Email => match value.as_str() {
                Some(s) if EmailAddress::is_valid(s) => Ok(()),
                _ => Err(ValidationError::new(path, "must be a valid email address")),
            },
            Rule::Date => match value.as_str() {
                Some(s) if is_strict_date(s) => Ok(()),
                _ => Err(ValidationError::new(path, "must be a date in YYYY-MM-DD form")),
            },
            Rule::Url => match value.as_str().map(reqwest::Url::parse) {
                Some(Ok(url)) if matches!(url.scheme(), "http" | "https") => Ok(()),
                _ => Err(ValidationError::new(path, "must be an absolute http(s) URL")),
            },
            Rule::In(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|candidate| *candidate == s) => Ok(()),
                _ => Err(ValidationError::new(
                    path,
                    format!("must be one of: {}", allowed.join(", ")),
                )),
            },
            Rule::Equals(expected) => {
                if value == expected {
                    Ok(())
                } else {
                    Err(ValidationError::new(path, format!("must equal {expected}")))
                }
            }
            Rule::Array(item) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| ValidationError::new(path, "must be an array"))?;
                if let Some(item) = item {
                    for (index, element) in items.iter().enumerate() {
                        item.check(element, &format!("{path}[{index}]"))?;
                    }
                }
                Ok(())
            }
            Rule::KeySet(keys) => {
                let object = value
                    .as_object()
                    .ok_or_else(|| ValidationError::new(path, "must be an object"))?;
                check_key_set(keys, object, path)
            }
            Rule::AnyOf(alternatives) => {
                if alternatives.iter().any(|rule| rule.check(value, path).is_ok()) {
                    Ok(())
                } else {
                    Err(ValidationError::new(path, "does not match any allowed shape"))
                }
            }
            Rule::OneOf(alternatives) => {
                let matched = alternatives
                    .iter()
                    .filter(|rule| rule.check(value, path).is_ok())
                    .count();
                match matched {
                    1 => Ok(()),
                    0 => Err(ValidationError::new(path, "does not match any allowed shape")),
                    _ => Err(ValidationError::new(path, "matches more than one allowed shape")),
                }
            }
        }
    }
}

fn check_key_set(keys: &[KeyRule], object: &Map<String, Value>, path: &str) -> Result<(), ValidationError> {
    for name in object.keys() {
        if !keys.iter().any(|k| k.name == name.as_str()) {
            return Err(ValidationError::new(&child(path, name), "unexpected key"));
        }
    }
    for k in keys {
        match object.get(k.name) {
            Some(value) => k.rule.check(value, &child(path, k.name))?,
            None if k.required => {
                return Err(ValidationError::new(&child(path, k.name), "is required"));
            }
            None => {}
        }
    }
    Ok(())
}

/// `YYYY-MM-DD` exactly: chrono alone tolerates padding and single digits.
fn is_strict_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string() == s)
        .unwrap_or(false)
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
