//! Scalar attribute values carried by features.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Number, Value as JsonValue};

/// A scalar attribute value read from a source dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl AttributeValue {
    /// Short type label used in schema listings.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Null => "Null",
            AttributeValue::Boolean(_) => "Boolean",
            AttributeValue::Integer(_) => "Integer",
            AttributeValue::Float(_) => "Float",
            AttributeValue::String(_) => "String",
            AttributeValue::Date(_) => "Date",
            AttributeValue::DateTime(_) => "DateTime",
        }
    }

    /// JSON representation. Dates are ISO-8601 strings; non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            AttributeValue::Null => JsonValue::Null,
            AttributeValue::Boolean(b) => JsonValue::Bool(*b),
            AttributeValue::Integer(i) => JsonValue::Number((*i).into()),
            AttributeValue::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            AttributeValue::String(s) => JsonValue::String(s.clone()),
            AttributeValue::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            AttributeValue::DateTime(dt) => {
                JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            },
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            AttributeValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

/// Infers a typed value from the text content of an XML element.
///
/// Empty text is `Null`. Integers keep leading-zero strings (postal codes,
/// INSEE codes) as text.
#[must_use]
pub fn infer_scalar(raw: &str) -> AttributeValue {
    let text = raw.trim();
    if text.is_empty() {
        return AttributeValue::Null;
    }

    let has_leading_zero = text.len() > 1 && text.starts_with('0') && !text.starts_with("0.");
    if !has_leading_zero {
        if let Ok(i) = text.parse::<i64>() {
            return AttributeValue::Integer(i);
        }
        if text.contains(['.', 'e', 'E'])
            && let Ok(f) = text.parse::<f64>()
            && f.is_finite()
        {
            return AttributeValue::Float(f);
        }
    }

    match text {
        "true" => return AttributeValue::Boolean(true),
        "false" => return AttributeValue::Boolean(false),
        _ => {},
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return AttributeValue::Date(date);
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
            return AttributeValue::DateTime(dt);
        }
    }

    AttributeValue::String(text.to_string())
}
