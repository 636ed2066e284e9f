//! Database models
//!
//! A customer is stored as a free-form JSON document. Only a handful of fields
//! carry meaning for the service; everything else is passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the store-assigned identifier field
pub const IDENTIFIER_FIELD: &str = "_id";

/// Customer record, kept as an opaque JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Customer(Map<String, Value>);

impl Customer {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// The customer number held in `id`, coerced from a number or numeric string
    pub fn number(&self) -> Option<f64> {
        self.get("id").and_then(coerce_number)
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }

    /// The password as a search matches it: scalars in their text form,
    /// anything else unsearchable
    pub fn password(&self) -> Option<String> {
        match self.get("password")? {
            Value::String(password) => Some(password.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The store-assigned identifier, if this record has been persisted
    pub fn identifier(&self) -> Option<&str> {
        self.get(IDENTIFIER_FIELD).and_then(Value::as_str)
    }

    /// Copy of this record with the store-assigned identifier attached
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.insert(IDENTIFIER_FIELD, Value::String(identifier.into()));
        self
    }

    /// Shallow merge: every field of `changes` overwrites the same field here
    pub fn merge(&mut self, changes: Customer) {
        for (field, value) in changes.0 {
            self.0.insert(field, value);
        }
    }
}

/// Parse a customer number the way query strings and path segments carry it.
///
/// Surrounding whitespace is ignored; empty, NaN and infinite values are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a JSON value to a customer number
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// JSON representation of a customer number; integral values stay integers
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Display form of a customer number for messages ("3", not "3.0")
pub fn display_number(n: f64) -> String {
    number_value(n).to_string()
}

/// Records restored by a reset
pub fn seed_customers() -> Vec<Customer> {
    [
        (0, "Mary Jackson", "maryj@abc.com", "maryj"),
        (1, "Karen Addams", "karena@abc.com", "karena"),
        (2, "Scott Ramsey", "scottr@abc.com", "scottr"),
    ]
    .into_iter()
    .map(|(id, name, email, password)| {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::from(id));
        fields.insert("name".to_string(), Value::from(name));
        fields.insert("email".to_string(), Value::from(email));
        fields.insert("password".to_string(), Value::from(password));
        Customer::new(fields)
    })
    .collect()
}
