//! Flat key/value payload carried by one webhook event

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

/// A single payload value.
///
/// Webhook bodies are flattened into this shape at ingress so the renderer
/// only ever deals with scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    String(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl PayloadValue {
    /// Flatten a JSON value into a payload value.
    ///
    /// Integers keep every digit (`i64`, or `u64` above `i64::MAX`); other
    /// numbers become floats. `null` becomes an empty string; arrays and
    /// objects keep their compact JSON text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => PayloadValue::String(s),
            Value::Bool(b) => PayloadValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PayloadValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    PayloadValue::Unsigned(u)
                } else {
                    PayloadValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::Null => PayloadValue::String(String::new()),
            nested @ (Value::Array(_) | Value::Object(_)) => {
                PayloadValue::String(nested.to_string())
            }
        }
    }
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadValue::String(s) => f.write_str(s),
            PayloadValue::Integer(i) => write!(f, "{}", i),
            PayloadValue::Unsigned(u) => write!(f, "{}", u),
            PayloadValue::Float(x) => write_float(f, *x),
            PayloadValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Decimal exponents outside `MIN_PLAIN_EXP..MAX_PLAIN_EXP` switch floats to exponent form
const MIN_PLAIN_EXP: i32 = -4;
const MAX_PLAIN_EXP: i32 = 21;

/// Shortest round-trip digits; positional for moderate magnitudes (`3.0` -> `3`),
/// exponent form otherwise (`1e300`, `1e-7`).
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_finite() && x != 0.0 {
        let scientific = format!("{:e}", x);
        let exponent = scientific
            .rsplit_once('e')
            .and_then(|(_, exp)| exp.parse::<i32>().ok());

        if let Some(exp) = exponent {
            if !(MIN_PLAIN_EXP..MAX_PLAIN_EXP).contains(&exp) {
                return f.write_str(&scientific);
            }
        }
    }

    write!(f, "{}", x)
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::String(value)
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::String(value.to_string())
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        PayloadValue::Integer(value)
    }
}

impl From<u64> for PayloadValue {
    fn from(value: u64) -> Self {
        PayloadValue::Unsigned(value)
    }
}

impl From<f64> for PayloadValue {
    fn from(value: f64) -> Self {
        PayloadValue::Float(value)
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        PayloadValue::Bool(value)
    }
}

/// Payload of a single event, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: HashMap<String, PayloadValue>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from a JSON object, flattening every value.
    pub fn from_json_map(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(key, value)| (key, PayloadValue::from_json(value)))
            .collect()
    }

    /// Insert a field, returning the previous value if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PayloadValue>,
    ) -> Option<PayloadValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PayloadValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PayloadValue)> {
        self.fields.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<PayloadValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
