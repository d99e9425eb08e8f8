//! Payload domain types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A decoded JSON body returned by a polled endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(JsonValue);

impl Payload {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// Returns true when the body carries an `error` member
    ///
    /// Only JSON objects can signal an error. Empty members (`null`,
    /// `false`, `0` and `""`) do not count, so `{"error": ""}` is a normal
    /// payload.
    pub fn signals_error(&self) -> bool {
        match self.0.get("error") {
            None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => false,
            Some(JsonValue::Number(n)) => n.as_f64() != Some(0.0),
            Some(JsonValue::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Looks up a top-level member
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_inner(self) -> JsonValue {
        self.0
    }
}

impl From<JsonValue> for Payload {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}
