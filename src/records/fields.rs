//! Typed access to loosely typed record fields
//!
//! The exported data drops falsy fields, so a zero, an empty string and a
//! missing key all mean "not set". Every accessor here follows that rule.

use serde_json::Value;

pub trait Fields {
    /// Raw field, `None` when missing or null
    fn field(&self, key: &str) -> Option<&Value>;

    /// Non-zero number
    fn number(&self, key: &str) -> Option<f64> {
        let v = match self.field(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::Bool(true) => 1.0,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        (v != 0.0).then_some(v)
    }

    /// Number that defaults to zero
    fn number_or_zero(&self, key: &str) -> f64 {
        self.number(key).unwrap_or(0.0)
    }

    /// Non-zero integer id
    fn id_of(&self, key: &str) -> Option<u64> {
        match self.field(key)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|&id| id != 0)
    }

    /// Non-empty string
    fn text(&self, key: &str) -> Option<&str> {
        match self.field(key)? {
            Value::String(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Truthy flag
    fn flag(&self, key: &str) -> bool {
        match self.field(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            _ => false,
        }
    }

    /// Embedded child record
    fn record(&self, key: &str) -> Option<&Value> {
        self.field(key).filter(|v| v.is_object())
    }

    /// Embedded child records: a single record or a list of them
    fn records(&self, key: &str) -> Vec<&Value> {
        match self.field(key) {
            Some(v @ Value::Object(_)) => vec![v],
            Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
            _ => Vec::new(),
        }
    }

    /// `_Id` as a number
    fn record_id(&self) -> Option<u64> {
        self.id_of("_Id")
    }
}

impl Fields for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }
}

/// Human readable name for log and error messages
pub fn record_name(record: &Value) -> String {
    if let Some(name) = record.text("_SecondName").or_else(|| record.text("_Name")) {
        return name.to_string();
    }
    match record.field("_Id") {
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => "<unnamed>".to_string(),
    }
}
