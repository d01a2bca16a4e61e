//! Field-by-field reader for loosely typed JSON request bodies.
//!
//! Every accessor records a [`FieldError`](crate::FieldError) instead of
//! failing fast, so a single pass reports all bad fields.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use crate::error::ValidationError;

pub(crate) struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: ValidationError,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(value: &'a Value) -> Self {
        let mut errors = ValidationError::default();
        let object = value.as_object();
        if object.is_none() {
            errors.push("body", "must be a JSON object");
        }
        Self { object, errors }
    }

    /// Value of `field`, treating JSON `null` as absent
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.object
            .and_then(|o| o.get(field))
            .filter(|v| !v.is_null())
    }

    fn present(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    fn required(&mut self, field: &str) -> Option<&'a Value> {
        // A non-object body is already reported once under "body".
        self.object?;
        let value = self.get(field);
        if value.is_none() {
            self.errors.push(field, "is required");
        }
        value
    }

    /// Required calendar date
    pub(crate) fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let value = self.required(field)?;
        self.parse_date(field, value)
    }

    /// Optional calendar date; absent or `null` yields `None` without error
    pub(crate) fn optional_date(&mut self, field: &str) -> Option<NaiveDate> {
        let value = self.get(field)?;
        self.parse_date(field, value)
    }

    fn parse_date(&mut self, field: &str, value: &Value) -> Option<NaiveDate> {
        let parsed = value.as_str().and_then(parse_date);
        if parsed.is_none() {
            self.errors.push(field, "must be a valid date");
        }
        parsed
    }

    /// Required finite number >= 0
    pub(crate) fn non_negative_f64(&mut self, field: &str) -> Option<f64> {
        let value = self.required(field)?;
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if !n.is_finite() => {
                self.errors.push(field, "must be a finite number");
                None
            }
            Some(n) if n < 0.0 => {
                self.errors.push(field, "must be non-negative");
                None
            }
            Some(n) => Some(n),
            None => {
                self.errors.push(field, "must be a number");
                None
            }
        }
    }

    /// Required integer >= 0 that fits in `u32`
    pub(crate) fn non_negative_u32(&mut self, field: &str) -> Option<u32> {
        let n = self.integer(field)?;
        if n < 0 {
            self.errors.push(field, "must be non-negative");
            return None;
        }
        match u32::try_from(n) {
            Ok(v) => Some(v),
            Err(_) => {
                self.errors.push(field, "is too large");
                None
            }
        }
    }

    /// Required integer (JSON integer or a string holding one)
    pub(crate) fn integer(&mut self, field: &str) -> Option<i64> {
        let value = self.required(field)?;
        self.parse_integer(field, value)
    }

    /// Optional integer; absent or `null` yields `None`
    pub(crate) fn optional_integer(&mut self, field: &str) -> Option<i64> {
        let value = self.get(field)?;
        self.parse_integer(field, value)
    }

    fn parse_integer(&mut self, field: &str, value: &Value) -> Option<i64> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.push(field, "must be an integer");
        }
        parsed
    }

    /// Required string, non-empty after trimming
    pub(crate) fn string(&mut self, field: &str) -> Option<String> {
        let value = self.required(field)?;
        match value.as_str().map(str::trim) {
            Some("") => {
                self.errors.push(field, "must not be empty");
                None
            }
            Some(s) => Some(s.to_string()),
            None => {
                self.errors.push(field, "must be a string");
                None
            }
        }
    }

    /// Required value parsed with `FromStr`, e.g. an enum literal
    pub(crate) fn parsed<T: std::str::FromStr>(&mut self, field: &str, allowed: &str) -> Option<T> {
        let value = self.required(field)?;
        self.parse_literal(field, value, allowed)
    }

    /// Optional enum literal, `default` when absent
    pub(crate) fn parsed_or<T: std::str::FromStr>(
        &mut self,
        field: &str,
        allowed: &str,
        default: T,
    ) -> Option<T> {
        if !self.present(field) {
            return Some(default);
        }
        let value = self.get(field)?;
        self.parse_literal(field, value, allowed)
    }

    fn parse_literal<T: std::str::FromStr>(
        &mut self,
        field: &str,
        value: &Value,
        allowed: &str,
    ) -> Option<T> {
        let parsed = value.as_str().and_then(|s| s.parse::<T>().ok());
        if parsed.is_none() {
            self.errors.push(field, format!("must be one of: {}", allowed));
        }
        parsed
    }

    /// Collected errors, if any
    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        self.errors.into_result()
    }
}

/// Parse `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its own date
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
