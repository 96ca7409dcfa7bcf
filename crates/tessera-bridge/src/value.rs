// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tagged scalar values passed between the engine and platform modules.
//
// A `TaggedValue` is owned by whichever side created it. The other side only
// ever sees `&TaggedValue` for the duration of the call that hands it over;
// anything needed past that call must be copied out (`clone`, `to_owned` on
// the string view). The kind is fixed at construction and there is no way to
// mutate a value in place.
//
// Accessors are total. Asking for the wrong kind yields a sentinel (`""`,
// `0`, `0.0`, `false`) rather than a panic, because these reads happen inside
// platform callbacks that must not unwind. Use the `try_*` variants when a
// sentinel has to be told apart from a real payload.

use tessera_core::types::ValueKind;

/// One scalar value crossing the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue(Payload);

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    String(Box<str>),
    Integer(i64),
    Double(f64),
    Boolean(bool),
}

impl TaggedValue {
    pub fn string(text: impl Into<Box<str>>) -> Self {
        Self(Payload::String(text.into()))
    }

    pub const fn integer(value: i64) -> Self {
        Self(Payload::Integer(value))
    }

    pub const fn double(value: f64) -> Self {
        Self(Payload::Double(value))
    }

    pub const fn boolean(value: bool) -> Self {
        Self(Payload::Boolean(value))
    }

    /// The value's kind. Never `ValueKind::Invalid`.
    pub const fn kind(&self) -> ValueKind {
        match self.0 {
            Payload::String(_) => ValueKind::String,
            Payload::Integer(_) => ValueKind::Integer,
            Payload::Double(_) => ValueKind::Double,
            Payload::Boolean(_) => ValueKind::Boolean,
        }
    }

    pub fn is_kind(&self, kind: ValueKind) -> bool {
        self.kind() == kind
    }

    pub fn is_string(&self) -> bool {
        matches!(self.0, Payload::String(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.0, Payload::Integer(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self.0, Payload::Double(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.0, Payload::Boolean(_))
    }

    /// Borrowed text view; `""` when the value is not a string.
    pub fn as_str(&self) -> &str {
        self.try_str().unwrap_or("")
    }

    /// Integer payload; `0` when the value is not an integer.
    pub fn as_integer(&self) -> i64 {
        self.try_integer().unwrap_or(0)
    }

    /// Double payload; `0.0` when the value is not a double.
    pub fn as_double(&self) -> f64 {
        self.try_double().unwrap_or(0.0)
    }

    /// Boolean payload; `false` when the value is not a boolean.
    pub fn as_boolean(&self) -> bool {
        self.try_boolean().unwrap_or(false)
    }

    pub fn try_str(&self) -> Option<&str> {
        match &self.0 {
            Payload::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn try_integer(&self) -> Option<i64> {
        match self.0 {
            Payload::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn try_double(&self) -> Option<f64> {
        match self.0 {
            Payload::Double(value) => Some(value),
            _ => None,
        }
    }

    pub fn try_boolean(&self) -> Option<bool> {
        match self.0 {
            Payload::Boolean(value) => Some(value),
            _ => None,
        }
    }
}

/// Kinds of a slice of values, in order.
pub fn kinds_of(values: &[TaggedValue]) -> Vec<ValueKind> {
    values.iter().map(TaggedValue::kind).collect()
}

impl From<&str> for TaggedValue {
    fn from(text: &str) -> Self {
        Self::string(text)
    }
}

impl From<String> for TaggedValue {
    fn from(text: String) -> Self {
        Self::string(text)
    }
}

impl From<i64> for TaggedValue {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<i32> for TaggedValue {
    fn from(value: i32) -> Self {
        Self::integer(i64::from(value))
    }
}

impl From<f64> for TaggedValue {
    fn from(value: f64) -> Self {
        Self::double(value)
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl std::fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Payload::String(text) => write!(f, "{text:?}"),
            Payload::Integer(value) => write!(f, "{value}"),
            Payload::Double(value) => write!(f, "{value}"),
            Payload::Boolean(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_value_reports_string() {
        for text in ["x", "", "héllo wörld", "line\nbreak"] {
            let value = TaggedValue::from(text);
            assert_eq!(value.kind(), ValueKind::String);
            assert!(value.is_string());
            assert!(!value.is_integer());
            assert_eq!(value.as_str(), text);
        }
    }

    #[test]
    fn integer_value_reports_integer() {
        for n in [0_i64, 1, -1, i64::MAX, i64::MIN] {
            let value = TaggedValue::from(n);
            assert_eq!(value.kind(), ValueKind::Integer);
            assert!(value.is_integer());
            assert!(!value.is_string());
            assert_eq!(value.as_integer(), n);
        }
    }

    #[test]
    fn mismatched_reads_return_sentinels() {
        let number = TaggedValue::integer(42);
        assert_eq!(number.as_str(), "");
        assert_eq!(number.try_str(), None);
        assert_eq!(number.as_double(), 0.0);
        assert!(!number.as_boolean());

        let text = TaggedValue::string("42");
        assert_eq!(text.as_integer(), 0);
        assert_eq!(text.try_integer(), None);
    }

    #[test]
    fn sentinel_is_distinguishable_with_try() {
        // An empty string and a mismatch both read as "" through as_str.
        let empty = TaggedValue::string("");
        let number = TaggedValue::integer(0);
        assert_eq!(empty.as_str(), number.as_str());
        assert_eq!(empty.try_str(), Some(""));
        assert_eq!(number.try_str(), None);
    }

    #[test]
    fn is_kind_matches_kind() {
        let values = [
            TaggedValue::from("a"),
            TaggedValue::from(7_i32),
            TaggedValue::from(1.5),
            TaggedValue::from(true),
        ];
        assert_eq!(
            kinds_of(&values),
            vec![
                ValueKind::String,
                ValueKind::Integer,
                ValueKind::Double,
                ValueKind::Boolean
            ]
        );
        for value in &values {
            assert!(value.is_kind(value.kind()));
            assert!(!value.is_kind(ValueKind::Invalid));
        }
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(TaggedValue::from("hi").to_string(), "\"hi\"");
        assert_eq!(TaggedValue::from(3_i64).to_string(), "3");
    }
}
