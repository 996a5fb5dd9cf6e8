use std::fmt;

use stepchain_core::Outcome;

use crate::partial::Partial;

/// Outcome carried between the steps of a pipeline.
pub type StepOutcome = Outcome<Value>;

/// A value threaded from one step into the next.
///
/// Most values are plain data. A step that still awaits arguments after
/// being handed the previous result is itself a value, so a pipeline can
/// return it and the caller can finish applying it later.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// Plain data.
    Data(serde_json::Value),
    /// A partially applied step.
    Partial(Partial),
}

impl Value {
    /// The `null` data value.
    #[must_use]
    pub const fn null() -> Self {
        Self::Data(serde_json::Value::Null)
    }

    /// Borrow the plain data, or `None` for a partial step.
    #[must_use]
    pub const fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(data) => Some(data),
            Self::Partial(_) => None,
        }
    }

    /// Take the plain data, or `None` for a partial step.
    #[must_use]
    pub fn into_data(self) -> Option<serde_json::Value> {
        match self {
            Self::Data(data) => Some(data),
            Self::Partial(_) => None,
        }
    }

    /// The data as an integer, if it is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(serde_json::Value::as_i64)
    }

    /// The data as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(serde_json::Value::as_bool)
    }

    /// The data as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(serde_json::Value::as_str)
    }

    /// Borrow the partial step, if this is one.
    #[must_use]
    pub const fn as_partial(&self) -> Option<&Partial> {
        match self {
            Self::Partial(partial) => Some(partial),
            Self::Data(_) => None,
        }
    }

    /// Take the partial step, if this is one.
    #[must_use]
    pub fn into_partial(self) -> Option<Partial> {
        match self {
            Self::Partial(partial) => Some(partial),
            Self::Data(_) => None,
        }
    }

    /// Whether this value is a step still awaiting arguments.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => write!(f, "{data}"),
            Self::Partial(partial) => fmt::Debug::fmt(partial, f),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => write!(f, "{data}"),
            Self::Partial(partial) => write!(f, "<partial {}>", partial.step_name()),
        }
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        self.as_data() == Some(other)
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Self::Data(data)
    }
}

impl From<Partial> for Value {
    fn from(partial: Partial) -> Self {
        Self::Partial(partial)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Data(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Data(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Data(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Data(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Data(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Data(value.into())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::null()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn data_accessors_read_through_json() {
        let number = Value::from(42_i64);
        let text = Value::from("abc");

        assert_eq!(number.as_i64(), Some(42));
        assert_eq!(text.as_str(), Some("abc"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(!number.is_partial());
    }

    #[test]
    fn value_compares_with_json() {
        assert_eq!(Value::from(json!([1, 2])), json!([1, 2]));
        assert_ne!(Value::from(1_i64), json!(2));
    }

    #[test]
    fn unit_becomes_null() {
        assert_eq!(Value::from(()), Value::null());
        assert_eq!(Value::null().into_data(), Some(serde_json::Value::Null));
    }

    #[test]
    fn display_renders_json() {
        assert_eq!(Value::from(json!({"id": 7})).to_string(), r#"{"id":7}"#);
    }
}
