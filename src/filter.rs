use std::str::FromStr;

use serde_json::Value as JsonValue;

use crate::Error;

/// Client-side filter over a listing response, parsed from a
/// `"key:value"` pair.
///
/// Matching compares the string-coerced entry under `key`. When that entry
/// is itself an object, the match falls back one level and looks for
/// `value` as a sub-key or a sub-value; deeper nesting is not supported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    key: String,
    value: String,
}

impl FromStr for FilterSpec {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once(':') {
            Some((key, value)) if !key.is_empty() => Ok(Self::new(key, value)),
            _ => Err(Error::FilterInvalid(input.to_string())),
        }
    }
}

impl FilterSpec {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn matches(&self, item: &JsonValue) -> bool {
        match item.get(&self.key) {
            Some(JsonValue::Object(inner)) => {
                inner.contains_key(&self.value)
                    || inner.values().any(|sub| coerce(sub) == self.value)
            }
            Some(found) => coerce(found) == self.value,
            None => false,
        }
    }
}

fn coerce(value: &JsonValue) -> String {
    match value {
        JsonValue::String(inner) => inner.clone(),
        other => other.to_string(),
    }
}

/// Keeps the items of `data` matching `spec`, in their original order.
/// Anything that is not an array yields an empty list rather than an error.
pub fn filter_list(data: &JsonValue, spec: &FilterSpec) -> Vec<JsonValue> {
    match data.as_array() {
        Some(items) => items
            .iter()
            .filter(|item| spec.matches(item))
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}
