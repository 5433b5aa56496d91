//! Redacted JSON for logging boundaries.
//!
//! Logs never reveal secrets, regardless of what the current request is
//! authorized to see. [`ToRedactedJson`] always hides.

use serde_json::Value as JsonValue;

use super::{redact, redact_map};
use crate::{
    plain::{to_plain, to_plain_map},
    value::{PropertyMap, PropertyValue},
};

// =============================================================================
// RedactedJson - Output produced at logging boundaries
// =============================================================================

/// A plain JSON value produced from a redacted property tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedactedJson(JsonValue);

impl RedactedJson {
    /// Returns the redacted JSON value.
    pub fn value(&self) -> &JsonValue {
        &self.0
    }

    /// Consumes the wrapper.
    pub fn into_value(self) -> JsonValue {
        self.0
    }
}

impl std::fmt::Display for RedactedJson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// ToRedactedJson - Trait for producing logging-safe JSON
// =============================================================================

/// Produces a logging-safe JSON representation with every secret hidden.
///
/// If the redacted tree cannot be serialized, the result is a JSON string
/// describing the failure. The failure message never contains values.
pub trait ToRedactedJson {
    #[must_use]
    fn to_redacted_json(&self) -> RedactedJson;
}

impl ToRedactedJson for PropertyValue {
    fn to_redacted_json(&self) -> RedactedJson {
        RedactedJson(to_plain(&redact(self, false)).unwrap_or_else(failure))
    }
}

impl ToRedactedJson for PropertyMap {
    fn to_redacted_json(&self) -> RedactedJson {
        let json = to_plain_map(&redact_map(self, false))
            .map(|map| JsonValue::Object(map.into_iter().collect()))
            .unwrap_or_else(failure);
        RedactedJson(json)
    }
}

fn failure(err: impl std::fmt::Display) -> JsonValue {
    JsonValue::String(format!("Failed to serialize redacted value: {err}"))
}
