//! Secret redaction.
//!
//! [`redact`] builds a new tree in which every secret is either replaced by
//! [`SECRET_PLACEHOLDER`] or, when the caller is authorized, unwrapped. Both
//! secret shapes are handled the same way:
//!
//! - the `Secret` wrapper variant
//! - `Output` values whose `secret` flag is set
//!
//! When hiding, the secret's contents are dropped without being visited.
//! Authorization is global for the call, so revealing unwraps every nested
//! secret as well.

mod output;

pub use output::{RedactedJson, ToRedactedJson};

use crate::value::{OutputValue, PropertyMap, PropertyValue};

/// Replacement emitted for every hidden secret.
pub const SECRET_PLACEHOLDER: &str = "[secret]";

/// Returns `value` with every secret hidden (`reveal == false`) or unwrapped
/// (`reveal == true`).
///
/// The input is not modified. The result never contains a
/// [`PropertyValue::Secret`] and never contains an output with `secret` set.
pub fn redact(value: &PropertyValue, reveal: bool) -> PropertyValue {
    match value {
        PropertyValue::Secret(inner) => {
            if reveal {
                redact(inner, true)
            } else {
                placeholder()
            }
        }
        PropertyValue::Output(output) => {
            if output.secret && !reveal {
                return placeholder();
            }
            PropertyValue::Output(OutputValue {
                value: output
                    .value
                    .as_deref()
                    .map(|inner| Box::new(redact(inner, reveal))),
                known: output.known,
                secret: false,
                dependencies: output.dependencies.clone(),
            })
        }
        PropertyValue::Array(items) => {
            PropertyValue::Array(items.iter().map(|item| redact(item, reveal)).collect())
        }
        PropertyValue::Object(map) => PropertyValue::Object(redact_map(map, reveal)),
        PropertyValue::Null
        | PropertyValue::Bool(_)
        | PropertyValue::Number(_)
        | PropertyValue::String(_)
        | PropertyValue::Computed
        | PropertyValue::Asset(_)
        | PropertyValue::Archive(_)
        | PropertyValue::ResourceReference(_) => value.clone(),
    }
}

/// Redacts every value of a property map. Keys are never redacted.
pub fn redact_map(map: &PropertyMap, reveal: bool) -> PropertyMap {
    map.iter()
        .map(|(key, value)| (key.clone(), redact(value, reveal)))
        .collect()
}

fn placeholder() -> PropertyValue {
    PropertyValue::String(SECRET_PLACEHOLDER.to_string())
}
