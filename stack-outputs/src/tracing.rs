//! Adapters for emitting property values through `tracing`.
//!
//! Property trees are logged as redacted JSON strings. Secrets are always
//! hidden here, even when the surrounding request reveals them.
//!
//! ```ignore
//! use stack_outputs::tracing::TracingRedactedExt;
//!
//! tracing::debug!(outputs = %outputs.tracing_redacted(), "decoded outputs");
//! ```

use tracing::field::{DisplayValue, display};

use crate::redaction::{RedactedJson, ToRedactedJson};

/// Marker trait for types whose `tracing` integration always emits redacted
/// output.
pub trait TracingRedacted {}

impl TracingRedacted for RedactedJson {}

/// Extension trait for logging redacted values as display strings.
pub trait TracingRedactedExt {
    /// Redacts the value and wraps its JSON text for `tracing`.
    fn tracing_redacted(&self) -> DisplayValue<String>;
}

impl<T> TracingRedactedExt for T
where
    T: ToRedactedJson,
{
    fn tracing_redacted(&self) -> DisplayValue<String> {
        display(self.to_redacted_json().to_string())
    }
}
