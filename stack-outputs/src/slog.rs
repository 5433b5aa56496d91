//! Adapters for emitting property values through `slog`.
//!
//! This module provides `slog::Value` implementations that serialize redacted
//! property trees as structured JSON via `slog`'s nested-value support.
//!
//! It is responsible for:
//! - Ensuring the logged representation is derived from a hiding redaction,
//!   not from the original value.
//! - Avoiding fallible logging APIs: serialization failures are represented as
//!   placeholder strings rather than propagated as errors.

use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

pub use crate::redaction::RedactedJson;
use crate::redaction::ToRedactedJson;

/// Marker trait for types whose `slog` integration always emits redacted
/// output.
///
/// ```compile_fail
/// use stack_outputs::slog::SlogRedacted;
///
/// fn assert_slog_redacted<T: SlogRedacted>() {}
///
/// assert_slog_redacted::<stack_outputs::PropertyValue>();
/// ```
pub trait SlogRedacted: SlogValue {}

impl<T: SlogRedacted + ?Sized> SlogRedacted for &T {}

impl SlogValue for RedactedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value().clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

impl SlogRedacted for RedactedJson {}

/// Extension trait for ergonomic slog logging of property trees.
///
/// ```ignore
/// use stack_outputs::slog::SlogRedactedExt;
///
/// info!(logger, "extracted"; "outputs" => outputs.slog_redacted_json());
/// ```
pub trait SlogRedactedExt: ToRedactedJson {
    /// Hides every secret and returns a `slog::Value` that serializes as
    /// structured JSON.
    fn slog_redacted_json(&self) -> RedactedJson {
        self.to_redacted_json()
    }
}

impl<T> SlogRedactedExt for T where T: ToRedactedJson {}
