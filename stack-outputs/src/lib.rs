//! Secret-safe extraction of deployed stack outputs.
//!
//! This crate separates:
//! - **Values**: the tagged property tree stored in a deployment snapshot
//!   ([`PropertyValue`]).
//! - **Redaction**: hiding (or, on explicit request, revealing) secret-marked
//!   subtrees before anything else looks at them.
//! - **Presentation**: turning the redacted tree into plain JSON values and
//!   rendering them as text or JSON.
//!
//! The pipeline is `Snapshot` → [`extract_outputs`] → [`present`]. Redaction
//! runs before serialization, and the serializer refuses any `Secret` that
//! survived it.
//!
//! What this crate does not do:
//! - locate or fetch stacks (callers hand it a parsed [`Snapshot`])
//! - decrypt secrets for computation
//! - mutate or persist snapshots

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
pub mod audit;
pub mod crypter;
mod error;
mod extract;
pub mod pipeline;
mod plain;
mod present;
mod redaction;
#[cfg(feature = "slog")]
pub mod slog;
pub mod snapshot;
pub mod tracing;
pub mod value;

// Re-exports
pub use audit::{AuditSink, DisclosureEvent, NoopAuditSink, TracingAuditSink};
pub use crypter::{Base64Crypter, Crypter, CrypterError, RefusingCrypter};
pub use error::{Error, Result, SerializeError, StructureError};
pub use extract::{OutputMap, ROOT_STACK_TYPE, extract_outputs};
pub use pipeline::{OutputRequest, run};
pub use plain::{UNKNOWN_SENTINEL, from_plain, to_plain, to_plain_map};
pub use present::{UNKNOWN_DISPLAY, present};
pub use redaction::{RedactedJson, SECRET_PLACEHOLDER, ToRedactedJson, redact, redact_map};
pub use snapshot::{ResourceState, SecretsProvider, Snapshot};
pub use value::{
    Archive, Asset, AssetOrArchive, DecodeError, OutputValue, PropertyMap, PropertyValue,
    ResourceReference, SecretDecoding,
};
