//! Error types.
//!
//! No error in this crate carries a property value. Messages name the output,
//! the property path, or the kind of corruption, which is enough to locate
//! the problem without echoing secret material.

use thiserror::Error;

use crate::{crypter::CrypterError, value::DecodeError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error for extraction and presentation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Structure(#[from] StructureError),
    /// Redaction did not run, or missed a value, before serialization.
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error("decrypting output '{name}'")]
    Decrypt {
        name: String,
        #[source]
        source: CrypterError,
    },
    #[error("current stack does not have output property '{name}'")]
    UnknownOutput { name: String },
    #[error("encoding JSON")]
    Json(#[from] serde_json::Error),
}

/// The snapshot is present but not shaped the way a deployment must be.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("snapshot is not a valid deployment")]
    InvalidSnapshot(#[source] serde_json::Error),
    #[error("unsupported deployment version {0}")]
    UnsupportedVersion(u64),
    #[error("snapshot contains {count} root stack resources")]
    DuplicateRoot { count: usize },
    #[error("outputs of root resource '{urn}' are not an object")]
    OutputsNotAnObject { urn: String },
    #[error("output '{name}' of root resource '{urn}' is malformed")]
    MalformedOutput {
        urn: String,
        name: String,
        #[source]
        source: DecodeError,
    },
}

/// The value tree cannot be turned into a plain value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// A secret reached the serializer unredacted. This is a bug in the
    /// caller, never a property of the input.
    #[error("unredacted secret at '{path}' reached serialization")]
    UnredactedSecret { path: String },
    #[error("number at '{path}' is not finite")]
    NonFiniteNumber { path: String },
}
