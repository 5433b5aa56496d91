//! Deployment snapshots.
//!
//! A [`Snapshot`] is the parsed form of a stack's deployment record. Resource
//! outputs stay as raw JSON here; they are decoded into property values only
//! when extracted, so that secrets are never decrypted unless a caller asks to
//! see them.

use std::io::Read;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::{error::StructureError, extract::ROOT_STACK_TYPE};

/// Deployment format versions this crate understands.
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u64> = 1..=3;

/// An immutable, point-in-time record of a stack's resources.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub secrets_providers: Option<SecretsProvider>,
    #[serde(default)]
    pub resources: Vec<ResourceState>,
}

/// The secrets provider a deployment's ciphertext was produced with.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SecretsProvider {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub state: Option<JsonValue>,
}

/// One resource recorded in a snapshot.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ResourceState {
    pub urn: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Serialized output properties, decoded lazily.
    #[serde(default)]
    pub outputs: Option<JsonValue>,
}

impl ResourceState {
    /// Returns `true` for the resource that represents the stack itself.
    pub fn is_root_stack(&self) -> bool {
        self.resource_type == ROOT_STACK_TYPE && self.parent.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Deserialize)]
struct VersionedDeployment {
    version: u64,
    deployment: Option<Snapshot>,
}

impl Snapshot {
    /// Parses a deployment, either bare or wrapped in a versioned envelope
    /// (`{"version": 3, "deployment": {...}}`).
    pub fn from_json(json: &str) -> Result<Self, StructureError> {
        let value: JsonValue = serde_json::from_str(json).map_err(StructureError::InvalidSnapshot)?;
        Self::from_value(value)
    }

    /// Like [`Snapshot::from_json`], reading from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StructureError> {
        let value: JsonValue =
            serde_json::from_reader(reader).map_err(StructureError::InvalidSnapshot)?;
        Self::from_value(value)
    }

    fn from_value(value: JsonValue) -> Result<Self, StructureError> {
        if value.get("version").is_none() {
            return serde_json::from_value(value).map_err(StructureError::InvalidSnapshot);
        }
        let envelope: VersionedDeployment =
            serde_json::from_value(value).map_err(StructureError::InvalidSnapshot)?;
        if !SUPPORTED_VERSIONS.contains(&envelope.version) {
            return Err(StructureError::UnsupportedVersion(envelope.version));
        }
        // A freshly initialized stack has no deployment yet.
        Ok(envelope.deployment.unwrap_or_default())
    }

    /// Iterates over every resource that claims to be the root stack.
    pub fn root_stack_resources(&self) -> impl Iterator<Item = &ResourceState> {
        self.resources.iter().filter(|r| r.is_root_stack())
    }
}
