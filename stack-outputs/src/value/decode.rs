//! Decoding of the snapshot's JSON property encoding.
//!
//! Plain JSON maps onto the obvious variants. Special values are JSON objects
//! carrying the signature key [`SIG_KEY`] whose value names the kind:
//!
//! | kind               | fields                                    |
//! |--------------------|-------------------------------------------|
//! | secret             | `plaintext` or `ciphertext`               |
//! | asset              | `hash`, `path`, `uri`, `text`             |
//! | archive            | `hash`, `path`, `uri`, `assets`           |
//! | resource reference | `urn`, `id`, `packageVersion`             |
//! | output value       | `value`, `secret`, `dependencies`         |
//!
//! Unknown values are recorded as the string [`crate::UNKNOWN_SENTINEL`].

use std::fmt;

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::{
    Archive, Asset, AssetOrArchive, OutputValue, PropertyMap, PropertyValue, ResourceReference,
};
use crate::{
    crypter::{Crypter, CrypterError},
    plain::UNKNOWN_SENTINEL,
};

pub(crate) const SIG_KEY: &str = "4dabf18193072939515e22adb298388d";
pub(crate) const SECRET_SIG: &str = "1b47061264138c4ac30d75fd1eb44270";
pub(crate) const ASSET_SIG: &str = "c44067f5952c0a294b673a41bacd8c17";
pub(crate) const ARCHIVE_SIG: &str = "0def7320c3a5731c473e5ecbe6d01bc7";
pub(crate) const RESOURCE_REFERENCE_SIG: &str = "5cf8f73096256a8f31e491e813e4eb8e";
pub(crate) const OUTPUT_VALUE_SIG: &str = "d0e6a833031e9bbcd3f4e8bde6ca49a4";

/// A serialized property value that could not be decoded.
///
/// Messages describe structure only; they never quote property contents.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The signature value is not echoed: inside a secret payload it is
    /// secret content.
    #[error("{kind} carries an unrecognized signature")]
    UnknownSignature { kind: &'static str },
    #[error("{kind} is missing required field '{field}'")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
    #[error("{kind} field '{field}' has an unexpected type")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
    },
    #[error("secret payload is not valid JSON")]
    InvalidSecretPayload(#[source] serde_json::Error),
    #[error(transparent)]
    Decrypt(#[from] CrypterError),
}

/// How ciphertext secrets are handled while decoding.
#[derive(Clone, Copy)]
pub enum SecretDecoding<'a> {
    /// Leave ciphertext undecrypted. The secret decodes as
    /// `Secret(Computed)`, which carries no trace of the ciphertext.
    Withhold,
    /// Decrypt ciphertext with the given crypter.
    Decrypt(&'a dyn Crypter),
}

impl fmt::Debug for SecretDecoding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Withhold => f.write_str("Withhold"),
            Self::Decrypt(_) => f.write_str("Decrypt(..)"),
        }
    }
}

/// Decodes a JSON object of serialized properties.
pub fn decode_property_map(
    map: &Map<String, JsonValue>,
    secrets: SecretDecoding<'_>,
) -> Result<PropertyMap, DecodeError> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), decode_property_value(value, secrets)?)))
        .collect()
}

/// Decodes one serialized property value.
pub fn decode_property_value(
    value: &JsonValue,
    secrets: SecretDecoding<'_>,
) -> Result<PropertyValue, DecodeError> {
    Ok(match value {
        JsonValue::Null => PropertyValue::Null,
        JsonValue::Bool(b) => PropertyValue::Bool(*b),
        // Every JSON number is representable as f64 without arbitrary precision.
        JsonValue::Number(n) => PropertyValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) if s == UNKNOWN_SENTINEL => PropertyValue::Computed,
        JsonValue::String(s) => PropertyValue::String(s.clone()),
        JsonValue::Array(items) => PropertyValue::Array(
            items
                .iter()
                .map(|item| decode_property_value(item, secrets))
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(map) => match map.get(SIG_KEY) {
            None => PropertyValue::Object(decode_property_map(map, secrets)?),
            Some(JsonValue::String(sig)) => decode_signed(sig, map, secrets)?,
            Some(_) => {
                return Err(DecodeError::InvalidField {
                    kind: "object",
                    field: SIG_KEY,
                });
            }
        },
    })
}

fn decode_signed(
    sig: &str,
    map: &Map<String, JsonValue>,
    secrets: SecretDecoding<'_>,
) -> Result<PropertyValue, DecodeError> {
    match sig {
        SECRET_SIG => decode_secret(map, secrets),
        ASSET_SIG => decode_asset(map).map(PropertyValue::Asset),
        ARCHIVE_SIG => decode_archive(map).map(PropertyValue::Archive),
        RESOURCE_REFERENCE_SIG => decode_resource_reference(map),
        OUTPUT_VALUE_SIG => decode_output_value(map, secrets),
        _ => Err(DecodeError::UnknownSignature { kind: "object" }),
    }
}

fn decode_secret(
    map: &Map<String, JsonValue>,
    secrets: SecretDecoding<'_>,
) -> Result<PropertyValue, DecodeError> {
    const KIND: &str = "secret";

    if let Some(plaintext) = optional_str(map, KIND, "plaintext")? {
        return decode_secret_payload(plaintext, secrets);
    }
    let Some(ciphertext) = optional_str(map, KIND, "ciphertext")? else {
        return Err(DecodeError::MissingField {
            kind: KIND,
            field: "ciphertext",
        });
    };
    match secrets {
        SecretDecoding::Withhold => Ok(PropertyValue::secret(PropertyValue::Computed)),
        SecretDecoding::Decrypt(crypter) => {
            tracing::trace!("decrypting secret property");
            let plaintext = crypter.decrypt(ciphertext)?;
            decode_secret_payload(&plaintext, secrets)
        }
    }
}

fn decode_secret_payload(
    payload: &str,
    secrets: SecretDecoding<'_>,
) -> Result<PropertyValue, DecodeError> {
    let inner: JsonValue =
        serde_json::from_str(payload).map_err(DecodeError::InvalidSecretPayload)?;
    Ok(PropertyValue::secret(decode_property_value(&inner, secrets)?))
}

fn decode_asset(map: &Map<String, JsonValue>) -> Result<Asset, DecodeError> {
    const KIND: &str = "asset";
    Ok(Asset {
        hash: optional_string(map, KIND, "hash")?,
        path: optional_string(map, KIND, "path")?,
        uri: optional_string(map, KIND, "uri")?,
        text: optional_string(map, KIND, "text")?,
    })
}

fn decode_archive(map: &Map<String, JsonValue>) -> Result<Archive, DecodeError> {
    const KIND: &str = "archive";
    let assets = match map.get("assets") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Object(members)) => Some(
            members
                .iter()
                .map(|(name, member)| Ok((name.clone(), decode_archive_member(member)?)))
                .collect::<Result<_, DecodeError>>()?,
        ),
        Some(_) => {
            return Err(DecodeError::InvalidField {
                kind: KIND,
                field: "assets",
            });
        }
    };
    Ok(Archive {
        hash: optional_string(map, KIND, "hash")?,
        path: optional_string(map, KIND, "path")?,
        uri: optional_string(map, KIND, "uri")?,
        assets,
    })
}

fn decode_archive_member(value: &JsonValue) -> Result<AssetOrArchive, DecodeError> {
    const KIND: &str = "archive member";
    let invalid = DecodeError::InvalidField {
        kind: KIND,
        field: SIG_KEY,
    };
    let JsonValue::Object(map) = value else {
        return Err(invalid);
    };
    match map.get(SIG_KEY).and_then(JsonValue::as_str) {
        Some(ASSET_SIG) => decode_asset(map).map(AssetOrArchive::Asset),
        Some(ARCHIVE_SIG) => decode_archive(map).map(AssetOrArchive::Archive),
        Some(_) => Err(DecodeError::UnknownSignature { kind: KIND }),
        None => Err(invalid),
    }
}

fn decode_resource_reference(map: &Map<String, JsonValue>) -> Result<PropertyValue, DecodeError> {
    const KIND: &str = "resource reference";
    let Some(urn) = optional_string(map, KIND, "urn")? else {
        return Err(DecodeError::MissingField {
            kind: KIND,
            field: "urn",
        });
    };
    let id = optional_string(map, KIND, "id")?.filter(|id| id != UNKNOWN_SENTINEL);
    Ok(PropertyValue::ResourceReference(ResourceReference {
        urn,
        id,
        package_version: optional_string(map, KIND, "packageVersion")?,
    }))
}

fn decode_output_value(
    map: &Map<String, JsonValue>,
    secrets: SecretDecoding<'_>,
) -> Result<PropertyValue, DecodeError> {
    const KIND: &str = "output value";
    let value = match map.get("value") {
        None => None,
        Some(value) => Some(Box::new(decode_property_value(value, secrets)?)),
    };
    let secret = match map.get("secret") {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::Bool(secret)) => *secret,
        Some(_) => {
            return Err(DecodeError::InvalidField {
                kind: KIND,
                field: "secret",
            });
        }
    };
    let dependencies = match map.get("dependencies") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(urns)) => urns
            .iter()
            .map(|urn| {
                urn.as_str()
                    .map(str::to_string)
                    .ok_or(DecodeError::InvalidField {
                        kind: KIND,
                        field: "dependencies",
                    })
            })
            .collect::<Result<_, _>>()?,
        Some(_) => {
            return Err(DecodeError::InvalidField {
                kind: KIND,
                field: "dependencies",
            });
        }
    };
    // An output without a recorded value was never resolved.
    let known = value.as_deref().is_some_and(|v| !v.is_unknown());
    Ok(PropertyValue::Output(OutputValue {
        value: if known { value } else { None },
        known,
        secret,
        dependencies,
    }))
}

fn optional_str<'m>(
    map: &'m Map<String, JsonValue>,
    kind: &'static str,
    field: &'static str,
) -> Result<Option<&'m str>, DecodeError> {
    match map.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(_) => Err(DecodeError::InvalidField { kind, field }),
    }
}

fn optional_string(
    map: &Map<String, JsonValue>,
    kind: &'static str,
    field: &'static str,
) -> Result<Option<String>, DecodeError> {
    optional_str(map, kind, field).map(|s| s.map(str::to_string))
}

// =============================================================================
// Tests
// =============================================================================
