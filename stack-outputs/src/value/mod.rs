//! The property value model.
//!
//! A deployment snapshot stores each resource's inputs and outputs as a tree
//! of [`PropertyValue`]s. The set of variants is closed: redaction and
//! serialization match on it exhaustively, so a new secret-carrying shape
//! cannot be added without updating both.
//!
//! - **`asset`**: opaque blob references (`Asset`, `Archive`) and
//!   `ResourceReference`
//! - **`decode`**: the snapshot's JSON encoding of property values

mod asset;
mod decode;

pub use asset::{Archive, Asset, AssetOrArchive, ResourceReference};
pub use decode::{DecodeError, SecretDecoding, decode_property_map, decode_property_value};
use indexmap::IndexMap;

/// A mapping of property names to values, in the order they were recorded.
pub type PropertyMap = IndexMap<String, PropertyValue>;

// =============================================================================
// PropertyValue
// =============================================================================

/// One node of a stack's property tree.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PropertyValue>),
    Object(PropertyMap),
    /// Marks the wrapped subtree as sensitive. Redaction acts at this
    /// boundary, not on the leaves beneath it.
    Secret(Box<PropertyValue>),
    /// A value that was not known when the snapshot was captured.
    Computed,
    /// A deferred value with its own known/secret flags.
    Output(OutputValue),
    Asset(Asset),
    Archive(Archive),
    ResourceReference(ResourceReference),
}

/// A deferred value recorded together with its resolution state.
///
/// `secret` is independent of any [`PropertyValue::Secret`] wrapper around or
/// inside `value`; redaction honors both.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputValue {
    pub value: Option<Box<PropertyValue>>,
    pub known: bool,
    pub secret: bool,
    /// URNs of the resources this value depends on.
    pub dependencies: Vec<String>,
}

impl OutputValue {
    /// A resolved output.
    #[must_use]
    pub fn known(value: PropertyValue) -> Self {
        Self {
            value: Some(Box::new(value)),
            known: true,
            ..Self::default()
        }
    }

    /// An output whose value was not yet known.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Marks the output as secret.
    #[must_use]
    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    /// Records the URNs this output depends on.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

impl PropertyValue {
    /// Wraps `value` in a secret marker.
    #[must_use]
    pub fn secret(value: impl Into<Self>) -> Self {
        Self::Secret(Box::new(value.into()))
    }

    /// Returns `true` for the secret wrapper and for secret outputs.
    pub fn is_secret(&self) -> bool {
        match self {
            Self::Secret(_) => true,
            Self::Output(output) => output.secret,
            _ => false,
        }
    }

    /// Returns `true` if this value, or anything nested in it, is secret.
    pub fn contains_secrets(&self) -> bool {
        match self {
            Self::Secret(_) => true,
            Self::Output(output) => {
                output.secret || output.value.as_deref().is_some_and(Self::contains_secrets)
            }
            Self::Array(items) => items.iter().any(Self::contains_secrets),
            Self::Object(map) => map.values().any(Self::contains_secrets),
            Self::Null
            | Self::Bool(_)
            | Self::Number(_)
            | Self::String(_)
            | Self::Computed
            | Self::Asset(_)
            | Self::Archive(_)
            | Self::ResourceReference(_) => false,
        }
    }

    /// Returns `true` for values that were not known at capture time.
    pub fn is_unknown(&self) -> bool {
        match self {
            Self::Computed => true,
            Self::Output(output) => !output.known,
            _ => false,
        }
    }

    /// Returns the redacted form of this value. See [`crate::redact`].
    #[must_use]
    pub fn redacted(&self, reveal: bool) -> Self {
        crate::redaction::redact(self, reveal)
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        Self::Array(value)
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        Self::Object(value)
    }
}

impl From<OutputValue> for PropertyValue {
    fn from(value: OutputValue) -> Self {
        Self::Output(value)
    }
}

impl From<Asset> for PropertyValue {
    fn from(value: Asset) -> Self {
        Self::Asset(value)
    }
}

impl From<Archive> for PropertyValue {
    fn from(value: Archive) -> Self {
        Self::Archive(value)
    }
}

impl From<ResourceReference> for PropertyValue {
    fn from(value: ResourceReference) -> Self {
        Self::ResourceReference(value)
    }
}

impl<V: Into<PropertyValue>> From<Option<V>> for PropertyValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyValue
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
