//! Blob references and resource references.

use indexmap::IndexMap;

/// A reference to a single blob: a local path, a remote URI, or inline text.
///
/// Inline `text` is content, not metadata, and never leaves the crate through
/// the plain serializer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Asset {
    pub hash: Option<String>,
    pub path: Option<String>,
    pub uri: Option<String>,
    pub text: Option<String>,
}

impl Asset {
    /// An asset backed by a file on disk.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// An asset backed by a remote URI.
    #[must_use]
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// An asset holding inline text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Records the content hash.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }
}

/// A collection of blobs: a path, a URI, or a map of named members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Archive {
    pub hash: Option<String>,
    pub path: Option<String>,
    pub uri: Option<String>,
    pub assets: Option<IndexMap<String, AssetOrArchive>>,
}

impl Archive {
    /// An archive backed by a file on disk.
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// An archive backed by a remote URI.
    #[must_use]
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// An archive assembled from named members.
    #[must_use]
    pub fn from_assets<I, K>(assets: I) -> Self
    where
        I: IntoIterator<Item = (K, AssetOrArchive)>,
        K: Into<String>,
    {
        Self {
            assets: Some(assets.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            ..Self::default()
        }
    }

    /// Records the content hash.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }
}

/// A member of an [`Archive`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetOrArchive {
    Asset(Asset),
    Archive(Archive),
}

impl From<Asset> for AssetOrArchive {
    fn from(value: Asset) -> Self {
        Self::Asset(value)
    }
}

impl From<Archive> for AssetOrArchive {
    fn from(value: Archive) -> Self {
        Self::Archive(value)
    }
}

/// A reference to another resource's identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceReference {
    pub urn: String,
    /// The provider-assigned ID. `None` when the resource is a component or
    /// the ID was not yet known.
    pub id: Option<String>,
    pub package_version: Option<String>,
}

impl ResourceReference {
    #[must_use]
    pub fn new(urn: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            id: None,
            package_version: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The string this reference is displayed as: the ID when known and
    /// non-empty, otherwise the URN.
    pub fn identifier(&self) -> &str {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => &self.urn,
        }
    }
}
