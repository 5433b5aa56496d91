//! Conversion of property trees into plain, JSON-compatible values.
//!
//! The serializer assumes redaction already ran. A `Secret` that reaches it is
//! reported as [`SerializeError::UnredactedSecret`] and the whole conversion is
//! abandoned; no partial result is returned.

use std::fmt::{self, Write as _};

use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    error::SerializeError,
    extract::OutputMap,
    value::{Archive, Asset, AssetOrArchive, PropertyMap, PropertyValue},
};

/// Marker emitted for values that were not known when the snapshot was
/// captured. It is the snapshot format's own unknown sentinel.
pub const UNKNOWN_SENTINEL: &str = "04da6b54-80e4-46f7-96ec-b56ff0331ba9";

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Converts a redacted value into its plain form.
pub fn to_plain(value: &PropertyValue) -> Result<JsonValue, SerializeError> {
    let mut path = PropertyPath::default();
    convert(value, &mut path)
}

/// Converts a redacted property map into a plain output map.
pub fn to_plain_map(map: &PropertyMap) -> Result<OutputMap, SerializeError> {
    let mut path = PropertyPath::default();
    map.iter()
        .map(|(key, value)| {
            path.push(Segment::Key(key));
            let plain = convert(value, &mut path)?;
            path.pop();
            Ok((key.clone(), plain))
        })
        .collect()
}

/// Rebuilds a property tree from a plain value.
///
/// This is the inverse of [`to_plain`] on the plain subset: feeding the result
/// back through `to_plain` reproduces `value`.
pub fn from_plain(value: &JsonValue) -> PropertyValue {
    match value {
        JsonValue::Null => PropertyValue::Null,
        JsonValue::Bool(b) => PropertyValue::Bool(*b),
        JsonValue::Number(n) => PropertyValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => PropertyValue::String(s.clone()),
        JsonValue::Array(items) => PropertyValue::Array(items.iter().map(from_plain).collect()),
        JsonValue::Object(map) => PropertyValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), from_plain(value)))
                .collect(),
        ),
    }
}

fn convert<'v>(
    value: &'v PropertyValue,
    path: &mut PropertyPath<'v>,
) -> Result<JsonValue, SerializeError> {
    Ok(match value {
        PropertyValue::Null => JsonValue::Null,
        PropertyValue::Bool(b) => JsonValue::Bool(*b),
        PropertyValue::Number(n) => JsonValue::Number(number(*n, path)?),
        PropertyValue::String(s) => JsonValue::String(s.clone()),
        PropertyValue::Array(items) => {
            let mut plain = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(Segment::Index(index));
                plain.push(convert(item, path)?);
                path.pop();
            }
            JsonValue::Array(plain)
        }
        PropertyValue::Object(map) => {
            let mut plain = Map::with_capacity(map.len());
            for (key, item) in map {
                path.push(Segment::Key(key));
                plain.insert(key.clone(), convert(item, path)?);
                path.pop();
            }
            JsonValue::Object(plain)
        }
        PropertyValue::Secret(_) => {
            return Err(SerializeError::UnredactedSecret {
                path: path.to_string(),
            });
        }
        PropertyValue::Computed => unknown(),
        PropertyValue::Output(output) => match (output.known, output.value.as_deref()) {
            (false, _) => unknown(),
            (true, Some(inner)) => convert(inner, path)?,
            (true, None) => JsonValue::Null,
        },
        PropertyValue::Asset(asset) => asset_descriptor(asset),
        PropertyValue::Archive(archive) => archive_descriptor(archive),
        PropertyValue::ResourceReference(reference) => {
            JsonValue::String(reference.identifier().to_string())
        }
    })
}

fn unknown() -> JsonValue {
    JsonValue::String(UNKNOWN_SENTINEL.to_string())
}

fn number(n: f64, path: &PropertyPath<'_>) -> Result<Number, SerializeError> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(Number::from(n as i64));
    }
    Number::from_f64(n).ok_or_else(|| SerializeError::NonFiniteNumber {
        path: path.to_string(),
    })
}

fn asset_descriptor(asset: &Asset) -> JsonValue {
    let mut plain = Map::new();
    plain.insert("kind".into(), "asset".into());
    insert_present(&mut plain, "hash", asset.hash.as_deref());
    insert_present(&mut plain, "path", asset.path.as_deref());
    insert_present(&mut plain, "uri", asset.uri.as_deref());
    JsonValue::Object(plain)
}

fn archive_descriptor(archive: &Archive) -> JsonValue {
    let mut plain = Map::new();
    plain.insert("kind".into(), "archive".into());
    insert_present(&mut plain, "hash", archive.hash.as_deref());
    insert_present(&mut plain, "path", archive.path.as_deref());
    insert_present(&mut plain, "uri", archive.uri.as_deref());
    if let Some(assets) = &archive.assets {
        let members = assets
            .iter()
            .map(|(name, member)| {
                let descriptor = match member {
                    AssetOrArchive::Asset(asset) => asset_descriptor(asset),
                    AssetOrArchive::Archive(archive) => archive_descriptor(archive),
                };
                (name.clone(), descriptor)
            })
            .collect();
        plain.insert("assets".into(), JsonValue::Object(members));
    }
    JsonValue::Object(plain)
}

fn insert_present(map: &mut Map<String, JsonValue>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
}

// =============================================================================
// PropertyPath - location of a node, for error messages
// =============================================================================

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

#[derive(Default)]
struct PropertyPath<'a>(Vec<Segment<'a>>);

impl<'a> PropertyPath<'a> {
    fn push(&mut self, segment: Segment<'a>) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for PropertyPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_char('.');
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{UNKNOWN_SENTINEL, from_plain, to_plain, to_plain_map};
    use crate::{
        error::SerializeError,
        value::{Archive, Asset, OutputValue, PropertyMap, PropertyValue, ResourceReference},
    };

    #[test]
    fn scalars_map_to_themselves() {
        assert_eq!(to_plain(&PropertyValue::Null).unwrap(), json!(null));
        assert_eq!(to_plain(&true.into()).unwrap(), json!(true));
        assert_eq!(to_plain(&"x".into()).unwrap(), json!("x"));
    }

    #[test]
    fn integral_numbers_serialize_as_integers() {
        assert_eq!(to_plain(&3.0.into()).unwrap().to_string(), "3");
        assert_eq!(to_plain(&(-2.0).into()).unwrap().to_string(), "-2");
        assert_eq!(to_plain(&1.5.into()).unwrap().to_string(), "1.5");
    }

    #[test]
    fn non_finite_numbers_are_rejected_with_path() {
        let value: PropertyValue = [("ratio", PropertyValue::Number(f64::NAN))]
            .into_iter()
            .collect();
        assert_eq!(
            to_plain(&value),
            Err(SerializeError::NonFiniteNumber {
                path: "ratio".to_string()
            })
        );
    }

    #[test]
    fn containers_preserve_order_and_keys() {
        let mut map = PropertyMap::new();
        map.insert("zeta".into(), PropertyValue::from(1));
        map.insert("alpha".into(), PropertyValue::Array(vec!["a".into(), "b".into()]));
        let plain = to_plain(&PropertyValue::Object(map)).unwrap();
        assert_eq!(plain.to_string(), r#"{"zeta":1,"alpha":["a","b"]}"#);
    }

    #[test]
    fn unredacted_secret_fails_loudly() {
        let value: PropertyValue = [(
            "db",
            PropertyValue::Array(vec![PropertyValue::Null, PropertyValue::secret("p@ss")]),
        )]
        .into_iter()
        .collect();
        let err = to_plain(&value).unwrap_err();
        assert_eq!(
            err,
            SerializeError::UnredactedSecret {
                path: "db[1]".to_string()
            }
        );
        assert!(!err.to_string().contains("p@ss"));
    }

    #[test]
    fn top_level_secret_path_is_root() {
        let err = to_plain(&PropertyValue::secret(1)).unwrap_err();
        assert_eq!(
            err,
            SerializeError::UnredactedSecret {
                path: ".".to_string()
            }
        );
    }

    #[test]
    fn unknown_values_use_sentinel() {
        assert_eq!(to_plain(&PropertyValue::Computed).unwrap(), json!(UNKNOWN_SENTINEL));
        assert_eq!(
            to_plain(&OutputValue::unknown().into()).unwrap(),
            json!(UNKNOWN_SENTINEL)
        );
    }

    #[test]
    fn known_output_unwraps_value() {
        let output = OutputValue::known(PropertyValue::Array(vec![1.into()]));
        assert_eq!(to_plain(&output.into()).unwrap(), json!([1]));
    }

    #[test]
    fn unknown_output_ignores_stale_value() {
        let stale = OutputValue {
            value: Some(Box::new("stale".into())),
            known: false,
            ..OutputValue::default()
        };
        assert_eq!(to_plain(&stale.into()).unwrap(), json!(UNKNOWN_SENTINEL));
    }

    #[test]
    fn assets_serialize_metadata_only() {
        let asset = Asset {
            text: Some("top secret body".into()),
            ..Asset::from_path("./index.html").with_hash("abc")
        };
        let plain = to_plain(&asset.into()).unwrap();
        assert_eq!(plain, json!({"kind": "asset", "hash": "abc", "path": "./index.html"}));
        assert!(!plain.to_string().contains("top secret body"));
    }

    #[test]
    fn archives_describe_members() {
        let archive = Archive::from_assets([
            ("a.txt", Asset::from_text("body").into()),
            ("nested", Archive::from_uri("https://example.com/x.zip").into()),
        ]);
        assert_eq!(
            to_plain(&archive.into()).unwrap(),
            json!({
                "kind": "archive",
                "assets": {
                    "a.txt": {"kind": "asset"},
                    "nested": {"kind": "archive", "uri": "https://example.com/x.zip"},
                },
            })
        );
    }

    #[test]
    fn resource_reference_serializes_identifier() {
        let reference = ResourceReference::new("urn:x").with_id("i-123");
        assert_eq!(to_plain(&reference.into()).unwrap(), json!("i-123"));
    }

    #[test]
    fn map_conversion_reports_key_path() {
        let mut map = PropertyMap::new();
        map.insert("ok".into(), 1.into());
        map.insert("password".into(), PropertyValue::secret("p@ss"));
        assert_eq!(
            to_plain_map(&map),
            Err(SerializeError::UnredactedSecret {
                path: "password".to_string()
            })
        );
    }

    #[test]
    fn plain_round_trip_is_stable() {
        let original = json!({"a": [1, 2.5, "x", null, {"b": false}]});
        let once = to_plain(&from_plain(&original)).unwrap();
        assert_eq!(once, original);
        assert_eq!(to_plain(&from_plain(&once)).unwrap(), once);
    }
}
