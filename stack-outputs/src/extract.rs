//! Extraction of the root stack resource's outputs.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::{
    crypter::Crypter,
    error::{Error, StructureError},
    plain::to_plain_map,
    redaction::redact_map,
    snapshot::{ResourceState, Snapshot},
    tracing::TracingRedactedExt,
    value::{DecodeError, PropertyMap, SecretDecoding, decode_property_value},
};

/// Type token of the resource that represents the stack itself.
pub const ROOT_STACK_TYPE: &str = "pulumi:pulumi:Stack";

/// Plain output values keyed by output name, in recorded order.
pub type OutputMap = IndexMap<String, JsonValue>;

/// Returns the plain, redacted outputs of the snapshot's root stack resource.
///
/// A snapshot without a root resource has no outputs and yields an empty map.
/// When `reveal` is `false` the crypter is never called: ciphertext secrets
/// are withheld during decoding and then replaced by the redaction filter.
pub fn extract_outputs(
    snapshot: &Snapshot,
    reveal: bool,
    crypter: &dyn Crypter,
) -> Result<OutputMap, Error> {
    let Some(root) = find_root(snapshot)? else {
        tracing::debug!("snapshot has no root stack resource");
        return Ok(OutputMap::new());
    };
    tracing::debug!(urn = %root.urn, reveal, "extracting root stack outputs");

    let secrets = if reveal {
        SecretDecoding::Decrypt(crypter)
    } else {
        SecretDecoding::Withhold
    };
    let outputs = decode_outputs(root, secrets)?;
    tracing::trace!(outputs = %outputs.tracing_redacted(), "decoded root outputs");
    Ok(to_plain_map(&redact_map(&outputs, reveal))?)
}

fn find_root(snapshot: &Snapshot) -> Result<Option<&ResourceState>, StructureError> {
    let mut roots = snapshot.root_stack_resources();
    let first = roots.next();
    let extra = roots.count();
    if extra > 0 {
        return Err(StructureError::DuplicateRoot { count: extra + 1 });
    }
    Ok(first)
}

fn decode_outputs(root: &ResourceState, secrets: SecretDecoding<'_>) -> Result<PropertyMap, Error> {
    let map = match &root.outputs {
        None | Some(JsonValue::Null) => return Ok(PropertyMap::new()),
        Some(JsonValue::Object(map)) => map,
        Some(_) => {
            return Err(StructureError::OutputsNotAnObject {
                urn: root.urn.clone(),
            }
            .into());
        }
    };

    let mut outputs = PropertyMap::with_capacity(map.len());
    for (name, raw) in map {
        let value = decode_property_value(raw, secrets).map_err(|err| match err {
            DecodeError::Decrypt(source) => Error::Decrypt {
                name: name.clone(),
                source,
            },
            source => StructureError::MalformedOutput {
                urn: root.urn.clone(),
                name: name.clone(),
                source,
            }
            .into(),
        })?;
        outputs.insert(name.clone(), value);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::extract_outputs;
    use crate::{
        crypter::{Base64Crypter, Crypter, CrypterError, RefusingCrypter},
        error::{Error, StructureError},
        snapshot::Snapshot,
    };

    const SIG: &str = "4dabf18193072939515e22adb298388d";
    const SECRET: &str = "1b47061264138c4ac30d75fd1eb44270";

    struct PanickingCrypter;

    impl Crypter for PanickingCrypter {
        fn decrypt(&self, _ciphertext: &str) -> Result<String, CrypterError> {
            panic!("decryption must not be attempted");
        }
    }

    struct CountingCrypter(Cell<usize>);

    impl Crypter for CountingCrypter {
        fn decrypt(&self, ciphertext: &str) -> Result<String, CrypterError> {
            self.0.set(self.0.get() + 1);
            Base64Crypter.decrypt(ciphertext)
        }
    }

    fn snapshot_with_outputs(outputs: serde_json::Value) -> Snapshot {
        Snapshot::from_json(
            &json!({"resources": [
                {"urn": "urn:pulumi:dev::app::aws:s3/bucket:Bucket::site", "type": "aws:s3/bucket:Bucket",
                 "outputs": {"bucket": "should-not-appear"}},
                {"urn": "urn:pulumi:dev::app::pulumi:pulumi:Stack::app-dev", "type": "pulumi:pulumi:Stack",
                 "outputs": outputs},
            ]})
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn empty_snapshot_has_no_outputs() {
        let outputs = extract_outputs(&Snapshot::default(), false, &RefusingCrypter).unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn root_without_outputs_is_empty() {
        let snapshot = snapshot_with_outputs(serde_json::Value::Null);
        assert!(extract_outputs(&snapshot, true, &RefusingCrypter).unwrap().is_empty());
    }

    #[test]
    fn extracts_only_root_outputs() {
        let snapshot = snapshot_with_outputs(json!({"url": "https://x"}));
        let outputs = extract_outputs(&snapshot, false, &RefusingCrypter).unwrap();
        assert_eq!(serde_json::to_value(&outputs).unwrap(), json!({"url": "https://x"}));
    }

    #[test]
    fn hidden_ciphertext_never_reaches_the_crypter() {
        let ciphertext = Base64Crypter.encrypt("\"p@ss\"");
        let snapshot = snapshot_with_outputs(json!({
            "url": "https://x",
            "password": {SIG: SECRET, "ciphertext": ciphertext},
        }));
        let outputs = extract_outputs(&snapshot, false, &PanickingCrypter).unwrap();
        assert_eq!(
            serde_json::to_value(&outputs).unwrap(),
            json!({"url": "https://x", "password": "[secret]"})
        );
    }

    #[test]
    fn revealed_ciphertext_is_decrypted_once() {
        let crypter = CountingCrypter(Cell::new(0));
        let snapshot = snapshot_with_outputs(json!({
            "password": {SIG: SECRET, "ciphertext": Base64Crypter.encrypt("\"p@ss\"")},
        }));
        let outputs = extract_outputs(&snapshot, true, &crypter).unwrap();
        assert_eq!(outputs["password"], json!("p@ss"));
        assert_eq!(crypter.0.get(), 1);
    }

    #[test]
    fn decrypt_failure_names_the_output() {
        let snapshot = snapshot_with_outputs(json!({
            "password": {SIG: SECRET, "ciphertext": "abc"},
        }));
        let err = extract_outputs(&snapshot, true, &RefusingCrypter).unwrap_err();
        assert!(matches!(&err, Error::Decrypt { name, .. } if name == "password"));
    }

    #[test]
    fn non_object_outputs_are_a_structure_error() {
        let snapshot = snapshot_with_outputs(json!(["not", "a", "map"]));
        let err = extract_outputs(&snapshot, false, &RefusingCrypter).unwrap_err();
        assert!(matches!(
            err,
            Error::Structure(StructureError::OutputsNotAnObject { .. })
        ));
    }

    #[test]
    fn malformed_output_is_a_structure_error() {
        let snapshot = snapshot_with_outputs(json!({"bad": {SIG: "garbage"}}));
        let err = extract_outputs(&snapshot, false, &RefusingCrypter).unwrap_err();
        assert!(matches!(
            &err,
            Error::Structure(StructureError::MalformedOutput { name, .. }) if name == "bad"
        ));
    }

    #[test]
    fn duplicate_roots_are_a_structure_error() {
        let snapshot = Snapshot::from_json(
            &json!({"resources": [
                {"urn": "urn:one", "type": "pulumi:pulumi:Stack"},
                {"urn": "urn:two", "type": "pulumi:pulumi:Stack"},
            ]})
            .to_string(),
        )
        .unwrap();
        let err = extract_outputs(&snapshot, false, &RefusingCrypter).unwrap_err();
        assert!(matches!(
            err,
            Error::Structure(StructureError::DuplicateRoot { count: 2 })
        ));
    }
}
