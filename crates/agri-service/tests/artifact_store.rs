use agri_core::{AgriError, ArtifactStore, SchemaVersion};
use agri_service::{decode_artifact, encode_artifact, ArtifactEnvelope, FileArtifactStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Toy {
    name: String,
    weights: Vec<f64>,
}

fn toy(name: &str) -> Toy {
    Toy {
        name: name.into(),
        weights: vec![0.5, -1.25, 3.0],
    }
}

fn serde_code(err: AgriError) -> String {
    match err {
        AgriError::Serde(info) => info.code,
        other => panic!("expected Serde error, got {other:?}"),
    }
}

#[test]
fn envelope_carries_schema_and_checksum() {
    let bytes = encode_artifact("wheat", &toy("a")).unwrap();
    let envelope: ArtifactEnvelope = bincode::deserialize(&bytes).unwrap();
    assert_eq!(envelope.key, "wheat");
    assert_eq!(envelope.schema_version, SchemaVersion::new(1, 0, 0));
    assert_eq!(envelope.sha256.len(), 64);
    let decoded: Toy = decode_artifact("wheat", &bytes).unwrap();
    assert_eq!(decoded, toy("a"));
}

#[test]
fn corrupted_or_foreign_envelopes_are_rejected() {
    let bytes = encode_artifact("wheat", &toy("a")).unwrap();
    let envelope: ArtifactEnvelope = bincode::deserialize(&bytes).unwrap();

    let mut tampered = envelope.clone();
    tampered.payload[0] ^= 0xff;
    let tampered = bincode::serialize(&tampered).unwrap();
    assert_eq!(
        serde_code(decode_artifact::<Toy>("wheat", &tampered).unwrap_err()),
        "checksum-mismatch"
    );

    let mut future = envelope.clone();
    future.schema_version = SchemaVersion::new(2, 0, 0);
    let future = bincode::serialize(&future).unwrap();
    assert_eq!(
        serde_code(decode_artifact::<Toy>("wheat", &future).unwrap_err()),
        "schema-mismatch"
    );

    assert_eq!(
        serde_code(decode_artifact::<Toy>("rice", &bytes).unwrap_err()),
        "key-mismatch"
    );
    assert_eq!(
        serde_code(decode_artifact::<Toy>("wheat", &[1, 2, 3]).unwrap_err()),
        "envelope-decode"
    );
}

#[test]
fn file_store_replaces_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let store: FileArtifactStore<Toy> = FileArtifactStore::open(dir.path().join("models")).unwrap();
    assert!(store.get("maize/north").unwrap().is_none());

    store.put("maize/north", toy("first")).unwrap();
    store.put("maize/north", toy("second")).unwrap();
    let path = store.path_for("maize/north");
    assert_eq!(path.parent(), Some(store.root()));
    assert!(path.exists());

    let reopened: FileArtifactStore<Toy> = FileArtifactStore::open(dir.path().join("models")).unwrap();
    assert_eq!(reopened.get("maize/north").unwrap(), Some(toy("second")));
    assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 1);
}

#[test]
fn unreadable_file_surfaces_serde_error() {
    let dir = tempfile::tempdir().unwrap();
    let store: FileArtifactStore<Toy> = FileArtifactStore::open(dir.path()).unwrap();
    std::fs::write(store.path_for("oats"), b"garbage").unwrap();
    let err = store.get("oats").unwrap_err();
    assert!(err.is_fatal());
    assert!(err.info().context.contains_key("path"));
}
