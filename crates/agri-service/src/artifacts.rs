//! Artifact envelopes and the directory-backed artifact store.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use agri_core::{AgriError, ArtifactStore, ErrorInfo, SchemaVersion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Schema version written into every envelope.
pub const ARTIFACT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Versioned, checksummed wrapper around a bincode payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    /// Schema of the payload.
    pub schema_version: SchemaVersion,
    /// Store key the artifact was written under.
    pub key: String,
    /// Hex SHA-256 of `payload`.
    pub sha256: String,
    /// Bincode-encoded artifact.
    pub payload: Vec<u8>,
}

fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Serializes an artifact into envelope bytes.
pub fn encode_artifact<A: Serialize>(key: &str, artifact: &A) -> Result<Vec<u8>, AgriError> {
    let payload = bincode::serialize(artifact).map_err(|err| {
        AgriError::Serde(ErrorInfo::new("artifact-encode", err.to_string()).with_context("key", key))
    })?;
    let envelope = ArtifactEnvelope {
        schema_version: ARTIFACT_SCHEMA,
        key: key.to_string(),
        sha256: checksum(&payload),
        payload,
    };
    bincode::serialize(&envelope).map_err(|err| {
        AgriError::Serde(ErrorInfo::new("envelope-encode", err.to_string()).with_context("key", key))
    })
}

/// Decodes envelope bytes written by [`encode_artifact`].
///
/// Fails when the schema major version differs, the key does not match or the
/// payload checksum is wrong.
pub fn decode_artifact<A: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<A, AgriError> {
    let envelope: ArtifactEnvelope = bincode::deserialize(bytes).map_err(|err| {
        AgriError::Serde(ErrorInfo::new("envelope-decode", err.to_string()).with_context("key", key))
    })?;
    if !envelope.schema_version.is_compatible_with(&ARTIFACT_SCHEMA) {
        return Err(AgriError::Serde(
            ErrorInfo::new("schema-mismatch", "artifact schema is not readable by this build")
                .with_context("key", key)
                .with_context(
                    "found",
                    format!(
                        "{}.{}.{}",
                        envelope.schema_version.major,
                        envelope.schema_version.minor,
                        envelope.schema_version.patch
                    ),
                )
                .with_hint("retrain the model to regenerate the artifact"),
        ));
    }
    if envelope.key != key {
        return Err(AgriError::Serde(
            ErrorInfo::new("key-mismatch", "artifact was stored under a different key")
                .with_context("expected", key)
                .with_context("found", &envelope.key),
        ));
    }
    let actual = checksum(&envelope.payload);
    if actual != envelope.sha256 {
        return Err(AgriError::Serde(
            ErrorInfo::new("checksum-mismatch", "artifact payload is corrupted")
                .with_context("key", key)
                .with_context("expected", &envelope.sha256)
                .with_context("actual", actual),
        ));
    }
    bincode::deserialize(&envelope.payload).map_err(|err| {
        AgriError::Serde(ErrorInfo::new("artifact-decode", err.to_string()).with_context("key", key))
    })
}

/// One envelope file per key under a directory.
///
/// File names are the hex encoding of the key, so any key maps to a distinct,
/// portable file name.
#[derive(Debug, Clone)]
pub struct FileArtifactStore<A> {
    root: PathBuf,
    _artifact: PhantomData<fn() -> A>,
}

impl<A> FileArtifactStore<A> {
    /// Opens the store, creating the directory when needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AgriError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| storage_error("artifact-dir", err, &root))?;
        Ok(Self {
            root,
            _artifact: PhantomData,
        })
    }

    /// Directory holding the artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File an artifact under `key` is written to.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.artifact", hex::encode(key.as_bytes())))
    }
}

fn storage_error(code: &str, err: std::io::Error, path: &Path) -> AgriError {
    AgriError::Storage(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

impl<A> ArtifactStore<A> for FileArtifactStore<A>
where
    A: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> Result<Option<A>, AgriError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|err| storage_error("artifact-read", err, &path))?;
        decode_artifact(key, &bytes)
            .map(Some)
            .map_err(|err| err.with_context("path", path.display()))
    }

    fn put(&self, key: &str, artifact: A) -> Result<(), AgriError> {
        let bytes = encode_artifact(key, &artifact)?;
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|err| storage_error("artifact-delete", err, &path))?;
        }
        fs::write(&path, bytes).map_err(|err| storage_error("artifact-write", err, &path))
    }
}
