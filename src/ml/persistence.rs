//! Binary model artifacts.
//!
//! Layout: 8-byte magic, little-endian `u16` format version, then the
//! bincode-encoded [`TrainedModel`].

use crate::error::{AppError, Result};
use crate::ml::classifier::TrainedModel;
use bincode::Options;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

const MAGIC: &[u8; 8] = b"AGRIMDL\0";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

/// Upper bound on a decoded artifact body
const MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_ARTIFACT_BYTES)
}

/// Encode a model into artifact bytes
pub fn to_bytes(model: &TrainedModel) -> Result<Vec<u8>> {
    let body = codec()
        .serialize(model)
        .map_err(|e| AppError::Serialization(format!("Failed to encode model: {}", e)))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode artifact bytes
pub fn from_bytes(bytes: &[u8]) -> Result<TrainedModel> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(AppError::CorruptArtifact(
            "Not a model artifact (bad header)".to_string(),
        ));
    }

    let version = u16::from_le_bytes([bytes[MAGIC.len()], bytes[MAGIC.len() + 1]]);
    if version != FORMAT_VERSION {
        return Err(AppError::CorruptArtifact(format!(
            "Unsupported artifact version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let model: TrainedModel = codec()
        .deserialize(&bytes[HEADER_LEN..])
        .map_err(|e| AppError::CorruptArtifact(format!("Failed to decode model: {}", e)))?;

    if !model.is_trained() {
        return Err(AppError::CorruptArtifact(
            "Artifact holds an untrained model".to_string(),
        ));
    }

    Ok(model)
}

/// Write a model artifact, replacing any existing file
pub fn save(model: &TrainedModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(model)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), bytes = bytes.len(), "Saved model artifact");
    Ok(())
}

/// Read a model artifact
pub fn load(path: impl AsRef<Path>) -> Result<TrainedModel> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let model = from_bytes(&bytes)?;

    info!(
        path = %path.display(),
        algorithm = %model.model_type(),
        classes = model.classes().len(),
        "Loaded model artifact"
    );
    Ok(model)
}

impl TrainedModel {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save(self, path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load(path)
    }
}
