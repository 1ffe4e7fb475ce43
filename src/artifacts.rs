//! Loading of the trained model artifacts.
//!
//! A model directory holds three JSON files written by the training job:
//!
//! - `model.json`: the classifier (see [`crate::classifier`]).
//! - `label_encoders.json`: `{"job": ["admin.", "blue-collar", ...], ...}`,
//!   each list in code order.
//! - `feature_columns.json`: `["age", "job", ...]`, the classifier's column order.
//!
//! An optional `manifest.json` pins the SHA-256 of each file:
//! `{"files": {"model.json": "<hex>", ...}}`. Any listed file whose digest
//! differs is rejected.

use crate::classifier::ClassifierModel;
use crate::encoder::{CategoryEncodings, FeatureSchema};
use anyhow::{bail, Context};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

pub const MODEL_FILE: &str = "model.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const FEATURES_FILE: &str = "feature_columns.json";
pub const MANIFEST_FILE: &str = "manifest.json";

pub const ARTIFACT_FILES: [&str; 3] = [MODEL_FILE, ENCODERS_FILE, FEATURES_FILE];

/// Expected digests of the artifact files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
}

/// Everything the scoring pipeline needs from the training run.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub classifier: ClassifierModel,
    pub schema: FeatureSchema,
    pub encodings: CategoryEncodings,
    /// SHA-256 (hex) of each loaded file, keyed by file name.
    pub fingerprints: BTreeMap<String, String>,
}

impl ModelArtifacts {
    /// Cross-checks the three artifacts against each other.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.schema.is_empty() {
            bail!("{} lists no columns", FEATURES_FILE);
        }

        let mut seen = HashSet::new();
        for column in self.schema.columns() {
            if !seen.insert(column.as_str()) {
                bail!("{} lists column '{}' twice", FEATURES_FILE, column);
            }
        }

        for (field, encoding) in &self.encodings {
            if !self.schema.contains(field) {
                bail!(
                    "{} encodes '{}' which is not a schema column",
                    ENCODERS_FILE,
                    field
                );
            }
            if encoding.classes().is_empty() {
                bail!("{} has no classes for '{}'", ENCODERS_FILE, field);
            }
        }

        self.classifier
            .validate(self.schema.len())
            .with_context(|| format!("{} does not match the feature schema", MODEL_FILE))
    }
}

/// SHA-256 of `bytes`, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn read_artifact(dir: &Path, name: &str) -> anyhow::Result<(Vec<u8>, String)> {
    let path = dir.join(name);
    let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let digest = fingerprint(&bytes);
    Ok((bytes, digest))
}

fn parse_artifact<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> anyhow::Result<T> {
    serde_json::from_slice(bytes).with_context(|| format!("parsing {}", name))
}

/// Reads `manifest.json` if the directory has one.
pub fn read_manifest(dir: &Path) -> anyhow::Result<Option<Manifest>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    parse_artifact(MANIFEST_FILE, &bytes).map(Some)
}

fn verify_manifest(
    manifest: &Manifest,
    fingerprints: &BTreeMap<String, String>,
) -> anyhow::Result<()> {
    for (name, expected) in &manifest.files {
        let Some(actual) = fingerprints.get(name) else {
            bail!("{} lists unknown artifact '{}'", MANIFEST_FILE, name);
        };
        if !actual.eq_ignore_ascii_case(expected) {
            bail!(
                "checksum mismatch for {}: expected {}, found {}",
                name,
                expected,
                actual
            );
        }
    }
    Ok(())
}

/// Loads and validates the artifacts in `dir`.
pub fn load_artifacts(dir: impl AsRef<Path>) -> anyhow::Result<ModelArtifacts> {
    read_artifacts(dir.as_ref(), true)
}

/// Loads and validates the artifacts in `dir` ignoring any existing
/// manifest, then writes a fresh `manifest.json` for them.
///
/// Invalid artifacts are never pinned.
pub fn pin_artifacts(dir: impl AsRef<Path>) -> anyhow::Result<(ModelArtifacts, Manifest)> {
    let dir = dir.as_ref();
    let artifacts = read_artifacts(dir, false)?;
    let manifest = Manifest {
        files: artifacts.fingerprints.clone(),
    };
    store_manifest(dir, &manifest)?;
    Ok((artifacts, manifest))
}

fn read_artifacts(dir: &Path, verify: bool) -> anyhow::Result<ModelArtifacts> {
    let mut fingerprints = BTreeMap::new();
    let mut contents = BTreeMap::new();
    for name in ARTIFACT_FILES {
        let (bytes, digest) = read_artifact(dir, name)?;
        tracing::debug!("Read {} ({} bytes, sha256 {})", name, bytes.len(), digest);
        fingerprints.insert(name.to_string(), digest);
        contents.insert(name, bytes);
    }

    if verify {
        if let Some(manifest) = read_manifest(dir)? {
            verify_manifest(&manifest, &fingerprints)?;
            tracing::info!("Artifact checksums verified against {}", MANIFEST_FILE);
        }
    }

    let artifacts = ModelArtifacts {
        classifier: parse_artifact(MODEL_FILE, &contents[MODEL_FILE])?,
        encodings: parse_artifact(ENCODERS_FILE, &contents[ENCODERS_FILE])?,
        schema: parse_artifact(FEATURES_FILE, &contents[FEATURES_FILE])?,
        fingerprints,
    };
    artifacts.validate()?;

    Ok(artifacts)
}

/// Computes digests for the artifact files in `dir` and writes `manifest.json`.
pub fn write_manifest(dir: impl AsRef<Path>) -> anyhow::Result<Manifest> {
    let dir = dir.as_ref();

    let mut manifest = Manifest::default();
    for name in ARTIFACT_FILES {
        let (_, digest) = read_artifact(dir, name)?;
        manifest.files.insert(name.to_string(), digest);
    }

    store_manifest(dir, &manifest)?;
    Ok(manifest)
}

fn store_manifest(dir: &Path, manifest: &Manifest) -> anyhow::Result<()> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
}
