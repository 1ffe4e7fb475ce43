//! Utility to inspect a model directory and optionally pin its checksums.
//!
//! Usage: `inspect_model [MODEL_DIR] [--write-manifest]`
//!
//! `MODEL_DIR` defaults to the `MODEL_DIR` environment variable, then `model`.

use dotenvy::dotenv;
use lead_scoring_api::artifacts::{load_artifacts, pin_artifacts, MANIFEST_FILE};
use std::env;

/// Main entry point for the model inspection utility.
///
/// Loads and validates the artifacts, then prints the feature schema, the
/// category encodings, the classifier summary and the file fingerprints.
/// With `--write-manifest` an existing manifest is not checked but replaced.
fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut write = false;
    let mut dir = None;
    for arg in env::args().skip(1) {
        if arg == "--write-manifest" {
            write = true;
        } else {
            dir = Some(arg);
        }
    }
    let dir = dir
        .or_else(|| env::var("MODEL_DIR").ok())
        .unwrap_or_else(|| "model".to_string());

    let artifacts = if write {
        let (artifacts, manifest) = pin_artifacts(&dir)?;
        tracing::info!(
            "Wrote {} with {} entries",
            MANIFEST_FILE,
            manifest.files.len()
        );
        artifacts
    } else {
        load_artifacts(&dir)?
    };

    println!("Model directory: {}", dir);
    println!("Classifier: {}", artifacts.classifier.summary());
    println!();

    println!("Feature schema ({} columns):", artifacts.schema.len());
    for (i, column) in artifacts.schema.columns().iter().enumerate() {
        match artifacts.encodings.get(column) {
            Some(encoding) => println!(
                "  {:>2}. {} (categorical, {} classes)",
                i,
                column,
                encoding.classes().len()
            ),
            None => println!("  {:>2}. {} (numeric)", i, column),
        }
    }
    println!();

    let mut fields: Vec<&String> = artifacts.encodings.keys().collect();
    fields.sort();
    println!("Category encodings:");
    for field in fields {
        let classes = artifacts.encodings[field].classes();
        let labels: Vec<String> = classes
            .iter()
            .enumerate()
            .map(|(code, class)| format!("{}={}", class, code))
            .collect();
        println!("  {}: {}", field, labels.join(", "));
    }
    println!();

    println!("Fingerprints (sha256):");
    for (file, digest) in &artifacts.fingerprints {
        println!("  {}: {}", file, digest);
    }

    Ok(())
}
