//! Lead Scoring API Library
//!
//! This library scores prospective customer leads by combining a trained
//! classifier's probability estimate with a deterministic adjustment derived
//! from the lead's free-text comments.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `domain`: Core scoring logic.
//! - `artifacts`: Loading and verification of trained model artifacts.
//! - `classifier`: Classifier artifacts and the initial-score adapter.
//! - `config`: Configuration management.
//! - `encoder`: Feature encoding of lead records.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Request, response and result models.
//! - `pipeline`: Scoring orchestration.
//! - `recent`: Bounded buffer of recent score results.
//! - `reranker`: Comment-driven score adjustment.

pub mod api;
pub mod domain;

pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod recent;
pub mod reranker;
