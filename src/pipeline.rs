//! Lead scoring pipeline
//!
//! Sequences the three scoring stages for one lead:
//! 1. Encode the lead against the trained feature schema
//! 2. Ask the classifier for the initial 0-100 score
//! 3. Rerank the initial score from the lead's comments
//!
//! The pipeline holds only read-only state and can be shared across
//! concurrent requests behind an `Arc`.

use crate::artifacts::ModelArtifacts;
use crate::classifier::{Classifier, ClassifierAdapter};
use crate::encoder::{encode, CategoryEncodings, FeatureSchema};
use crate::errors::AppError;
use crate::models::{LeadRequest, ScoreResult, ANONYMOUS_EMAIL};
use crate::reranker;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ScoringPipeline {
    schema: FeatureSchema,
    encodings: CategoryEncodings,
    classifier: ClassifierAdapter,
}

impl ScoringPipeline {
    pub fn new(
        schema: FeatureSchema,
        encodings: CategoryEncodings,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            schema,
            encodings,
            classifier: ClassifierAdapter::new(classifier),
        }
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self::new(
            artifacts.schema,
            artifacts.encodings,
            Arc::new(artifacts.classifier),
        )
    }

    /// Pipeline for a process whose model failed to load: every score call
    /// fails with [`AppError::ModelUnavailable`].
    pub fn degraded() -> Self {
        Self::default()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_loaded()
    }

    /// Scores one validated lead.
    pub fn score(&self, lead: &LeadRequest) -> Result<ScoreResult, AppError> {
        let features = encode(lead, &self.schema, &self.encodings);
        let initial_score = self.classifier.predict(&features)?;
        let reranked_score = reranker::rerank(initial_score, &lead.comments);

        let email = if lead.email.trim().is_empty() {
            ANONYMOUS_EMAIL.to_string()
        } else {
            lead.email.clone()
        };

        Ok(ScoreResult {
            id: Uuid::new_v4(),
            email,
            initial_score: round2(initial_score),
            reranked_score: round2(reranked_score),
            comments: lead.comments.clone(),
            timestamp: Utc::now(),
        })
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
