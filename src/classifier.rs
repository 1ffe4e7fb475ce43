//! Inference over the pre-trained binary intent classifier.
//!
//! The classifier is an opaque artifact produced offline. Two artifact kinds
//! are understood:
//!
//! ```json
//! {
//!   "kind": "gradient_boosting",
//!   "init_score": -1.2,
//!   "learning_rate": 0.1,
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 9, "threshold": 206.5, "left": 1, "right": 2 },
//!         { "value": -0.8 },
//!         { "value": 1.1 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! and `{"kind": "logistic_regression", "intercept": ..., "coefficients": [...]}`.
//! Split nodes send a sample left when `x <= threshold`.

use crate::encoder::FeatureVector;
use crate::errors::AppError;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A binary classifier exposing class probabilities.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Returns `[P(low intent), P(high intent)]` for one feature row.
    fn predict_proba(&self, features: &[f64]) -> [f64; 2];
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn binary_proba(raw: f64) -> [f64; 2] {
    let positive = sigmoid(raw);
    [1.0 - positive, positive]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walks from the root to a leaf. Assumes [`RegressionTree::validate`] passed.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    index = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Children must point forward so traversal always terminates.
    fn validate(&self, n_features: usize) -> anyhow::Result<()> {
        if self.nodes.is_empty() {
            bail!("tree has no nodes");
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        bail!(
                            "node {} splits on feature {} but the schema has {} columns",
                            index,
                            feature,
                            n_features
                        );
                    }
                    if !threshold.is_finite() {
                        bail!("node {} has a non-finite threshold", index);
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            bail!("node {} has invalid child index {}", index, child);
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        bail!("leaf {} has a non-finite value", index);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Binary gradient-boosted regression trees over log-odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub init_score: f64,
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    pub fn raw_score(&self, features: &[f64]) -> f64 {
        let boosted: f64 = self.trees.iter().map(|t| t.evaluate(features)).sum();
        self.init_score + self.learning_rate * boosted
    }
}

impl Classifier for GradientBoostedTrees {
    fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        binary_proba(self.raw_score(features))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        let linear: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(c, x)| c * x)
            .sum();
        binary_proba(self.intercept + linear)
    }
}

/// Classifier artifact as stored in `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    GradientBoosting(GradientBoostedTrees),
    LogisticRegression(LogisticRegression),
}

impl ClassifierModel {
    /// Checks the artifact against the number of schema columns.
    pub fn validate(&self, n_features: usize) -> anyhow::Result<()> {
        match self {
            ClassifierModel::GradientBoosting(model) => {
                if !model.init_score.is_finite() || !model.learning_rate.is_finite() {
                    bail!("gradient boosting model has non-finite parameters");
                }
                if model.trees.is_empty() {
                    bail!("gradient boosting model has no trees");
                }
                for (i, tree) in model.trees.iter().enumerate() {
                    tree.validate(n_features)
                        .map_err(|e| anyhow::anyhow!("tree {}: {}", i, e))?;
                }
            }
            ClassifierModel::LogisticRegression(model) => {
                if model.coefficients.len() != n_features {
                    bail!(
                        "logistic regression has {} coefficients but the schema has {} columns",
                        model.coefficients.len(),
                        n_features
                    );
                }
                if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite())
                {
                    bail!("logistic regression has non-finite parameters");
                }
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        match self {
            ClassifierModel::GradientBoosting(model) => format!(
                "gradient boosting: {} trees, learning rate {}, init score {:.4}",
                model.trees.len(),
                model.learning_rate,
                model.init_score
            ),
            ClassifierModel::LogisticRegression(model) => format!(
                "logistic regression: {} coefficients, intercept {:.4}",
                model.coefficients.len(),
                model.intercept
            ),
        }
    }
}

impl Classifier for ClassifierModel {
    fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        match self {
            ClassifierModel::GradientBoosting(model) => model.predict_proba(features),
            ClassifierModel::LogisticRegression(model) => model.predict_proba(features),
        }
    }
}

/// Turns classifier output into the initial 0-100 score.
#[derive(Debug, Clone, Default)]
pub struct ClassifierAdapter {
    model: Option<Arc<dyn Classifier>>,
}

impl ClassifierAdapter {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self { model: Some(model) }
    }

    /// Adapter for a process whose model failed to load.
    pub fn unavailable() -> Self {
        Self { model: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<f64, AppError> {
        let model = self.model.as_ref().ok_or(AppError::ModelUnavailable)?;
        let [_, positive] = model.predict_proba(vector.as_slice());

        // Implementors may drift outside [0, 1].
        let score = (positive * 100.0).clamp(0.0, 100.0);
        if score.is_nan() {
            return Err(AppError::InternalError(
                "classifier returned a non-numeric probability".to_string(),
            ));
        }
        Ok(score)
    }
}
