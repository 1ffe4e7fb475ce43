use crate::errors::{AppError, FieldViolation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Email recorded for leads submitted without one.
pub const ANONYMOUS_EMAIL: &str = "anonymous@example.com";

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 100;

// ============ API Request/Response Models ============

/// A lead submitted for scoring.
///
/// Numeric and categorical attributes mirror the columns the classifier was
/// trained on. `comments`, `email` and `phone` are optional free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRequest {
    pub age: i64,
    pub job: String,
    pub marital: String,
    pub education: String,
    /// Whether the lead has credit in default ("yes"/"no"/"unknown").
    pub default: String,
    pub balance: f64,
    pub housing: String,
    pub loan: String,
    pub contact: String,
    /// Last contact duration in seconds.
    pub duration: i64,
    /// Contacts performed during this campaign.
    pub campaign: i64,
    /// Days since the lead was last contacted (-1 when never contacted).
    pub pdays: i64,
    /// Contacts performed before this campaign.
    pub previous: i64,
    pub poutcome: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub consent: bool,
}

/// A lead attribute looked up by name, as seen by the feature encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl FieldValue<'_> {
    /// Numeric view of the value, `None` for text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    /// String form used when looking the value up in a category encoding.
    ///
    /// Whole floats keep one decimal place (`1000.0`) so they match labels
    /// written out by the training pipeline.
    pub fn category_label(&self) -> String {
        match self {
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.1}", v),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Text(s) => (*s).to_string(),
        }
    }
}

impl LeadRequest {
    /// Looks up an attribute by its column name.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "age" => FieldValue::Int(self.age),
            "job" => FieldValue::Text(&self.job),
            "marital" => FieldValue::Text(&self.marital),
            "education" => FieldValue::Text(&self.education),
            "default" => FieldValue::Text(&self.default),
            "balance" => FieldValue::Float(self.balance),
            "housing" => FieldValue::Text(&self.housing),
            "loan" => FieldValue::Text(&self.loan),
            "contact" => FieldValue::Text(&self.contact),
            "duration" => FieldValue::Int(self.duration),
            "campaign" => FieldValue::Int(self.campaign),
            "pdays" => FieldValue::Int(self.pdays),
            "previous" => FieldValue::Int(self.previous),
            "poutcome" => FieldValue::Text(&self.poutcome),
            "comments" => FieldValue::Text(&self.comments),
            "email" => FieldValue::Text(&self.email),
            "phone" => FieldValue::Text(&self.phone),
            _ => return None,
        };
        Some(value)
    }

    /// Enforces the request boundary constraints.
    ///
    /// Every violation is collected so the caller sees all offending fields at once.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut violations = Vec::new();

        if self.age < MIN_AGE || self.age > MAX_AGE {
            violations.push(FieldViolation::new(
                "age",
                format!("Age must be between {} and {}", MIN_AGE, MAX_AGE),
            ));
        }
        if !self.balance.is_finite() || self.balance < 0.0 {
            violations.push(FieldViolation::new("balance", "Balance cannot be negative"));
        }
        if !self.consent {
            violations.push(FieldViolation::new("consent", "Consent is required"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(violations))
        }
    }
}

/// Outcome of scoring one lead, kept in the recent scores buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub id: Uuid,
    pub email: String,
    /// Classifier probability of high intent, scaled to 0-100.
    pub initial_score: f64,
    /// Initial score adjusted by the comment reranker, clamped to 0-100.
    pub reranked_score: f64,
    pub comments: String,
    pub timestamp: DateTime<Utc>,
}

/// Response payload for `POST /score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub initial_score: f64,
    pub reranked_score: f64,
    pub message: String,
}

impl From<&ScoreResult> for ScoreResponse {
    fn from(result: &ScoreResult) -> Self {
        Self {
            initial_score: result.initial_score,
            reranked_score: result.reranked_score,
            message: "Lead scored successfully".to_string(),
        }
    }
}

/// Response payload for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model_loaded: bool,
    pub leads_count: usize,
}
