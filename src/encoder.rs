//! Maps a lead onto the classifier's fixed-order numeric input.
//!
//! The schema and the per-field category encodings come from the training
//! run and are never mutated after load. Unknown categories and missing
//! fields are not errors: they encode as [`FALLBACK_CODE`].

use crate::models::{FieldValue, LeadRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Code emitted for a category the encoding has never seen, and for absent fields.
pub const FALLBACK_CODE: f64 = 0.0;

/// Ordered list of column names the classifier expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema(Vec<String>);

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }
}

/// Known classes of one categorical field. A class's code is its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryEncoding {
    classes: Vec<String>,
}

impl CategoryEncoding {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn code(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }
}

/// Category encodings keyed by field name.
pub type CategoryEncodings = HashMap<String, CategoryEncoding>;

/// Numeric input for the classifier, one value per schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Encodes `lead` in schema order.
pub fn encode(
    lead: &LeadRequest,
    schema: &FeatureSchema,
    encodings: &CategoryEncodings,
) -> FeatureVector {
    let values = schema
        .columns()
        .iter()
        .map(|column| encode_field(column, lead.field(column), encodings.get(column)))
        .collect();

    FeatureVector(values)
}

fn encode_field(
    column: &str,
    value: Option<FieldValue<'_>>,
    encoding: Option<&CategoryEncoding>,
) -> f64 {
    let Some(value) = value else {
        tracing::debug!("Field '{}' missing from lead, using fallback", column);
        return FALLBACK_CODE;
    };

    if let Some(encoding) = encoding {
        let label = value.category_label();
        return match encoding.code(&label) {
            Some(code) => code as f64,
            None => {
                tracing::debug!(
                    "Unseen category '{}' for field '{}', using fallback",
                    label,
                    column
                );
                FALLBACK_CODE
            }
        };
    }

    match value.as_number() {
        Some(number) => number,
        None => {
            tracing::warn!(
                "Field '{}' is text but has no category encoding, using fallback",
                column
            );
            FALLBACK_CODE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_lead;

    fn schema(columns: &[&str]) -> FeatureSchema {
        FeatureSchema::new(columns.iter().map(|c| c.to_string()).collect())
    }

    fn encodings() -> CategoryEncodings {
        let mut map = CategoryEncodings::new();
        map.insert(
            "job".to_string(),
            CategoryEncoding::new(vec![
                "admin.".to_string(),
                "blue-collar".to_string(),
                "technician".to_string(),
            ]),
        );
        map.insert(
            "marital".to_string(),
            CategoryEncoding::new(vec![
                "divorced".to_string(),
                "married".to_string(),
                "single".to_string(),
            ]),
        );
        map
    }

    #[test]
    fn test_encodes_in_schema_order() {
        let lead = sample_lead();
        let vector = encode(
            &lead,
            &schema(&["marital", "age", "job", "balance"]),
            &encodings(),
        );

        assert_eq!(vector.as_slice(), &[2.0, 25.0, 0.0, 1000.0]);
    }

    #[test]
    fn test_unseen_category_uses_fallback() {
        let mut lead = sample_lead();
        lead.job = "astronaut".to_string();
        lead.marital = "married".to_string();

        let vector = encode(&lead, &schema(&["job", "marital"]), &encodings());

        assert_eq!(vector.as_slice(), &[FALLBACK_CODE, 1.0]);
    }

    #[test]
    fn test_missing_field_uses_fallback() {
        let lead = sample_lead();
        let vector = encode(&lead, &schema(&["age", "credit_score"]), &encodings());

        assert_eq!(vector.as_slice(), &[25.0, FALLBACK_CODE]);
    }

    #[test]
    fn test_text_without_encoding_uses_fallback() {
        let lead = sample_lead();
        let vector = encode(&lead, &schema(&["education"]), &encodings());

        assert_eq!(vector.as_slice(), &[FALLBACK_CODE]);
    }

    #[test]
    fn test_numeric_field_can_be_categorical() {
        let lead = sample_lead();
        let mut map = CategoryEncodings::new();
        map.insert(
            "campaign".to_string(),
            CategoryEncoding::new(vec!["0".to_string(), "1".to_string()]),
        );

        let vector = encode(&lead, &schema(&["campaign"]), &map);

        assert_eq!(vector.as_slice(), &[1.0]);
    }

    #[test]
    fn test_vector_length_matches_schema() {
        let lead = sample_lead();
        let columns = schema(&[
            "age", "job", "marital", "education", "default", "balance", "housing", "loan",
            "contact", "duration", "campaign", "pdays", "previous", "poutcome",
        ]);

        let vector = encode(&lead, &columns, &encodings());

        assert_eq!(vector.len(), columns.len());
    }
}
