//! Prediction request message structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw field value as submitted by the input surface.
///
/// Numeric for fields like age and years of experience, text for
/// categorical fields like gender or job title. Which is which is decided
/// by the bundle's schema, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One salary prediction request, created at submission time and consumed
/// immediately. The field set is whatever the loaded bundle expects; the
/// pipeline never assumes a particular schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Caller-supplied request identifier
    pub request_id: String,

    /// Named raw field values, e.g. `"Age": 30`, `"Gender": "Male"`
    pub fields: HashMap<String, FieldValue>,

    /// Submission timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PredictionRequest {
    /// Create a request with an empty field set.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            fields: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Add a field value, builder style.
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = PredictionRequest::new("req_001")
            .with_field("Age", 30.0)
            .with_field("Gender", "Male");

        let json = serde_json::to_string(&request).unwrap();
        let deserialized: PredictionRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(request.request_id, deserialized.request_id);
        assert_eq!(
            deserialized.fields.get("Age"),
            Some(&FieldValue::Number(30.0))
        );
        assert_eq!(
            deserialized.fields.get("Gender"),
            Some(&FieldValue::Text("Male".to_string()))
        );
    }

    #[test]
    fn test_field_value_untagged_json() {
        // Plain JSON numbers and strings map straight onto FieldValue.
        let parsed: HashMap<String, FieldValue> =
            serde_json::from_str(r#"{"Age": 42, "Job Title": "Manager"}"#).unwrap();
        assert_eq!(parsed.get("Age"), Some(&FieldValue::Number(42.0)));
        assert_eq!(
            parsed.get("Job Title"),
            Some(&FieldValue::Text("Manager".to_string()))
        );
    }
}
