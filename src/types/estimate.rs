//! Salary estimate and reply message structures.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successful salary estimate for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryEstimate {
    /// Unique estimate identifier
    pub estimate_id: String,

    /// Associated request ID
    pub request_id: String,

    /// Raw model output, in the model's native unit (e.g. monthly salary)
    pub model_output: f64,

    /// Model output times the configured display multiplier
    pub display_value: f64,

    /// The multiplier that was applied, so consumers can tell what unit
    /// `display_value` is in
    pub multiplier: f64,

    /// Estimate generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl SalaryEstimate {
    /// Build an estimate from a raw model output and a display multiplier.
    pub fn new(request_id: impl Into<String>, model_output: f64, multiplier: f64) -> Self {
        Self {
            estimate_id: uuid::Uuid::new_v4().to_string(),
            request_id: request_id.into(),
            model_output,
            display_value: model_output * multiplier,
            multiplier,
            timestamp: Utc::now(),
        }
    }
}

/// A typed failure for one request. Carries the error discriminant so the
/// consumer can show actionable detail instead of an opaque message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionFailure {
    /// Associated request ID
    pub request_id: String,

    /// Machine-readable error kind: `bundle_load`, `unknown_category`,
    /// `schema_mismatch`, or `inference`
    pub kind: String,

    /// Human-readable detail
    pub message: String,

    /// Failure timestamp
    pub timestamp: DateTime<Utc>,
}

impl PredictionFailure {
    pub fn from_error(request_id: impl Into<String>, error: &PipelineError) -> Self {
        Self {
            request_id: request_id.into(),
            kind: error.kind().to_string(),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Reply published for every request: either an estimate or a typed
/// failure. Never a stale or default estimate dressed up as success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionReply {
    Ok(SalaryEstimate),
    Error(PredictionFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_applies_multiplier() {
        let estimate = SalaryEstimate::new("req_001", 4500.0, 12.0);
        assert_eq!(estimate.model_output, 4500.0);
        assert_eq!(estimate.display_value, 54000.0);
        assert_eq!(estimate.multiplier, 12.0);
    }

    #[test]
    fn test_reply_serialization() {
        let reply = PredictionReply::Ok(SalaryEstimate::new("req_001", 39.0, 1.0));

        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains("\"status\":\"ok\""));

        let deserialized: PredictionReply = serde_json::from_str(&json).unwrap();
        match deserialized {
            PredictionReply::Ok(estimate) => {
                assert_eq!(estimate.request_id, "req_001");
                assert_eq!(estimate.display_value, 39.0);
            }
            PredictionReply::Error(_) => panic!("expected ok reply"),
        }
    }

    #[test]
    fn test_failure_carries_kind() {
        let error = PipelineError::schema("missing field \"Age\"");
        let failure = PredictionFailure::from_error("req_002", &error);

        assert_eq!(failure.kind, "schema_mismatch");
        assert!(failure.message.contains("Age"));

        let json = serde_json::to_string(&PredictionReply::Error(failure)).unwrap();
        assert!(json.contains("\"status\":\"error\""));
    }
}
