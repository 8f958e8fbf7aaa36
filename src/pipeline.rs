//! The inference pipeline: raw field values in, one salary figure out.
//!
//! Reproduces the training-time preprocessing exactly: categorical fields
//! are replaced by their fitted encoder codes, the feature vector is
//! assembled in the bundle's column order, the scaler (when present) is
//! applied to the full post-encoding vector, and the model evaluates the
//! result. Any mismatch with the bundle's contract is a typed error, never
//! a silently wrong number.

use crate::bundle::ModelBundle;
use crate::error::PipelineError;
use crate::types::{FieldValue, PredictionRequest};
use std::sync::Arc;
use tracing::debug;

/// Raw model output for one request, in the model's native unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub model_output: f64,
}

impl Prediction {
    /// Apply a display-time multiplier (e.g. 12.0 for monthly to annual).
    /// A presentation decision, parameterized so callers cannot bake in
    /// divergent constants.
    pub fn display_value(&self, multiplier: f64) -> f64 {
        self.model_output * multiplier
    }
}

/// Pure inference over an immutable, shared bundle. No state persists
/// across predictions, so concurrent callers need no coordination beyond
/// the shared handle.
pub struct InferencePipeline {
    bundle: Arc<ModelBundle>,
}

impl InferencePipeline {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Produce a prediction for one request.
    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction, PipelineError> {
        let vector = self.assemble(request)?;

        let vector = match self.bundle.scaler() {
            Some(scaler) => scaler.transform(&vector)?,
            None => vector,
        };

        let model = self.bundle.model();
        if vector.len() != model.n_features() {
            return Err(PipelineError::schema(format!(
                "model {:?} expects {} features but the assembled vector has {}",
                model.name(),
                model.n_features(),
                vector.len()
            )));
        }

        let features: Vec<f32> = vector.iter().map(|&v| v as f32).collect();
        let model_output = model.predict(&features)?;

        if !model_output.is_finite() {
            return Err(PipelineError::Inference {
                detail: format!("model produced a non-finite output: {model_output}"),
            });
        }

        debug!(
            request_id = %request.request_id,
            model_output,
            "Prediction produced"
        );

        Ok(Prediction { model_output })
    }

    /// Assemble the feature vector in the bundle's column order, encoding
    /// categorical fields along the way. The order is part of the bundle's
    /// contract; it is never re-derived or reordered here.
    fn assemble(&self, request: &PredictionRequest) -> Result<Vec<f64>, PipelineError> {
        let columns = self.bundle.feature_columns();
        let mut vector = Vec::with_capacity(columns.len());

        for column in columns {
            let value = request.fields.get(column).ok_or_else(|| {
                PipelineError::schema(format!("request is missing field {column:?}"))
            })?;

            let encoded = match self.bundle.encoder(column) {
                Some(encoder) => match value {
                    FieldValue::Text(text) => {
                        encoder
                            .encode(text)
                            .ok_or_else(|| PipelineError::UnknownCategory {
                                field: column.clone(),
                                value: text.clone(),
                                known: encoder.classes().to_vec(),
                            })? as f64
                    }
                    FieldValue::Number(_) => {
                        return Err(PipelineError::schema(format!(
                            "field {column:?} is categorical but a number was supplied"
                        )))
                    }
                },
                None => match value {
                    FieldValue::Number(number) => *number,
                    FieldValue::Text(_) => {
                        return Err(PipelineError::schema(format!(
                            "field {column:?} is numeric but text was supplied"
                        )))
                    }
                },
            };

            vector.push(encoded);
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{LabelEncoder, Predictor, StandardScaler};
    use std::collections::HashMap;

    struct SummingModel {
        n_features: usize,
    }

    impl Predictor for SummingModel {
        fn predict(&self, features: &[f32]) -> Result<f64, PipelineError> {
            Ok(features.iter().map(|&f| f as f64).sum())
        }
        fn n_features(&self) -> usize {
            self.n_features
        }
        fn name(&self) -> &str {
            "summing"
        }
    }

    fn reference_columns() -> Vec<String> {
        [
            "Age",
            "Gender",
            "Education Level",
            "Job Title",
            "Years of Experience",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn reference_encoders() -> HashMap<String, LabelEncoder> {
        let mut encoders = HashMap::new();
        encoders.insert(
            "Gender".to_string(),
            LabelEncoder::new(vec!["Female".to_string(), "Male".to_string()]),
        );
        encoders.insert(
            "Education Level".to_string(),
            LabelEncoder::new(vec![
                "Bachelor's".to_string(),
                "Master's".to_string(),
                "PhD".to_string(),
            ]),
        );
        encoders.insert(
            "Job Title".to_string(),
            LabelEncoder::new(vec![
                "Analyst".to_string(),
                "Developer".to_string(),
                "Director".to_string(),
                "Manager".to_string(),
            ]),
        );
        encoders
    }

    fn pipeline(scaler: Option<StandardScaler>) -> InferencePipeline {
        let bundle = ModelBundle::from_parts(
            reference_columns(),
            reference_encoders(),
            scaler,
            Box::new(SummingModel { n_features: 5 }),
        )
        .unwrap();
        InferencePipeline::new(Arc::new(bundle))
    }

    fn reference_request() -> PredictionRequest {
        PredictionRequest::new("req_001")
            .with_field("Age", 30.0)
            .with_field("Gender", "Male")
            .with_field("Education Level", "Bachelor's")
            .with_field("Job Title", "Manager")
            .with_field("Years of Experience", 5.0)
    }

    #[test]
    fn test_predict_sums_encoded_vector() {
        // Male -> 1, Bachelor's -> 0, Manager -> 3, so 30+1+0+3+5 = 39.
        let prediction = pipeline(None).predict(&reference_request()).unwrap();
        assert_eq!(prediction.model_output, 39.0);
        assert_eq!(prediction.display_value(1.0), 39.0);
        assert_eq!(prediction.display_value(12.0), 468.0);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let pipeline = pipeline(None);
        let request = reference_request();
        let first = pipeline.assemble(&request).unwrap();
        let second = pipeline.assemble(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec![30.0, 1.0, 0.0, 3.0, 5.0]);
    }

    #[test]
    fn test_unknown_category_fails() {
        let request = reference_request().with_field("Gender", "Nonbinary");
        let err = pipeline(None).predict(&request).unwrap_err();
        match err {
            PipelineError::UnknownCategory { field, value, known } => {
                assert_eq!(field, "Gender");
                assert_eq!(value, "Nonbinary");
                assert_eq!(known, vec!["Female".to_string(), "Male".to_string()]);
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_schema_mismatch() {
        let mut request = reference_request();
        request.fields.remove("Job Title");
        let err = pipeline(None).predict(&request).unwrap_err();
        assert_eq!(err.kind(), "schema_mismatch");
        assert!(err.to_string().contains("Job Title"));
    }

    #[test]
    fn test_wrong_typed_field_is_schema_mismatch() {
        let request = reference_request().with_field("Age", "thirty");
        let err = pipeline(None).predict(&request).unwrap_err();
        assert_eq!(err.kind(), "schema_mismatch");
        assert!(err.to_string().contains("Age"));

        let request = reference_request().with_field("Gender", 1.0);
        let err = pipeline(None).predict(&request).unwrap_err();
        assert_eq!(err.kind(), "schema_mismatch");
    }

    #[test]
    fn test_scaler_applied_to_full_vector() {
        // Identity scale, mean shifts every column by 1: sum drops by 5.
        let scaler = StandardScaler::new(vec![1.0; 5], vec![1.0; 5]);
        let prediction = pipeline(Some(scaler)).predict(&reference_request()).unwrap();
        assert_eq!(prediction.model_output, 34.0);
    }

    #[test]
    fn test_width_mismatch_against_model() {
        let bundle = ModelBundle::from_parts(
            reference_columns(),
            reference_encoders(),
            None,
            Box::new(SummingModel { n_features: 7 }),
        )
        .unwrap();
        let pipeline = InferencePipeline::new(Arc::new(bundle));

        let err = pipeline.predict(&reference_request()).unwrap_err();
        assert_eq!(err.kind(), "schema_mismatch");
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn test_non_finite_output_is_inference_error() {
        struct NanModel;
        impl Predictor for NanModel {
            fn predict(&self, _: &[f32]) -> Result<f64, PipelineError> {
                Ok(f64::NAN)
            }
            fn n_features(&self) -> usize {
                5
            }
            fn name(&self) -> &str {
                "nan"
            }
        }

        let bundle = ModelBundle::from_parts(
            reference_columns(),
            reference_encoders(),
            None,
            Box::new(NanModel),
        )
        .unwrap();
        let pipeline = InferencePipeline::new(Arc::new(bundle));

        let err = pipeline.predict(&reference_request()).unwrap_err();
        assert_eq!(err.kind(), "inference");
    }
}
