//! Regression model capability and its ONNX Runtime implementation.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

/// The predict capability the pipeline depends on.
///
/// The pipeline is polymorphic over whatever regression algorithm was
/// trained; it only assumes a fitted model that maps one feature vector to
/// one number.
pub trait Predictor: Send + Sync {
    /// Evaluate the model on one feature vector.
    fn predict(&self, features: &[f32]) -> Result<f64, PipelineError>;

    /// The feature-vector width the model was fit on.
    fn n_features(&self) -> usize;

    /// Model name for logging.
    fn name(&self) -> &str;
}

/// A regression model backed by an ONNX Runtime session.
pub struct OnnxModel {
    name: String,
    /// Session needs `&mut` to run, so it sits behind a lock
    session: RwLock<Session>,
    input_name: String,
    n_features: usize,
}

impl OnnxModel {
    /// Load an ONNX model from file.
    ///
    /// `n_features` comes from the bundle manifest; it is the training-time
    /// column count and is enforced before every evaluation.
    pub fn load<P: AsRef<Path>>(
        path: P,
        name: &str,
        n_features: usize,
        intra_threads: usize,
    ) -> Result<Self> {
        let path = path.as_ref();

        ort::init().commit()?;

        info!(
            model = %name,
            path = %path.display(),
            threads = intra_threads,
            "Loading ONNX model"
        );

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        info!(model = %name, input = %input_name, "Model loaded successfully");

        Ok(Self {
            name: name.to_string(),
            session: RwLock::new(session),
            input_name,
            n_features,
        })
    }
}

impl Predictor for OnnxModel {
    fn predict(&self, features: &[f32]) -> Result<f64, PipelineError> {
        use ort::value::Tensor;

        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, features.to_vec())).map_err(|e| PipelineError::Inference {
                detail: format!("failed to create input tensor: {e}"),
            })?;

        let mut session = self.session.write().map_err(|e| PipelineError::Inference {
            detail: format!("session lock poisoned: {e}"),
        })?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| PipelineError::Inference {
                detail: format!("session run failed: {e}"),
            })?;

        // Regression exports emit one tensor of shape [1] or [1, 1]; take
        // the first output that extracts as f32.
        for (output_name, output) in outputs.iter() {
            if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
                let value = data.first().copied().ok_or_else(|| PipelineError::Inference {
                    detail: format!("output {output_name:?} is an empty tensor"),
                })?;
                debug!(model = %self.name, output = %output_name, value, "Extracted model output");
                return Ok(value as f64);
            }
        }

        Err(PipelineError::Inference {
            detail: "no f32 tensor output found in model outputs".to_string(),
        })
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        &self.name
    }
}
