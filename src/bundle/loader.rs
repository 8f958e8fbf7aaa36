//! Model bundle artifact loading.
//!
//! A bundle is a directory holding `bundle.json` — the manifest with the
//! training-time feature column order, the fitted label encoders, and the
//! optional scaler — next to the serialized ONNX model the manifest points
//! at. The bundle is immutable after load.

use crate::bundle::encoder::LabelEncoder;
use crate::bundle::model::{OnnxModel, Predictor};
use crate::bundle::scaler::StandardScaler;
use crate::error::PipelineError;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Manifest file name inside a bundle directory.
pub const MANIFEST_FILE: &str = "bundle.json";

/// On-disk manifest. Missing `model`, `feature_columns`, or
/// `label_encoders` keys fail deserialization, which surfaces as a
/// `BundleLoad` error rather than a null model.
#[derive(Debug, Deserialize)]
struct BundleManifest {
    /// Path of the ONNX model file, relative to the bundle directory
    model: String,
    /// Training-time column order; part of the bundle's contract
    feature_columns: Vec<String>,
    /// Field name -> ordered fitted class list
    label_encoders: HashMap<String, LabelEncoder>,
    /// Optional fitted scaler over the full post-encoding vector
    #[serde(default)]
    scaler: Option<StandardScaler>,
}

/// The loaded, immutable model bundle: one fitted regression model plus
/// the encoders and optional scaler it was trained alongside.
pub struct ModelBundle {
    feature_columns: Vec<String>,
    encoders: HashMap<String, LabelEncoder>,
    scaler: Option<StandardScaler>,
    model: Box<dyn Predictor>,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("feature_columns", &self.feature_columns)
            .field("encoders", &self.encoders)
            .field("scaler", &self.scaler)
            .field("model", &self.model.name())
            .finish()
    }
}

impl ModelBundle {
    /// Load a bundle from a directory containing `bundle.json` and the
    /// ONNX model file the manifest names.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, PipelineError> {
        Self::load_with_threads(dir, 1)
    }

    /// Load a bundle, configuring the ONNX intra-op thread count.
    pub fn load_with_threads<P: AsRef<Path>>(
        dir: P,
        onnx_threads: usize,
    ) -> Result<Self, PipelineError> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);

        let bundle_err = |reason: String| PipelineError::BundleLoad {
            path: dir.to_path_buf(),
            reason,
        };

        let raw = std::fs::read_to_string(&manifest_path)
            .map_err(|e| bundle_err(format!("cannot read {}: {e}", manifest_path.display())))?;

        let manifest: BundleManifest = serde_json::from_str(&raw)
            .map_err(|e| bundle_err(format!("invalid manifest: {e}")))?;

        let model_path = dir.join(&manifest.model);
        let model = OnnxModel::load(
            &model_path,
            "regressor",
            manifest.feature_columns.len(),
            onnx_threads,
        )
        .map_err(|e| bundle_err(format!("cannot load model {}: {e:#}", model_path.display())))?;

        let bundle = Self::from_parts(
            manifest.feature_columns,
            manifest.label_encoders,
            manifest.scaler,
            Box::new(model),
        )
        .map_err(|e| bundle_err(e.to_string()))?;

        info!(
            path = %dir.display(),
            columns = bundle.feature_columns.len(),
            encoders = bundle.encoders.len(),
            scaler = bundle.scaler.is_some(),
            "Model bundle loaded"
        );

        Ok(bundle)
    }

    /// Assemble a bundle from already-constructed parts, validating the
    /// structural contract. This is also the seam tests use to supply stub
    /// predictors.
    pub fn from_parts(
        feature_columns: Vec<String>,
        encoders: HashMap<String, LabelEncoder>,
        scaler: Option<StandardScaler>,
        model: Box<dyn Predictor>,
    ) -> Result<Self, PipelineError> {
        if feature_columns.is_empty() {
            return Err(PipelineError::schema("bundle has no feature columns"));
        }

        for field in encoders.keys() {
            if !feature_columns.iter().any(|c| c == field) {
                return Err(PipelineError::schema(format!(
                    "encoder for {field:?} does not match any feature column"
                )));
            }
        }

        for (field, encoder) in &encoders {
            if encoder.is_empty() {
                return Err(PipelineError::schema(format!(
                    "encoder for {field:?} has an empty fitted set"
                )));
            }
        }

        if let Some(scaler) = &scaler {
            if scaler.is_malformed() {
                return Err(PipelineError::schema(
                    "scaler mean and scale vectors disagree in length",
                ));
            }
            if scaler.width() != feature_columns.len() {
                return Err(PipelineError::schema(format!(
                    "scaler was fit on {} columns but the bundle has {}",
                    scaler.width(),
                    feature_columns.len()
                )));
            }
        }

        Ok(Self {
            feature_columns,
            encoders,
            scaler,
            model,
        })
    }

    /// Training-time feature column order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Encoder for a field, if the field is categorical.
    pub fn encoder(&self, field: &str) -> Option<&LabelEncoder> {
        self.encoders.get(field)
    }

    /// All fitted encoders, keyed by field name. Input surfaces derive
    /// their selectable category lists from here.
    pub fn encoders(&self) -> &HashMap<String, LabelEncoder> {
        &self.encoders
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn model(&self) -> &dyn Predictor {
        self.model.as_ref()
    }
}

static CACHED_BUNDLE: OnceCell<Arc<ModelBundle>> = OnceCell::new();

/// Load the bundle at most once per process and reuse the handle.
///
/// Deserializing the artifact is the only non-trivial-cost operation in
/// the system; after the first successful call every caller gets the same
/// immutable bundle. A failed load is not cached, so a later call can
/// succeed once the artifact is in place.
pub fn load_cached<P: AsRef<Path>>(
    dir: P,
    onnx_threads: usize,
) -> Result<Arc<ModelBundle>, PipelineError> {
    CACHED_BUNDLE
        .get_or_try_init(|| ModelBundle::load_with_threads(dir, onnx_threads).map(Arc::new))
        .cloned()
}
