//! Typed failure conditions for the inference pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure conditions surfaced by bundle loading and prediction.
///
/// Every variant is deterministic given the same inputs, so none of them
/// is worth retrying without changing the request or the artifact.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The bundle artifact is missing, unreadable, or structurally invalid.
    /// Fatal to the process: no predictions may be served afterwards.
    #[error("failed to load model bundle from {}: {reason}", path.display())]
    BundleLoad { path: PathBuf, reason: String },

    /// A categorical value outside the encoder's fitted set was offered.
    #[error("unknown category {value:?} for field {field:?} (known: {known:?})")]
    UnknownCategory {
        field: String,
        value: String,
        known: Vec<String>,
    },

    /// The request does not match the bundle's feature schema: a field is
    /// missing, has the wrong type, or the assembled vector has the wrong
    /// width. Indicates a caller/bundle version mismatch.
    #[error("feature schema mismatch: {detail}")]
    SchemaMismatch { detail: String },

    /// The model itself failed to evaluate, or produced a non-finite value.
    #[error("model evaluation failed: {detail}")]
    Inference { detail: String },
}

impl PipelineError {
    pub fn schema(detail: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            detail: detail.into(),
        }
    }

    /// Stable machine-readable discriminant, used in reply payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BundleLoad { .. } => "bundle_load",
            Self::UnknownCategory { .. } => "unknown_category",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::Inference { .. } => "inference",
        }
    }
}
