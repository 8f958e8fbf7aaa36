//! Salary Prediction Pipeline Library
//!
//! A NATS-driven prediction service around a pre-trained regression model
//! bundle: fitted label encoders, an optional standard scaler, and an ONNX
//! model, applied in the exact preprocessing order the bundle was trained
//! under.

pub mod bundle;
pub mod config;
pub mod consumer;
pub mod error;
pub mod history;
pub mod metrics;
pub mod pipeline;
pub mod producer;
pub mod types;

pub use bundle::{LabelEncoder, ModelBundle, Predictor, StandardScaler};
pub use config::AppConfig;
pub use consumer::RequestConsumer;
pub use error::PipelineError;
pub use pipeline::InferencePipeline;
pub use producer::ReplyProducer;
pub use types::{PredictionReply, PredictionRequest, SalaryEstimate};
