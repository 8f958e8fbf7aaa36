//! The immutable model bundle: fitted model, label encoders, optional scaler

pub mod encoder;
pub mod loader;
pub mod model;
pub mod scaler;

pub use encoder::LabelEncoder;
pub use loader::{load_cached, ModelBundle};
pub use model::{OnnxModel, Predictor};
pub use scaler::StandardScaler;
