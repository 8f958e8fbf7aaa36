//! Message types exchanged with the input and display surfaces

pub mod estimate;
pub mod request;

pub use estimate::{PredictionFailure, PredictionReply, SalaryEstimate};
pub use request::{FieldValue, PredictionRequest};
