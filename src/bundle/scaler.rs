//! Fitted numeric scaler.

use crate::error::PipelineError;
use serde::Deserialize;

/// A fitted standard scaler: subtract the per-column mean, divide by the
/// per-column scale.
///
/// The scaler was fit on the full post-encoding feature vector, so it is
/// applied to the whole assembled vector, never to a numeric sub-slice.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Number of columns the scaler was fit on.
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// True when the mean and scale vectors disagree in length; such a
    /// scaler can never be applied and must be rejected at load time.
    pub fn is_malformed(&self) -> bool {
        self.mean.len() != self.scale.len()
    }

    /// Apply the affine transform to a full feature vector.
    pub fn transform(&self, vector: &[f64]) -> Result<Vec<f64>, PipelineError> {
        if vector.len() != self.mean.len() {
            return Err(PipelineError::schema(format!(
                "scaler was fit on {} columns but the assembled vector has {}",
                self.mean.len(),
                vector.len()
            )));
        }

        Ok(vector
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&mean, &scale))| (x - mean) / scale)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 1.0]);
        let out = scaler.transform(&[14.0, 3.0]).unwrap();
        assert_eq!(out, vec![2.0, 3.0]);
    }

    #[test]
    fn test_transform_is_pure() {
        let scaler = StandardScaler::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 4.0]);
        let input = [5.0, 6.0, 7.0];
        let first = scaler.transform(&input).unwrap();
        let second = scaler.transform(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_width_mismatch_is_schema_error() {
        let scaler = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]);
        let err = scaler.transform(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), "schema_mismatch");
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('3'));
    }
}
