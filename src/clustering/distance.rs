use nalgebra::DVector;
use thiserror::Error;

/// Euclidean distance between two feature vectors of equal length.
pub fn euclidean_distance(a: &DVector<f64>, b: &DVector<f64>) -> Result<f64, DistanceError> {
    if a.len() != b.len() {
        return Err(DistanceError::DimensionMismatch { left: a.len(), right: b.len() });
    }

    Ok((a - b).norm())
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    #[error("cannot compare vectors of length {left} and {right}")]
    DimensionMismatch { left: usize, right: usize },
}
