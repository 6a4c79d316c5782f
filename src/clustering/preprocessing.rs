use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use super::observation::Dataset;

/// What to do with a feature whose minimum equals its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateRangePolicy {
    MapToZero,    // Every value of the feature becomes 0.0
    Skip,         // Leave the feature as it is
    PropagateNan, // Divide anyway, the feature becomes NaN
}

impl DegenerateRangePolicy {
    pub fn default() -> Self {
        Self::MapToZero
    }
}

impl fmt::Display for DegenerateRangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateRangePolicy::MapToZero => write!(f, "Map to zero"),
            DegenerateRangePolicy::Skip => write!(f, "Skip"),
            DegenerateRangePolicy::PropagateNan => write!(f, "Propagate NaN"),
        }
    }
}

/// Replaces every missing value (NaN or infinite) with the mean of the
/// finite values of the same feature.
///
/// Does nothing on an empty dataset. Fails if some feature has no present
/// value at all, since its mean is undefined.
pub fn impute_missing(dataset: &mut Dataset) -> Result<(), PreprocessingError> {
    if dataset.is_empty() {
        return Ok(());
    }

    let num_features = dataset.num_features();
    let mut feature_sums = vec![0.0; num_features];
    let mut feature_counts = vec![0_usize; num_features];

    // First pass: accumulate what is there
    for observation in dataset.iter() {
        for (i, value) in observation.features.iter().enumerate() {
            if value.is_finite() {
                feature_sums[i] += value;
                feature_counts[i] += 1;
            }
        }
    }

    let mut feature_means = Vec::with_capacity(num_features);
    for (feature, (sum, count)) in feature_sums.iter().zip(&feature_counts).enumerate() {
        if *count == 0 {
            return Err(PreprocessingError::FeatureFullyMissing { feature });
        }
        feature_means.push(sum / *count as f64);
    }

    // Second pass: fill the holes
    let mut num_imputed = 0_usize;
    for observation in dataset.iter_mut() {
        for (value, mean) in observation.features.iter_mut().zip(&feature_means) {
            if !value.is_finite() {
                *value = *mean;
                num_imputed += 1;
            }
        }
    }

    debug!(num_imputed, "imputed missing feature values");

    Ok(())
}

/// Min-max scales every feature to [0, 1].
///
/// Must run after [`impute_missing`], otherwise NaNs poison the ranges.
/// Returns the indices of the features whose range was degenerate; those
/// are handled according to `policy`.
pub fn normalize(dataset: &mut Dataset, policy: DegenerateRangePolicy) -> Vec<usize> {
    let num_features = dataset.num_features();
    let mut feature_min_values = vec![f64::MAX; num_features];
    let mut feature_max_values = vec![f64::MIN; num_features];

    for observation in dataset.iter() {
        for (i, &value) in observation.features.iter().enumerate() {
            if value < feature_min_values[i] {
                feature_min_values[i] = value;
            }
            if value > feature_max_values[i] {
                feature_max_values[i] = value;
            }
        }
    }

    let degenerate: Vec<usize> = (0..num_features)
        .filter(|&i| feature_max_values[i] == feature_min_values[i])
        .collect();

    for &feature in &degenerate {
        warn!(feature, value = feature_min_values[feature], %policy, "feature has a degenerate range");
    }

    // Halved bounds keep max - min finite for values near f64::MAX
    for observation in dataset.iter_mut() {
        for (i, value) in observation.features.iter_mut().enumerate() {
            let half_min = feature_min_values[i] / 2.0;
            let half_range = feature_max_values[i] / 2.0 - half_min;

            if half_range == 0.0 {
                match policy {
                    DegenerateRangePolicy::MapToZero => *value = 0.0,
                    DegenerateRangePolicy::Skip => {}
                    DegenerateRangePolicy::PropagateNan => *value = (*value / 2.0 - half_min) / half_range,
                }
                continue;
            }

            *value = (*value / 2.0 - half_min) / half_range;
        }
    }

    degenerate
}

/// Imputation followed by normalization, in the only order that makes sense.
pub fn preprocess(dataset: &mut Dataset, policy: DegenerateRangePolicy) -> Result<Vec<usize>, PreprocessingError> {
    impute_missing(dataset)?;
    Ok(normalize(dataset, policy))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessingError {
    #[error("feature {feature} has no value in any observation")]
    FeatureFullyMissing { feature: usize },
}
