use std::fmt;

use nalgebra::DVector;
use thiserror::Error;

use super::observation::{Centroid, Dataset};

/// What an update does to a cluster that lost all of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    ResetToOrigin,  // All-zero centroid
    RetainPrevious, // Keep the centroid from the previous step
}

impl EmptyClusterPolicy {
    pub fn default() -> Self {
        Self::RetainPrevious
    }
}

impl fmt::Display for EmptyClusterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyClusterPolicy::ResetToOrigin => write!(f, "Reset to origin"),
            EmptyClusterPolicy::RetainPrevious => write!(f, "Retain previous"),
        }
    }
}

/// Recomputes every centroid as the mean of the observations assigned to it.
///
/// Returns a fresh set, `previous` is only read to fill empty clusters when
/// the policy asks for it. Accumulation follows dataset order, so the result
/// is deterministic for a given assignment.
pub fn update(
    dataset: &Dataset,
    k: usize,
    previous: &[Centroid],
    policy: EmptyClusterPolicy,
) -> Result<Vec<Centroid>, CentroidUpdateError> {
    if k == 0 {
        return Err(CentroidUpdateError::InvalidConfiguration);
    }
    if policy == EmptyClusterPolicy::RetainPrevious && previous.len() != k {
        return Err(CentroidUpdateError::PreviousCentroidCount { expected: k, found: previous.len() });
    }

    let num_features = dataset.num_features();
    let mut new_centroids: Vec<Centroid> = vec![DVector::zeros(num_features); k];
    let mut num_entries_in_cluster = vec![0_usize; k];

    for (position, observation) in dataset.iter().enumerate() {
        let cluster_index = observation
            .cluster_index()
            .ok_or(CentroidUpdateError::UnassignedObservation { position })?;

        if cluster_index >= k {
            return Err(CentroidUpdateError::ClusterIndexOutOfRange { position, cluster_index, k });
        }

        new_centroids[cluster_index] += &observation.features;
        num_entries_in_cluster[cluster_index] += 1;
    }

    for (cluster, centroid) in new_centroids.iter_mut().enumerate() {
        let count = num_entries_in_cluster[cluster];

        if count == 0 {
            if policy == EmptyClusterPolicy::RetainPrevious {
                *centroid = previous[cluster].clone();
            }
            continue;
        }

        *centroid /= count as f64;
    }

    Ok(new_centroids)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CentroidUpdateError {
    #[error("cannot update zero centroids")]
    InvalidConfiguration,
    #[error("observation {position} has not been assigned to a cluster")]
    UnassignedObservation { position: usize },
    #[error("observation {position} is in cluster {cluster_index}, but k = {k}")]
    ClusterIndexOutOfRange { position: usize, cluster_index: usize, k: usize },
    #[error("expected {expected} previous centroids, got {found}")]
    PreviousCentroidCount { expected: usize, found: usize },
}
