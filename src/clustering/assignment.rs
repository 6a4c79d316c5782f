use nalgebra::DVector;
use thiserror::Error;

use super::distance::{euclidean_distance, DistanceError};
use super::observation::{Centroid, Dataset};

/// Index of the closest centroid. Ties go to the lowest index: only a
/// strictly smaller distance replaces the current best.
pub fn nearest_centroid(features: &DVector<f64>, centroids: &[Centroid]) -> Result<usize, AssignmentError> {
    if centroids.is_empty() {
        return Err(AssignmentError::NoCentroids);
    }

    let mut best_cluster = 0;
    let mut min_distance = f64::INFINITY;

    for (cluster, centroid) in centroids.iter().enumerate() {
        let distance = euclidean_distance(features, centroid).map_err(|err| AssignmentError::Distance { err })?;

        // First pass guarantees a pick even if every distance is NaN
        if cluster == 0 || distance < min_distance {
            min_distance = distance;
            best_cluster = cluster;
        }
    }

    Ok(best_cluster)
}

/// Moves every observation to its nearest centroid.
///
/// Returns true if at least one observation changed cluster. This is the
/// convergence signal of the k-means loop.
pub fn assign(dataset: &mut Dataset, centroids: &[Centroid]) -> Result<bool, AssignmentError> {
    let mut changed = false;

    for observation in dataset.iter_mut() {
        let best_cluster = nearest_centroid(&observation.features, centroids)?;
        changed |= observation.set_cluster_index(best_cluster);
    }

    Ok(changed)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignmentError {
    #[error("no centroids to assign to")]
    NoCentroids,
    #[error("distance computation failed: {err}")]
    Distance { err: DistanceError },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(values: &[f64]) -> DVector<f64> {
        DVector::from_vec(values.to_vec())
    }

    fn four_points() -> Dataset {
        Dataset::from_records(
            vec![
                ("A".to_string(), vec![0.0, 0.0]),
                ("B".to_string(), vec![0.0, 1.0]),
                ("C".to_string(), vec![10.0, 10.0]),
                ("D".to_string(), vec![10.0, 11.0]),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_centroid() {
        let centroids = vec![vector(&[0.0, 0.0]), vector(&[10.0, 10.0])];

        assert_eq!(nearest_centroid(&vector(&[1.0, 1.0]), &centroids).unwrap(), 0);
        assert_eq!(nearest_centroid(&vector(&[9.0, 8.0]), &centroids).unwrap(), 1);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let centroids = vec![vector(&[-1.0]), vector(&[1.0]), vector(&[-1.0])];

        assert_eq!(nearest_centroid(&vector(&[0.0]), &centroids).unwrap(), 0);

        let centroids = vec![vector(&[5.0]), vector(&[1.0]), vector(&[-1.0])];
        assert_eq!(nearest_centroid(&vector(&[0.0]), &centroids).unwrap(), 1);
    }

    #[test]
    fn test_no_centroids() {
        assert_eq!(nearest_centroid(&vector(&[0.0]), &[]), Err(AssignmentError::NoCentroids));
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let centroids = vec![vector(&[0.0, 0.0, 0.0])];

        let result = nearest_centroid(&vector(&[0.0, 0.0]), &centroids);

        assert_eq!(
            result,
            Err(AssignmentError::Distance { err: DistanceError::DimensionMismatch { left: 2, right: 3 } })
        );
    }

    #[test]
    fn test_assign_reports_changes() {
        let mut dataset = four_points();
        let centroids = vec![vector(&[0.0, 0.0]), vector(&[10.0, 10.0])];

        assert!(assign(&mut dataset, &centroids).unwrap());

        let indices: Vec<Option<usize>> = dataset.iter().map(|observation| observation.cluster_index()).collect();
        assert_eq!(indices, vec![Some(0), Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn test_assign_twice_with_same_centroids_changes_nothing() {
        let mut dataset = four_points();
        let centroids = vec![vector(&[0.0, 0.0]), vector(&[0.0, 1.0])];

        assign(&mut dataset, &centroids).unwrap();

        assert!(!assign(&mut dataset, &centroids).unwrap());
    }
}
