//! The k-means driver.
//!
//! A run seeds `k` centroids, assigns every observation once, then
//! alternates centroid updates and assignment passes until a pass changes
//! nothing or the iteration cap is reached. Hitting the cap is a normal
//! outcome, not an error.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::assignment::{assign, AssignmentError};
use super::centroid_init::InitializerError;
use super::centroid_update::{update, CentroidUpdateError};
use super::kmeans_settings::{KMeansSettings, LabelOrigin};
use super::observation::{Centroid, Dataset, ObservationError};
use super::preprocessing::{preprocess, PreprocessingError};
use super::verbosity::Yapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KMeansTermination {
    Converged,           // An assignment pass changed nothing
    IterationCapReached, // max_iterations passes all changed something
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansOutcome {
    pub termination: KMeansTermination,
    pub iterations: usize, // Loop passes that moved at least one observation
    pub centroids: Vec<Centroid>,
}

pub struct KMeans<R: Rng = StdRng> {
    settings: KMeansSettings,
    rng: R,
}

impl KMeans<StdRng> {
    /// Builds a driver whose random source is seeded from `settings.seed`,
    /// or from the OS when no seed is given.
    pub fn new(settings: KMeansSettings) -> Result<Self, KMeansError> {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self::with_rng(settings, rng)
    }
}

impl<R: Rng> KMeans<R> {
    pub fn with_rng(settings: KMeansSettings, rng: R) -> Result<Self, KMeansError> {
        settings
            .validate()
            .map_err(|err| KMeansError::InvalidConfiguration { reason: err.to_string() })?;

        Ok(Self {
            settings: settings.handle_nones(),
            rng,
        })
    }

    pub fn settings(&self) -> &KMeansSettings {
        &self.settings
    }

    fn check_dataset(&self, dataset: &Dataset) -> Result<(), KMeansError> {
        if dataset.is_empty() {
            return Err(KMeansError::EmptyDataset);
        }

        let expected = self.settings.num_features();
        if dataset.num_features() != expected {
            return Err(KMeansError::DimensionMismatch { expected, found: dataset.num_features() });
        }

        // Seed positions are checked before any work starts
        self.settings
            .init_method()
            .check_validity(dataset.len(), self.settings.k)
            .map_err(|err| KMeansError::InvalidConfiguration { reason: err.to_string() })
    }

    /// Clusters `dataset` in place, leaving every observation with a cluster
    /// index in `0..k`.
    ///
    /// The dataset is expected to be preprocessed already (see
    /// [`cluster_records`] for the full pipeline).
    pub fn run(&mut self, dataset: &mut Dataset) -> Result<KMeansOutcome, KMeansError> {
        self.check_dataset(dataset)?;

        let k = self.settings.k;
        let max_iterations = self.settings.max_iterations();
        let init_method = self.settings.init_method();
        let empty_cluster_policy = self.settings.empty_cluster_policy();

        let mut yapper = Yapper::new(
            k,
            dataset.len(),
            dataset.num_features(),
            max_iterations,
            &init_method,
            empty_cluster_policy,
            self.settings.yap_level(),
        );
        yapper.startup_yap();

        info!(k, observations = dataset.len(), max_iterations, init_method = %init_method, "starting k-means");

        let mut centroids = init_method
            .initial_centroids(dataset, k, &mut self.rng)
            .map_err(|err| KMeansError::Initializer { err })?;

        // Establishes the first assignment; its change flag means nothing
        assign(dataset, &centroids).map_err(|err| KMeansError::Assignment { err })?;

        let mut termination = KMeansTermination::IterationCapReached;
        let mut iterations = 0;

        for iteration in 0..max_iterations {
            centroids = update(dataset, k, &centroids, empty_cluster_policy)
                .map_err(|err| KMeansError::CentroidUpdate { err })?;

            let changed = assign(dataset, &centroids).map_err(|err| KMeansError::Assignment { err })?;

            debug!(iteration, changed, "finished assignment pass");
            yapper.iteration_yap(iteration + 1, &cluster_sizes(dataset, k));

            if !changed {
                termination = KMeansTermination::Converged;
                break;
            }

            iterations += 1;
        }

        match termination {
            KMeansTermination::Converged => info!(iterations, "k-means converged"),
            KMeansTermination::IterationCapReached => {
                warn!(iterations, "k-means stopped at the iteration cap without converging")
            }
        }

        let outcome = KMeansOutcome { termination, iterations, centroids };
        yapper.finish_yap(&outcome);

        Ok(outcome)
    }
}

/// `(identifier, label)` pairs in dataset order.
pub fn labels(dataset: &Dataset, origin: LabelOrigin) -> Result<Vec<(String, usize)>, KMeansError> {
    dataset
        .iter()
        .enumerate()
        .map(|(position, observation)| {
            observation
                .cluster_index()
                .map(|cluster_index| (observation.identifier.clone(), origin.label(cluster_index)))
                .ok_or(KMeansError::UnassignedObservation { position })
        })
        .collect()
}

/// Number of observations currently in each cluster.
pub fn cluster_sizes(dataset: &Dataset, k: usize) -> Vec<usize> {
    let mut sizes = vec![0; k];

    for cluster_index in dataset.iter().filter_map(|observation| observation.cluster_index()) {
        if cluster_index < k {
            sizes[cluster_index] += 1;
        }
    }

    sizes
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringReport {
    pub labels: Vec<(String, usize)>,
    pub iterations: usize,
    pub termination: KMeansTermination,
    pub degenerate_features: Vec<usize>,
}

/// Full pipeline: records in, labels out.
///
/// Builds the dataset, imputes and normalizes it, runs k-means and returns
/// the labels in input order.
pub fn cluster_records(records: Vec<(String, Vec<f64>)>, settings: KMeansSettings) -> Result<ClusteringReport, KMeansError> {
    // Configuration errors surface before any data is touched
    let mut kmeans = KMeans::new(settings)?;

    let mut dataset = Dataset::from_records(records, kmeans.settings().num_features())
        .map_err(|err| KMeansError::Observation { err })?;
    kmeans.check_dataset(&dataset)?;

    let degenerate_features = preprocess(&mut dataset, kmeans.settings().degenerate_range_policy())
        .map_err(|err| KMeansError::Preprocessing { err })?;

    let outcome = kmeans.run(&mut dataset)?;
    let labels = labels(&dataset, kmeans.settings().label_origin())?;

    Ok(ClusteringReport {
        labels,
        iterations: outcome.iterations,
        termination: outcome.termination,
        degenerate_features,
    })
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KMeansError {
    #[error("the dataset has no observations")]
    EmptyDataset,
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
    #[error("dataset has {found} features per observation, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("observation {position} has no cluster")]
    UnassignedObservation { position: usize },
    #[error("{err}")]
    Observation { err: ObservationError },
    #[error("{err}")]
    Preprocessing { err: PreprocessingError },
    #[error("{err}")]
    Initializer { err: InitializerError },
    #[error("{err}")]
    Assignment { err: AssignmentError },
    #[error("{err}")]
    CentroidUpdate { err: CentroidUpdateError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::centroid_init::CentroidInitMethod;
    use crate::clustering::verbosity::YapLevel;

    fn quiet_settings(k: usize, num_features: usize) -> KMeansSettings {
        let mut settings = KMeansSettings::new(k);
        settings.num_features = Some(num_features);
        settings.seed = Some(0);
        settings.yap_level = Some(YapLevel::None);
        settings
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
    fn test_new_rejects_invalid_settings() {
        let result = KMeans::new(quiet_settings(0, 2));

        assert!(matches!(result, Err(KMeansError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_run_rejects_empty_dataset() {
        let mut kmeans = KMeans::new(quiet_settings(1, 2)).unwrap();
        let mut dataset = Dataset::new(2);

        assert_eq!(kmeans.run(&mut dataset), Err(KMeansError::EmptyDataset));
    }

    #[test]
    fn test_run_rejects_k_larger_than_dataset() {
        let mut kmeans = KMeans::new(quiet_settings(5, 2)).unwrap();
        let mut dataset = four_points();

        assert!(matches!(kmeans.run(&mut dataset), Err(KMeansError::InvalidConfiguration { .. })));
        // Nothing was assigned
        assert!(dataset.iter().all(|observation| observation.cluster_index().is_none()));
    }

    #[test]
    fn test_run_rejects_bad_seed_positions_before_assigning() {
        let mut settings = quiet_settings(2, 2);
        settings.init_method = Some(CentroidInitMethod::Deterministic { offset: Some(3) });
        let mut kmeans = KMeans::new(settings).unwrap();
        let mut dataset = four_points();

        assert!(matches!(kmeans.run(&mut dataset), Err(KMeansError::InvalidConfiguration { .. })));
        assert!(dataset.iter().all(|observation| observation.cluster_index().is_none()));
    }

    #[test]
    fn test_run_rejects_feature_count_mismatch() {
        let mut kmeans = KMeans::new(quiet_settings(2, 3)).unwrap();
        let mut dataset = four_points();

        assert_eq!(kmeans.run(&mut dataset), Err(KMeansError::DimensionMismatch { expected: 3, found: 2 }));
    }

    #[test]
    fn test_run_separates_two_groups() {
        let mut settings = quiet_settings(2, 2);
        settings.init_method = Some(CentroidInitMethod::Positions { positions: vec![0, 2] });
        let mut kmeans = KMeans::new(settings).unwrap();
        let mut dataset = four_points();

        let outcome = kmeans.run(&mut dataset).unwrap();

        assert_eq!(outcome.termination, KMeansTermination::Converged);
        assert!(outcome.iterations <= 2);

        let labels = labels(&dataset, LabelOrigin::ZeroBased).unwrap();
        assert_eq!(
            labels,
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 0),
                ("C".to_string(), 1),
                ("D".to_string(), 1),
            ]
        );
        assert_eq!(outcome.centroids[0], Centroid::from_vec(vec![0.0, 0.5]));
        assert_eq!(outcome.centroids[1], Centroid::from_vec(vec![10.0, 10.5]));
    }

    #[test]
    fn test_iteration_cap_is_not_an_error() {
        // Seeds A and B put C and D with B first, so the first loop pass
        // moves B and a one-iteration cap is hit
        let mut settings = quiet_settings(2, 2);
        settings.init_method = Some(CentroidInitMethod::Deterministic { offset: Some(0) });
        settings.max_iterations = Some(1);
        let mut kmeans = KMeans::new(settings).unwrap();
        let mut dataset = four_points();

        let outcome = kmeans.run(&mut dataset).unwrap();

        assert_eq!(outcome.termination, KMeansTermination::IterationCapReached);
        assert_eq!(outcome.iterations, 1);
        assert!(dataset.is_fully_assigned());
    }

    #[test]
    fn test_deterministic_first_k_still_converges() {
        let mut settings = quiet_settings(2, 2);
        settings.init_method = Some(CentroidInitMethod::Deterministic { offset: None });
        let mut kmeans = KMeans::new(settings).unwrap();
        let mut dataset = four_points();

        let outcome = kmeans.run(&mut dataset).unwrap();

        assert_eq!(outcome.termination, KMeansTermination::Converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(cluster_sizes(&dataset, 2), vec![2, 2]);
    }

    #[test]
    fn test_labels_one_based() {
        let mut settings = quiet_settings(2, 2);
        settings.init_method = Some(CentroidInitMethod::Positions { positions: vec![0, 2] });
        let mut kmeans = KMeans::new(settings).unwrap();
        let mut dataset = four_points();
        kmeans.run(&mut dataset).unwrap();

        let labels = labels(&dataset, LabelOrigin::OneBased).unwrap();
        let label_values: Vec<usize> = labels.iter().map(|(_, label)| *label).collect();

        assert_eq!(label_values, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_labels_before_run_fails() {
        let dataset = four_points();

        assert_eq!(
            labels(&dataset, LabelOrigin::OneBased),
            Err(KMeansError::UnassignedObservation { position: 0 })
        );
    }

    #[test]
    fn test_cluster_records_pipeline() {
        let records = vec![
            ("day1".to_string(), vec![1.0, f64::NAN, 7.0]),
            ("day2".to_string(), vec![1.2, 5.0, 7.0]),
            ("day3".to_string(), vec![9.0, 95.0, 7.0]),
            ("day4".to_string(), vec![9.1, 100.0, 7.0]),
        ];
        let mut settings = quiet_settings(2, 3);
        settings.init_method = Some(CentroidInitMethod::Positions { positions: vec![1, 3] });

        let report = cluster_records(records, settings).unwrap();

        assert_eq!(report.termination, KMeansTermination::Converged);
        assert_eq!(report.degenerate_features, vec![2]);
        let label_values: Vec<usize> = report.labels.iter().map(|(_, label)| *label).collect();
        assert_eq!(label_values, vec![1, 1, 2, 2]);
        assert_eq!(report.labels[0].0, "day1");
    }

    #[test]
    fn test_cluster_records_empty_input() {
        let result = cluster_records(Vec::new(), quiet_settings(1, 3));

        assert_eq!(result, Err(KMeansError::EmptyDataset));
    }

    #[test]
    fn test_cluster_records_rejects_short_record() {
        let records = vec![("day1".to_string(), vec![1.0, 2.0])];

        let result = cluster_records(records, quiet_settings(1, 3));

        assert!(matches!(result, Err(KMeansError::Observation { .. })));
    }

    #[test]
    fn test_cluster_records_checks_seed_positions_before_preprocessing() {
        // The second feature is fully missing, so preprocessing would fail
        let records = vec![
            ("day1".to_string(), vec![1.0, f64::NAN]),
            ("day2".to_string(), vec![2.0, f64::NAN]),
        ];
        let mut settings = quiet_settings(2, 2);
        settings.init_method = Some(CentroidInitMethod::Positions { positions: vec![0, 5] });

        let result = cluster_records(records, settings);

        assert!(matches!(result, Err(KMeansError::InvalidConfiguration { .. })));
    }
}
