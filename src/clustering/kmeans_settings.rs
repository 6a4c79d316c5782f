use std::fmt;

use thiserror::Error;

use super::centroid_init::CentroidInitMethod;
use super::centroid_update::EmptyClusterPolicy;
use super::observation::DEFAULT_NUM_FEATURES;
use super::preprocessing::DegenerateRangePolicy;
use super::verbosity::YapLevel;

pub const KMEANS_MAX_ITERS_DEFAULT: usize = 100;
pub const KMEANS_NUM_FEATURES_DEFAULT: usize = DEFAULT_NUM_FEATURES;

/// Whether emitted labels count clusters from 0 or from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrigin {
    ZeroBased,
    OneBased,
}

impl LabelOrigin {
    pub fn default() -> Self {
        Self::OneBased
    }

    pub fn label(&self, cluster_index: usize) -> usize {
        match self {
            LabelOrigin::ZeroBased => cluster_index,
            LabelOrigin::OneBased => cluster_index + 1,
        }
    }
}

impl fmt::Display for LabelOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelOrigin::ZeroBased => write!(f, "0-based"),
            LabelOrigin::OneBased => write!(f, "1-based"),
        }
    }
}

/// Everything a k-means run can be tuned with.
///
/// Only `k` is mandatory. Every `None` falls back to the matching default
/// (see [`KMeansSettings::handle_nones`]).
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansSettings {
    pub k: usize,
    pub max_iterations: Option<usize>,
    pub init_method: Option<CentroidInitMethod>,
    pub seed: Option<u64>, // None draws the seed from the OS
    pub empty_cluster_policy: Option<EmptyClusterPolicy>,
    pub degenerate_range_policy: Option<DegenerateRangePolicy>,
    pub label_origin: Option<LabelOrigin>,
    pub num_features: Option<usize>,
    pub yap_level: Option<YapLevel>,
}

impl KMeansSettings {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: None,
            init_method: None,
            seed: None,
            empty_cluster_policy: None,
            degenerate_range_policy: None,
            label_origin: None,
            num_features: None,
            yap_level: None,
        }
    }

    pub fn handle_nones(self) -> Self {
        let k = self.k;

        Self {
            k,
            max_iterations: Some(self.max_iterations.unwrap_or(KMEANS_MAX_ITERS_DEFAULT)),
            init_method: Some(self.init_method.unwrap_or(CentroidInitMethod::default()).handle_nones(k)),
            seed: self.seed,
            empty_cluster_policy: Some(self.empty_cluster_policy.unwrap_or(EmptyClusterPolicy::default())),
            degenerate_range_policy: Some(self.degenerate_range_policy.unwrap_or(DegenerateRangePolicy::default())),
            label_origin: Some(self.label_origin.unwrap_or(LabelOrigin::default())),
            num_features: Some(self.num_features.unwrap_or(KMEANS_NUM_FEATURES_DEFAULT)),
            yap_level: Some(self.yap_level.unwrap_or(YapLevel::default())),
        }
    }

    /// Checks the parts that can be judged without seeing the data.
    /// `k` against the number of observations is checked when the run starts.
    pub fn validate(&self) -> Result<(), KMeansSettingsError> {
        if self.k == 0 {
            return Err(KMeansSettingsError::InvalidNumberOfClusters { k: self.k });
        }
        if self.max_iterations() == 0 {
            return Err(KMeansSettingsError::InvalidMaxIterations);
        }
        if self.num_features() == 0 {
            return Err(KMeansSettingsError::InvalidNumberOfFeatures);
        }
        if let CentroidInitMethod::Randomized { max_attempts: Some(0) } = self.init_method() {
            return Err(KMeansSettingsError::InvalidMaxAttempts);
        }

        Ok(())
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(KMEANS_MAX_ITERS_DEFAULT)
    }

    pub fn init_method(&self) -> CentroidInitMethod {
        self.init_method.clone().unwrap_or(CentroidInitMethod::default())
    }

    pub fn empty_cluster_policy(&self) -> EmptyClusterPolicy {
        self.empty_cluster_policy.unwrap_or(EmptyClusterPolicy::default())
    }

    pub fn degenerate_range_policy(&self) -> DegenerateRangePolicy {
        self.degenerate_range_policy.unwrap_or(DegenerateRangePolicy::default())
    }

    pub fn label_origin(&self) -> LabelOrigin {
        self.label_origin.unwrap_or(LabelOrigin::default())
    }

    pub fn num_features(&self) -> usize {
        self.num_features.unwrap_or(KMEANS_NUM_FEATURES_DEFAULT)
    }

    pub fn yap_level(&self) -> YapLevel {
        self.yap_level.clone().unwrap_or(YapLevel::default())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KMeansSettingsError {
    #[error("k must be at least 1, got {k}")]
    InvalidNumberOfClusters { k: usize },
    #[error("max_iterations must be at least 1")]
    InvalidMaxIterations,
    #[error("the number of features must be at least 1")]
    InvalidNumberOfFeatures,
    #[error("random seeding needs at least one draw")]
    InvalidMaxAttempts,
}
