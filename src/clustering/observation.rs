use nalgebra::DVector;
use thiserror::Error;

pub const DEFAULT_NUM_FEATURES: usize = 38;

/// Feature vector representing one cluster.
pub type Centroid = DVector<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub identifier: String,
    pub features: DVector<f64>,
    cluster_index: Option<usize>, // None until the first assignment pass
}

impl Observation {
    // Missing values are carried as NaN until imputation
    pub fn new(identifier: String, features: Vec<f64>) -> Self {
        Self {
            identifier,
            features: DVector::from_vec(features),
            cluster_index: None,
        }
    }

    pub fn cluster_index(&self) -> Option<usize> {
        self.cluster_index
    }

    // Returns true if the stored index actually changed
    pub(crate) fn set_cluster_index(&mut self, cluster_index: usize) -> bool {
        if self.cluster_index == Some(cluster_index) {
            return false;
        }

        self.cluster_index = Some(cluster_index);
        true
    }

    pub fn has_missing(&self) -> bool {
        self.features.iter().any(|value| !value.is_finite())
    }
}

/// Ordered collection of observations sharing one feature count.
#[derive(Debug, Clone)]
pub struct Dataset {
    observations: Vec<Observation>,
    num_features: usize,
}

impl Dataset {
    pub fn new(num_features: usize) -> Self {
        Self {
            observations: Vec::new(),
            num_features,
        }
    }

    /// Builds a dataset from `(identifier, features)` records, rejecting any
    /// record whose length is not `num_features`.
    pub fn from_records(records: Vec<(String, Vec<f64>)>, num_features: usize) -> Result<Self, ObservationError> {
        let mut dataset = Self::new(num_features);

        for (identifier, features) in records {
            dataset.push(identifier, features)?;
        }

        Ok(dataset)
    }

    pub fn push(&mut self, identifier: String, features: Vec<f64>) -> Result<(), ObservationError> {
        if features.len() != self.num_features {
            return Err(ObservationError::DimensionMismatch {
                position: self.observations.len(),
                expected: self.num_features,
                found: features.len(),
            });
        }

        self.observations.push(Observation::new(identifier, features));

        Ok(())
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Observation> {
        self.observations.iter_mut()
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.observations.iter().all(|observation| observation.cluster_index.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("record {position} has {found} features, expected {expected}")]
    DimensionMismatch { position: usize, expected: usize, found: usize },
}
