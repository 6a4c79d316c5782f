use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use super::observation::{Centroid, Dataset};

pub const DETERMINISTIC_OFFSET_DEFAULT: usize = 0;
pub const RANDOM_INIT_ATTEMPTS_PER_CENTROID: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum CentroidInitMethod {
    Deterministic { offset: Option<usize> }, // Observations offset..offset + k
    Positions { positions: Vec<usize> },     // Explicit seed observations, one per cluster
    Randomized { max_attempts: Option<usize> }, // Distinct uniform draws, capped in total
}

impl CentroidInitMethod {
    pub fn default() -> Self {
        Self::Randomized { max_attempts: None }
    }

    pub fn handle_nones(self, k: usize) -> Self {
        match self {
            Self::Deterministic { offset } => {
                Self::Deterministic { offset: Some(offset.unwrap_or(DETERMINISTIC_OFFSET_DEFAULT)) }
            }
            Self::Randomized { max_attempts } => {
                Self::Randomized { max_attempts: Some(max_attempts.unwrap_or(default_max_attempts(k))) }
            }
            Self::Positions { .. } => self,
        }
    }

    /// Checks that this method can seed `k` clusters from `num_observations`
    /// observations, without drawing anything.
    pub fn check_validity(&self, num_observations: usize, k: usize) -> Result<(), InitializerError> {
        if k == 0 {
            return Err(InitializerError::InvalidConfiguration { reason: "k must be at least 1".to_string() });
        }

        if k > num_observations {
            return Err(InitializerError::InvalidConfiguration {
                reason: format!("k = {} exceeds the {} available observations", k, num_observations),
            });
        }

        match self {
            CentroidInitMethod::Deterministic { offset } => {
                let offset = offset.unwrap_or(DETERMINISTIC_OFFSET_DEFAULT);

                if offset.saturating_add(k) > num_observations {
                    return Err(InitializerError::InvalidConfiguration {
                        reason: format!(
                            "deterministic seeds {}..{} exceed the {} available observations",
                            offset,
                            offset.saturating_add(k),
                            num_observations
                        ),
                    });
                }
            }

            CentroidInitMethod::Positions { positions } => {
                if positions.len() != k {
                    return Err(InitializerError::InvalidConfiguration {
                        reason: format!("{} seed positions given for k = {}", positions.len(), k),
                    });
                }

                let mut seen = BTreeSet::new();
                for &position in positions {
                    if position >= num_observations {
                        return Err(InitializerError::InvalidConfiguration {
                            reason: format!("seed position {} is out of bounds for {} observations", position, num_observations),
                        });
                    }
                    if !seen.insert(position) {
                        return Err(InitializerError::InvalidConfiguration {
                            reason: format!("seed position {} is given twice", position),
                        });
                    }
                }
            }

            CentroidInitMethod::Randomized { .. } => {}
        }

        Ok(())
    }

    /// Picks `k` distinct observations and returns owned copies of their
    /// feature vectors.
    ///
    /// `rng` is only drawn from by the randomized variant.
    pub fn initial_centroids<R: Rng>(
        &self,
        dataset: &Dataset,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<Centroid>, InitializerError> {
        self.check_validity(dataset.len(), k)?;

        let positions: Vec<usize> = match self {
            CentroidInitMethod::Deterministic { offset } => {
                let offset = offset.unwrap_or(DETERMINISTIC_OFFSET_DEFAULT);
                (offset..offset + k).collect()
            }

            CentroidInitMethod::Positions { positions } => positions.clone(),

            CentroidInitMethod::Randomized { max_attempts } => {
                let max_attempts = max_attempts.unwrap_or(default_max_attempts(k));
                sample_distinct_positions(dataset.len(), k, max_attempts, rng)?
                    .into_iter()
                    .collect()
            }
        };

        debug!(?positions, "selected seed observations");

        // Clone so later centroid updates never touch the observations
        let centroids = positions
            .iter()
            .map(|&position| dataset.observations()[position].features.clone())
            .collect();

        Ok(centroids)
    }
}

impl fmt::Display for CentroidInitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentroidInitMethod::Deterministic { offset } => {
                write!(f, "Deterministic (offset {})", offset.unwrap_or(DETERMINISTIC_OFFSET_DEFAULT))
            }
            CentroidInitMethod::Positions { positions } => {
                let formatted_positions: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
                write!(f, "Positions [{}]", formatted_positions.join(", "))
            }
            CentroidInitMethod::Randomized { max_attempts: Some(max_attempts) } => {
                write!(f, "Randomized (at most {} draws)", max_attempts)
            }
            CentroidInitMethod::Randomized { max_attempts: None } => write!(f, "Randomized"),
        }
    }
}

fn default_max_attempts(k: usize) -> usize {
    k.saturating_mul(RANDOM_INIT_ATTEMPTS_PER_CENTROID)
}

// Rejection sampling: draw, drop duplicates, redraw. The set keeps the
// chosen positions sorted.
fn sample_distinct_positions<R: Rng>(
    num_observations: usize,
    k: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<BTreeSet<usize>, InitializerError> {
    let mut chosen = BTreeSet::new();
    let mut attempts = 0_usize;

    while chosen.len() < k {
        if attempts >= max_attempts {
            return Err(InitializerError::InvalidConfiguration {
                reason: format!(
                    "found only {} distinct seeds out of {} after {} draws",
                    chosen.len(),
                    k,
                    attempts
                ),
            });
        }

        chosen.insert(rng.gen_range(0..num_observations));
        attempts += 1;
    }

    debug!(attempts, k, "random seeding finished");

    Ok(chosen)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitializerError {
    #[error("invalid centroid initialization: {reason}")]
    InvalidConfiguration { reason: String },
}
