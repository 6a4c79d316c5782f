pub mod observation;
pub mod preprocessing;
pub mod distance;
pub mod centroid_init;
pub mod assignment;
pub mod centroid_update;
pub mod kmeans_settings;
pub mod kmeans;
pub mod verbosity;

pub use observation::{Centroid, Dataset, Observation};
pub use kmeans::{cluster_records, labels, ClusteringReport, KMeans, KMeansError, KMeansOutcome, KMeansTermination};
pub use kmeans_settings::{KMeansSettings, LabelOrigin};
