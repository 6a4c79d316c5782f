// Command-line arguments for the k-means binary.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use kmeans_lib::clustering::centroid_init::CentroidInitMethod;
use kmeans_lib::clustering::centroid_update::EmptyClusterPolicy;
use kmeans_lib::clustering::kmeans_settings::{KMeansSettings, LabelOrigin, KMEANS_MAX_ITERS_DEFAULT, KMEANS_NUM_FEATURES_DEFAULT};
use kmeans_lib::clustering::preprocessing::DegenerateRangePolicy;
use kmeans_lib::clustering::verbosity::YapLevel;
use kmeans_lib::data_loading::results_writer::DEFAULT_RESULTS_FILE;

/// Cluster the rows of a comma separated data file with k-means.
#[derive(Parser, Debug)]
#[command(name = "kmeans-lib")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Data file, one `identifier,f1,...,fN` record per line
    pub data_file: PathBuf,

    /// Number of clusters
    pub k: usize,

    /// Maximum number of update/assign iterations
    #[arg(short = 'm', long = "max-iterations", default_value_t = KMEANS_MAX_ITERS_DEFAULT)]
    pub max_iterations: usize,

    /// How the initial centroids are picked
    #[arg(short = 'i', long = "init", value_enum, default_value_t = InitArg::Random)]
    pub init: InitArg,

    /// First seed position for deterministic initialization
    #[arg(long = "offset")]
    pub offset: Option<usize>,

    /// Seed for random initialization
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Number of numeric features after the identifier
    #[arg(short = 'n', long = "num-features", default_value_t = KMEANS_NUM_FEATURES_DEFAULT)]
    pub num_features: usize,

    /// Where to write `identifier,label` lines
    #[arg(short = 'o', long = "output", default_value = DEFAULT_RESULTS_FILE)]
    pub output: PathBuf,

    /// What happens to a cluster that loses all its members
    #[arg(long = "empty-cluster", value_enum, default_value_t = EmptyClusterArg::Retain)]
    pub empty_cluster: EmptyClusterArg,

    /// What happens to a feature whose values are all equal
    #[arg(long = "degenerate", value_enum, default_value_t = DegenerateArg::Zero)]
    pub degenerate: DegenerateArg,

    /// Number clusters from 0 instead of 1
    #[arg(long = "zero-based")]
    pub zero_based: bool,

    /// Print the full parameter list and cluster sizes per iteration
    #[arg(short = 'v', long = "verbose", conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum InitArg {
    Random,
    Deterministic,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum EmptyClusterArg {
    Retain,
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DegenerateArg {
    Zero,
    Skip,
    Nan,
}

impl Cli {
    pub fn settings(&self) -> KMeansSettings {
        let init_method = match self.init {
            InitArg::Random => CentroidInitMethod::Randomized { max_attempts: None },
            InitArg::Deterministic => CentroidInitMethod::Deterministic { offset: self.offset },
        };

        let empty_cluster_policy = match self.empty_cluster {
            EmptyClusterArg::Retain => EmptyClusterPolicy::RetainPrevious,
            EmptyClusterArg::Reset => EmptyClusterPolicy::ResetToOrigin,
        };

        let degenerate_range_policy = match self.degenerate {
            DegenerateArg::Zero => DegenerateRangePolicy::MapToZero,
            DegenerateArg::Skip => DegenerateRangePolicy::Skip,
            DegenerateArg::Nan => DegenerateRangePolicy::PropagateNan,
        };

        let label_origin = if self.zero_based { LabelOrigin::ZeroBased } else { LabelOrigin::OneBased };

        let yap_level = if self.quiet {
            YapLevel::None
        } else if self.verbose {
            YapLevel::ALot
        } else {
            YapLevel::ALittle
        };

        let mut settings = KMeansSettings::new(self.k);
        settings.max_iterations = Some(self.max_iterations);
        settings.init_method = Some(init_method);
        settings.seed = self.seed;
        settings.empty_cluster_policy = Some(empty_cluster_policy);
        settings.degenerate_range_policy = Some(degenerate_range_policy);
        settings.label_origin = Some(label_origin);
        settings.num_features = Some(self.num_features);
        settings.yap_level = Some(yap_level);

        settings
    }
}
