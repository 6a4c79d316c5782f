use std::io::{self, Write};
use terminal_size::{terminal_size, Width};

use super::centroid_init::CentroidInitMethod;
use super::centroid_update::EmptyClusterPolicy;
use super::kmeans::{KMeansOutcome, KMeansTermination};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum YapLevel {
    ALot,
    ALittle,
    None,
}

impl YapLevel {
    pub fn default() -> Self {
        YapLevel::ALittle
    }
}

/// Console progress for a k-means run.
#[derive(Clone, Debug)]
pub struct Yapper {
    pub k: usize,
    pub num_observations: usize,
    pub num_features: usize,
    pub max_iterations: usize,
    pub init_method: CentroidInitMethod,
    pub empty_cluster_policy: EmptyClusterPolicy,
    pub yap_level: YapLevel,
    last_msg_len: usize, // Tracks the length of the last message for clearing
}

impl Yapper {
    pub fn new(
        k: usize,
        num_observations: usize,
        num_features: usize,
        max_iterations: usize,
        init_method: &CentroidInitMethod,
        empty_cluster_policy: EmptyClusterPolicy,
        yap_level: YapLevel,
    ) -> Self {
        Self {
            k,
            num_observations,
            num_features,
            max_iterations,
            init_method: init_method.clone(),
            empty_cluster_policy,
            yap_level,
            last_msg_len: 0,
        }
    }

    pub fn startup_yap(&self) {
        match self.yap_level {
            YapLevel::None => return,
            YapLevel::ALittle => {
                println!("\n\nStarting k-means with k = {}", self.k);
                println!("=============================================");
            }
            YapLevel::ALot => {
                println!("\n\nStarting k-means");
                println!("=============================================");
                println!("With parameters:\n");
                println!("Number of Clusters (k)   : {}", self.k);
                println!("Observations             : {}", self.num_observations);
                println!("Features per Observation : {}", self.num_features);
                println!("Maximum Iterations       : {}", self.max_iterations);
                println!("Initialization Method    : {}", self.init_method);
                println!("Empty Cluster Policy     : {}", self.empty_cluster_policy);
                println!("=============================================\n");
            }
        }
    }

    pub fn iteration_yap(&mut self, current_iteration: usize, cluster_sizes: &[usize]) {
        let iteration_info = format!("Current Iteration: {}/{}", current_iteration, self.max_iterations);

        let output = match self.yap_level {
            YapLevel::None => return,
            YapLevel::ALittle => iteration_info,
            YapLevel::ALot => {
                let formatted_sizes: Vec<String> = cluster_sizes.iter().map(|size| size.to_string()).collect();
                format!("{} | Cluster Sizes: [{}]", iteration_info, formatted_sizes.join(", "))
            }
        };

        // Determine terminal width
        let terminal_width = match terminal_size() {
            Some((Width(w), _)) => w as usize,
            None => 80,
        };

        // Number of terminal lines the previous message took
        let prev_lines = (self.last_msg_len + terminal_width - 1) / terminal_width;

        // Clear the previous message
        if self.last_msg_len > 0 {
            for _ in 0..prev_lines {
                print!("\x1B[1A"); // Move up one line
                print!("\x1B[2K"); // Clear the line
            }
            print!("\r");
        }

        println!("{}", output);
        let _ = io::stdout().flush();

        self.last_msg_len = output.len();
    }

    pub fn finish_yap(&self, outcome: &KMeansOutcome) {
        if self.yap_level == YapLevel::None {
            return;
        }

        match outcome.termination {
            KMeansTermination::Converged => {
                println!("\nConverged. Total number of iterations: {}", outcome.iterations);
            }
            KMeansTermination::IterationCapReached => {
                println!("\nStopped at the iteration cap. Total number of iterations: {}", outcome.iterations);
            }
        }
    }
}
