//! k-means clustering of tabular observations.
//!
//! The [`clustering`] module holds the algorithm: missing-value imputation,
//! min-max normalization, centroid seeding and the assign/update loop.
//! [`data_loading`] turns delimited text into records and writes the
//! resulting labels back out.

pub mod clustering;
pub mod data_loading;
