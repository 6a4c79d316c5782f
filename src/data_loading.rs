pub mod record_loader;
pub mod results_writer;
