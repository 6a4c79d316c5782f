mod cli;

use anyhow::{bail, Context};
use clap::Parser;

use kmeans_lib::clustering::{cluster_records, KMeansTermination};
use kmeans_lib::data_loading::record_loader::parse_file;
use kmeans_lib::data_loading::results_writer::write_results_file;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("kmeans_lib=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();

    let loaded = parse_file(&cli.data_file, cli.num_features)
        .with_context(|| format!("could not load \"{}\"", cli.data_file.display()))?;

    if loaded.records.is_empty() {
        bail!("no data found in file \"{}\"", cli.data_file.display());
    }

    println!("Found {} data lines and successfully parsed them.", loaded.records.len());
    if !loaded.skipped_lines.is_empty() {
        println!("Skipped {} malformed lines.", loaded.skipped_lines.len());
    }

    let report = cluster_records(loaded.records, settings).context("clustering failed")?;

    match report.termination {
        KMeansTermination::Converged => println!("Total number of iterations == {}", report.iterations),
        KMeansTermination::IterationCapReached => {
            println!("Total number of iterations == {} (iteration cap reached)", report.iterations)
        }
    }

    write_results_file(&cli.output, &report.labels)
        .with_context(|| format!("could not write \"{}\"", cli.output.display()))?;

    Ok(())
}
