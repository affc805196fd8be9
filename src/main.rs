// Entry point: process-data <messages.csv> <categories.csv> <database.db>

use anyhow::Context;
use clap::Parser;
use disaster_etl::args::{Cli, USAGE};
use disaster_etl::config::PipelineConfig;
use disaster_etl::{logging, pipeline};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Misuse prints guidance and still exits 0.
    let Some(args) = cli.pipeline_args() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = PipelineConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    logging::init(&config.logging, cli.verbose);

    let mut stdout = std::io::stdout().lock();
    let summary = pipeline::run(&args, &config, &mut stdout).context("processing failed")?;

    log::info!(
        "{} merged rows, {} duplicates removed, {} rows saved across {} categories",
        summary.rows_merged,
        summary.duplicates_removed,
        summary.rows_saved,
        summary.category_names.len()
    );
    Ok(())
}
