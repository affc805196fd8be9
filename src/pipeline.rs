// Load -> clean -> save, with the progress lines printed before each stage
use crate::args::PipelineArgs;
use crate::config::PipelineConfig;
use crate::etl::{CategoryExpander, Cleaned, Loader};
use crate::metrics::PipelineMetrics;
use crate::store::save_table;
use crate::table::Table;
use crate::EtlResult;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows_merged: usize,
    pub rows_saved: usize,
    pub duplicates_removed: usize,
    pub clipped_values: usize,
    pub category_names: Vec<String>,
    pub metrics: PipelineMetrics,
}

pub fn run<W: Write>(args: &PipelineArgs, config: &PipelineConfig, out: &mut W) -> EtlResult<RunSummary> {
    config.validate()?;
    let mut metrics = PipelineMetrics::new();

    writeln!(
        out,
        "Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}",
        args.messages.display(),
        args.categories.display()
    )?;
    let loader = Loader::from_config(&config.etl)?;
    let merged: EtlResult<Table> = crate::time_stage!(metrics, "load", |t: &Table| t.len(), {
        loader.load(&args.messages, &args.categories)
    });
    let merged = merged?;
    let rows_merged = merged.len();

    writeln!(out, "Cleaning data...")?;
    let expander = CategoryExpander::from_config(&config.etl);
    let cleaned: EtlResult<Cleaned> = crate::time_stage!(metrics, "clean", |c: &Cleaned| c.table.len(), {
        expander.clean(merged)
    });
    let Cleaned {
        table,
        category_names,
        duplicates_removed,
        clipped_values,
    } = cleaned?;

    writeln!(out, "Saving data...\n    DATABASE: {}", args.database.display())?;
    let saved: EtlResult<usize> = crate::time_stage!(metrics, "save", |n: &usize| *n, {
        save_table(&table, &args.database, &config.storage.table_name)
    });
    let rows_saved = saved?;

    writeln!(out, "Cleaned data saved to database!")?;

    if config.logging.enable_performance_metrics || log::log_enabled!(log::Level::Debug) {
        metrics.log_summary();
    }

    Ok(RunSummary {
        rows_merged,
        rows_saved,
        duplicates_removed,
        clipped_values,
        category_names,
        metrics,
    })
}
