use clap::Parser;
use std::path::PathBuf;

pub const USAGE: &str = "Please provide the filepaths of the messages and categories \
datasets as the first and second argument respectively, as \
well as the filepath of the database to save the cleaned data \
to as the third argument. \n\nExample: process-data \
disaster_messages.csv disaster_categories.csv \
DisasterResponse.db";

#[derive(Parser, Debug)]
#[command(name = "process-data")]
#[command(about = "Merge disaster messages with their categories and store the cleaned table in SQLite.")]
#[command(version)]
pub struct Cli {
    // Messages CSV, categories CSV, destination database
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    // Configuration file path
    #[arg(short, long, default_value = "etl.yaml")]
    pub config: PathBuf,

    // Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// The three positional paths of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineArgs {
    pub messages: PathBuf,
    pub categories: PathBuf,
    pub database: PathBuf,
}

impl Cli {
    /// Returns the run arguments only when exactly three paths were given.
    pub fn pipeline_args(&self) -> Option<PipelineArgs> {
        match self.paths.as_slice() {
            [messages, categories, database] => Some(PipelineArgs {
                messages: messages.clone(),
                categories: categories.clone(),
                database: database.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_paths_make_a_run() {
        let cli = Cli::try_parse_from(["process-data", "m.csv", "c.csv", "out.db"]).unwrap();
        let args = cli.pipeline_args().unwrap();
        assert_eq!(args.messages, PathBuf::from("m.csv"));
        assert_eq!(args.categories, PathBuf::from("c.csv"));
        assert_eq!(args.database, PathBuf::from("out.db"));
        assert!(!cli.verbose);
        assert_eq!(cli.config, PathBuf::from("etl.yaml"));
    }

    #[test]
    fn test_wrong_count_yields_no_run() {
        for argv in [
            vec!["process-data"],
            vec!["process-data", "m.csv", "c.csv"],
            vec!["process-data", "m.csv", "c.csv", "out.db", "extra"],
        ] {
            let cli = Cli::try_parse_from(argv).unwrap();
            assert!(cli.pipeline_args().is_none());
        }
    }

    #[test]
    fn test_options_mix_with_paths() {
        let cli = Cli::try_parse_from([
            "process-data", "-v", "--config", "custom.yaml", "m.csv", "c.csv", "out.db",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("custom.yaml"));
        assert!(cli.pipeline_args().is_some());
    }
}
