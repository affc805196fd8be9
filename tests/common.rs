// Common test utilities for integration tests

use disaster_etl::args::PipelineArgs;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper function to write a CSV file with the given header and raw lines
pub fn create_test_csv(temp_dir: &TempDir, filename: &str, header: &str, lines: &[String]) -> PathBuf {
    let csv_path = temp_dir.path().join(filename);
    let mut file = File::create(&csv_path).expect("Failed to create CSV file");

    writeln!(file, "{}", header).expect("Failed to write CSV header");
    for line in lines {
        writeln!(file, "{}", line).expect("Failed to write CSV data");
    }

    csv_path
}

// Messages file with id,message,original,genre columns
pub fn create_messages_csv(temp_dir: &TempDir, messages: &[(i64, &str)]) -> PathBuf {
    let lines: Vec<String> = messages
        .iter()
        .map(|(id, message)| format!("{},\"{}\",,direct", id, message))
        .collect();
    create_test_csv(temp_dir, "messages.csv", "id,message,original,genre", &lines)
}

// Categories file with id,categories columns
pub fn create_categories_csv(temp_dir: &TempDir, categories: &[(i64, &str)]) -> PathBuf {
    let lines: Vec<String> = categories
        .iter()
        .map(|(id, encoded)| format!("{},{}", id, encoded))
        .collect();
    create_test_csv(temp_dir, "categories.csv", "id,categories", &lines)
}

pub fn pipeline_args(temp_dir: &TempDir, messages: PathBuf, categories: PathBuf) -> PipelineArgs {
    PipelineArgs {
        messages,
        categories,
        database: temp_dir.path().join("DisasterResponse.db"),
    }
}

// Encodes flags as "c0-v0;c1-v1;..."
pub fn encode_categories(names: &[&str], values: &[i64]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(name, value)| format!("{}-{}", name, value))
        .collect::<Vec<_>>()
        .join(";")
}
