mod common;

use common::*;
use disaster_etl::{config::PipelineConfig, pipeline, store::SqliteStore, Value};

const NAMES: [&str; 6] = ["related", "request", "offer", "aid_related", "medical_help", "water"];

#[test]
fn test_large_dataset_invariants() {
    let temp_dir = tempfile::tempdir().unwrap();
    let total = 5000i64;

    let messages: Vec<(i64, String)> = (0..total).map(|i| (i, format!("message {}", i))).collect();
    let message_refs: Vec<(i64, &str)> = messages.iter().map(|(i, m)| (*i, m.as_str())).collect();
    let messages_path = create_messages_csv(&temp_dir, &message_refs);

    // Every 10th id appears twice in the categories file; values cycle through 0..=2
    let mut encoded = Vec::new();
    for i in 0..total {
        let values: Vec<i64> = (0..NAMES.len() as i64).map(|j| (i + j) % 3).collect();
        encoded.push((i, encode_categories(&NAMES, &values)));
        if i % 10 == 0 {
            encoded.push((i, encode_categories(&NAMES, &values)));
        }
    }
    let encoded_refs: Vec<(i64, &str)> = encoded.iter().map(|(i, e)| (*i, e.as_str())).collect();
    let categories_path = create_categories_csv(&temp_dir, &encoded_refs);

    let args = pipeline_args(&temp_dir, messages_path, categories_path);
    let summary = pipeline::run(&args, &PipelineConfig::default(), &mut std::io::sink())
        .expect("Pipeline failed");

    assert_eq!(summary.rows_merged, encoded.len());
    assert_eq!(summary.duplicates_removed, (total / 10) as usize);
    assert_eq!(summary.rows_saved, total as usize);
    assert!(summary.rows_saved <= messages.len().min(encoded.len()));
    assert_eq!(summary.category_names, NAMES.to_vec());

    let store = SqliteStore::open(&args.database).unwrap();
    let columns = store.column_names("DisasterResponse").unwrap();
    assert_eq!(&columns[columns.len() - NAMES.len()..], &NAMES.map(String::from)[..]);

    let first_category = columns.len() - NAMES.len();
    for row in store.fetch_rows("DisasterResponse").unwrap() {
        for value in &row[first_category..] {
            assert!(
                matches!(value, Value::Integer(0) | Value::Integer(1)),
                "unexpected category value {:?}",
                value
            );
        }
    }
}
