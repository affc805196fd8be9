use crate::config::EtlConfig;
use crate::etl::csv_parser::CsvTableReader;
use crate::table::{Column, ColumnType, Table, Value};
use crate::{EtlError, EtlResult};
use fnv::FnvHashMap;
use std::path::Path;

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Reads the messages and categories files and joins them on the key column.
pub struct Loader {
    reader: CsvTableReader,
    key_column: String,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            reader: CsvTableReader::new(),
            key_column: "id".to_string(),
        }
    }
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EtlConfig) -> EtlResult<Self> {
        Ok(Self {
            reader: CsvTableReader::from_config(config)?,
            key_column: config.key_column.clone(),
        })
    }

    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = key_column.into();
        self
    }

    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(&self, messages: P, categories: Q) -> EtlResult<Table> {
        let messages = self.reader.read_path(messages)?;
        let categories = self.reader.read_path(categories)?;
        log::info!(
            "loaded {} messages and {} category rows",
            messages.len(),
            categories.len()
        );

        let merged = inner_join(&messages, &categories, &self.key_column)?;
        if merged.is_empty() {
            log::warn!("no '{}' values matched between the two files", self.key_column);
        } else {
            log::info!("joined {} rows on '{}'", merged.len(), self.key_column);
        }
        Ok(merged)
    }
}

/// Inner join on `key`. Rows follow the left table's order; a left row that
/// matches several right rows emits one output row per match, in right order.
/// Null keys never match.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> EtlResult<Table> {
    let left_key = left.column_index(key).ok_or_else(|| EtlError::MissingColumn {
        column: key.to_string(),
        context: "left table".to_string(),
    })?;
    let right_key = right.column_index(key).ok_or_else(|| EtlError::MissingColumn {
        column: key.to_string(),
        context: "right table".to_string(),
    })?;

    let left_kind = left.columns()[left_key].kind;
    let right_kind = right.columns()[right_key].kind;
    let text_vs_numeric = (left_kind == ColumnType::Text) != (right_kind == ColumnType::Text);
    if text_vs_numeric && !left.is_empty() && !right.is_empty() {
        return Err(EtlError::KeyTypeMismatch {
            column: key.to_string(),
            left: left_kind,
            right: right_kind,
        });
    }

    let columns = joined_columns(left, right, left_key, right_key);
    let mut joined = Table::new(columns)?;

    let mut index: FnvHashMap<Value, Vec<usize>> = FnvHashMap::default();
    for (row_idx, row) in right.rows().iter().enumerate() {
        let value = &row[right_key];
        if !value.is_null() {
            index.entry(join_key(value)).or_default().push(row_idx);
        }
    }

    for left_row in left.rows() {
        let Some(matches) = index.get(&join_key(&left_row[left_key])) else {
            continue;
        };
        for &right_idx in matches {
            let mut row = left_row.clone();
            row.extend(
                right.rows()[right_idx]
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != right_key)
                    .map(|(_, value)| value.clone()),
            );
            joined.push_row(row)?;
        }
    }

    Ok(joined)
}

// Integral reals match integers, so 1 and 1.0 land on the same key.
fn join_key(value: &Value) -> Value {
    match value {
        Value::Real(r) if r.fract() == 0.0 && r.abs() < i64::MAX as f64 => Value::Integer(*r as i64),
        other => other.clone(),
    }
}

fn joined_columns(left: &Table, right: &Table, left_key: usize, right_key: usize) -> Vec<Column> {
    let shared = |name: &str, own_key: usize, other: &Table, other_key: usize, own_idx: usize| {
        own_idx != own_key
            && other
                .column_index(name)
                .is_some_and(|other_idx| other_idx != other_key)
    };

    let mut columns: Vec<Column> = left
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            if shared(&column.name, left_key, right, right_key, idx) {
                Column::new(format!("{}{}", column.name, LEFT_SUFFIX), column.kind)
            } else {
                column.clone()
            }
        })
        .collect();

    columns.extend(
        right
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != right_key)
            .map(|(idx, column)| {
                if shared(&column.name, right_key, left, left_key, idx) {
                    Column::new(format!("{}{}", column.name, RIGHT_SUFFIX), column.kind)
                } else {
                    column.clone()
                }
            }),
    );

    columns
}
