use crate::config::EtlConfig;
use crate::table::{Column, ColumnType, Table, Value};
use crate::{EtlError, EtlResult};
use fnv::FnvHashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads a headed, delimited file into a typed [`Table`].
pub struct CsvTableReader {
    delimiter: u8,
    null_markers: Vec<String>,
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_markers: EtlConfig::default().null_markers,
        }
    }
}

impl CsvTableReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EtlConfig) -> EtlResult<Self> {
        Ok(Self {
            delimiter: config.delimiter_byte()?,
            null_markers: config.null_markers.clone(),
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> EtlResult<Table> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| EtlError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let table = self.parse_table(file)?;
        log::debug!(
            "read {} rows x {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        Ok(table)
    }

    pub fn parse_table<R: Read>(&self, reader: R) -> EtlResult<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = dedupe_headers(csv_reader.headers()?.iter());
        let width = headers.len();

        let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            if record.len() > width {
                return Err(EtlError::RowWidth {
                    row: row_idx,
                    expected: width,
                    found: record.len(),
                });
            }
            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|field| (!self.is_null(field)).then(|| field.to_string()))
                .collect();
            row.resize(width, None);
            raw_rows.push(row);
        }

        let kinds: Vec<ColumnType> = (0..width)
            .map(|col| infer_type(raw_rows.iter().filter_map(|row| row[col].as_deref())))
            .collect();

        let columns = headers
            .into_iter()
            .zip(kinds.iter())
            .map(|(name, kind)| Column::new(name, *kind))
            .collect();
        let mut table = Table::new(columns)?;

        for raw in raw_rows {
            let row = raw
                .into_iter()
                .zip(kinds.iter())
                .map(|(cell, kind)| convert(cell, *kind))
                .collect();
            table.push_row(row)?;
        }

        Ok(table)
    }

    fn is_null(&self, field: &str) -> bool {
        self.null_markers.iter().any(|m| m == field)
    }
}

// Repeated header names become name.1, name.2, ...
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: FnvHashMap<String, usize> = FnvHashMap::default();
    let mut names = Vec::new();
    for header in headers {
        let mut name = header.to_string();
        while let Some(count) = counts.get_mut(&name) {
            *count += 1;
            name = format!("{}.{}", header, count);
        }
        counts.insert(name.clone(), 0);
        names.push(name);
    }
    names
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut any = false;
    let mut all_int = true;
    let mut all_real = true;
    for cell in cells {
        any = true;
        if all_int && cell.parse::<i64>().is_err() {
            all_int = false;
        }
        if !all_int && cell.parse::<f64>().is_err() {
            all_real = false;
            break;
        }
    }
    match (any, all_int, all_real) {
        // A column with no values at all reads as missing numbers.
        (false, _, _) => ColumnType::Real,
        (true, true, _) => ColumnType::Integer,
        (true, false, true) => ColumnType::Real,
        _ => ColumnType::Text,
    }
}

fn convert(cell: Option<String>, kind: ColumnType) -> Value {
    let Some(cell) = cell else {
        return Value::Null;
    };
    match kind {
        ColumnType::Integer => cell.parse().map(Value::Integer).unwrap_or(Value::Text(cell)),
        ColumnType::Real => match cell.parse() {
            Ok(real) => Value::Real(real),
            Err(_) => Value::Text(cell),
        },
        ColumnType::Text => Value::Text(cell),
    }
}
