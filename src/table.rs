// In-memory row-oriented table threaded through the pipeline
use crate::{EtlError, EtlResult};
use fnv::FnvHashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// SQLite type name used when the column is persisted.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A single cell. Reals compare bitwise (with signed zero folded) so that whole rows can be hashed.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

// -0.0 and 0.0 are the same cell value.
fn real_bits(r: f64) -> u64 {
    if r == 0.0 { 0f64.to_bits() } else { r.to_bits() }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => real_bits(*a) == real_bits(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Integer(i) => i.hash(state),
            Value::Real(r) => real_bits(*r).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> EtlResult<Self> {
        let mut seen = FnvHashSet::default();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EtlError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> EtlResult<()> {
        if row.len() != self.columns.len() {
            return Err(EtlError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes a column and returns its definition with the values it held.
    pub fn drop_column(&mut self, name: &str) -> EtlResult<(Column, Vec<Value>)> {
        let idx = self.column_index(name).ok_or_else(|| EtlError::MissingColumn {
            column: name.to_string(),
            context: "table".to_string(),
        })?;
        let column = self.columns.remove(idx);
        let values = self.rows.iter_mut().map(|row| row.remove(idx)).collect();
        Ok((column, values))
    }

    /// Appends columns on the right. `values[i]` holds the new cells for row `i`.
    pub fn append_columns(&mut self, columns: Vec<Column>, values: Vec<Vec<Value>>) -> EtlResult<()> {
        if values.len() != self.rows.len() {
            return Err(EtlError::RowWidth {
                row: values.len().min(self.rows.len()),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        for column in &columns {
            if self.column_index(&column.name).is_some() {
                return Err(EtlError::DuplicateColumn(column.name.clone()));
            }
        }
        if let Some((row_idx, extra)) = values
            .iter()
            .enumerate()
            .find(|(_, extra)| extra.len() != columns.len())
        {
            return Err(EtlError::RowWidth {
                row: row_idx,
                expected: columns.len(),
                found: extra.len(),
            });
        }
        for (row, extra) in self.rows.iter_mut().zip(values) {
            row.extend(extra);
        }
        self.columns.extend(columns);
        Ok(())
    }

    /// Drops rows identical across every column, keeping the first occurrence.
    /// Returns the number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: FnvHashSet<Vec<Value>> = FnvHashSet::default();
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }
}
