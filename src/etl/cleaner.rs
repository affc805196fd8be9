use crate::config::EtlConfig;
use crate::table::{Column, ColumnType, Table, Value};
use crate::{EtlError, EtlResult};
use fnv::FnvHashSet;

/// Output of [`CategoryExpander::clean`].
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: Table,
    pub category_names: Vec<String>,
    pub duplicates_removed: usize,
    pub clipped_values: usize,
}

/// Splits the compound categories field into one 0/1 integer column per
/// category and removes duplicate rows.
pub struct CategoryExpander {
    column: String,
    category_separator: char,
    value_separator: char,
}

impl Default for CategoryExpander {
    fn default() -> Self {
        Self {
            column: "categories".to_string(),
            category_separator: ';',
            value_separator: '-',
        }
    }
}

impl CategoryExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EtlConfig) -> Self {
        Self {
            column: config.categories_column.clone(),
            category_separator: config.category_separator,
            value_separator: config.value_separator,
        }
    }

    pub fn with_separators(mut self, category_separator: char, value_separator: char) -> Self {
        self.category_separator = category_separator;
        self.value_separator = value_separator;
        self
    }

    pub fn clean(&self, mut table: Table) -> EtlResult<Cleaned> {
        if table.column_index(&self.column).is_none() {
            return Err(EtlError::MissingColumn {
                column: self.column.clone(),
                context: "merged table".to_string(),
            });
        }
        if table.is_empty() {
            return Err(EtlError::EmptyTable);
        }

        let (_, fields) = table.drop_column(&self.column)?;

        // The first row fixes the category names and their order.
        let first = self.split_tokens(0, &fields[0])?;
        let category_names: Vec<String> = first.iter().map(|(name, _)| name.to_string()).collect();

        let mut unique = FnvHashSet::default();
        for name in &category_names {
            if !unique.insert(name.as_str()) {
                return Err(EtlError::DuplicateColumn(name.clone()));
            }
        }

        let mut clipped_values = 0;
        let mut expanded = Vec::with_capacity(fields.len());
        for (row, field) in fields.iter().enumerate() {
            let tokens = self.split_tokens(row, field)?;
            if tokens.len() != category_names.len()
                || tokens.iter().zip(&category_names).any(|((name, _), expected)| *name != expected.as_str())
            {
                return Err(EtlError::CategoryMismatch {
                    row,
                    expected: category_names.clone(),
                    found: tokens.iter().map(|(name, _)| name.to_string()).collect(),
                });
            }

            let mut values = Vec::with_capacity(tokens.len());
            for (name, raw) in tokens {
                let flag: i64 = raw.trim().parse().map_err(|_| EtlError::InvalidCategoryValue {
                    row,
                    name: name.to_string(),
                    value: raw.to_string(),
                })?;
                if flag > 1 {
                    clipped_values += 1;
                }
                values.push(Value::Integer(flag.min(1)));
            }
            expanded.push(values);
        }

        let columns = category_names
            .iter()
            .map(|name| Column::new(name.clone(), ColumnType::Integer))
            .collect();
        table.append_columns(columns, expanded)?;

        if clipped_values > 0 {
            log::info!("clipped {} category values greater than 1", clipped_values);
        }

        let duplicates_removed = table.drop_duplicates();
        log::info!(
            "expanded {} category columns, removed {} duplicate rows, {} rows remain",
            category_names.len(),
            duplicates_removed,
            table.len()
        );

        Ok(Cleaned {
            table,
            category_names,
            duplicates_removed,
            clipped_values,
        })
    }

    // Splits "name-value;name-value" into (name, value) pairs.
    fn split_tokens<'a>(&self, row: usize, field: &'a Value) -> EtlResult<Vec<(&'a str, &'a str)>> {
        let text = field.as_text().ok_or(EtlError::InvalidCategoryField { row })?;
        text.split(self.category_separator)
            .map(|token| {
                let mut parts = token.split(self.value_separator);
                match (parts.next(), parts.next()) {
                    (Some(name), Some(value)) => Ok((name, value)),
                    _ => Err(EtlError::MalformedCategoryToken {
                        row,
                        token: token.to_string(),
                    }),
                }
            })
            .collect()
    }
}
