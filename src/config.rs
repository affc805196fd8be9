use crate::{EtlError, EtlResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TABLE_NAME: &str = "DisasterResponse";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub etl: EtlConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub delimiter: char,
    pub key_column: String,
    pub categories_column: String,
    pub category_separator: char,
    pub value_separator: char,
    pub null_markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub enable_performance_metrics: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            key_column: "id".into(),
            categories_column: "categories".into(),
            category_separator: ';',
            value_separator: '-',
            null_markers: ["", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A", "<NA>"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.into(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            enable_performance_metrics: false,
        }
    }
}

impl EtlConfig {
    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> EtlResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(EtlError::Config(format!(
                "delimiter '{}' must be a single ASCII character",
                self.delimiter
            )))
        }
    }
}

impl PipelineConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> EtlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Falls back to the built-in defaults when no file exists at `path`.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> EtlResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> EtlResult<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> EtlResult<()> {
        self.etl.delimiter_byte()?;
        if self.etl.key_column.is_empty() || self.etl.categories_column.is_empty() {
            return Err(EtlError::Config("column names must not be empty".into()));
        }
        if self.etl.category_separator == self.etl.value_separator {
            return Err(EtlError::Config(
                "category and value separators must differ".into(),
            ));
        }
        if self.storage.table_name.is_empty() {
            return Err(EtlError::Config("table name must not be empty".into()));
        }
        Ok(())
    }
}
