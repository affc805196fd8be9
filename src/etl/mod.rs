pub mod cleaner;
pub mod csv_parser;
pub mod loader;

pub use cleaner::{CategoryExpander, Cleaned};
pub use csv_parser::CsvTableReader;
pub use loader::{Loader, inner_join};
