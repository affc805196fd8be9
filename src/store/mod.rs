pub mod sqlite;

pub use sqlite::{save_table, SqliteStore};
