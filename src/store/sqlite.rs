// SQLite persistence for the cleaned table
use crate::table::{Table, Value};
use crate::EtlResult;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Borrowed(ValueRef::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Value::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Owns one connection to the destination database. The connection is
/// released on `close` or when the store is dropped.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> EtlResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::debug!("opened database {}", path.as_ref().display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> EtlResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Drops `name` if present, recreates it from the table's columns and
    /// inserts every row. Returns the number of rows written.
    pub fn replace_table(&mut self, name: &str, table: &Table) -> EtlResult<usize> {
        let tx = self.conn.transaction()?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_ident(name)))?;

        let column_defs = table
            .columns()
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.kind.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        tx.execute_batch(&format!("CREATE TABLE {} ({});", quote_ident(name), column_defs))?;

        let column_list = table
            .columns()
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=table.columns().len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(name),
            column_list,
            placeholders
        );

        let mut written = 0;
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in table.rows() {
                written += stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        log::info!("wrote {} rows into table {}", written, name);
        Ok(written)
    }

    pub fn row_count(&self, name: &str) -> EtlResult<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Column names of `name` in declaration order.
    pub fn column_names(&self, name: &str) -> EtlResult<Vec<String>> {
        let stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} LIMIT 0", quote_ident(name)))?;
        Ok(stmt.column_names().into_iter().map(String::from).collect())
    }

    /// Every row of `name` in insertion order.
    pub fn fetch_rows(&self, name: &str) -> EtlResult<Vec<Vec<Value>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", quote_ident(name)))?;
        let width = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|idx| row.get_ref(idx).map(Value::from))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn close(self) -> EtlResult<()> {
        self.conn.close().map_err(|(_, err)| err)?;
        Ok(())
    }
}

/// Writes `table` into `table_name` at `path`, replacing any earlier table.
pub fn save_table<P: AsRef<Path>>(table: &Table, path: P, table_name: &str) -> EtlResult<usize> {
    let mut store = SqliteStore::open(path)?;
    let written = store.replace_table(table_name, table)?;
    store.close()?;
    Ok(written)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnType};
    use tempfile::tempdir;

    fn cleaned() -> Table {
        let mut table = Table::new(vec![
            Column::new("id", ColumnType::Integer),
            Column::new("message", ColumnType::Text),
            Column::new("original", ColumnType::Real),
            Column::new("related", ColumnType::Integer),
        ])
        .unwrap();
        table
            .push_row(vec![Value::Integer(1), Value::from("flood"), Value::Null, Value::Integer(1)])
            .unwrap();
        table
            .push_row(vec![Value::Integer(2), Value::from("fire"), Value::Null, Value::Integer(0)])
            .unwrap();
        table
    }

    #[test]
    fn test_replace_table_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let table = cleaned();

        assert_eq!(store.replace_table("DisasterResponse", &table).unwrap(), 2);
        assert_eq!(store.row_count("DisasterResponse").unwrap(), 2);
        assert_eq!(
            store.column_names("DisasterResponse").unwrap(),
            vec!["id", "message", "original", "related"]
        );
        assert_eq!(store.fetch_rows("DisasterResponse").unwrap(), table.rows().to_vec());
    }

    #[test]
    fn test_replace_does_not_append() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let table = cleaned();

        store.replace_table("DisasterResponse", &table).unwrap();
        store.replace_table("DisasterResponse", &table).unwrap();
        assert_eq!(store.row_count("DisasterResponse").unwrap(), 2);
    }

    #[test]
    fn test_replace_changes_schema() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_table("DisasterResponse", &cleaned()).unwrap();

        let mut narrow = Table::new(vec![Column::new("id", ColumnType::Integer)]).unwrap();
        narrow.push_row(vec![Value::Integer(7)]).unwrap();
        store.replace_table("DisasterResponse", &narrow).unwrap();

        assert_eq!(store.column_names("DisasterResponse").unwrap(), vec!["id"]);
        assert_eq!(store.fetch_rows("DisasterResponse").unwrap(), vec![vec![Value::Integer(7)]]);
    }

    #[test]
    fn test_other_tables_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE keep (x INTEGER); INSERT INTO keep VALUES (42);")
                .unwrap();
        }

        save_table(&cleaned(), &path, "DisasterResponse").unwrap();

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.row_count("keep").unwrap(), 1);
        assert_eq!(store.row_count("DisasterResponse").unwrap(), 2);
    }

    #[test]
    fn test_quoted_identifiers() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut table = Table::new(vec![Column::new("weird \"name\"", ColumnType::Text)]).unwrap();
        table.push_row(vec![Value::from("x")]).unwrap();

        store.replace_table("my table", &table).unwrap();
        assert_eq!(store.column_names("my table").unwrap(), vec!["weird \"name\""]);
    }

    #[test]
    fn test_unwritable_destination_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.db");
        assert!(save_table(&cleaned(), &path, "DisasterResponse").is_err());
    }
}
