// SQLite database import: one dataset per user table

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::dataset::{Dataset, DatasetCollection, Scalar};
use crate::error::NormalizeError;

/// User tables in catalog order. SQLite reserves names starting with
/// `sqlite_`; LIKE would treat the `_` as a wildcard.
const LIST_TABLES: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND substr(name, 1, 7) <> 'sqlite_'";

pub fn import(path: &Path) -> Result<DatasetCollection, NormalizeError> {
    // SQLite would happily create a missing file; refuse instead
    if !path.is_file() {
        return Err(NormalizeError::Database(format!(
            "unable to open database file: {}",
            path.display()
        )));
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| NormalizeError::Database(format!("{}: {}", path.display(), e)))?;

    // On error the connection is dropped (and closed) on the way out
    let collection = read_tables(&conn)?;

    conn.close().map_err(|(_, e)| NormalizeError::from(e))?;
    Ok(collection)
}

fn read_tables(conn: &Connection) -> Result<DatasetCollection, NormalizeError> {
    let tables = list_tables(conn)?;
    let mut collection = DatasetCollection::new();

    for table in &tables {
        let dataset = read_table(conn, table)?;
        log::debug!(
            "table '{}': {} columns, {} rows",
            table,
            dataset.column_count(),
            dataset.row_count()
        );
        collection.insert(dataset);
    }

    Ok(collection)
}

fn list_tables(conn: &Connection) -> Result<Vec<String>, NormalizeError> {
    let mut stmt = conn.prepare(LIST_TABLES)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Quote an identifier for interpolation into SQL
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Declared column names, in declaration order.
///
/// `table_xinfo` also reports generated columns (which `SELECT *` returns);
/// hidden virtual-table columns (hidden = 1) are not part of `SELECT *`.
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, NormalizeError> {
    let sql = format!("PRAGMA table_xinfo({})", quote_ident(table));
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| {
            let name: String = row.get("name")?;
            let hidden: i64 = row.get("hidden")?;
            Ok((name, hidden))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns
        .into_iter()
        .filter(|(_, hidden)| *hidden != 1)
        .map(|(name, _)| name)
        .collect())
}

fn read_table(conn: &Connection, table: &str) -> Result<Dataset, NormalizeError> {
    let column_names = table_columns(conn, table)?;

    let sql = format!("SELECT * FROM {}", quote_ident(table));
    let mut stmt = conn.prepare(&sql)?;
    let width = stmt.column_count();
    if width != column_names.len() {
        return Err(NormalizeError::Database(format!(
            "table '{}': metadata lists {} columns but scan returns {}",
            table,
            column_names.len(),
            width
        )));
    }

    let mut rows: Vec<Vec<Scalar>> = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(value_to_scalar(row.get_ref(idx)?));
        }
        rows.push(values);
    }

    Dataset::new(table, column_names, rows)
        .map_err(|e| NormalizeError::Database(format!("table '{}': {}", table, e)))
}

fn value_to_scalar(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(n) => Scalar::Int(n),
        ValueRef::Real(n) => Scalar::Float(n),
        ValueRef::Text(bytes) => Scalar::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Scalar::Blob(bytes.to_vec()),
    }
}
