use async_trait::async_trait;
use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};

use crate::error::SqlScriptError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::ScriptConnection;

/// `SQLite` connection adapter.
///
/// `rusqlite` is synchronous; a long-running statement blocks the calling
/// thread until the driver returns, which the runner accepts since only one
/// statement is ever in flight.
pub struct SqliteScriptConnection {
    conn: Connection,
}

impl SqliteScriptConnection {
    /// Open a database from a path or `:memory:`.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError::SqliteError` if the database cannot be opened.
    pub fn open(connection_string: &str) -> Result<Self, SqlScriptError> {
        let conn = Connection::open(connection_string)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl ScriptConnection for SqliteScriptConnection {
    async fn execute(&mut self, sql: &str) -> Result<Vec<ResultSet>, SqlScriptError> {
        let mut result_sets = Vec::new();

        // Batch walks every statement in the payload, so a single call covers
        // both one statement and a combined batch.
        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next()? {
            let column_count = stmt.column_count();
            if column_count > 0 {
                let column_names: Vec<String> = stmt
                    .column_names()
                    .iter()
                    .map(|name| (*name).to_string())
                    .collect();
                let mut set = ResultSet::with_columns(column_names);
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    let mut values = Vec::with_capacity(column_count);
                    for idx in 0..column_count {
                        values.push(row_value(row.get_ref(idx)?));
                    }
                    set.add_row_values(values);
                }
                result_sets.push(set);
            } else {
                let affected = stmt.execute([])?;
                result_sets.push(ResultSet::from_dml(affected));
            }
        }

        Ok(result_sets)
    }

    async fn begin(&mut self) -> Result<(), SqlScriptError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlScriptError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlScriptError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

fn row_value(value: ValueRef<'_>) -> RowValues {
    match value {
        ValueRef::Null => RowValues::Null,
        ValueRef::Integer(v) => RowValues::Int(v),
        ValueRef::Real(v) => RowValues::Float(v),
        ValueRef::Text(bytes) => RowValues::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => RowValues::Blob(bytes.to_vec()),
    }
}
