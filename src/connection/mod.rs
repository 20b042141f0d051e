// Connection seam between the orchestrator and the database drivers.
//
// The runner only ever talks to `ScriptConnection`; each backend module
// adapts one driver to it. Tests substitute their own implementation.

use async_trait::async_trait;

use crate::error::SqlScriptError;
use crate::results::ResultSet;
use crate::types::DatabaseType;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// One open database connection, exclusively owned by the runner for the
/// duration of a script run.
#[async_trait]
pub trait ScriptConnection: Send {
    /// Execute SQL (one statement or a combined batch payload) and return the
    /// result sets it produced, in order.
    async fn execute(&mut self, sql: &str) -> Result<Vec<ResultSet>, SqlScriptError>;

    /// Begin a transaction.
    async fn begin(&mut self) -> Result<(), SqlScriptError>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> Result<(), SqlScriptError>;

    /// Roll back the open transaction.
    async fn rollback(&mut self) -> Result<(), SqlScriptError>;

    /// Informational messages surfaced by the server since the last call, in
    /// arrival order. Backends without server messages return nothing.
    fn drain_messages(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Open a connection for the configured backend.
///
/// # Errors
///
/// Returns `SqlScriptError` when the backend rejects the connection string or
/// the backend was not compiled into this build.
pub async fn connect(
    database: &DatabaseType,
    connection_string: &str,
) -> Result<Box<dyn ScriptConnection>, SqlScriptError> {
    match database {
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => Ok(Box::new(sqlite::SqliteScriptConnection::open(
            connection_string,
        )?)),
        #[cfg(feature = "postgres")]
        DatabaseType::Postgres => Ok(Box::new(
            postgres::PostgresScriptConnection::connect(connection_string).await?,
        )),
        #[allow(unreachable_patterns)]
        _ => Err(SqlScriptError::ConfigError(
            "this database type is not enabled in the current build".to_string(),
        )),
    }
}
