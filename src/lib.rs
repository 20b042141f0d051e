//! Run delimited SQL scripts against a database on behalf of a build or
//! automation pipeline.
//!
//! A script is split into statements by a configurable delimiter (anywhere in
//! the text, or a whole-line token like a bare `GO`), optionally expanded
//! with `${name}` properties, and executed either as one combined batch or
//! statement-by-statement, optionally inside a transaction, with result
//! sets rendered as tab-separated text to a file or the console.

pub mod config;
pub mod connection;
pub mod error;
pub mod format;
pub mod prelude;
pub mod results;
pub mod runner;
pub mod script;
pub mod types;

pub use config::ScriptConfig;
pub use error::SqlScriptError;
pub use runner::{RunOutcome, ScriptRunner, StatementOutcome};
pub use script::{DelimiterConfig, DelimiterStyle};
pub use types::{DatabaseType, RowValues};
