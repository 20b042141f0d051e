//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::ScriptConfig;
pub use crate::connection::{ScriptConnection, connect};
pub use crate::error::SqlScriptError;
pub use crate::format::write_result_sets;
pub use crate::results::{ResultRow, ResultSet};
pub use crate::runner::{RunOutcome, ScriptRunner, StatementOutcome};
pub use crate::script::{
    DelimiterConfig, DelimiterStyle, combine, combine_file, expand, split, split_file,
};
pub use crate::types::{DatabaseType, RowValues};
