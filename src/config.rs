use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::SqlScriptError;
use crate::script::DelimiterConfig;
use crate::types::DatabaseType;

/// Everything one script run needs, constructed by the caller and passed by
/// value into the runner.
///
/// ```rust
/// use sql_script_runner::prelude::*;
///
/// # #[cfg(feature = "sqlite")]
/// let config = ScriptConfig::new(
///     DatabaseType::Sqlite,
///     ":memory:",
///     DelimiterConfig::normal(";").unwrap(),
/// )
/// .with_inline("SELECT 1")
/// .with_batch(false);
/// # #[cfg(feature = "sqlite")]
/// # let _ = config;
/// ```
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Backend to connect to
    pub database: DatabaseType,
    /// Connection string, passed through to the backend driver untouched
    pub connection_string: String,
    /// Inline script text; wins over `source` when non-empty
    pub inline: Option<String>,
    /// Script file, used when no inline text is given
    pub source: Option<PathBuf>,
    /// Statement delimiter
    pub delimiter: DelimiterConfig,
    /// Execute all statements as one combined payload
    pub batch: bool,
    /// Wrap the run in a transaction
    pub use_transaction: bool,
    /// Treat a per-statement failure as fatal instead of continuing
    pub fail_on_error: bool,
    /// Echo statements and result summaries to the log
    pub print: bool,
    /// Substitute `${name}` placeholders before splitting
    pub expand_properties: bool,
    /// Property map for placeholder expansion
    pub properties: Option<HashMap<String, String>>,
    /// Result text destination; console when absent
    pub output: Option<PathBuf>,
}

impl ScriptConfig {
    #[must_use]
    pub fn new(
        database: DatabaseType,
        connection_string: impl Into<String>,
        delimiter: DelimiterConfig,
    ) -> Self {
        Self {
            database,
            connection_string: connection_string.into(),
            inline: None,
            source: None,
            delimiter,
            batch: true,
            use_transaction: true,
            fail_on_error: false,
            print: false,
            expand_properties: true,
            properties: None,
            output: None,
        }
    }

    #[must_use]
    pub fn with_inline(mut self, sql: impl Into<String>) -> Self {
        self.inline = Some(sql.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    #[must_use]
    pub fn with_transaction(mut self, use_transaction: bool) -> Self {
        self.use_transaction = use_transaction;
        self
    }

    #[must_use]
    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    #[must_use]
    pub fn with_print(mut self, print: bool) -> Self {
        self.print = print;
        self
    }

    #[must_use]
    pub fn with_expand_properties(mut self, expand_properties: bool) -> Self {
        self.expand_properties = expand_properties;
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = Some(properties);
        self
    }

    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Resolve the script text: inline text wins when non-empty, then the
    /// source file.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError::ConfigError` when neither is usable or the
    /// file cannot be read.
    pub fn resolve_source(&self) -> Result<String, SqlScriptError> {
        if let Some(text) = &self.inline
            && !text.trim().is_empty()
        {
            return Ok(text.clone());
        }
        if let Some(path) = &self.source {
            return std::fs::read_to_string(path).map_err(|e| {
                SqlScriptError::ConfigError(format!(
                    "cannot read SQL script {}: {e}",
                    path.display()
                ))
            });
        }
        Err(SqlScriptError::ConfigError(
            "no SQL source: provide inline text or a script file".to_string(),
        ))
    }
}
