use std::path::Path;

use clap::ValueEnum;

use crate::error::SqlScriptError;

/// How the delimiter token is recognized inside a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DelimiterStyle {
    /// The token separates statements wherever it appears in the text.
    #[default]
    Normal,
    /// The token only counts when it is the sole non-whitespace content of a
    /// line (case-insensitive), like a bare `GO`.
    Line,
}

/// A delimiter token plus the rule for recognizing it.
///
/// ```rust
/// use sql_script_runner::script::{DelimiterConfig, split};
///
/// let cfg = DelimiterConfig::normal(";").unwrap();
/// assert_eq!(split("A;B;C", &cfg), vec!["A", "B", "C"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterConfig {
    token: String,
    style: DelimiterStyle,
}

impl DelimiterConfig {
    /// Create a delimiter configuration.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError::ConfigError` if the token is empty or
    /// whitespace-only.
    pub fn new(token: impl Into<String>, style: DelimiterStyle) -> Result<Self, SqlScriptError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SqlScriptError::ConfigError(
                "statement delimiter must not be empty".to_string(),
            ));
        }
        Ok(Self { token, style })
    }

    /// Shorthand for a `Normal`-style delimiter.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError::ConfigError` if the token is empty or
    /// whitespace-only.
    pub fn normal(token: impl Into<String>) -> Result<Self, SqlScriptError> {
        Self::new(token, DelimiterStyle::Normal)
    }

    /// Shorthand for a `Line`-style delimiter.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError::ConfigError` if the token is empty or
    /// whitespace-only.
    pub fn line(token: impl Into<String>) -> Result<Self, SqlScriptError> {
        Self::new(token, DelimiterStyle::Line)
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn style(&self) -> DelimiterStyle {
        self.style
    }
}

/// Split script text into an ordered list of trimmed, non-empty statements.
///
/// `Normal` style splits on every literal occurrence of the token; `Line`
/// style closes a statement only on a line whose trimmed content equals the
/// token case-insensitively. A trailing delimiter is optional either way, and
/// the statements themselves pass through opaquely; no SQL parsing happens
/// here.
#[must_use]
pub fn split(text: &str, cfg: &DelimiterConfig) -> Vec<String> {
    match cfg.style {
        DelimiterStyle::Normal => text
            .split(cfg.token.as_str())
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string)
            .collect(),
        DelimiterStyle::Line => split_lines(text, cfg.token.trim()),
    }
}

fn split_lines(text: &str, token: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().eq_ignore_ascii_case(token) {
            flush(&mut current, &mut statements);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    flush(&mut current, &mut statements);

    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// Read a script file and split it.
///
/// # Errors
///
/// Returns `SqlScriptError::ConfigError` if the file cannot be read.
pub fn split_file(path: &Path, cfg: &DelimiterConfig) -> Result<Vec<String>, SqlScriptError> {
    Ok(split(&read_script(path)?, cfg))
}

/// Combine a script into one payload for a single batch execution call.
///
/// The configured delimiter tokens are removed (a single execution call must
/// not contain the script's own separators, e.g. a client-side `GO`) and the
/// statements are re-joined with the SQL statement terminator, so the payload
/// stays executable as one call with the same statement boundaries as
/// [`split`]. Combine is built directly on it, so the two modes can never
/// disagree on where a statement ends.
#[must_use]
pub fn combine(text: &str, cfg: &DelimiterConfig) -> String {
    split(text, cfg).join(";\n")
}

/// Read a script file and combine it into one batch payload.
///
/// # Errors
///
/// Returns `SqlScriptError::ConfigError` if the file cannot be read.
pub fn combine_file(path: &Path, cfg: &DelimiterConfig) -> Result<String, SqlScriptError> {
    Ok(combine(&read_script(path)?, cfg))
}

fn read_script(path: &Path) -> Result<String, SqlScriptError> {
    std::fs::read_to_string(path).map_err(|e| {
        SqlScriptError::ConfigError(format!("cannot read SQL script {}: {e}", path.display()))
    })
}
