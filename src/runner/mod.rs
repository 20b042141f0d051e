// Execution orchestration: the only component that touches the connection.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::ScriptConfig;
use crate::connection::{ScriptConnection, connect};
use crate::error::SqlScriptError;
use crate::format::write_result_sets;
use crate::script::{combine, expand, split};

mod outcome;

pub use outcome::{RunOutcome, StatementOutcome};

/// Drives one script run: prepare, execute (batch or per-statement), commit
/// or roll back, release.
///
/// The two execution modes deliberately differ in failure policy: a batch is
/// one call and any failure is fatal, while per-statement mode logs the
/// failing statement and keeps going so a script with a known-unsafe
/// statement does not halt the rest (unless `fail_on_error` is set).
pub struct ScriptRunner {
    config: ScriptConfig,
}

impl ScriptRunner {
    #[must_use]
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }

    /// Open the sink and connection from the configuration, then run.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError` on any fatal condition per the task's error
    /// policy; per-statement failures under the lenient policy are counted in
    /// the returned outcome instead.
    pub async fn run(&self) -> Result<RunOutcome, SqlScriptError> {
        let sink = open_sink(self.config.output.as_deref())?;
        let conn = connect(&self.config.database, &self.config.connection_string).await?;
        self.run_with(conn, sink).await
    }

    /// Run against a caller-supplied connection and sink.
    ///
    /// This is the seam tests use to observe output and substitute
    /// connections; [`run`](Self::run) delegates here after preparing both
    /// handles. The connection and sink are owned for the duration of the run
    /// and released on every exit path when they drop.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError` on any fatal condition per the task's error
    /// policy.
    pub async fn run_with(
        &self,
        mut conn: Box<dyn ScriptConnection>,
        mut sink: Box<dyn Write + Send>,
    ) -> Result<RunOutcome, SqlScriptError> {
        let text = self.config.resolve_source()?;
        let script = if self.config.expand_properties {
            expand(&text, self.config.properties.as_ref())?
        } else {
            Cow::Borrowed(text.as_str())
        };

        if self.config.use_transaction {
            conn.begin().await?;
        }

        let result = match self.execute_script(conn.as_mut(), sink.as_mut(), &script).await {
            Ok(outcome) => sink.flush().map(|()| outcome).map_err(SqlScriptError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                if self.config.use_transaction {
                    conn.commit().await?;
                }
                tracing::info!(
                    executed = outcome.statements_executed,
                    failed = outcome.statements_failed,
                    rows_affected = outcome.rows_affected,
                    "script run complete"
                );
                Ok(outcome)
            }
            Err(e) => {
                if self.config.use_transaction
                    && let Err(rollback_err) = conn.rollback().await
                {
                    tracing::warn!(error = %rollback_err, "rollback after failed run also failed");
                }
                Err(e)
            }
        }
    }

    async fn execute_script(
        &self,
        conn: &mut dyn ScriptConnection,
        sink: &mut dyn Write,
        script: &str,
    ) -> Result<RunOutcome, SqlScriptError> {
        if self.config.batch {
            self.execute_batch(conn, sink, script).await
        } else {
            self.execute_statements(conn, sink, script).await
        }
    }

    /// Batch mode: one execution call with the combined payload. There is no
    /// partial-success notion here; any failure fails the whole task.
    async fn execute_batch(
        &self,
        conn: &mut dyn ScriptConnection,
        sink: &mut dyn Write,
        script: &str,
    ) -> Result<RunOutcome, SqlScriptError> {
        let payload = combine(script, &self.config.delimiter);
        if payload.is_empty() {
            return Ok(RunOutcome::default());
        }
        if self.config.print {
            tracing::info!(sql = %payload, "executing batch");
        }

        match run_statement(conn, &payload).await {
            StatementOutcome::Succeeded { result_sets } => {
                let rows_affected = write_result_sets(&result_sets, sink)?;
                forward_messages(conn, sink)?;
                Ok(RunOutcome {
                    statements_executed: 1,
                    statements_failed: 0,
                    rows_affected,
                })
            }
            StatementOutcome::Failed { message } => {
                forward_messages(conn, sink)?;
                Err(SqlScriptError::ExecutionError(format!(
                    "batch execution failed: {message}"
                )))
            }
        }
    }

    /// Per-statement mode: each statement gets its own call; failures are
    /// logged with the offending statement text and execution continues.
    async fn execute_statements(
        &self,
        conn: &mut dyn ScriptConnection,
        sink: &mut dyn Write,
        script: &str,
    ) -> Result<RunOutcome, SqlScriptError> {
        let statements = split(script, &self.config.delimiter);
        let mut outcome = RunOutcome::default();

        for statement in &statements {
            if self.config.print {
                tracing::info!(sql = %statement, "executing statement");
            }
            match run_statement(conn, statement).await {
                StatementOutcome::Succeeded { result_sets } => {
                    outcome.statements_executed += 1;
                    let affected = write_result_sets(&result_sets, sink)?;
                    outcome.rows_affected += affected;
                    if self.config.print {
                        tracing::info!(rows_affected = affected, "statement complete");
                    }
                }
                StatementOutcome::Failed { message } => {
                    tracing::error!(error = %message, sql = %statement, "statement failed");
                    if self.config.fail_on_error {
                        return Err(SqlScriptError::ExecutionError(format!(
                            "statement failed: {message}; statement was: {statement}"
                        )));
                    }
                    outcome.statements_failed += 1;
                }
            }
            forward_messages(conn, sink)?;
        }

        Ok(outcome)
    }
}

async fn run_statement(conn: &mut dyn ScriptConnection, sql: &str) -> StatementOutcome {
    match conn.execute(sql).await {
        Ok(result_sets) => StatementOutcome::Succeeded { result_sets },
        Err(e) => StatementOutcome::Failed {
            message: e.to_string(),
        },
    }
}

/// Forward queued server messages verbatim to both the sink and the log.
fn forward_messages(
    conn: &mut dyn ScriptConnection,
    sink: &mut dyn Write,
) -> Result<(), SqlScriptError> {
    for message in conn.drain_messages() {
        writeln!(sink, "{message}")?;
        tracing::info!(server_message = %message);
    }
    Ok(())
}

fn open_sink(output: Option<&Path>) -> Result<Box<dyn Write + Send>, SqlScriptError> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SqlScriptError::ConfigError(format!(
                    "cannot open output file {}: {e}",
                    path.display()
                ))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
