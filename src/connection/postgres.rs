use std::future::poll_fn;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_postgres::{AsyncMessage, Client, NoTls, SimpleQueryMessage};

use crate::error::SqlScriptError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::ScriptConnection;

/// `PostgreSQL` connection adapter.
///
/// Server notices (`RAISE NOTICE`, etc.) arrive asynchronously on the
/// connection task and are queued on a channel; the runner drains them after
/// each execution, preserving their order relative to result-set output.
pub struct PostgresScriptConnection {
    client: Client,
    messages: mpsc::UnboundedReceiver<String>,
}

impl PostgresScriptConnection {
    /// Connect with a `tokio-postgres` connection string.
    ///
    /// # Errors
    ///
    /// Returns `SqlScriptError::PostgresError` if the connection cannot be
    /// established.
    pub async fn connect(connection_string: &str) -> Result<Self, SqlScriptError> {
        let (client, mut connection) = tokio_postgres::connect(connection_string, NoTls).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Drive the connection and forward notices until the client drops.
        tokio::spawn(async move {
            loop {
                match poll_fn(|cx| connection.poll_message(cx)).await {
                    Some(Ok(AsyncMessage::Notice(notice))) => {
                        let _ = tx.send(notice.message().to_string());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "postgres connection task ended");
                        break;
                    }
                    None => break,
                }
            }
        });

        Ok(Self {
            client,
            messages: rx,
        })
    }
}

#[async_trait]
impl ScriptConnection for PostgresScriptConnection {
    async fn execute(&mut self, sql: &str) -> Result<Vec<ResultSet>, SqlScriptError> {
        let messages = self.client.simple_query(sql).await?;

        let mut result_sets = Vec::new();
        let mut current: Option<ResultSet> = None;
        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    if let Some(set) = current.take() {
                        result_sets.push(set);
                    }
                    let names = columns
                        .iter()
                        .map(|column| column.name().to_string())
                        .collect();
                    current = Some(ResultSet::with_columns(names));
                }
                SimpleQueryMessage::Row(row) => {
                    let set = current.get_or_insert_with(|| {
                        ResultSet::with_columns(
                            row.columns()
                                .iter()
                                .map(|column| column.name().to_string())
                                .collect(),
                        )
                    });
                    let mut values = Vec::with_capacity(row.len());
                    for idx in 0..row.len() {
                        values.push(match row.get(idx) {
                            Some(text) => RowValues::Text(text.to_string()),
                            None => RowValues::Null,
                        });
                    }
                    set.add_row_values(values);
                }
                SimpleQueryMessage::CommandComplete(affected) => match current.take() {
                    Some(set) => result_sets.push(set),
                    None => result_sets.push(ResultSet::from_dml(affected as usize)),
                },
                _ => {}
            }
        }
        if let Some(set) = current.take() {
            result_sets.push(set);
        }

        Ok(result_sets)
    }

    async fn begin(&mut self) -> Result<(), SqlScriptError> {
        self.client.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), SqlScriptError> {
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), SqlScriptError> {
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }

    fn drain_messages(&mut self) -> Vec<String> {
        let mut drained = Vec::new();
        while let Ok(message) = self.messages.try_recv() {
            drained.push(message);
        }
        drained
    }
}
