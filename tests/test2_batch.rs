#![cfg(feature = "sqlite")]

use sql_script_runner::prelude::*;
use tempfile::TempDir;

fn batch_config(dir: &TempDir, db_path: &str, script: &str) -> ScriptConfig {
    ScriptConfig::new(
        DatabaseType::Sqlite,
        db_path,
        DelimiterConfig::normal(";").expect("valid delimiter"),
    )
    .with_inline(script)
    .with_output(dir.path().join("results.txt"))
}

fn count_rows(db_path: &str) -> Result<i64, rusqlite::Error> {
    let conn = rusqlite::Connection::open(db_path)?;
    conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
}

#[test]
fn batch_executes_the_whole_script_in_one_call() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("batch.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");

        let script = "CREATE TABLE t (id INTEGER);\
            INSERT INTO t (id) VALUES (1);\
            INSERT INTO t (id) VALUES (2);";
        let outcome = ScriptRunner::new(batch_config(&dir, db_path, script))
            .run()
            .await?;

        // One combined call, two rows touched.
        assert_eq!(outcome.statements_executed, 1);
        assert_eq!(outcome.rows_affected, 2);
        assert_eq!(count_rows(db_path)?, 2);
        Ok(())
    })
}

#[test]
fn failing_batch_rolls_back_and_fails_the_task() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("batch_rollback.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");

        let setup = "CREATE TABLE t (id INTEGER); INSERT INTO t (id) VALUES (1);";
        ScriptRunner::new(batch_config(&dir, db_path, setup))
            .run()
            .await?;

        // The first insert of the payload succeeds before the failure, so a
        // rollback is the only thing keeping the run all-or-nothing.
        let bad = "INSERT INTO t (id) VALUES (10); INSERT INTO missing (id) VALUES (11);";
        let err = ScriptRunner::new(batch_config(&dir, db_path, bad))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, SqlScriptError::ExecutionError(_)));

        assert_eq!(count_rows(db_path)?, 1);
        Ok(())
    })
}

#[test]
fn without_a_transaction_a_failing_batch_keeps_earlier_work()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("batch_no_tx.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");

        let setup = "CREATE TABLE t (id INTEGER);";
        ScriptRunner::new(batch_config(&dir, db_path, setup))
            .run()
            .await?;

        let bad = "INSERT INTO t (id) VALUES (10); INSERT INTO missing (id) VALUES (11);";
        let err = ScriptRunner::new(batch_config(&dir, db_path, bad).with_transaction(false))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, SqlScriptError::ExecutionError(_)));

        // No transaction was requested, so the statement that ran stays.
        assert_eq!(count_rows(db_path)?, 1);
        Ok(())
    })
}

#[test]
fn empty_script_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("empty.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");

        let outcome = ScriptRunner::new(batch_config(&dir, db_path, " ; ; "))
            .run()
            .await?;
        assert_eq!(outcome.statements_executed, 0);
        assert_eq!(outcome.rows_affected, 0);
        Ok(())
    })
}
