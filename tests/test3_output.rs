#![cfg(feature = "sqlite")]

use sql_script_runner::format::RULE_WIDTH;
use sql_script_runner::prelude::*;
use tempfile::TempDir;

#[test]
fn result_file_carries_headers_rules_and_counts() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("output.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");
        let output = dir.path().join("results.txt");

        let script = "CREATE TABLE t (id INTEGER);\
            INSERT INTO t (id) VALUES (1);\
            SELECT id FROM t;";
        let config = ScriptConfig::new(
            DatabaseType::Sqlite,
            db_path,
            DelimiterConfig::normal(";")?,
        )
        .with_inline(script)
        .with_batch(false)
        .with_output(&output);
        ScriptRunner::new(config).run().await?;

        let text = std::fs::read_to_string(&output)?;
        let expected = format!(
            "0 row(s) affected\n1 row(s) affected\nid\n{}\n1\n\n",
            "-".repeat(RULE_WIDTH)
        );
        assert_eq!(text, expected);
        Ok(())
    })
}

#[test]
fn line_style_script_runs_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("line_style.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");
        let output = dir.path().join("results.txt");

        let script = "CREATE TABLE go_t (id INTEGER)\nGO\n\
            INSERT INTO go_t (id) VALUES (1)\ngo\n\
            SELECT id FROM go_t\nGO";
        let config = ScriptConfig::new(DatabaseType::Sqlite, db_path, DelimiterConfig::line("GO")?)
            .with_inline(script)
            .with_batch(false)
            .with_output(&output);
        let outcome = ScriptRunner::new(config).run().await?;
        assert!(outcome.is_clean());
        assert_eq!(outcome.statements_executed, 3);

        let text = std::fs::read_to_string(&output)?;
        assert!(text.contains("id\n"));
        assert!(text.contains("\n1\n"));
        Ok(())
    })
}

#[test]
fn script_file_source_is_read_when_no_inline_text() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("from_file.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");
        let script_path = dir.path().join("script.sql");
        std::fs::write(
            &script_path,
            "CREATE TABLE t (id INTEGER);\nINSERT INTO t (id) VALUES (9);\n",
        )?;

        let config = ScriptConfig::new(
            DatabaseType::Sqlite,
            db_path,
            DelimiterConfig::normal(";")?,
        )
        .with_source(&script_path)
        .with_output(dir.path().join("results.txt"));
        let outcome = ScriptRunner::new(config).run().await?;
        assert_eq!(outcome.rows_affected, 1);

        let mut conn = connect(&DatabaseType::Sqlite, db_path).await?;
        let sets = conn.execute("SELECT id FROM t").await?;
        assert_eq!(sets[0].rows[0].get_by_index(0), Some(&RowValues::Int(9)));
        Ok(())
    })
}

/// Sink that stays observable after the runner consumes its clone.
#[derive(Clone, Default)]
struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("sink lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn run_with_accepts_caller_supplied_connection_and_sink()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let sink = SharedBuf::default();
        let conn = connect(&DatabaseType::Sqlite, ":memory:").await?;

        let config = ScriptConfig::new(
            DatabaseType::Sqlite,
            ":memory:",
            DelimiterConfig::normal(";")?,
        )
        .with_inline("SELECT 1 AS one;")
        .with_batch(false);
        let outcome = ScriptRunner::new(config)
            .run_with(conn, Box::new(sink.clone()))
            .await?;
        assert_eq!(outcome.statements_executed, 1);

        let text = String::from_utf8(sink.0.lock().expect("sink lock").clone())?;
        assert!(text.starts_with("one\n"));
        assert!(text.contains("\n1\n"));
        Ok(())
    })
}

#[test]
fn unwritable_output_path_fails_before_executing() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let dir = TempDir::new()?;
        let db_path = dir.path().join("unwritable.db");
        let db_path = db_path.to_str().expect("utf-8 temp path");

        let config = ScriptConfig::new(
            DatabaseType::Sqlite,
            db_path,
            DelimiterConfig::normal(";")?,
        )
        .with_inline("CREATE TABLE t (id INTEGER);")
        .with_output(dir.path().join("no/such/dir/results.txt"));
        let err = ScriptRunner::new(config).run().await.unwrap_err();
        assert!(matches!(err, SqlScriptError::ConfigError(_)));
        Ok(())
    })
}
