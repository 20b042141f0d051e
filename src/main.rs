use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sql_script_runner::prelude::*;

/// Run a delimited SQL script against a database.
#[derive(Parser, Debug)]
#[command(name = "sql-script-runner", version, about)]
struct Cli {
    /// Database backend to connect to.
    #[arg(long, value_enum)]
    database: DatabaseType,

    /// Connection string, passed through to the backend driver.
    #[arg(long)]
    connect: String,

    /// SQL script file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Inline SQL text; wins over --file when non-empty.
    #[arg(long)]
    sql: Option<String>,

    /// Statement delimiter token.
    #[arg(long, default_value = ";")]
    delimiter: String,

    /// How the delimiter is recognized.
    #[arg(long, value_enum, default_value = "normal")]
    delimiter_style: DelimiterStyle,

    /// Execute each statement separately instead of one combined batch.
    #[arg(long)]
    no_batch: bool,

    /// Run without a wrapping transaction.
    #[arg(long)]
    no_transaction: bool,

    /// Disable ${name} property expansion.
    #[arg(long)]
    no_expand: bool,

    /// Abort on the first failing statement in per-statement mode.
    #[arg(long)]
    fail_on_error: bool,

    /// Echo statements and result summaries to the log.
    #[arg(long)]
    print: bool,

    /// Write result text to this file instead of the console.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Property value for ${name} expansion, as name=value (repeatable).
    #[arg(long = "property", value_parser = parse_property)]
    property: Vec<(String, String)>,

    /// JSON file holding a string-to-string property map.
    #[arg(long)]
    properties: Option<PathBuf>,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

fn load_properties(cli: &Cli) -> Result<Option<HashMap<String, String>>, SqlScriptError> {
    let mut map: HashMap<String, String> = HashMap::new();
    if let Some(path) = &cli.properties {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SqlScriptError::ConfigError(format!(
                "cannot read properties file {}: {e}",
                path.display()
            ))
        })?;
        map = serde_json::from_str(&raw).map_err(|e| {
            SqlScriptError::ConfigError(format!(
                "invalid properties file {}: {e}",
                path.display()
            ))
        })?;
    }
    // Command-line pairs override the file.
    for (name, value) in &cli.property {
        map.insert(name.clone(), value.clone());
    }
    Ok(if map.is_empty() { None } else { Some(map) })
}

async fn run(cli: Cli) -> Result<RunOutcome, SqlScriptError> {
    let delimiter = DelimiterConfig::new(cli.delimiter.clone(), cli.delimiter_style)?;
    let properties = load_properties(&cli)?;

    let mut config = ScriptConfig::new(cli.database.clone(), cli.connect.clone(), delimiter)
        .with_batch(!cli.no_batch)
        .with_transaction(!cli.no_transaction)
        .with_expand_properties(!cli.no_expand)
        .with_fail_on_error(cli.fail_on_error)
        .with_print(cli.print);
    if let Some(sql) = cli.sql {
        config = config.with_inline(sql);
    }
    if let Some(file) = cli.file {
        config = config.with_source(file);
    }
    if let Some(output) = cli.output {
        config = config.with_output(output);
    }
    if let Some(properties) = properties {
        config = config.with_properties(properties);
    }

    ScriptRunner::new(config).run().await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(outcome) => {
            if outcome.statements_failed > 0 {
                tracing::warn!(
                    failed = outcome.statements_failed,
                    "script finished with failed statements"
                );
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "sql script task failed");
            std::process::exit(1);
        }
    }
}
