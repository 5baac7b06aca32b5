//! check_mssql_job_history - SQL Server Agent job probe
//!
//! Invoked once per check cycle by the monitoring scheduler:
//! - prints exactly one `<SEVERITY> - <message>` line on stdout
//! - exits 0/1/2/3 for OK/WARNING/CRITICAL/UNKNOWN
//! - `--list` prints the job inventory instead and exits 0
//!
//! Logs go to stderr so they never mix with the status line.

mod cli;
mod config;
mod listing;
mod mssql;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use config::{ProbeConfig, Settings};
use jobwatch_core::{CheckResult, FileHistoryStore, HistoryStore, JobSource, Probe};
use mssql::MssqlSource;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        // clap would exit 2, which the scheduler reads as CRITICAL
        Err(e) => {
            eprintln!("{e}");
            return emit(&CheckResult::unknown(usage_error(&e)));
        }
    };

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => emit(&CheckResult::unknown(format!("{e:#}"))),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file = ProbeConfig::load(cli.config.as_deref()).context("Configuration error")?;
    let settings = Settings::resolve(cli, file);

    if settings.list_jobs {
        let mut source = MssqlSource::connect(&settings.connection).await?;
        let jobs = source.list_jobs().await?;
        print!("{}", listing::render(&settings.connection.host, &jobs));
        return Ok(ExitCode::SUCCESS);
    }

    // Validated before any connection or history access.
    let probe = Probe::new(&settings.check)?;
    let history = settings.history_dir.map(|dir| {
        debug!("alert history in {:?}", dir);
        FileHistoryStore::new(dir)
    });

    let mut source = MssqlSource::connect(&settings.connection).await?;
    let result = probe
        .run(&mut source, history.as_ref().map(|store| store as &dyn HistoryStore))
        .await
        .unwrap_or_else(|e| CheckResult::unknown(e.to_string()));

    info!("check finished for {}", probe.host_key());
    Ok(emit(&result))
}

fn emit(result: &CheckResult) -> ExitCode {
    println!("{result}");
    ExitCode::from(result.exit_code())
}

/// One-line form of a clap error, without the usage block.
fn usage_error(e: &clap::Error) -> String {
    let rendered = e.render().to_string();
    let summary = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("Usage:"))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let summary = summary.strip_prefix("error: ").unwrap_or(&summary);
    format!("Invalid arguments: {summary}")
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,{}={level},jobwatch_core={level}",
            env!("CARGO_CRATE_NAME")
        ))
    });

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_is_single_line() {
        let err = Cli::try_parse_from(["check_mssql_job_history", "-U", "u", "-P", "p"]).unwrap_err();
        let message = usage_error(&err);

        assert!(message.starts_with("Invalid arguments: "));
        assert!(message.contains("--host"));
        assert!(!message.contains('\n'));
        assert!(!message.contains("Usage:"));
    }
}
