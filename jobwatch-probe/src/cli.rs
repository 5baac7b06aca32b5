use clap::Parser;
use std::path::PathBuf;

/// Check a SQL Server for failed jobs. Results are based on the state of the
/// last run of every enabled job, or of the jobs named with --job.
#[derive(Debug, Parser)]
#[command(name = "check_mssql_job_history")]
#[command(version)]
pub struct Cli {
    /// Host name or IP address to connect to
    #[arg(short = 'H', long)]
    pub host: String,

    /// SQL Server port number
    #[arg(short, long)]
    pub port: Option<u16>,

    /// User name to connect as (SQL Server authentication)
    #[arg(short = 'U', long, env = "MSSQL_USER")]
    pub user: String,

    /// Password for the user you are authenticating as
    #[arg(short = 'P', long, env = "MSSQL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Failed jobs before a warning alert is generated [default: 0]
    #[arg(short, long)]
    pub warning: Option<u32>,

    /// Failed jobs before a critical alert is generated [default: 1]
    #[arg(short, long)]
    pub critical: Option<u32>,

    /// Timeout for connection and login in seconds [default: 60]
    #[arg(short = 't', long = "timeout", value_name = "SECS")]
    pub login_timeout: Option<u64>,

    /// Query timeout in seconds [default: 60]
    #[arg(long, value_name = "SECS")]
    pub query_timeout: Option<u64>,

    /// Comma separated list of jobs to check instead of all enabled jobs
    #[arg(short, long, value_name = "JOBS")]
    pub job: Option<String>,

    /// Comma separated list of jobs not to check (ignored with --job)
    #[arg(short = 'x', long, value_name = "JOBS")]
    pub exclude: Option<String>,

    /// List all jobs on the server instead of running a check
    #[arg(short, long)]
    pub list: bool,

    /// Log the T-SQL being executed (to stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress repeat alerts for an unchanged failure
    #[arg(long)]
    pub history: bool,

    /// Directory holding the per-host alert history
    #[arg(long, value_name = "DIR")]
    pub history_dir: Option<PathBuf>,

    /// Accept the server certificate without validation
    #[arg(long)]
    pub trust_cert: bool,

    /// Configuration file [default: <config dir>/jobwatch/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "check_mssql_job_history",
            "-H", "sql01", "-U", "monitor", "-P", "secret",
            "-w", "2", "-c", "4", "-t", "5", "-j", "Backup,Reindex", "-v",
        ])
        .unwrap();

        assert_eq!(cli.host, "sql01");
        assert_eq!(cli.warning, Some(2));
        assert_eq!(cli.critical, Some(4));
        assert_eq!(cli.login_timeout, Some(5));
        assert_eq!(cli.job.as_deref(), Some("Backup,Reindex"));
        assert!(cli.verbose);
        assert!(!cli.history);
    }

    #[test]
    fn test_host_is_required() {
        let err = Cli::try_parse_from(["check_mssql_job_history", "-U", "u", "-P", "p"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
