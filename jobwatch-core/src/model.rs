//! Data model shared by the probe and its collaborators
//!
//! - `JobOccurrence`: most recent failed/canceled run of one job
//! - `Severity` / `CheckResult`: what gets reported to the scheduler
//! - `JobFilter`: include/exclude lists handed to the data source

use crate::error::{ConfigError, TimestampError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a check, in the monitoring scheduler's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Process exit code consumed by the scheduler. Fixed external contract.
    pub fn exit_code(self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// WARNING and CRITICAL page someone; OK and UNKNOWN do not count as alerts here.
    pub fn is_alert(self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity plus the human-readable message. Renders as the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub severity: Severity,
    pub message: String,
}

impl CheckResult {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(Severity::Unknown, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.severity.exit_code()
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.severity, self.message)
    }
}

/// Final state of a job run as recorded by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobOutcome {
    Failed,
    Canceled,
}

impl JobOutcome {
    /// Maps an agent `run_status` code; only failure codes are accepted.
    pub fn from_run_status(status: i32) -> Option<Self> {
        match status {
            0 => Some(JobOutcome::Failed),
            3 => Some(JobOutcome::Canceled),
            _ => None,
        }
    }
}

/// Agent run timestamp, built from the `YYYYMMDD` / `HHMMSS` integer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunTimestamp(NaiveDateTime);

impl RunTimestamp {
    pub fn from_agent(run_date: i32, run_time: i32) -> Result<Self, TimestampError> {
        if !(10_000_000..=99_999_999).contains(&run_date) {
            return Err(TimestampError::Date(run_date));
        }
        if !(0..=235_959).contains(&run_time) {
            return Err(TimestampError::Time(run_time));
        }

        let date = NaiveDate::from_ymd_opt(
            run_date / 10_000,
            (run_date / 100 % 100) as u32,
            (run_date % 100) as u32,
        )
        .ok_or(TimestampError::Date(run_date))?;

        let time = NaiveTime::from_hms_opt(
            (run_time / 10_000) as u32,
            (run_time / 100 % 100) as u32,
            (run_time % 100) as u32,
        )
        .ok_or(TimestampError::Time(run_time))?;

        Ok(Self(date.and_time(time)))
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for RunTimestamp {
    /// `MM/DD/YYYY HH:MM:SS`, no locale variation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%m/%d/%Y %H:%M:%S"))
    }
}

/// Renders an agent date/time pair as `MM/DD/YYYY HH:MM:SS`.
pub fn render_run_timestamp(run_date: i32, run_time: i32) -> Result<String, TimestampError> {
    RunTimestamp::from_agent(run_date, run_time).map(|ts| ts.to_string())
}

/// Most recent run of one monitored job, when that run failed or was canceled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOccurrence {
    job_name: String,
    run_date: i32,
    run_time: i32,
    last_run: RunTimestamp,
    outcome: JobOutcome,
}

impl JobOccurrence {
    pub fn new(
        job_name: impl Into<String>,
        run_date: i32,
        run_time: i32,
        outcome: JobOutcome,
    ) -> Result<Self, TimestampError> {
        let last_run = RunTimestamp::from_agent(run_date, run_time)?;
        Ok(Self {
            job_name: job_name.into(),
            run_date,
            run_time,
            last_run,
            outcome,
        })
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn run_date(&self) -> i32 {
        self.run_date
    }

    pub fn run_time(&self) -> i32 {
        self.run_time
    }

    pub fn last_run(&self) -> RunTimestamp {
        self.last_run
    }

    pub fn outcome(&self) -> JobOutcome {
        self.outcome
    }
}

impl fmt::Display for JobOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} last run at {}", self.job_name, self.last_run)
    }
}

/// One row of the listing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub name: String,
    pub enabled: bool,
}

/// Which jobs the data source should consider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobFilter {
    #[default]
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl JobFilter {
    /// Builds a filter from comma-separated lists. The include list wins when both are given.
    pub fn from_lists(include: Option<&str>, exclude: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(include) = include {
            if exclude.is_some() {
                tracing::warn!("both --job and --exclude given, ignoring --exclude");
            }
            return Ok(JobFilter::Include(split_names("job", include)?));
        }

        match exclude {
            Some(exclude) => Ok(JobFilter::Exclude(split_names("exclude", exclude)?)),
            None => Ok(JobFilter::All),
        }
    }

    pub fn names(&self) -> &[String] {
        match self {
            JobFilter::All => &[],
            JobFilter::Include(names) | JobFilter::Exclude(names) => names,
        }
    }
}

fn split_names(option: &'static str, list: &str) -> Result<Vec<String>, ConfigError> {
    let names: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(ConfigError::EmptyJobList(option));
    }
    Ok(names)
}
