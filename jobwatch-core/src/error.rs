use std::time::Duration;

/// Invalid probe configuration, detected before any data or history access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("warning threshold ({warning}) must be lower than critical threshold ({critical})")]
    Thresholds { warning: u32, critical: u32 },
    #[error("--{0} was given but lists no job names")]
    EmptyJobList(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Agent date/time values that cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("run_date {0} is not a valid YYYYMMDD value")]
    Date(i32),
    #[error("run_time {0} is not a valid HHMMSS value")]
    Time(i32),
}

/// Failure reported by the job data source. Opaque to the classifier.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Unable to connect to SQL Server: {0}")]
    Connection(String),
    #[error("timed out after {secs}s while {stage}", secs = .after.as_secs())]
    Timeout { after: Duration, stage: &'static str },
    #[error("query failed: {0}")]
    Query(String),
    #[error("malformed job history row for {job}: {source}")]
    MalformedRow {
        job: String,
        #[source]
        source: TimestampError,
    },
}

/// History store failures. Never escalated past the deduplicator.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

/// Fatal check failures; all of them are reported as UNKNOWN.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
}
