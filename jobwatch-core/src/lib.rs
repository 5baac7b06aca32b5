/*!
# Jobwatch Core

Decision logic of the scheduled-job probe:
- `classify`: failed-job count → OK / WARNING / CRITICAL plus summary message
- `dedup`: per-host suppression of repeated alerts
- `history`: the keyed store holding each host's last reported message
- `source`: the data-source seam (SQL Server in production, stubs in tests)
- `check`: one full check cycle, every fatal error folded into UNKNOWN
*/

pub mod check;
pub mod classify;
pub mod dedup;
pub mod error;
pub mod history;
pub mod model;
pub mod source;

pub use check::{execute, CheckSettings, Probe};
pub use classify::{evaluate, Thresholds};
pub use dedup::reconcile;
pub use error::{CheckError, ConfigError, HistoryError, SourceError, TimestampError};
pub use history::{FileHistoryStore, HistoryStore, HostHistory};
pub use model::{
    render_run_timestamp, CheckResult, JobFilter, JobListing, JobOccurrence, JobOutcome,
    RunTimestamp, Severity,
};
pub use source::JobSource;
