//! Per-host alert history
//!
//! One record per monitored host holding the last message that was reported.
//! `HistoryStore` is the keyed text store the deduplicator talks to; the file
//! implementation lives in `file`.

mod file;

pub use file::FileHistoryStore;

use crate::error::HistoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted baseline for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostHistory {
    pub host_key: String,
    pub last_message: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl HostHistory {
    pub fn empty(host_key: &str) -> Self {
        Self {
            host_key: host_key.to_string(),
            last_message: String::new(),
            updated_at: None,
        }
    }
}

/// Keyed, text-valued store addressed by host identifier.
pub trait HistoryStore {
    /// Last stored message for `host_key`, or an empty string.
    ///
    /// Implementations create their backing location and an empty record
    /// for the host when either is missing.
    fn last_message(&self, host_key: &str) -> Result<String, HistoryError>;

    /// Replaces the stored message for `host_key`.
    fn record(&self, host_key: &str, message: &str) -> Result<(), HistoryError>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for &S {
    fn last_message(&self, host_key: &str) -> Result<String, HistoryError> {
        (**self).last_message(host_key)
    }

    fn record(&self, host_key: &str, message: &str) -> Result<(), HistoryError> {
        (**self).record(host_key, message)
    }
}
