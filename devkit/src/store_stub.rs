/*!
History stores for tests: an in-memory map and a store that always fails.
*/

use jobwatch_core::{HistoryError, HistoryStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory history. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    records: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a baseline without counting it as a write.
    pub fn with_baseline(self, host_key: &str, message: &str) -> Self {
        self.records.lock().insert(host_key.to_string(), message.to_string());
        self
    }

    /// Stored message, `None` when the host was never seen.
    pub fn stored(&self, host_key: &str) -> Option<String> {
        self.records.lock().get(host_key).cloned()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn last_message(&self, host_key: &str) -> Result<String, HistoryError> {
        Ok(self
            .records
            .lock()
            .entry(host_key.to_string())
            .or_default()
            .clone())
    }

    fn record(&self, host_key: &str, message: &str) -> Result<(), HistoryError> {
        self.records.lock().insert(host_key.to_string(), message.to_string());
        *self.writes.lock() += 1;
        Ok(())
    }
}

/// Which side of the read-modify-write should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Read,
    Write,
}

/// History store simulating a full disk or missing permissions.
#[derive(Debug, Clone)]
pub struct FailingHistoryStore {
    mode: FailureMode,
    inner: MemoryHistoryStore,
}

impl FailingHistoryStore {
    pub fn on_read() -> Self {
        Self::new(FailureMode::Read)
    }

    /// Reads succeed from `inner`; only writes fail.
    pub fn on_write(inner: MemoryHistoryStore) -> Self {
        Self {
            mode: FailureMode::Write,
            inner,
        }
    }

    fn new(mode: FailureMode) -> Self {
        Self {
            mode,
            inner: MemoryHistoryStore::new(),
        }
    }
}

impl HistoryStore for FailingHistoryStore {
    fn last_message(&self, host_key: &str) -> Result<String, HistoryError> {
        match self.mode {
            FailureMode::Read => Err(HistoryError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            ))),
            FailureMode::Write => self.inner.last_message(host_key),
        }
    }

    fn record(&self, _host_key: &str, _message: &str) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("no space left on device".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_creates_empty_record_on_read() {
        let store = MemoryHistoryStore::new();
        assert_eq!(store.stored("sql01"), None);
        assert_eq!(store.last_message("sql01").unwrap(), "");
        assert_eq!(store.stored("sql01"), Some(String::new()));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_failing_store_modes() {
        assert!(FailingHistoryStore::on_read().last_message("sql01").is_err());

        let inner = MemoryHistoryStore::new().with_baseline("sql01", "M");
        let store = FailingHistoryStore::on_write(inner);
        assert_eq!(store.last_message("sql01").unwrap(), "M");
        assert!(store.record("sql01", "N").is_err());
    }
}
