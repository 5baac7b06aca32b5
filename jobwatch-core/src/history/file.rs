use super::{HistoryStore, HostHistory};
use crate::error::HistoryError;
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// History kept as one JSON file per host under a directory.
///
/// Writes land in a temp file in the same directory and are renamed over the
/// record, so readers see either the old or the new baseline.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record path for a host. Characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn record_path(&self, host_key: &str) -> PathBuf {
        let file_name: String = host_key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }

    fn load(&self, host_key: &str) -> Result<HostHistory, HistoryError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.record_path(host_key);

        if !path.exists() {
            let record = HostHistory::empty(host_key);
            self.save(&record)?;
            debug!("created empty history record at {:?}", path);
            return Ok(record);
        }

        let content = fs::read_to_string(&path)?;
        match serde_json::from_str::<HostHistory>(&content) {
            Ok(record) if record.host_key == host_key => Ok(record),
            Ok(record) => {
                warn!(
                    "history record {:?} belongs to {}, treating as empty",
                    path, record.host_key
                );
                Ok(HostHistory::empty(host_key))
            }
            Err(e) => {
                warn!("unreadable history record {:?}: {}, treating as empty", path, e);
                Ok(HostHistory::empty(host_key))
            }
        }
    }

    fn save(&self, record: &HostHistory) -> Result<(), HistoryError> {
        let path = self.record_path(&record.host_key);
        let json = serde_json::to_string_pretty(record)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| HistoryError::Io(e.error))?;
        Ok(())
    }
}

impl HistoryStore for FileHistoryStore {
    fn last_message(&self, host_key: &str) -> Result<String, HistoryError> {
        self.load(host_key).map(|record| record.last_message)
    }

    fn record(&self, host_key: &str, message: &str) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir)?;
        let record = HostHistory {
            host_key: host_key.to_string(),
            last_message: message.to_string(),
            updated_at: Some(Utc::now()),
        };
        self.save(&record)?;
        debug!("history for {} updated", host_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_access_creates_dir_and_empty_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(tmp.path().join("nested/history"));

        assert_eq!(store.last_message("sql01").unwrap(), "");
        let path = store.record_path("sql01");
        assert!(path.exists());

        let record: HostHistory =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(record, HostHistory::empty("sql01"));
    }

    #[test]
    fn test_record_then_read_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(tmp.path());

        store.record("sql01", "Number of failed jobs: 1").unwrap();
        assert_eq!(store.last_message("sql01").unwrap(), "Number of failed jobs: 1");
        assert_eq!(store.last_message("sql02").unwrap(), "");
    }

    #[test]
    fn test_record_path_is_sanitised() {
        let store = FileHistoryStore::new("/var/lib/jobwatch");
        assert_eq!(
            store.record_path("sql01.corp:1444"),
            PathBuf::from("/var/lib/jobwatch/sql01.corp_1444.json")
        );
        assert_eq!(
            store.record_path("../etc/passwd"),
            PathBuf::from("/var/lib/jobwatch/.._etc_passwd.json")
        );
    }

    #[test]
    fn test_colliding_record_is_treated_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(tmp.path());

        store.record("sql01:1444", "old failure").unwrap();
        assert_eq!(store.record_path("sql01:1444"), store.record_path("sql01_1444"));
        assert_eq!(store.last_message("sql01_1444").unwrap(), "");
        assert_eq!(store.last_message("sql01:1444").unwrap(), "old failure");
    }

    #[test]
    fn test_corrupt_record_is_treated_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(tmp.path());
        fs::write(store.record_path("sql01"), "{not json").unwrap();

        assert_eq!(store.last_message("sql01").unwrap(), "");
        store.record("sql01", "recovered").unwrap();
        assert_eq!(store.last_message("sql01").unwrap(), "recovered");
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_location_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let store = FileHistoryStore::new(blocker.join("history"));

        assert!(store.last_message("sql01").is_err());
        assert!(store.record("sql01", "msg").is_err());
    }
}
