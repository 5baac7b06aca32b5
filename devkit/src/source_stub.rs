/*!
Stub job source for running checks without a SQL Server.

Returns whatever rows (or failure) it was primed with and records every
filter it was asked for.
*/

use async_trait::async_trait;
use jobwatch_core::{JobFilter, JobListing, JobOccurrence, JobOutcome, SourceError};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Primed {
    Rows(Vec<JobOccurrence>),
    ConnectionLost(String),
}

/// Job source returning canned data. Clones share the call log.
#[derive(Debug, Clone)]
pub struct StubJobSource {
    primed: Arc<Mutex<Primed>>,
    listing: Arc<Mutex<Vec<JobListing>>>,
    requests: Arc<Mutex<Vec<JobFilter>>>,
}

impl StubJobSource {
    pub fn new() -> Self {
        Self {
            primed: Arc::new(Mutex::new(Primed::Rows(Vec::new()))),
            listing: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Primes a failed run; panics on a malformed date/time since that is a test bug.
    pub fn with_failure(self, job: &str, run_date: i32, run_time: i32) -> Self {
        self.push(job, run_date, run_time, JobOutcome::Failed);
        self
    }

    pub fn with_cancellation(self, job: &str, run_date: i32, run_time: i32) -> Self {
        self.push(job, run_date, run_time, JobOutcome::Canceled);
        self
    }

    pub fn with_listing(self, name: &str, enabled: bool) -> Self {
        self.listing.lock().push(JobListing {
            name: name.to_string(),
            enabled,
        });
        self
    }

    /// Replaces the primed rows, e.g. between two checks of a scenario.
    pub fn set_rows(&self, rows: Vec<JobOccurrence>) {
        *self.primed.lock() = Primed::Rows(rows);
    }

    pub fn clear(&self) {
        self.set_rows(Vec::new());
    }

    /// Makes every following query fail.
    pub fn fail_with(&self, reason: &str) {
        *self.primed.lock() = Primed::ConnectionLost(reason.to_string());
    }

    /// Number of failed-job queries served so far.
    pub fn query_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requested_filters(&self) -> Vec<JobFilter> {
        self.requests.lock().clone()
    }

    fn push(&self, job: &str, run_date: i32, run_time: i32, outcome: JobOutcome) {
        let occurrence = JobOccurrence::new(job, run_date, run_time, outcome)
            .unwrap_or_else(|e| panic!("bad stub row for {job}: {e}"));

        let mut primed = self.primed.lock();
        match &mut *primed {
            Primed::Rows(rows) => rows.push(occurrence),
            lost => *lost = Primed::Rows(vec![occurrence]),
        }
    }
}

impl Default for StubJobSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl jobwatch_core::JobSource for StubJobSource {
    async fn failed_jobs(&mut self, filter: &JobFilter) -> Result<Vec<JobOccurrence>, SourceError> {
        self.requests.lock().push(filter.clone());
        tracing::debug!("[stub] failed_jobs({:?})", filter);

        match &*self.primed.lock() {
            Primed::Rows(rows) => Ok(rows
                .iter()
                .filter(|row| match filter {
                    JobFilter::All => true,
                    JobFilter::Include(names) => names.iter().any(|n| n == row.job_name()),
                    JobFilter::Exclude(names) => !names.iter().any(|n| n == row.job_name()),
                })
                .cloned()
                .collect()),
            Primed::ConnectionLost(reason) => Err(SourceError::Connection(reason.clone())),
        }
    }

    async fn list_jobs(&mut self) -> Result<Vec<JobListing>, SourceError> {
        Ok(self.listing.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobwatch_core::JobSource;

    #[tokio::test]
    async fn test_stub_applies_filters() {
        let mut source = StubJobSource::new()
            .with_failure("Backup", 20111031, 90530)
            .with_cancellation("Reindex", 20230101, 0);

        let all = source.failed_jobs(&JobFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_backup = source
            .failed_jobs(&JobFilter::Include(vec!["Backup".into()]))
            .await
            .unwrap();
        assert_eq!(only_backup.len(), 1);
        assert_eq!(only_backup[0].job_name(), "Backup");

        let without_backup = source
            .failed_jobs(&JobFilter::Exclude(vec!["Backup".into()]))
            .await
            .unwrap();
        assert_eq!(without_backup[0].outcome(), JobOutcome::Canceled);

        assert_eq!(source.query_count(), 3);
    }

    #[tokio::test]
    async fn test_stub_failure() {
        let mut source = StubJobSource::new();
        source.fail_with("login failed for user 'monitor'");

        let err = source.failed_jobs(&JobFilter::All).await.unwrap_err();
        assert!(err.to_string().contains("login failed"));
    }

    #[tokio::test]
    async fn test_stub_listing() {
        let mut source = StubJobSource::new()
            .with_listing("Backup", true)
            .with_listing("Legacy ETL", false);

        let jobs = source.list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(!jobs[1].enabled);
        assert_eq!(source.query_count(), 0);
    }
}
