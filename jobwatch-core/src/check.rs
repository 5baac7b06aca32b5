//! One check cycle: validate settings, fetch failures, classify, deduplicate.

use crate::classify::{evaluate, Thresholds};
use crate::dedup::reconcile;
use crate::error::{CheckError, ConfigError};
use crate::history::HistoryStore;
use crate::model::{CheckResult, JobFilter};
use crate::source::JobSource;
use tracing::{debug, info};

/// Raw settings as they come from the command line / config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSettings {
    pub host_key: String,
    pub warning: u32,
    pub critical: u32,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

/// A validated check, ready to run against a source.
#[derive(Debug, Clone)]
pub struct Probe {
    host_key: String,
    thresholds: Thresholds,
    filter: JobFilter,
}

impl Probe {
    pub fn new(settings: &CheckSettings) -> Result<Self, ConfigError> {
        let thresholds = Thresholds::new(settings.warning, settings.critical)?;
        let filter = JobFilter::from_lists(settings.include.as_deref(), settings.exclude.as_deref())?;
        Ok(Self {
            host_key: settings.host_key.clone(),
            thresholds,
            filter,
        })
    }

    pub fn host_key(&self) -> &str {
        &self.host_key
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn filter(&self) -> &JobFilter {
        &self.filter
    }

    /// Classifies the current failures; applies history when a store is given.
    pub async fn run<S>(
        &self,
        source: &mut S,
        history: Option<&dyn HistoryStore>,
    ) -> Result<CheckResult, CheckError>
    where
        S: JobSource + ?Sized,
    {
        let occurrences = source.failed_jobs(&self.filter).await?;
        for occurrence in &occurrences {
            debug!(
                "{} {:?} at {}",
                occurrence.job_name(),
                occurrence.outcome(),
                occurrence.last_run()
            );
        }

        let result = evaluate(&occurrences, &self.thresholds);
        info!("{} failed jobs on {}: {}", occurrences.len(), self.host_key, result.severity);

        Ok(match history {
            Some(store) => reconcile(&self.host_key, result, store),
            None => result,
        })
    }
}

/// Runs a full check and folds every fatal error into UNKNOWN.
///
/// Settings are validated before the source or the history is touched.
pub async fn execute<S>(
    settings: &CheckSettings,
    source: &mut S,
    history: Option<&dyn HistoryStore>,
) -> CheckResult
where
    S: JobSource + ?Sized,
{
    let probe = match Probe::new(settings) {
        Ok(probe) => probe,
        Err(e) => return CheckResult::unknown(e.to_string()),
    };

    match probe.run(source, history).await {
        Ok(result) => result,
        Err(e) => CheckResult::unknown(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::model::{JobListing, JobOccurrence, JobOutcome, Severity};
    use async_trait::async_trait;

    struct FixedSource {
        rows: Result<Vec<JobOccurrence>, &'static str>,
        calls: usize,
    }

    #[async_trait]
    impl JobSource for FixedSource {
        async fn failed_jobs(&mut self, _filter: &JobFilter) -> Result<Vec<JobOccurrence>, SourceError> {
            self.calls += 1;
            self.rows.clone().map_err(|e| SourceError::Query(e.to_string()))
        }

        async fn list_jobs(&mut self) -> Result<Vec<JobListing>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn settings(warning: u32, critical: u32) -> CheckSettings {
        CheckSettings {
            host_key: "sql01".into(),
            warning,
            critical,
            include: None,
            exclude: None,
        }
    }

    #[tokio::test]
    async fn test_backup_failure_is_critical() {
        let mut source = FixedSource {
            rows: Ok(vec![
                JobOccurrence::new("Backup", 20111031, 90530, JobOutcome::Failed).unwrap(),
            ]),
            calls: 0,
        };

        let result = execute(&settings(0, 1), &mut source, None).await;
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(result.exit_code(), 2);
        assert!(result.message.contains("Backup last run at 10/31/2011 09:05:30"));
    }

    #[tokio::test]
    async fn test_invalid_thresholds_never_query() {
        let mut source = FixedSource { rows: Ok(Vec::new()), calls: 0 };

        let result = execute(&settings(1, 1), &mut source, None).await;
        assert_eq!(result.severity, Severity::Unknown);
        assert_eq!(source.calls, 0);
    }

    #[tokio::test]
    async fn test_source_error_is_unknown() {
        let mut source = FixedSource { rows: Err("deadlock victim"), calls: 0 };

        let result = execute(&settings(0, 1), &mut source, None).await;
        assert_eq!(result, CheckResult::unknown("query failed: deadlock victim"));
    }
}
