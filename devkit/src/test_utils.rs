/*!
Test harness for check scenarios

Runs consecutive check cycles for one host against a stub source and a
shared in-memory history, the way the scheduler would invoke the probe on
successive intervals.
*/

use crate::source_stub::StubJobSource;
use crate::store_stub::MemoryHistoryStore;
use anyhow::Result;
use jobwatch_core::{execute, CheckResult, CheckSettings, HistoryStore, Severity};

/// Scenario runner: one host, one source, optional history.
pub struct TestHarness {
    pub source: StubJobSource,
    pub history: MemoryHistoryStore,
    pub settings: CheckSettings,
    track_history: bool,
    results: Vec<CheckResult>,
}

impl TestHarness {
    /// Harness for `host_key` with the default thresholds (warning 0, critical 1).
    pub fn new(host_key: &str) -> Self {
        init_tracing();

        Self {
            source: StubJobSource::new(),
            history: MemoryHistoryStore::new(),
            settings: CheckSettings {
                host_key: host_key.to_string(),
                warning: 0,
                critical: 1,
                include: None,
                exclude: None,
            },
            track_history: false,
            results: Vec::new(),
        }
    }

    pub fn with_thresholds(mut self, warning: u32, critical: u32) -> Self {
        self.settings.warning = warning;
        self.settings.critical = critical;
        self
    }

    pub fn with_history(mut self) -> Self {
        self.track_history = true;
        self
    }

    pub fn with_source(mut self, source: StubJobSource) -> Self {
        self.source = source;
        self
    }

    /// One check cycle against the harness history.
    pub async fn check(&mut self) -> CheckResult {
        let history = self.history.clone();
        self.check_with(if self.track_history {
            Some(&history as &dyn HistoryStore)
        } else {
            None
        })
        .await
    }

    /// One check cycle against an arbitrary history store.
    pub async fn check_with(&mut self, history: Option<&dyn HistoryStore>) -> CheckResult {
        let result = execute(&self.settings, &mut self.source, history).await;
        tracing::info!("[harness] {}", result);
        self.results.push(result.clone());
        result
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn severities(&self) -> Vec<Severity> {
        self.results.iter().map(|r| r.severity).collect()
    }

    /// Fails unless the last check ended with `severity`.
    pub fn assert_last(&self, severity: Severity) -> Result<()> {
        match self.results.last() {
            Some(result) if result.severity == severity => Ok(()),
            Some(result) => anyhow::bail!("expected {severity}, got `{result}`"),
            None => anyhow::bail!("no check has run yet"),
        }
    }

    pub fn reset(&mut self) {
        self.results.clear();
        self.source.clear();
        self.history = MemoryHistoryStore::new();
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_records_results() {
        let mut harness = TestHarness::new("sql01").with_history();
        harness.source.set_rows(Vec::new());

        harness.check().await;
        harness.assert_last(Severity::Ok).unwrap();

        harness.source.fail_with("network unreachable");
        harness.check().await;
        harness.assert_last(Severity::Unknown).unwrap();

        assert_eq!(harness.severities(), vec![Severity::Ok, Severity::Unknown]);
        assert!(harness.assert_last(Severity::Critical).is_err());

        harness.reset();
        assert!(harness.results().is_empty());
    }
}
