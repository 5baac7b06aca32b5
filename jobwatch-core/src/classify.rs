//! Severity classification
//!
//! Maps the number of failed/canceled jobs onto OK / WARNING / CRITICAL and
//! builds the operator-facing summary. Pure and deterministic.

use crate::error::ConfigError;
use crate::model::{CheckResult, JobOccurrence, Severity};

pub const NO_FAILURES_MESSAGE: &str = "All jobs completed successfully on their last run";

/// Warning/critical job counts. Construction enforces `warning < critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    warning: u32,
    critical: u32,
}

impl Thresholds {
    pub fn new(warning: u32, critical: u32) -> Result<Self, ConfigError> {
        if warning >= critical {
            return Err(ConfigError::Thresholds { warning, critical });
        }
        Ok(Self { warning, critical })
    }

    pub fn warning(&self) -> u32 {
        self.warning
    }

    pub fn critical(&self) -> u32 {
        self.critical
    }

    /// Boundary counts land in the higher band: `count == warning` is WARNING,
    /// `count == critical` is CRITICAL.
    pub fn classify(&self, count: usize) -> Severity {
        let count = count as u64;
        if count < u64::from(self.warning) {
            Severity::Ok
        } else if count < u64::from(self.critical) {
            Severity::Warning
        } else {
            Severity::Critical
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 0,
            critical: 1,
        }
    }
}

/// Classifies a fresh set of occurrences and renders the status message.
///
/// No occurrences at all is always OK, whatever the thresholds say; the
/// message then differs from the below-threshold OK.
pub fn evaluate(occurrences: &[JobOccurrence], thresholds: &Thresholds) -> CheckResult {
    if occurrences.is_empty() {
        return CheckResult::new(Severity::Ok, NO_FAILURES_MESSAGE);
    }

    let count = occurrences.len();
    match thresholds.classify(count) {
        Severity::Ok => CheckResult::new(
            Severity::Ok,
            format!(
                "{count} failed jobs is below the warning threshold of {}",
                thresholds.warning()
            ),
        ),
        severity => CheckResult::new(severity, failure_summary(occurrences)),
    }
}

fn failure_summary(occurrences: &[JobOccurrence]) -> String {
    let jobs = occurrences
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Number of failed jobs: {} - Failed Jobs: {jobs}", occurrences.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobOutcome;

    fn failed(name: &str) -> JobOccurrence {
        JobOccurrence::new(name, 20111031, 90530, JobOutcome::Failed).unwrap()
    }

    #[test]
    fn test_thresholds_require_warning_below_critical() {
        assert!(Thresholds::new(0, 1).is_ok());
        assert_eq!(
            Thresholds::new(2, 2),
            Err(ConfigError::Thresholds { warning: 2, critical: 2 })
        );
        assert!(Thresholds::new(5, 1).is_err());
    }

    #[test]
    fn test_classify_bands() {
        let thresholds = Thresholds::new(2, 5).unwrap();
        assert_eq!(thresholds.classify(0), Severity::Ok);
        assert_eq!(thresholds.classify(1), Severity::Ok);
        assert_eq!(thresholds.classify(2), Severity::Warning);
        assert_eq!(thresholds.classify(4), Severity::Warning);
        assert_eq!(thresholds.classify(5), Severity::Critical);
        assert_eq!(thresholds.classify(500), Severity::Critical);
    }

    #[test]
    fn test_classify_exhaustive_small_range() {
        for warning in 0..6u32 {
            for critical in (warning + 1)..8 {
                let thresholds = Thresholds::new(warning, critical).unwrap();
                for count in 0..10usize {
                    let expected = if (count as u32) < warning {
                        Severity::Ok
                    } else if (count as u32) < critical {
                        Severity::Warning
                    } else {
                        Severity::Critical
                    };
                    assert_eq!(thresholds.classify(count), expected);
                }
            }
        }
    }

    #[test]
    fn test_evaluate_lists_every_failure() {
        let occurrences = vec![
            failed("Backup"),
            JobOccurrence::new("Reindex", 20230101, 0, JobOutcome::Canceled).unwrap(),
        ];
        let result = evaluate(&occurrences, &Thresholds::new(1, 3).unwrap());

        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(
            result.message,
            "Number of failed jobs: 2 - Failed Jobs: Backup last run at 10/31/2011 09:05:30, \
             Reindex last run at 01/01/2023 00:00:00"
        );
    }

    #[test]
    fn test_evaluate_critical_with_default_thresholds() {
        let result = evaluate(&[failed("Backup")], &Thresholds::default());
        assert_eq!(result.severity, Severity::Critical);
        assert!(result.message.contains("Backup last run at 10/31/2011 09:05:30"));
    }

    #[test]
    fn test_ok_messages_are_distinct() {
        let thresholds = Thresholds::new(3, 5).unwrap();

        let none = evaluate(&[], &thresholds);
        let below = evaluate(&[failed("Backup")], &thresholds);

        assert_eq!(none.severity, Severity::Ok);
        assert_eq!(below.severity, Severity::Ok);
        assert_eq!(none.message, NO_FAILURES_MESSAGE);
        assert_eq!(below.message, "1 failed jobs is below the warning threshold of 3");
    }

    #[test]
    fn test_no_failures_is_ok_even_with_zero_warning() {
        let result = evaluate(&[], &Thresholds::new(0, 1).unwrap());
        assert_eq!(result.severity, Severity::Ok);
    }
}
