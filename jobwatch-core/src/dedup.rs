//! Notification deduplication
//!
//! Downgrades a repeated WARNING/CRITICAL to OK when the message matches the
//! stored baseline for the host. Any other result becomes the new baseline,
//! recoveries included, so a recurrence after recovery pages again.
//!
//! Two invocations racing on the same host may both see the old baseline and
//! both alert. That costs one duplicate page and never hides a new condition.

use crate::error::HistoryError;
use crate::history::HistoryStore;
use crate::model::{CheckResult, Severity};
use tracing::{debug, warn};

pub const SUPPRESSED_SUFFIX: &str = "(already notified)";

/// Applies the host's history to a freshly classified result.
///
/// History failures are logged and swallowed; the classified result is then
/// returned untouched.
pub fn reconcile<S: HistoryStore + ?Sized>(
    host_key: &str,
    result: CheckResult,
    store: &S,
) -> CheckResult {
    if result.severity == Severity::Unknown {
        return result;
    }

    match suppress_repeat(host_key, &result, store) {
        Ok(Some(suppressed)) => suppressed,
        Ok(None) => result,
        Err(e) => {
            warn!("skipping alert deduplication for {}: {}", host_key, e);
            result
        }
    }
}

fn suppress_repeat<S: HistoryStore + ?Sized>(
    host_key: &str,
    result: &CheckResult,
    store: &S,
) -> Result<Option<CheckResult>, HistoryError> {
    let previous = store.last_message(host_key)?;

    // Baseline stays on the original failure so later repeats keep matching.
    if result.severity.is_alert() && previous == result.message {
        debug!("{} already notified for {}", result.severity, host_key);
        return Ok(Some(CheckResult::new(
            Severity::Ok,
            format!("{} {SUPPRESSED_SUFFIX}", result.message),
        )));
    }

    if previous != result.message {
        store.record(host_key, &result.message)?;
    }
    Ok(None)
}
