use crate::error::SourceError;
use crate::model::{JobFilter, JobListing, JobOccurrence};
use async_trait::async_trait;

/// Supplier of job state, typically the agent tables of a SQL Server.
#[async_trait]
pub trait JobSource: Send {
    /// Latest run of every enabled job matching `filter`, restricted to
    /// failed or canceled runs.
    async fn failed_jobs(&mut self, filter: &JobFilter) -> Result<Vec<JobOccurrence>, SourceError>;

    /// Every job with its enabled flag, for the listing mode.
    async fn list_jobs(&mut self) -> Result<Vec<JobListing>, SourceError>;
}
