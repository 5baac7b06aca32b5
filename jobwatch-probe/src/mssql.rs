//! SQL Server Agent data source
//!
//! Reads `msdb` job tables over TDS. Job-name filters are sent as bound
//! parameters, never spliced into the statement.

use crate::config::ConnectionSettings;
use async_trait::async_trait;
use jobwatch_core::{JobFilter, JobListing, JobOccurrence, JobOutcome, JobSource, SourceError};
use std::future::Future;
use std::time::Duration;
use tiberius::{AuthMethod, Client, Config, Query, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

const FAILED_JOBS_SQL: &str = "SELECT [j].[name], [h].[run_date], [h].[run_time], [h].[run_status]
FROM [msdb]..[sysjobs] [j]
INNER JOIN [msdb]..[sysjobhistory] [h] ON [j].[job_id] = [h].[job_id]
INNER JOIN (
    SELECT [job_id], MAX([instance_id]) AS [max_instance_id]
    FROM [msdb]..[sysjobhistory]
    WHERE [step_id] = 0
    GROUP BY [job_id]
) [latest] ON [h].[job_id] = [latest].[job_id] AND [h].[instance_id] = [latest].[max_instance_id]
WHERE [j].[enabled] = 1
AND [h].[run_status] IN (0, 3)";

const LIST_JOBS_SQL: &str = "SELECT [name], [enabled]
FROM [msdb]..[sysjobs]
ORDER BY [name]";

/// Statement text plus bind values for the failed-jobs query.
pub fn failed_jobs_query(filter: &JobFilter) -> (String, Vec<String>) {
    let mut sql = FAILED_JOBS_SQL.to_string();
    let names = filter.names().to_vec();

    let placeholders = (1..=names.len())
        .map(|i| format!("@P{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    match filter {
        JobFilter::All => {}
        JobFilter::Include(_) => sql.push_str(&format!("\nAND [j].[name] IN ({placeholders})")),
        JobFilter::Exclude(_) => {
            sql.push_str(&format!("\nAND [j].[name] NOT IN ({placeholders})"))
        }
    }
    sql.push_str("\nORDER BY [j].[name]");

    (sql, names)
}

pub struct MssqlSource {
    client: Client<Compat<TcpStream>>,
    query_timeout: Duration,
}

impl MssqlSource {
    /// Opens the TCP connection and logs in, both bounded by the login timeout.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, SourceError> {
        let mut config = Config::new();
        config.host(&settings.host);
        config.port(settings.port);
        config.application_name("check_mssql_job_history");
        config.authentication(AuthMethod::sql_server(&settings.user, &settings.password));
        if settings.trust_cert {
            config.trust_cert();
        }

        let client = bounded(settings.login_timeout, "connecting", async move {
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| SourceError::Connection(e.to_string()))?;
            tcp.set_nodelay(true)
                .map_err(|e| SourceError::Connection(e.to_string()))?;

            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| SourceError::Connection(e.to_string()))
        })
        .await?;

        info!("connected to {}:{}", settings.host, settings.port);
        Ok(Self {
            client,
            query_timeout: settings.query_timeout,
        })
    }

    async fn fetch(&mut self, sql: &str, params: Vec<String>) -> Result<Vec<Row>, SourceError> {
        debug!("executing T-SQL:\n{}", sql);
        if !params.is_empty() {
            debug!("with parameters {:?}", params);
        }

        let mut query = Query::new(sql);
        for param in params {
            query.bind(param);
        }

        let client = &mut self.client;
        bounded(self.query_timeout, "querying", async move {
            query
                .query(client)
                .await
                .map_err(|e| SourceError::Query(e.to_string()))?
                .into_first_result()
                .await
                .map_err(|e| SourceError::Query(e.to_string()))
        })
        .await
    }
}

#[async_trait]
impl JobSource for MssqlSource {
    async fn failed_jobs(&mut self, filter: &JobFilter) -> Result<Vec<JobOccurrence>, SourceError> {
        let (sql, params) = failed_jobs_query(filter);
        let rows = self.fetch(&sql, params).await?;
        rows.iter().map(occurrence_from_row).collect()
    }

    async fn list_jobs(&mut self) -> Result<Vec<JobListing>, SourceError> {
        let rows = self.fetch(LIST_JOBS_SQL, Vec::new()).await?;
        rows.iter()
            .map(|row| {
                Ok(JobListing {
                    name: column::<&str>(row, 0)?.unwrap_or_default().to_string(),
                    enabled: column::<u8>(row, 1)?.unwrap_or(0) == 1,
                })
            })
            .collect()
    }
}

fn occurrence_from_row(row: &Row) -> Result<JobOccurrence, SourceError> {
    let job = column::<&str>(row, 0)?.unwrap_or_default().to_string();
    let run_date = column::<i32>(row, 1)?.unwrap_or_default();
    let run_time = column::<i32>(row, 2)?.unwrap_or_default();
    let outcome = column::<i32>(row, 3)?
        .and_then(JobOutcome::from_run_status)
        .unwrap_or(JobOutcome::Failed);

    JobOccurrence::new(job.clone(), run_date, run_time, outcome)
        .map_err(|source| SourceError::MalformedRow { job, source })
}

fn column<'a, T>(row: &'a Row, idx: usize) -> Result<Option<T>, SourceError>
where
    T: tiberius::FromSql<'a>,
{
    row.try_get::<T, _>(idx)
        .map_err(|e| SourceError::Query(format!("column {idx}: {e}")))
}

async fn bounded<T, F>(limit: Duration, stage: &'static str, fut: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| SourceError::Timeout { after: limit, stage })?
}
