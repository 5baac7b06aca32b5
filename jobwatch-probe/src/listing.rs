use jobwatch_core::JobListing;
use std::fmt::Write;

/// Setup/debug listing of every job. Disabled jobs are prefixed with `-`.
pub fn render(host: &str, jobs: &[JobListing]) -> String {
    let mut out = format!("Jobs on {host}\n\"-\" at the beginning means the job is disabled\n\n");
    for job in jobs {
        let marker = if job.enabled { ' ' } else { '-' };
        let _ = writeln!(out, "{marker} {}", job.name);
    }
    out
}
