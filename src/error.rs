//! Job-level error kinds, unifying spec §7 across the core and the HTTP glue.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    /// Network, 5xx, or parse failure on a single page. Recorded in
    /// `job.errors`, never fatal to the job.
    #[error("fetch failed: {0}")]
    TransientFetch(String),

    /// The job's context ended (user cancel or timeout). Propagates as a
    /// clean exit; never logged as a job error.
    #[error("job cancelled")]
    Cancelled,

    /// Job creation failed. Returned synchronously from `JobPool::add_job`;
    /// no job is stored.
    #[error("config error: {0}")]
    ConfigError(String),

    /// `Job::stop` on an already-stopped job, or `Job::start`/`JobPool::start`
    /// on a missing job.
    #[error("job is not running")]
    NotRunning,

    /// The parent map walk could not reach `start` from `end`.
    #[error("no path found")]
    NoPath,
}
