//! C8: Job Pool — a keyed collection of jobs with create/lookup/start/cancel,
//! sharing one HTTP client across jobs so connection pooling benefits the
//! whole process. Grounded on
//! `examples/original_source/control/pool_manager.go`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::JobError;
use crate::job::{Job, JobInfo};
use crate::types::{CrawlerKind, Title};

pub struct JobPool {
    jobs: DashMap<Uuid, Arc<Job>>,
    client: reqwest::Client,
}

impl JobPool {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates (but does not start) a new job, returning its id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_job(
        &self,
        start: Title,
        end: Title,
        comment: String,
        crawler_kind: CrawlerKind,
        timeout: Duration,
        workers: usize,
    ) -> Result<Uuid, JobError> {
        if start.is_empty() || end.is_empty() {
            return Err(JobError::ConfigError("start_page and destination_page are required".into()));
        }

        let job = Job::new(start, end, comment, crawler_kind, timeout, workers, self.client.clone());
        let id = job.id;
        self.jobs.insert(id, job);
        Ok(id)
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<Job>> {
        self.jobs.get(&id).map(|entry| entry.clone())
    }

    /// Looks up and starts a job.
    pub fn start(&self, id: Uuid) -> Result<(), JobError> {
        let job = self.get(id).ok_or(JobError::NotRunning)?;
        job.start()
    }

    pub fn list(&self) -> Vec<JobInfo> {
        self.jobs.iter().map(|entry| entry.value().info()).collect()
    }
}

impl Default for JobPool {
    fn default() -> Self {
        Self::new()
    }
}
