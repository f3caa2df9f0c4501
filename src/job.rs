//! C7: Job Controller — lifecycle, status, stats, stop/cancel semantics,
//! path extraction. Grounded on `examples/original_source/control/job.go`.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crawler::{new_crawler, Crawler};
use crate::error::JobError;
use crate::frontier::Frontier;
use crate::parent_map::ParentMap;
use crate::types::{CrawlerKind, FetchTask, Page, Status, Title};
use crate::visited::VisitedSet;

/// Workers cannot hand a result off for longer than this; past it the
/// handler is assumed to be winding down and the result is dropped rather
/// than blocking the worker forever (spec §5, "Backpressure").
const RESULT_HANDOFF_BUDGET: Duration = Duration::from_secs(1);

const MIN_WORKERS: usize = 1;
const MAX_WORKERS: usize = 1000;
const DEFAULT_WORKERS: usize = 100;

fn clamp_workers(requested: usize) -> usize {
    if requested == 0 || requested > MAX_WORKERS {
        DEFAULT_WORKERS
    } else {
        requested.max(MIN_WORKERS)
    }
}

struct JobState {
    status: Status,
    started_at: Option<SystemTime>,
    ended_at: Option<SystemTime>,
    path: Vec<Title>,
    errors: Vec<String>,
    depth: u32,
    cancel: Option<CancellationToken>,
}

/// A single start -> destination search with its own workers, frontier,
/// visited-set and lifecycle.
pub struct Job {
    pub id: Uuid,
    pub start_link: Title,
    pub end_link: Title,
    pub comment: String,
    pub workers: usize,
    pub timeout: Duration,
    pub crawler_kind: CrawlerKind,

    client: reqwest::Client,

    state: std::sync::Mutex<JobState>,
    visited: VisitedSet,
    parent_map: ParentMap,
    frontier: Frontier,
}

/// Serializable snapshot of a job, as returned by the HTTP surface.
#[derive(Serialize)]
pub struct JobInfo {
    pub id: Uuid,
    pub start_link: Title,
    pub end_link: Title,
    pub comment: String,
    pub status: Status,
    pub path: Vec<Title>,
    pub errors: Vec<String>,
    pub depth: u32,
    pub pages_visited: usize,
    pub workers: usize,
    pub timeout: String,
    pub duration: String,
}

impl Job {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start_link: Title,
        end_link: Title,
        comment: String,
        crawler_kind: CrawlerKind,
        timeout: Duration,
        workers: usize,
        client: reqwest::Client,
    ) -> Arc<Job> {
        Arc::new(Job {
            id: Uuid::new_v4(),
            start_link,
            end_link,
            comment,
            workers: clamp_workers(workers),
            timeout,
            crawler_kind,
            client,
            state: std::sync::Mutex::new(JobState {
                status: Status::Unchanged,
                started_at: None,
                ended_at: None,
                path: Vec::new(),
                errors: Vec::new(),
                depth: 0,
                cancel: None,
            }),
            visited: VisitedSet::new(),
            parent_map: ParentMap::new(),
            frontier: Frontier::new(),
        })
    }

    /// Starts the job: seeds the frontier with the start page and spawns
    /// the result handler and the worker pool. Refuses if already running.
    /// Uses the crawler strategy selected by `crawler_kind`.
    pub fn start(self: &Arc<Self>) -> Result<(), JobError> {
        let crawler: Arc<dyn Crawler> = Arc::from(new_crawler(self.crawler_kind, self.client.clone()));
        self.start_with_crawler(crawler)
    }

    /// Same as `start`, but with an injected crawler — used by tests to
    /// substitute a mock for the real Wikipedia-hitting implementations,
    /// mirroring the original's test-only `job.newWorker` field swap in
    /// `control/job_test.go`.
    pub fn start_with_crawler(self: &Arc<Self>, crawler: Arc<dyn Crawler>) -> Result<(), JobError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.status != Status::Unchanged {
                return Err(JobError::NotRunning);
            }
            let cancel = CancellationToken::new();
            state.cancel = Some(cancel);
            state.status = Status::Running;
            state.started_at = Some(SystemTime::now());
        }

        info!(job_id = %self.id, start = %self.start_link, end = %self.end_link, "starting job");

        self.frontier.enqueue(FetchTask {
            title: self.start_link.clone(),
            depth: 0,
            parent: None,
        });

        let (tx, rx) = mpsc::channel::<Page>(1);

        let cancel = self.cancel_token();
        tokio::spawn(Self::run_timeout(self.clone(), cancel.clone(), self.timeout));
        tokio::spawn(Self::run_handler(self.clone(), rx, cancel.clone()));

        for _ in 0..self.workers {
            tokio::spawn(Self::run_worker(self.clone(), crawler.clone(), tx.clone(), cancel.clone()));
        }

        Ok(())
    }

    /// Stops the job. Idempotent-by-first-caller: a second call fails with
    /// `NotRunning`. On `PageFound`, walks the parent map to produce `path`.
    pub fn stop(&self, reason: Status) -> Result<(), JobError> {
        let cancel = {
            let mut state = self.state.lock().unwrap();
            if state.status != Status::Running {
                return Err(JobError::NotRunning);
            }
            state.status = reason;
            state.ended_at = Some(SystemTime::now());
            state.cancel.clone()
        };

        if let Some(cancel) = cancel {
            cancel.cancel();
        }

        if reason == Status::PageFound {
            match self.parent_map.walk(&self.start_link, &self.end_link) {
                Ok(path) => {
                    let mut state = self.state.lock().unwrap();
                    state.path = path;
                }
                Err(err) => {
                    warn!(job_id = %self.id, "path walk failed after PageFound: {err}");
                    let mut state = self.state.lock().unwrap();
                    state.errors.push(err.to_string());
                }
            }
        }

        info!(job_id = %self.id, status = ?reason, "job stopped");
        Ok(())
    }

    pub fn cancel_token(&self) -> CancellationToken {
        match self.state.lock().unwrap().cancel.clone() {
            Some(token) => token,
            None => CancellationToken::new(),
        }
    }

    pub(crate) fn add_error(&self, message: String) {
        self.state.lock().unwrap().errors.push(message);
    }

    pub(crate) fn update_depth(&self, depth: u32) {
        let mut state = self.state.lock().unwrap();
        if depth > state.depth {
            state.depth = depth;
        }
    }

    pub fn status(&self) -> Status {
        self.state.lock().unwrap().status
    }

    pub fn duration(&self) -> Duration {
        let state = self.state.lock().unwrap();
        Self::duration_from(&state)
    }

    fn duration_from(state: &JobState) -> Duration {
        match state.started_at {
            None => Duration::ZERO,
            Some(start) => {
                let end = state.ended_at.unwrap_or_else(SystemTime::now);
                end.duration_since(start).unwrap_or(Duration::ZERO)
            }
        }
    }

    pub fn info(&self) -> JobInfo {
        let state = self.state.lock().unwrap();
        JobInfo {
            id: self.id,
            start_link: self.start_link.clone(),
            end_link: self.end_link.clone(),
            comment: self.comment.clone(),
            status: state.status,
            path: state.path.clone(),
            errors: state.errors.clone(),
            depth: state.depth,
            pages_visited: self.visited.size(),
            workers: self.workers,
            timeout: humantime::format_duration(self.timeout).to_string(),
            duration: humantime::format_duration(Self::duration_from(&state)).to_string(),
        }
    }

    /// C7's timeout-observing task: races the job's cancellation token
    /// against a sleep for `timeout`. If the sleep wins, stops the job with
    /// `Timedout`; if the token fires first (user cancel, or another
    /// terminal reason already set by the handler), does nothing further.
    async fn run_timeout(job: Arc<Job>, cancel: CancellationToken, timeout: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                let _ = job.stop(Status::Timedout);
            }
            _ = cancel.cancelled() => {}
        }
    }

    /// C5: a single fetch worker.
    async fn run_worker(
        job: Arc<Job>,
        crawler: Arc<dyn Crawler>,
        tx: mpsc::Sender<Page>,
        cancel: CancellationToken,
    ) {
        loop {
            let task = tokio::select! {
                task = job.frontier.dequeue(&cancel) => task,
                _ = cancel.cancelled() => None,
            };

            let Some(task) = task else { return };

            if job.visited.mark(&task.title) {
                continue;
            }

            match crawler.fetch(&cancel, &task.title).await {
                Ok(page) => {
                    let result = Page {
                        name: task.title,
                        links: page.links,
                        depth: task.depth,
                        parent: task.parent,
                    };
                    match timeout(RESULT_HANDOFF_BUDGET, tx.send(result)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(_)) => return, // handler dropped its receiver: job is over
                        Err(_) => warn!(job_id = %job.id, "dropped fetch result, handler lagging"),
                    }
                }
                Err(JobError::Cancelled) => return,
                Err(err) => job.add_error(err.to_string()),
            }
        }
    }

    /// C6: the single result-handler consumer.
    async fn run_handler(job: Arc<Job>, mut rx: mpsc::Receiver<Page>, cancel: CancellationToken) {
        loop {
            let page = tokio::select! {
                page = rx.recv() => page,
                _ = cancel.cancelled() => return,
            };

            let Some(page) = page else { return };

            job.update_depth(page.depth);

            if page.name == job.end_link {
                if let Some(parent) = &page.parent {
                    job.parent_map.try_set_parent(&job.end_link, parent);
                }
                let _ = job.stop(Status::PageFound);
                return;
            }

            if page.links.iter().any(|link| *link == job.end_link) {
                job.parent_map.try_set_parent(&job.end_link, &page.name);
                let _ = job.stop(Status::PageFound);
                return;
            }

            for link in &page.links {
                job.parent_map.try_set_parent(link, &page.name);
                job.frontier.enqueue(FetchTask {
                    title: link.clone(),
                    depth: page.depth + 1,
                    parent: Some(page.name.clone()),
                });
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// A crawler over a fixed title -> outbound-links graph, standing in
    /// for the REST/HTML crawlers in tests. Mirrors the table-driven
    /// `fakeCrawler` in the original's `control/job_test.go`.
    pub struct MockCrawler {
        pub graph: HashMap<&'static str, Vec<&'static str>>,
    }

    #[async_trait::async_trait]
    impl Crawler for MockCrawler {
        async fn fetch(&self, _cancel: &CancellationToken, title: &Title) -> Result<Page, JobError> {
            match self.graph.get(title.as_str()) {
                Some(links) => Ok(Page {
                    name: title.clone(),
                    links: links.iter().map(|s| s.to_string()).collect(),
                    depth: 0,
                    parent: None,
                }),
                None => Err(JobError::TransientFetch(format!("{title} not found"))),
            }
        }
    }

    pub fn new_job(start: &str, end: &str, timeout: Duration, workers: usize) -> Arc<Job> {
        Job::new(
            start.to_string(),
            end.to_string(),
            "test".to_string(),
            CrawlerKind::Api,
            timeout,
            workers,
            reqwest::Client::new(),
        )
    }

    /// Waits (bounded) until the job leaves `Running`, polling rather than
    /// subscribing to a notifier — fine for the short timeouts used in tests.
    pub async fn wait_for_terminal(job: &Arc<Job>, bound: Duration) {
        let deadline = tokio::time::Instant::now() + bound;
        while job.status() == Status::Running {
            if tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{new_job, wait_for_terminal, MockCrawler};
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn scenario_1_finds_shortest_chain() {
        let job = new_job("Mike Tyson", "Ukraine", Duration::from_secs(1), 10);
        let crawler: Arc<dyn Crawler> = Arc::new(MockCrawler {
            graph: HashMap::from([
                ("Mike Tyson", vec!["AAA"]),
                ("AAA", vec!["BBB"]),
                ("BBB", vec!["Ukraine"]),
            ]),
        });
        job.start_with_crawler(crawler).unwrap();
        wait_for_terminal(&job, Duration::from_secs(2)).await;

        assert_eq!(job.status(), Status::PageFound);
        assert_eq!(job.info().path, vec!["Mike Tyson", "AAA", "BBB", "Ukraine"]);
        // Ukraine is detected inside BBB's links and short-circuits before
        // ever being fetched itself, so only the first three titles are marked.
        assert!(job.visited.size() >= 3);
    }

    #[tokio::test]
    async fn scenario_2_times_out_with_errors_and_no_path() {
        let job = new_job("Mike Tyson", "Nonexistent", Duration::from_millis(200), 10);
        let crawler: Arc<dyn Crawler> =
            Arc::new(MockCrawler { graph: HashMap::from([("Mike Tyson", vec!["AAA"])]) });
        job.start_with_crawler(crawler).unwrap();
        wait_for_terminal(&job, Duration::from_secs(1)).await;

        let info = job.info();
        assert_eq!(info.status, Status::Timedout);
        assert!(info.path.is_empty());
        assert!(!info.errors.is_empty());
    }

    #[tokio::test]
    async fn scenario_3_cancel_wins_over_steady_state() {
        let job = new_job("Mike Tyson", "Ukraine", Duration::from_secs(5), 10);
        let crawler: Arc<dyn Crawler> = Arc::new(MockCrawler {
            graph: HashMap::from([
                ("Mike Tyson", vec!["AAA"]),
                ("AAA", vec!["BBB"]),
                ("BBB", vec!["Ukraine"]),
            ]),
        });
        job.start_with_crawler(crawler).unwrap();
        job.stop(Status::Cancelled).unwrap();

        assert_eq!(job.status(), Status::Cancelled);
        assert!(job.info().path.is_empty());
    }

    #[tokio::test]
    async fn scenario_4_same_title_found_at_depth_zero() {
        let job = new_job("Ukraine", "Ukraine", Duration::from_secs(1), 10);
        let crawler: Arc<dyn Crawler> = Arc::new(MockCrawler { graph: HashMap::from([("Ukraine", vec![])]) });
        job.start_with_crawler(crawler).unwrap();
        wait_for_terminal(&job, Duration::from_secs(2)).await;

        assert_eq!(job.status(), Status::PageFound);
        assert_eq!(job.info().path, vec!["Ukraine"]);
    }

    #[tokio::test]
    async fn scenario_5_prefers_shallower_depth() {
        let job = new_job("Mike Tyson", "Ukraine", Duration::from_secs(1), 10);
        let crawler: Arc<dyn Crawler> = Arc::new(MockCrawler {
            graph: HashMap::from([
                ("Mike Tyson", vec!["AAA"]),
                ("AAA", vec!["BBB", "Ukraine"]),
                ("BBB", vec!["Ukraine"]),
            ]),
        });
        job.start_with_crawler(crawler).unwrap();
        wait_for_terminal(&job, Duration::from_secs(2)).await;

        assert_eq!(job.status(), Status::PageFound);
        assert_eq!(job.info().path, vec!["Mike Tyson", "AAA", "Ukraine"]);
    }

    #[test]
    fn worker_count_clamps_to_spec_bounds() {
        assert_eq!(clamp_workers(0), DEFAULT_WORKERS);
        assert_eq!(clamp_workers(1001), DEFAULT_WORKERS);
        assert_eq!(clamp_workers(1), 1);
        assert_eq!(clamp_workers(500), 500);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let job = new_job("Mike Tyson", "Ukraine", Duration::from_secs(1), 10);
        let crawler: Arc<dyn Crawler> = Arc::new(MockCrawler { graph: HashMap::new() });
        job.start_with_crawler(crawler).unwrap();

        assert!(job.stop(Status::Cancelled).is_ok());
        assert!(matches!(job.stop(Status::Cancelled), Err(JobError::NotRunning)));
    }

    #[test]
    fn start_refuses_double_start() {
        let job = new_job("Mike Tyson", "Ukraine", Duration::from_secs(1), 10);
        let crawler: Arc<dyn Crawler> = Arc::new(MockCrawler { graph: HashMap::new() });
        assert!(job.start_with_crawler(crawler.clone()).is_ok());
        assert!(matches!(job.start_with_crawler(crawler), Err(JobError::NotRunning)));
    }
}
