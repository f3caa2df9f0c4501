//! Shared data model: Title, Page, FetchTask, FetchResult, Status.
//!
//! Titles are treated as opaque, byte-equal strings — no normalization
//! happens in the core (see DESIGN.md for the open question this resolves).

use serde::{Deserialize, Serialize};

/// A Wikipedia article title, as used in a URL path or an API `titles=` value.
pub type Title = String;

/// A crawled Wikipedia page: its own name, the titles it links to, the BFS
/// depth at which it was enqueued, and the title that caused it to be enqueued.
#[derive(Debug, Clone)]
pub struct Page {
    pub name: Title,
    pub links: Vec<Title>,
    pub depth: u32,
    pub parent: Option<Title>,
}

/// A pending fetch, equivalent to a `Page` awaiting resolution.
#[derive(Debug, Clone)]
pub struct FetchTask {
    pub title: Title,
    pub depth: u32,
    pub parent: Option<Title>,
}

/// The job's terminal/lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unchanged,
    Running,
    PageFound,
    Cancelled,
    Timedout,
}

/// Which crawler strategy a job should use to resolve a title into a `Page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlerKind {
    Api,
    Html,
}

impl Default for CrawlerKind {
    fn default() -> Self {
        CrawlerKind::Api
    }
}

impl std::str::FromStr for CrawlerKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "html" => CrawlerKind::Html,
            _ => CrawlerKind::Api,
        })
    }
}
