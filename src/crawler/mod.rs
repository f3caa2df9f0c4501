//! C4 / §4.8: the crawler contract. `Fetch(ctx, title) -> Page` behind one
//! trait, with two interchangeable strategies (`api`, `html`).

mod api;
mod html;

pub use api::ApiCrawler;
pub use html::HtmlCrawler;

use tokio_util::sync::CancellationToken;

use crate::error::JobError;
use crate::types::{CrawlerKind, Page, Title};

/// Turns a title into a `Page` of outbound titles. Implementations must
/// honor cancellation and must exclude any outbound title whose raw form
/// contains a namespace separator (`":"`).
#[async_trait::async_trait]
pub trait Crawler: Send + Sync {
    async fn fetch(&self, cancel: &CancellationToken, title: &Title) -> Result<Page, JobError>;
}

/// Excludes Wikipedia namespace titles (`Category:`, `File:`, ...). Kept as
/// a free function since both crawler strategies apply it identically.
fn is_namespaced(title: &str) -> bool {
    title.contains(':')
}

pub fn new_crawler(kind: CrawlerKind, client: reqwest::Client) -> Box<dyn Crawler> {
    match kind {
        CrawlerKind::Api => Box::new(ApiCrawler::new(client)),
        CrawlerKind::Html => Box::new(HtmlCrawler::new(client)),
    }
}
