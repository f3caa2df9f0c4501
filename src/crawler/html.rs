//! HTML-based crawler: `en.wikipedia.org/wiki/<title>`, parsed with `scraper`
//! (the teacher's own HTML parsing crate). Grounded on
//! `examples/original_source/worker/worker.go`, re-expressed with
//! `scraper::Selector` instead of a manual token-by-token scan.

use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::JobError;
use crate::types::{Page, Title};

use super::is_namespaced;

const BASE: &str = "https://en.wikipedia.org/wiki/";

pub struct HtmlCrawler {
    client: reqwest::Client,
}

impl HtmlCrawler {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Strips the `/wiki/` prefix and rejects fragment-only hrefs.
fn extract_title(href: &str) -> Option<Title> {
    let rest = href.strip_prefix("/wiki/")?;
    if rest.is_empty() || rest.starts_with('#') {
        return None;
    }
    let title = rest.split('#').next().unwrap_or(rest);
    let title = urlencoding_decode(title);
    if title.is_empty() {
        return None;
    }
    Some(title)
}

/// Wikipedia titles in hrefs are percent-encoded; decode them so they match
/// the byte-equal titles the API crawler and the REST surface use.
fn urlencoding_decode(s: &str) -> String {
    percent_decode(s.as_bytes())
}

fn percent_decode(bytes: &[u8]) -> String {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        if bytes[i] == b'_' {
            out.push(b' ');
        } else {
            out.push(bytes[i]);
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[async_trait::async_trait]
impl super::Crawler for HtmlCrawler {
    async fn fetch(&self, cancel: &CancellationToken, title: &Title) -> Result<Page, JobError> {
        let url = format!("{BASE}{}", title.replace(' ', "_"));
        debug!(%title, %url, "GET");

        let request = self.client.get(&url).send();
        let response = tokio::select! {
            result = request => result.map_err(|e| JobError::TransientFetch(e.to_string()))?,
            _ = cancel.cancelled() => return Err(JobError::Cancelled),
        };

        if !response.status().is_success() {
            return Err(JobError::TransientFetch(format!(
                "bad response: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| JobError::TransientFetch(e.to_string()))?;

        let document = Html::parse_document(&body);
        let selector = Selector::parse("a[href]").expect("valid selector");

        let mut links = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else { continue };
            if !href.starts_with("/wiki/") {
                continue;
            }
            let Some(link_title) = extract_title(href) else { continue };
            if is_namespaced(&link_title) {
                continue;
            }
            if seen.insert(link_title.clone()) {
                links.push(link_title);
            }
        }

        Ok(Page { name: title.clone(), links, depth: 0, parent: None })
    }
}
