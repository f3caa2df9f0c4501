//! REST-based crawler: `en.wikipedia.org/w/api.php?action=query&prop=links`,
//! following `continue.plcontinue` pagination. Grounded on
//! `examples/original_source/worker/api_worker.go`.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::JobError;
use crate::types::{Page, Title};

use super::is_namespaced;

const ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

pub struct ApiCrawler {
    client: reqwest::Client,
}

impl ApiCrawler {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    #[serde(rename = "continue")]
    cont: Option<ApiContinue>,
    query: Option<ApiQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiContinue {
    plcontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    pages: std::collections::HashMap<String, ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    links: Vec<ApiLink>,
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    title: String,
}

#[async_trait::async_trait]
impl super::Crawler for ApiCrawler {
    async fn fetch(&self, cancel: &CancellationToken, title: &Title) -> Result<Page, JobError> {
        let mut links = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut plcontinue: Option<String> = None;

        loop {
            let mut query = vec![
                ("action", "query".to_string()),
                ("format", "json".to_string()),
                ("prop", "links".to_string()),
                ("pllimit", "500".to_string()),
                ("titles", title.clone()),
            ];
            if let Some(cont) = &plcontinue {
                query.push(("plcontinue", cont.clone()));
            }

            debug!(title = %title, plcontinue = ?plcontinue, "GET {}", ENDPOINT);

            let request = self.client.get(ENDPOINT).query(&query).send();
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

            let body: ApiResponse = response
                .json()
                .await
                .map_err(|e| JobError::TransientFetch(e.to_string()))?;

            if let Some(query) = body.query {
                for page in query.pages.into_values() {
                    for link in page.links {
                        if is_namespaced(&link.title) {
                            continue;
                        }
                        if seen.insert(link.title.clone()) {
                            links.push(link.title);
                        }
                    }
                }
            }

            match body.cont.and_then(|c| c.plcontinue) {
                Some(next) => plcontinue = Some(next),
                None => break,
            }
        }

        Ok(Page { name: title.clone(), links, depth: 0, parent: None })
    }
}
