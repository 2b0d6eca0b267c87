//! HTTP client for rubygems-compatible version metadata.
//!
//! One endpoint matters here: `GET <remote>/api/v1/versions/<gem>.json`,
//! which returns every published version of a gem, newest first. Responses
//! pass through the disk cache when one is configured, and requests to the
//! same host are spaced out to stay inside the registry's rate limit.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate};
use gemfresh_analyzer::{Release, ReleaseDate};
use gemfresh_version::Version;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::ResponseCache;

/// rubygems.org allows 10 requests per second per client.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("registry response for {gem} was not valid version metadata: {details}")]
    InvalidPayload { gem: String, details: String },
}

/// One row of the versions endpoint. Everything beyond these three fields is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionRow {
    pub number: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
}

impl VersionRow {
    /// Rows with an unparseable version number are dropped outright; a bad or
    /// absent date is kept and surfaced as such, since the analyzer reports
    /// those cases per gem.
    pub fn into_release(self) -> Option<Release> {
        let number = Version::new(&self.number).ok()?;
        let created_at = match self.created_at.as_deref() {
            None => ReleaseDate::Missing,
            Some(raw) => parse_release_date(raw),
        };
        Some(Release {
            number,
            created_at,
            prerelease: self.prerelease,
        })
    }
}

fn parse_release_date(raw: &str) -> ReleaseDate {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return ReleaseDate::Known(datetime.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return ReleaseDate::Known(date);
    }
    ReleaseDate::Invalid
}

pub struct RubyGemsClient {
    client: reqwest::Client,
    cache: Option<ResponseCache>,
    last_request: Mutex<HashMap<String, Instant>>,
}

impl RubyGemsClient {
    pub fn new(cache: Option<ResponseCache>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gemfresh/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(RubyGemsClient {
            client,
            cache,
            last_request: Mutex::new(HashMap::new()),
        })
    }

    /// Fetch the version history of `gem` from the registry at `remote`.
    ///
    /// A 404 means the registry has never heard of the gem; that is an empty
    /// history, not an error. Any other non-success status is.
    pub async fn fetch_versions(
        &self,
        remote: &str,
        gem: &str,
    ) -> Result<Vec<VersionRow>, ClientError> {
        let host = host_of(remote);

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.fresh(&host, gem) {
                debug!(gem, host, "using cached registry response");
                return parse_rows(gem, &body);
            }
        }

        self.throttle(&host).await;

        let url = versions_url(remote, gem);
        debug!(gem, url, "fetching version metadata");
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body = response.error_for_status()?.text().await?;

        let rows = parse_rows(gem, &body)?;
        if let Some(cache) = &self.cache {
            cache.store(&host, gem, &body);
        }
        Ok(rows)
    }

    /// Single-permit throttle: whoever holds the lock sleeps out the rest of
    /// the per-host interval before recording their own request time, so
    /// concurrent callers line up behind it.
    async fn throttle(&self, host: &str) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = last.get(host) {
            let elapsed = at.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        last.insert(host.to_string(), Instant::now());
    }
}

/// Turn registry rows into the analyzer's release list, dropping rows whose
/// version number does not parse.
pub fn releases_from_rows(gem: &str, rows: Vec<VersionRow>) -> Vec<Release> {
    let mut releases = Vec::with_capacity(rows.len());
    for row in rows {
        let number = row.number.clone();
        match row.into_release() {
            Some(release) => releases.push(release),
            None => warn!(gem, number, "skipping unparseable version number"),
        }
    }
    releases
}

fn versions_url(remote: &str, gem: &str) -> String {
    format!("{}/api/v1/versions/{gem}.json", remote.trim_end_matches('/'))
}

fn host_of(remote: &str) -> String {
    let without_scheme = match remote.split_once("://") {
        Some((_, rest)) => rest,
        None => remote,
    };
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

fn parse_rows(gem: &str, body: &str) -> Result<Vec<VersionRow>, ClientError> {
    serde_json::from_str(body).map_err(|err| ClientError::InvalidPayload {
        gem: gem.to_string(),
        details: err.to_string(),
    })
}
