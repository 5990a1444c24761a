//! HTTP client for the collector's metrics API.

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{server_message, ApiError};
use crate::types::{HistoryBody, Sample, Stats};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The four calls a refresh cycle makes. `MetricsClient` is the real implementation;
/// tests substitute scripted ones.
pub trait MetricsApi: Send + Sync + 'static {
    /// Asks the collector to take a sample now. The acknowledgement body is ignored.
    fn trigger_collection(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Samples from the last `window_hours`, or everything when `None`. Order is
    /// whatever the server sent.
    fn fetch_history(
        &self,
        window_hours: Option<NonZeroU32>,
    ) -> impl Future<Output = Result<Vec<Sample>, ApiError>> + Send;

    /// Most recent sample; `ApiError::NotFound` if nothing was ever collected.
    fn fetch_latest(&self) -> impl Future<Output = Result<Sample, ApiError>> + Send;

    /// Aggregates over the last `window_hours`. An empty window is a success with
    /// `total_samples == 0`.
    fn fetch_stats(
        &self,
        window_hours: NonZeroU32,
    ) -> impl Future<Output = Result<Stats, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct MetricsClient {
    http: reqwest::Client,
    collect_url: Url,
    history_url: Url,
    latest_url: Url,
    stats_url: Url,
}

impl MetricsClient {
    /// Every request is bounded by `timeout`; hitting it surfaces as `ApiError::Transport`.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("perftop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Url::join drops the last path segment unless it ends in '/'
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            collect_url: base.join("metrics/collect/")?,
            history_url: base.join("metrics/")?,
            latest_url: base.join("metrics/latest/")?,
            stats_url: base.join("metrics/stats/")?,
        })
    }
}

impl MetricsApi for MetricsClient {
    async fn trigger_collection(&self) -> Result<(), ApiError> {
        debug!(url = %self.collect_url, "POST collect");
        let resp = self.http.post(self.collect_url.clone()).send().await?;
        read_body(resp).await.map_err(not_found_as_server)?;
        Ok(())
    }

    async fn fetch_history(&self, window_hours: Option<NonZeroU32>) -> Result<Vec<Sample>, ApiError> {
        let mut req = self.http.get(self.history_url.clone());
        if let Some(h) = window_hours {
            req = req.query(&[("hours", h.get())]);
        }
        let resp = req.send().await?;
        let body = read_body(resp).await.map_err(not_found_as_server)?;
        let samples = parse::<HistoryBody>(&body)?.into_samples();
        for s in &samples {
            s.validate().map_err(ApiError::Malformed)?;
        }
        debug!(count = samples.len(), "history fetched");
        Ok(samples)
    }

    async fn fetch_latest(&self) -> Result<Sample, ApiError> {
        let resp = self.http.get(self.latest_url.clone()).send().await?;
        let body = read_body(resp).await?;
        let sample = parse::<Sample>(&body)?;
        sample.validate().map_err(ApiError::Malformed)?;
        Ok(sample)
    }

    async fn fetch_stats(&self, window_hours: NonZeroU32) -> Result<Stats, ApiError> {
        let resp = self
            .http
            .get(self.stats_url.clone())
            .query(&[("hours", window_hours.get())])
            .send()
            .await?;
        match read_body(resp).await {
            Ok(body) => parse::<Stats>(&body),
            // the collector answers an empty window with 404
            Err(ApiError::NotFound(_)) => Ok(Stats::empty(window_hours.get())),
            Err(e) => Err(e),
        }
    }
}

async fn read_body(resp: Response) -> Result<Vec<u8>, ApiError> {
    let status = resp.status();
    let body = resp.bytes().await?.to_vec();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(server_message(&body)));
    }
    if !status.is_success() {
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: server_message(&body),
        });
    }
    Ok(body)
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Malformed(e.to_string()))
}

fn not_found_as_server(e: ApiError) -> ApiError {
    match e {
        ApiError::NotFound(message) => ApiError::Server {
            status: StatusCode::NOT_FOUND.as_u16(),
            message,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path() {
        let base = Url::parse("http://localhost:8000/api").unwrap();
        let c = MetricsClient::new(&base, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(c.collect_url.as_str(), "http://localhost:8000/api/metrics/collect/");
        assert_eq!(c.history_url.as_str(), "http://localhost:8000/api/metrics/");
        assert_eq!(c.latest_url.as_str(), "http://localhost:8000/api/metrics/latest/");
        assert_eq!(c.stats_url.as_str(), "http://localhost:8000/api/metrics/stats/");

        let slashed = Url::parse("https://collector.example/v1/").unwrap();
        let c = MetricsClient::new(&slashed, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(c.stats_url.as_str(), "https://collector.example/v1/metrics/stats/");
    }

    #[test]
    fn not_found_only_remapped_for_list_calls() {
        let e = not_found_as_server(ApiError::NotFound(Some("gone".into())));
        assert!(matches!(e, ApiError::Server { status: 404, .. }));
        assert_eq!(e.display_message(), "gone");
        let t = not_found_as_server(ApiError::Transport("x".into()));
        assert!(matches!(t, ApiError::Transport(_)));
    }
}
