use crate::config::HttpConfig;
use crate::error::{Result, ScraperError};
use crate::types::PageFetcher;
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::{Duration, Instant};
use tracing::debug;

/// Single-attempt GET client with a browser-like user agent and a fixed timeout.
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ScraperError::Config(format!("Invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let started = Instant::now();
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            counter!("shadliq_fetch_errors_total", "kind" => "status").increment(1);
            return Err(ScraperError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text().await?;
        histogram!("shadliq_fetch_duration_seconds").record(started.elapsed().as_secs_f64());
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
