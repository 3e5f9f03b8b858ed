//! Push notification boundary (Bark-style endpoint).
//!
//! Delivery is best-effort by contract: the pipeline logs a failure and
//! moves on — no retry, no backpressure, and a failed delivery still counts
//! against the alert budget.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push rejected: {0}")]
    Rejected(String),
}

/// Delivery seam for anomaly alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Bark push endpoint: `GET {api_url}/{title}/{body}`.
///
/// Title and body are interpolated into the path and parsed by the HTTP
/// client, so alert text is kept single-line by its producers.
pub struct BarkNotifier {
    http: Client,
    api_url: String,
}

impl BarkNotifier {
    pub fn new(api_url: String) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(Duration::from_secs(5)).build()?;

        Ok(Self { http, api_url })
    }
}

#[async_trait]
impl Notifier for BarkNotifier {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        let url = format!("{}/{}/{}", self.api_url.trim_end_matches('/'), title, body);

        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(NotifyError::Rejected(resp.status().to_string()));
        }

        debug!(status = %resp.status(), "push delivered");
        Ok(())
    }
}
