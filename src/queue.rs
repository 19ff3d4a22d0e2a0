//! Rate-limited fetch queue for upstream requests.
//!
//! Every outbound request funnels through one [`FetchQueue`], which enforces
//! two independent limits: at most `fetch_concurrency` requests in flight
//! (from send until the body is fully read), and at most `fetch_rate_limit`
//! requests *started* per rate window.
//! Submissions past either limit wait their turn in FIFO order; the queue
//! holds any number of waiters and never retries on its own.

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::time::{Duration, Instant};

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::error::HnError;

/// Error payload the upstream API attaches to non-success responses.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: String,
}

/// Shared gateway for all upstream traffic.
#[derive(Debug)]
pub struct FetchQueue {
    client: reqwest::Client,
    permits: Semaphore,
    pacer: Mutex<VecDeque<Instant>>,
    rate_limit: usize,
    window: Duration,
}

impl FetchQueue {
    /// Build a queue from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, HnError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            permits: Semaphore::new(config.fetch_concurrency),
            pacer: Mutex::new(VecDeque::new()),
            rate_limit: config.fetch_rate_limit,
            window: config.fetch_rate_window,
        })
    }

    /// Fetch `url` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Non-success statuses become [`HnError::UpstreamStatus`], carrying the
    /// upstream error message when the body has one. Network and decoding
    /// failures become [`HnError::Transport`].
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HnError> {
        let _permit = self.admit().await;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<UpstreamErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(HnError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Fetch a rendered page and return the raw body.
    ///
    /// When `client_ip` is given it is forwarded upstream, so the site
    /// rate-limits the original caller instead of this service's egress
    /// address.
    ///
    /// # Errors
    ///
    /// Returns [`HnError::UpstreamStatus`] for non-success statuses and
    /// [`HnError::Transport`] for network failures.
    pub async fn fetch_page(&self, url: &str, client_ip: Option<&str>) -> Result<String, HnError> {
        let mut request = self.client.get(url);
        if let Some(ip) = client_ip {
            request = request.header("X-Forwarded-For", ip);
        }
        let _permit = self.admit().await;
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HnError::UpstreamStatus {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Wait for this unit's turn: first a concurrency permit, then a start
    /// slot in the rate window.
    ///
    /// The permit must stay alive until the response body has been
    /// consumed; a unit counts against the in-flight cap until it is fully
    /// read, not just until its headers arrive.
    async fn admit(&self) -> SemaphorePermit<'_> {
        let permit = self
            .permits
            .acquire()
            .await
            .expect("Semaphore closed unexpectedly");
        let start = self.reserve_start_slot().await;
        tokio::time::sleep_until(start).await;
        permit
    }

    /// Reserve the earliest instant at which the next request may start
    /// without exceeding `rate_limit` starts per `window`.
    ///
    /// The pacer keeps the start instants of the last `rate_limit`
    /// reservations; a new request may start one window after the oldest of
    /// them. Slots are handed out in lock order, so starts stay FIFO and
    /// reserved instants never move backwards.
    async fn reserve_start_slot(&self) -> Instant {
        let mut starts = self.pacer.lock().await;
        let now = Instant::now();
        let at = match starts.front() {
            Some(&oldest) if starts.len() >= self.rate_limit => now.max(oldest + self.window),
            _ => now,
        };
        starts.push_back(at);
        if starts.len() > self.rate_limit {
            starts.pop_front();
        }
        at
    }
}
