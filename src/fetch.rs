//! Fetching raw payload bytes over HTTP.
//!
//! # Architecture
//!
//! - [`FetchBytes`]: core trait, one URL in, bytes or an [`Absence`] out
//! - [`HttpFetcher`]: the `reqwest` implementation used in production
//!
//! A failed attempt is never an error for the run. Every non-success outcome
//! is returned as an [`Absence`]; the pipeline logs it with the URL and moves
//! on to the next host or index.

use crate::error::Absence;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Browser-like User-Agent; some mirrors reject library defaults.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Trait for retrieving the raw bytes behind one URL.
pub trait FetchBytes {
    /// Fetch `url`, returning its non-empty body or why there is none.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Absence>;
}

/// `reqwest`-backed [`FetchBytes`] with a fixed timeout and User-Agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// The `reqwest` builder error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchBytes for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Absence> {
        let t0 = Instant::now();
        let result = get_bytes(&self.client, url).await;
        match &result {
            Ok(body) => debug!(
                bytes = body.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetched payload"
            ),
            Err(reason) => debug!(%url, %reason, "Source unavailable"),
        }
        result
    }
}

async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>, Absence> {
    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Absence::Status(status.as_u16()));
    }
    let body = response.bytes().await.map_err(transport)?;
    if body.is_empty() {
        return Err(Absence::EmptyBody);
    }
    Ok(body.to_vec())
}

fn transport(e: reqwest::Error) -> Absence {
    let kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else {
        "request"
    };
    Absence::Transport(format!("{kind}: {e}"))
}
