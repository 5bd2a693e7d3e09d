//! The fetch → decode → merge → write pipeline.
//!
//! Per run and feed:
//! 1. For each index 0..=4, in order, try the primary host and then each
//!    fallback host until one yields a decodable payload
//! 2. Merge the collected payloads (first seen wins)
//! 3. Serialize, Base64-encode and write the artifact
//!
//! Everything is sequential. Missing sources are logged and skipped; only a
//! failed write ends the run with an error.

use crate::error::WriteError;
use crate::feeds::Feed;
use crate::fetch::FetchBytes;
use crate::models::{RunSummary, SOURCE_INDICES, SourceDescriptor};
use crate::outputs::artifact::write_artifact;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Everything one feed run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub target_date: NaiveDate,
    /// Primary host first, then fallbacks, in the order they are tried.
    pub hosts: Vec<String>,
    pub output_dir: PathBuf,
}

/// Try each host in order for one index; the first decodable payload wins.
///
/// Returns `None` once every host is exhausted.
#[instrument(level = "info", skip(fetcher, hosts), fields(feed = %F::KIND))]
pub async fn fetch_with_fallback<F, C>(
    fetcher: &C,
    hosts: &[String],
    date: NaiveDate,
    index: u8,
) -> Option<F::Payload>
where
    F: Feed,
    C: FetchBytes,
{
    for host in hosts {
        let url = SourceDescriptor {
            host,
            date,
            index,
            extension: F::KIND.extension(),
        }
        .url();
        info!(%url, "Trying source");

        let bytes = match fetcher.fetch(&url).await {
            Ok(bytes) => bytes,
            Err(reason) => {
                warn!(%url, %reason, "No payload from host");
                continue;
            }
        };
        match F::decode(&bytes) {
            Some(payload) => {
                info!(%url, size = F::payload_size(&payload), unit = F::KIND.unit(), "Collected payload");
                return Some(payload);
            }
            None => warn!(%url, "Payload decoded to no content"),
        }
    }
    warn!(index, "All hosts exhausted; skipping index");
    None
}

/// Run one feed end to end.
///
/// # Errors
///
/// [`WriteError`] if the artifact cannot be written. Source failures are
/// never errors.
#[instrument(level = "info", skip(fetcher, config), fields(feed = %F::KIND, date = %config.target_date))]
pub async fn run_feed<F, C>(fetcher: &C, config: &FeedConfig) -> Result<RunSummary, WriteError>
where
    F: Feed,
    C: FetchBytes,
{
    let kind = F::KIND;
    info!(target_date = %config.target_date.format("%Y-%m-%d"), "Target date");

    let mut payloads = Vec::with_capacity(SOURCE_INDICES.len());
    for index in SOURCE_INDICES {
        if let Some(payload) = fetch_with_fallback::<F, C>(fetcher, &config.hosts, config.target_date, index).await {
            payloads.push(payload);
        }
    }
    let succeeded = payloads.len();

    let mut summary = RunSummary {
        feed: kind,
        target_date: config.target_date,
        merged: 0,
        succeeded,
        attempted: SOURCE_INDICES.len(),
        output: None,
        encoded_len: 0,
    };

    if payloads.is_empty() {
        warn!(file = kind.output_file(), "Nothing collected from any source; skip writing");
        return Ok(summary);
    }

    let merged = F::merge(payloads);
    info!(unique = merged.len(), unit = kind.unit(), "Merged payloads");

    let text = F::serialize(&merged);
    let (path, encoded_len) = write_artifact(&config.output_dir, kind.output_file(), &text).await?;

    summary.merged = merged.len();
    summary.output = Some(path);
    summary.encoded_len = encoded_len;
    info!(
        file = kind.output_file(),
        chars = encoded_len,
        merged = summary.merged,
        unit = kind.unit(),
        sources = %format!("{}/{}", summary.succeeded, summary.attempted),
        "Run complete"
    );
    Ok(summary)
}
