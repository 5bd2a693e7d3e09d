//! # subfeed_merge
//!
//! A daily batch job that rebuilds two subscription artifacts from the
//! source files published for the previous day:
//!
//! - `Clash.txt`: Base64 of the merged, deduplicated Clash YAML documents
//! - `V2ray.txt`: Base64 of the merged, deduplicated V2Ray URI lines
//!
//! ## Usage
//!
//! ```sh
//! subfeed_merge                 # both feeds, yesterday in Asia/Shanghai
//! subfeed_merge v2ray -o ./out  # one feed, custom output directory
//! ```
//!
//! ## Architecture
//!
//! For each feed, sequentially:
//! 1. **Date**: resolve the target date (override or yesterday)
//! 2. **Fetching**: indices 0..=4, primary host then fallbacks
//! 3. **Decoding**: Base64 (standard, URL-safe) or raw text
//! 4. **Merging**: dedupe by document (Clash) or by line (V2Ray)
//! 5. **Output**: Base64-encode and overwrite the artifact
//!
//! ## Exit codes
//!
//! `0` on success, including runs where nothing was collected. `2` for an
//! invalid configuration such as a malformed date override. `1` when an
//! artifact cannot be written.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod date;
mod decode;
mod error;
mod feeds;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use error::RunError;
use feeds::{Clash, V2ray};
use fetch::{FetchBytes, HttpFetcher};
use models::{FeedKind, RunSummary};
use pipeline::run_feed;
use utils::ensure_writable_dir;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("subfeed_merge starting up");

    let args = Cli::parse();

    let result = match HttpFetcher::new(args.timeout()) {
        Ok(fetcher) => run(&args, &fetcher, Utc::now()).await,
        Err(e) => Err(e.into()),
    };

    let elapsed = start_time.elapsed();
    match result {
        Ok(summaries) => {
            info!(?elapsed, feeds = summaries.len(), "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, ?elapsed, "Run aborted");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Validate configuration, then run every selected feed in turn.
///
/// Nothing is fetched unless all configuration resolves.
#[instrument(level = "info", skip_all, fields(feed = ?args.feed))]
async fn run<C: FetchBytes>(args: &Cli, fetcher: &C, now: DateTime<Utc>) -> Result<Vec<RunSummary>, RunError> {
    let configs = args.feed_configs(now)?;
    ensure_writable_dir(&args.output_dir).await?;

    let mut summaries = Vec::with_capacity(configs.len());
    for (feed, config) in &configs {
        let summary = match feed {
            FeedKind::Clash => run_feed::<Clash, C>(fetcher, config).await?,
            FeedKind::V2ray => run_feed::<V2ray, C>(fetcher, config).await?,
        };
        info!(
            feed = %summary.feed,
            date = %summary.target_date,
            merged = summary.merged,
            sources = %format!("{}/{}", summary.succeeded, summary.attempted),
            written = summary.output.is_some(),
            chars = summary.encoded_len,
            "Feed summary"
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::ScriptedFetcher;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec![
            "subfeed_merge",
            "--primary-host",
            "https://p.test",
            "--clash-fallback-host",
            "https://f.test",
            "--v2ray-fallback-host",
            "https://f.test",
        ];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[tokio::test]
    async fn test_malformed_date_override_exits_2_without_fetching() {
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().to_str().unwrap();
        let args = cli(&["v2ray", "-o", out, "--v2ray-target-date", "2025-09-11"]);
        let fetcher = ScriptedFetcher::default();

        let err = run(&args, &fetcher, Utc::now()).await.unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(fetcher.calls.borrow().is_empty());
        assert!(!temp.path().join("V2ray.txt").exists());
    }

    #[tokio::test]
    async fn test_v2ray_end_to_end() {
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().to_str().unwrap();
        let args = cli(&["v2ray", "-o", out, "--v2ray-target-date", "20250911"]);
        let fetcher = ScriptedFetcher::default()
            .with("https://p.test/uploads/2025/09/1-20250911.txt", STANDARD.encode("a\nb"))
            .with("https://f.test/uploads/2025/09/4-20250911.txt", STANDARD.encode("b\nc"));

        let summaries = run(&args, &fetcher, Utc::now()).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].merged, 3);
        assert_eq!(summaries[0].succeeded, 2);
        assert_eq!(summaries[0].attempted, 5);
        let encoded = std::fs::read_to_string(temp.path().join("V2ray.txt")).unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"a\nb\nc");
    }

    #[tokio::test]
    async fn test_all_feeds_with_nothing_published() {
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().to_str().unwrap();
        let args = cli(&["-o", out, "--v2ray-target-date", "20250911"]);
        let fetcher = ScriptedFetcher::default();

        let summaries = run(&args, &fetcher, Utc::now()).await.unwrap();

        assert_eq!(
            summaries.iter().map(|s| s.feed).collect::<Vec<_>>(),
            vec![FeedKind::Clash, FeedKind::V2ray]
        );
        assert!(summaries.iter().all(|s| s.output.is_none()));
        // Clash picked up the V2Ray override.
        assert!(fetcher.calls.borrow()[0].ends_with("/0-20250911.yaml"));
        assert_eq!(fetcher.calls.borrow().len(), 20);
        assert!(!temp.path().join("Clash.txt").exists());
        assert!(!temp.path().join("V2ray.txt").exists());
    }
}
