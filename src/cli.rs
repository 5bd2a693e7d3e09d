//! Command-line interface definitions.
//!
//! No arguments are required. Every option can also come from an
//! environment variable, which is how the scheduled job configures it.

use crate::date::{DEFAULT_TIMEZONE, DateOverride, resolve_target_date};
use crate::error::ConfigError;
use crate::fetch::DEFAULT_TIMEOUT;
use crate::models::FeedKind;
use crate::pipeline::FeedConfig;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_PRIMARY_HOST: &str = "https://node.freessr.net";
pub const DEFAULT_FALLBACK_HOST: &str = "https://node.freeclashnode.com";

/// Which feeds to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedSelection {
    Clash,
    V2ray,
    All,
}

impl FeedSelection {
    pub fn feeds(self) -> Vec<FeedKind> {
        match self {
            FeedSelection::Clash => vec![FeedKind::Clash],
            FeedSelection::V2ray => vec![FeedKind::V2ray],
            FeedSelection::All => vec![FeedKind::Clash, FeedKind::V2ray],
        }
    }
}

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Update both Clash.txt and V2ray.txt in the current directory
/// subfeed_merge
///
/// # Re-run V2Ray for a specific day
/// V2RAY_TARGET_DATE=20250911 subfeed_merge v2ray
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Feed(s) to update
    #[arg(value_enum, default_value_t = FeedSelection::All)]
    pub feed: FeedSelection,

    /// Host tried first for every source index
    #[arg(long, env = "SUBFEED_PRIMARY_HOST", default_value = DEFAULT_PRIMARY_HOST)]
    pub primary_host: String,

    /// Fallback host(s) for the Clash feed, comma-separated, tried in order
    #[arg(long, env = "CLASH_FALLBACK_HOST", value_delimiter = ',', default_value = DEFAULT_FALLBACK_HOST)]
    pub clash_fallback_host: Vec<String>,

    /// Fallback host(s) for the V2Ray feed, comma-separated, tried in order
    #[arg(long, env = "V2RAY_FALLBACK_HOST", value_delimiter = ',', default_value = DEFAULT_FALLBACK_HOST)]
    pub v2ray_fallback_host: Vec<String>,

    /// Target date for the Clash feed (YYYYMMDD)
    #[arg(long, env = "CLASH_TARGET_DATE")]
    pub clash_target_date: Option<String>,

    /// Target date for the V2Ray feed (YYYYMMDD); also used by Clash when its own is unset
    #[arg(long, env = "V2RAY_TARGET_DATE")]
    pub v2ray_target_date: Option<String>,

    /// Timezone whose "yesterday" is the default target date
    #[arg(long, env = "SUBFEED_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Directory the artifacts are written to
    #[arg(short, long, env = "SUBFEED_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "SUBFEED_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The date override that applies to `feed`, if any.
    ///
    /// Clash honours `CLASH_TARGET_DATE` first and then `V2RAY_TARGET_DATE`.
    /// V2Ray only honours its own. Blank values count as unset.
    pub fn date_override(&self, feed: FeedKind) -> Option<DateOverride> {
        let pick = |name: &str, value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| DateOverride {
                    source_name: name.to_string(),
                    value: v.to_string(),
                })
        };
        let v2ray = pick("V2RAY_TARGET_DATE", &self.v2ray_target_date);
        match feed {
            FeedKind::Clash => pick("CLASH_TARGET_DATE", &self.clash_target_date).or(v2ray),
            FeedKind::V2ray => v2ray,
        }
    }

    /// Hosts for `feed`: the primary, then the non-blank fallbacks in order.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidHost`] if a host is not an absolute http(s) URL.
    pub fn hosts(&self, feed: FeedKind) -> Result<Vec<String>, ConfigError> {
        let fallbacks = match feed {
            FeedKind::Clash => &self.clash_fallback_host,
            FeedKind::V2ray => &self.v2ray_fallback_host,
        };
        std::iter::once(&self.primary_host)
            .chain(fallbacks)
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(validate_host)
            .collect()
    }

    /// Resolve one [`FeedConfig`] per selected feed.
    ///
    /// All configuration is validated here, before anything is fetched.
    pub fn feed_configs(&self, now: DateTime<Utc>) -> Result<Vec<(FeedKind, FeedConfig)>, ConfigError> {
        self.feed
            .feeds()
            .into_iter()
            .map(|feed| -> Result<(FeedKind, FeedConfig), ConfigError> {
                let target_date = resolve_target_date(self.date_override(feed).as_ref(), &self.timezone, now)?;
                let config = FeedConfig {
                    target_date,
                    hosts: self.hosts(feed)?,
                    output_dir: self.output_dir.clone(),
                };
                Ok((feed, config))
            })
            .collect()
    }
}

fn validate_host(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidHost {
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
