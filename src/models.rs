//! Data models shared by both feed pipelines.
//!
//! - [`FeedKind`]: which of the two subscription formats a run targets
//! - [`SourceDescriptor`]: one (host, date, index) source and its URL
//! - [`RunSummary`]: the outcome of one pipeline run

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::path::PathBuf;

/// Indices of the daily source files. Each feed publishes exactly these five.
pub const SOURCE_INDICES: [u8; 5] = [0, 1, 2, 3, 4];

/// The two subscription feed formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// Multi-document Clash YAML, merged per document.
    Clash,
    /// V2Ray URI list, merged per line.
    V2ray,
}

impl FeedKind {
    /// File extension used in the source URLs.
    pub fn extension(self) -> &'static str {
        match self {
            FeedKind::Clash => "yaml",
            FeedKind::V2ray => "txt",
        }
    }

    /// Output file name, relative to the output directory.
    pub fn output_file(self) -> &'static str {
        match self {
            FeedKind::Clash => "Clash.txt",
            FeedKind::V2ray => "V2ray.txt",
        }
    }

    /// What one merged item is called in log lines.
    pub fn unit(self) -> &'static str {
        match self {
            FeedKind::Clash => "docs",
            FeedKind::V2ray => "lines",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Clash => f.write_str("clash"),
            FeedKind::V2ray => f.write_str("v2ray"),
        }
    }
}

/// A single daily source file on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor<'a> {
    pub host: &'a str,
    pub date: NaiveDate,
    pub index: u8,
    pub extension: &'a str,
}

impl SourceDescriptor<'_> {
    /// Absolute URL of this source.
    ///
    /// `{host}/uploads/{YYYY}/{MM}/{index}-{YYYYMMDD}.{ext}`
    pub fn url(&self) -> String {
        build_url(self.host, self.date, self.index, self.extension)
    }
}

/// Build the URL of one daily source file.
///
/// A trailing `/` on `host` is ignored.
pub fn build_url(host: &str, date: NaiveDate, index: u8, extension: &str) -> String {
    format!(
        "{}/uploads/{}/{:02}/{}-{}.{}",
        host.trim_end_matches('/'),
        date.year(),
        date.month(),
        index,
        date.format("%Y%m%d"),
        extension
    )
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub feed: FeedKind,
    pub target_date: NaiveDate,
    /// Unique documents or lines in the artifact.
    pub merged: usize,
    /// Indices that produced a payload from some host.
    pub succeeded: usize,
    pub attempted: usize,
    /// Path of the written artifact, `None` when nothing was collected.
    pub output: Option<PathBuf>,
    /// Length of the Base64 artifact in characters.
    pub encoded_len: usize,
}
