//! The two subscription feed formats.
//!
//! Both feeds run through the same pipeline and differ only in how a decoded
//! payload is shaped, what the unit of deduplication is, and how the merged
//! result is joined back together.
//!
//! | Feed | Module | Payload | Dedup unit | Join |
//! |------|--------|---------|------------|------|
//! | Clash | [`clash`] | one YAML text | trimmed document | `\n---\n` plus trailing `\n` |
//! | V2Ray | [`v2ray`] | list of URI lines | single line | `\n` |

pub mod clash;
pub mod v2ray;

use crate::models::FeedKind;

pub use clash::Clash;
pub use v2ray::V2ray;

/// Feed-specific decode, merge and serialize rules.
pub trait Feed {
    /// One decoded source file.
    type Payload;

    const KIND: FeedKind;

    /// Decode raw bytes. `None` means "no content here"; the caller moves on
    /// to the next host for the same index.
    fn decode(bytes: &[u8]) -> Option<Self::Payload>;

    /// Size of a payload for log lines (chars for Clash, lines for V2Ray).
    fn payload_size(payload: &Self::Payload) -> usize;

    /// Merge payloads in index order into unique items, first seen wins.
    fn merge(payloads: Vec<Self::Payload>) -> Vec<String>;

    /// Join merged items into the text that gets Base64-encoded.
    fn serialize(merged: &[String]) -> String;
}
