//! V2Ray subscription feed.
//!
//! Each source file is a list of share URIs (`vmess://`, `ss://`, `trojan://`
//! and so on), one per line. Lines are merged individually across all sources.

use super::Feed;
use crate::decode::decode_payload_text;
use crate::models::FeedKind;
use itertools::Itertools;

/// Marker type for the V2Ray feed.
#[derive(Debug, Clone, Copy)]
pub struct V2ray;

impl Feed for V2ray {
    type Payload = Vec<String>;

    const KIND: FeedKind = FeedKind::V2ray;

    fn decode(bytes: &[u8]) -> Option<Vec<String>> {
        let lines = decode_lines(bytes);
        (!lines.is_empty()).then_some(lines)
    }

    fn payload_size(payload: &Vec<String>) -> usize {
        payload.len()
    }

    fn merge(payloads: Vec<Vec<String>>) -> Vec<String> {
        merge_lines(payloads)
    }

    fn serialize(merged: &[String]) -> String {
        merged.join("\n")
    }
}

/// Decode a payload into trimmed, non-empty lines.
pub fn decode_lines(bytes: &[u8]) -> Vec<String> {
    decode_payload_text(bytes)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Merge line lists into one list of unique lines, first seen wins.
pub fn merge_lines<I, L>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = String>,
{
    lists.into_iter().flatten().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_base64_line_list() {
        let encoded = STANDARD.encode("vmess://aaa\r\n\r\n  ss://bbb  \rtrojan://ccc\n");
        assert_eq!(
            V2ray::decode(encoded.as_bytes()),
            Some(lines(&["vmess://aaa", "ss://bbb", "trojan://ccc"]))
        );
    }

    #[test]
    fn test_decode_bom_prefixed_line_list() {
        let payload = [&b"\xEF\xBB\xBF"[..], STANDARD.encode("vmess://a\nss://b").as_bytes()].concat();
        assert_eq!(V2ray::decode(&payload), Some(lines(&["vmess://a", "ss://b"])));
    }

    #[test]
    fn test_decode_raw_uri_list() {
        let raw = b"vmess://aaa\nss://bbb\n";
        assert_eq!(V2ray::decode(raw), Some(lines(&["vmess://aaa", "ss://bbb"])));
    }

    #[test]
    fn test_empty_or_whitespace_payload_has_no_content() {
        assert!(decode_lines(b"").is_empty());
        assert_eq!(V2ray::decode(b"   \n\t"), None);
        let blank_lines = STANDARD.encode("\n  \n\r\n");
        assert_eq!(V2ray::decode(blank_lines.as_bytes()), None);
    }

    #[test]
    fn test_merge_preserves_first_seen_order() {
        let merged = merge_lines(vec![lines(&["b", "a"]), lines(&["a", "c"])]);
        assert_eq!(merged, lines(&["b", "a", "c"]));
    }

    #[test]
    fn test_merge_dedupes_within_a_list() {
        let merged = V2ray::merge(vec![lines(&["x", "x", "y"]), lines(&["y"])]);
        assert_eq!(merged, lines(&["x", "y"]));
    }

    #[test]
    fn test_serialize_has_no_trailing_newline() {
        assert_eq!(V2ray::serialize(&lines(&["a", "b", "c"])), "a\nb\nc");
        assert_eq!(V2ray::serialize(&[]), "");
    }
}
