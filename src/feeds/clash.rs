//! Clash subscription feed.
//!
//! Each source file is one multi-document YAML text. Documents are merged
//! whole: two sources publishing the exact same (trimmed) config collapse to
//! one, anything else is kept and separated by `---` in the output.

use super::Feed;
use crate::decode::decode_with_encoding;
use crate::models::FeedKind;
use itertools::Itertools;
use serde_yaml::Value;
use tracing::debug;

/// Top-level keys that mark a text as a Clash config.
const HINT_KEYS: [&str; 5] = ["proxies", "proxy-groups", "mixed-port", "port", "rules"];

/// Marker type for the Clash feed.
#[derive(Debug, Clone, Copy)]
pub struct Clash;

impl Feed for Clash {
    type Payload = String;

    const KIND: FeedKind = FeedKind::Clash;

    fn decode(bytes: &[u8]) -> Option<String> {
        let (text, encoding) = decode_with_encoding(bytes);
        debug!(
            ?encoding,
            looks_like_clash = looks_like_clash_config(&text),
            "Decoded Clash payload"
        );
        // Any decoded text is accepted, the hint is diagnostic only.
        Some(text)
    }

    fn payload_size(payload: &String) -> usize {
        payload.chars().count()
    }

    fn merge(payloads: Vec<String>) -> Vec<String> {
        merge_documents(payloads)
    }

    fn serialize(merged: &[String]) -> String {
        format!("{}\n", merged.join("\n---\n"))
    }
}

/// Trim documents, drop blank ones and dedupe on the trimmed text.
pub fn merge_documents<I, S>(docs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    docs.into_iter()
        .map(|doc| doc.as_ref().trim().to_string())
        .filter(|doc| !doc.is_empty())
        .unique()
        .collect()
}

/// Whether any YAML document in `text` has one of the Clash top-level keys.
///
/// Texts that don't parse as YAML fall back to a plain substring scan.
pub fn looks_like_clash_config(text: &str) -> bool {
    use serde::Deserialize;

    let mut parsed_any = false;
    for document in serde_yaml::Deserializer::from_str(text) {
        let Ok(value) = Value::deserialize(document) else {
            break;
        };
        parsed_any = true;
        if let Value::Mapping(map) = value {
            if HINT_KEYS.iter().any(|key| map.contains_key(*key)) {
                return true;
            }
        }
    }
    !parsed_any && HINT_KEYS.iter().any(|key| text.contains(&format!("{key}:")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    const DOC_A: &str = "mixed-port: 7890\nproxies:\n  - name: hk-01\n    type: ss\n";
    const DOC_B: &str = "port: 7891\nproxies:\n  - name: jp-01\n    type: vmess\n";

    #[test]
    fn test_decode_base64_document() {
        let encoded = STANDARD.encode(DOC_A.replace('\n', "\r\n"));
        assert_eq!(Clash::decode(encoded.as_bytes()).as_deref(), Some(DOC_A));
    }

    #[test]
    fn test_decode_raw_yaml_document() {
        assert_eq!(Clash::decode(DOC_B.as_bytes()).as_deref(), Some(DOC_B));
    }

    #[test]
    fn test_decode_accepts_non_yaml_text() {
        let text = "just some: [unbalanced";
        assert_eq!(Clash::decode(text.as_bytes()).as_deref(), Some(text));
    }

    #[test]
    fn test_whitespace_only_is_accepted_then_dropped_by_merge() {
        let decoded = Clash::decode(b"  \n ").unwrap();
        assert_eq!(decoded, "");
        assert!(Clash::merge(vec![decoded]).is_empty());
    }

    #[test]
    fn test_merge_dedupes_trimmed_documents_in_order() {
        let merged = merge_documents([
            format!("\n{DOC_B}\n\n"),
            DOC_A.to_string(),
            "   ".to_string(),
            DOC_B.to_string(),
        ]);
        assert_eq!(merged, vec![DOC_B.trim().to_string(), DOC_A.trim().to_string()]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let docs = vec![DOC_A.to_string(), DOC_B.to_string(), DOC_A.to_string()];
        let once = merge_documents(&docs);
        let doubled: Vec<&String> = docs.iter().chain(docs.iter()).collect();
        assert_eq!(merge_documents(doubled), once);
        assert_eq!(merge_documents(&once), once);
    }

    #[test]
    fn test_serialize_joins_with_separator_and_trailing_newline() {
        let merged = vec!["a: 1".to_string(), "b: 2".to_string()];
        assert_eq!(Clash::serialize(&merged), "a: 1\n---\nb: 2\n");
    }

    #[test]
    fn test_looks_like_clash_config() {
        assert!(looks_like_clash_config(DOC_A));
        assert!(looks_like_clash_config(&format!("{DOC_A}---\n{DOC_B}")));
        assert!(looks_like_clash_config("rules: [\nbroken"));
        assert!(!looks_like_clash_config("vmess://abc\nss://def"));
        assert!(!looks_like_clash_config("name: x\nvalue: 1\n"));
    }
}
