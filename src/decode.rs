//! Payload decoding shared by both feeds.
//!
//! A payload is either Base64 (standard or URL-safe alphabet, padding
//! optional) or plain text. There is no marker telling the two apart, so
//! decoding is attempted and plain text is the fallback. Nothing here fails.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use tracing::debug;

use crate::utils::truncate_for_log;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Which path produced the decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Standard,
    UrlSafe,
    RawText,
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Drop a leading UTF-8 BOM, strip all ASCII whitespace and pad with `=`
/// to a multiple of 4.
pub fn normalize_base64(bytes: &[u8]) -> Vec<u8> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut out: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let padding = (4 - out.len() % 4) % 4;
    out.extend(std::iter::repeat_n(b'=', padding));
    out
}

/// Replace `\r\n` and lone `\r` with `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decode a payload to text, reporting which path succeeded.
pub fn decode_with_encoding(bytes: &[u8]) -> (String, Encoding) {
    let normalized = normalize_base64(bytes);
    let (decoded, encoding) = match STANDARD_LENIENT.decode(&normalized) {
        Ok(decoded) => (decoded, Encoding::Standard),
        Err(std_err) => match URL_SAFE_LENIENT.decode(&normalized) {
            Ok(decoded) => (decoded, Encoding::UrlSafe),
            Err(url_err) => {
                debug!(
                    standard = %std_err,
                    url_safe = %url_err,
                    preview = %truncate_for_log(&String::from_utf8_lossy(bytes), 80),
                    "Payload is not Base64; treating as raw text"
                );
                (bytes.to_vec(), Encoding::RawText)
            }
        },
    };
    let text = normalize_line_endings(&String::from_utf8_lossy(&decoded));
    (text, encoding)
}

/// Decode a payload to normalized text.
pub fn decode_payload_text(bytes: &[u8]) -> String {
    decode_with_encoding(bytes).0
}
