//! Share identifier codec for the Graph shares API.
//!
//! The API addresses a shared resource by an opaque identifier derived from
//! its sharing URL: `u!` followed by the URL-safe base64 of the URL's UTF-8
//! bytes with trailing `=` padding stripped. The encoding is reproduced
//! byte-for-byte here since the identifier goes on the wire as-is.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::{GraphError, Result};

/// Prefix marking a sharing-URL-derived identifier.
const SHARE_ID_PREFIX: &str = "u!";

/// Encode a sharing URL into an opaque share identifier.
///
/// Never fails; any string, URL-shaped or not, has an encoding.
///
/// # Examples
///
/// ```
/// use share_inspect::share_id::{decode_share_id, encode_share_url};
///
/// let url = "https://contoso.sharepoint.com/:w:/s/Site/Report.docx";
/// let id = encode_share_url(url);
/// assert!(id.starts_with("u!"));
/// assert!(!id.ends_with('='));
/// assert_eq!(decode_share_id(&id).unwrap(), url);
/// ```
pub fn encode_share_url(url: &str) -> String {
    format!("{}{}", SHARE_ID_PREFIX, URL_SAFE_NO_PAD.encode(url.as_bytes()))
}

/// Decode a share identifier back into the sharing URL it encodes.
///
/// This is the exact inverse of [`encode_share_url`] for every identifier
/// that function produces, and also accepts payloads that kept their
/// trailing `=` padding. Identifiers without the `u!` prefix are rejected
/// with [`GraphError::InvalidShareId`]; payloads that are not URL-safe
/// base64 of UTF-8 text are rejected with
/// [`GraphError::MalformedShareId`].
pub fn decode_share_id(share_id: &str) -> Result<String> {
    let payload = share_id
        .strip_prefix(SHARE_ID_PREFIX)
        .ok_or_else(|| GraphError::InvalidShareId(share_id.to_string()))?;

    // Encoding never emits padding, but identifiers from other producers
    // may carry it; trailing `=` holds no data either way.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| GraphError::MalformedShareId(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| GraphError::MalformedShareId(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_vector() {
        // Observed wire format for this URL.
        let url = "https://yourdomain.sharepoint.com/:t:/s/ExampleSite/ExampleFile.txt";
        assert_eq!(
            encode_share_url(url),
            "u!aHR0cHM6Ly95b3VyZG9tYWluLnNoYXJlcG9pbnQuY29tLzp0Oi9zL0V4YW1wbGVTaXRlL0V4YW1wbGVGaWxlLnR4dA"
        );
    }

    #[test]
    fn test_round_trip() {
        let urls = [
            "https://yourdomain.sharepoint.com/:t:/s/ExampleSite/ExampleFile.txt",
            "https://yourdomain.sharepoint.com/sites/yoursite/Lists/yourlistitem",
            "not a url at all",
            "",
        ];
        for url in urls {
            let id = encode_share_url(url);
            assert_eq!(decode_share_id(&id).unwrap(), url, "round trip for {:?}", url);
        }
    }

    #[test]
    fn test_round_trip_non_ascii() {
        let url = "https://contoso.sharepoint.com/:w:/s/Site/Ünïcødé 文件.docx";
        assert_eq!(decode_share_id(&encode_share_url(url)).unwrap(), url);
    }

    #[test]
    fn test_no_padding_in_output() {
        // Inputs whose base64 form would carry 2, 1, 0 and 2 padding chars.
        for (input, expected) in [("a", "u!YQ"), ("ab", "u!YWI"), ("abc", "u!YWJj"), ("abcd", "u!YWJjZA")] {
            let id = encode_share_url(input);
            assert_eq!(id, expected);
            assert!(!id.contains('='));
            assert_eq!(decode_share_id(&id).unwrap(), input);
        }
    }

    #[test]
    fn test_padded_payload_accepted() {
        assert_eq!(decode_share_id("u!YQ==").unwrap(), "a");
        assert_eq!(decode_share_id("u!YQ=").unwrap(), "a");
    }

    #[test]
    fn test_missing_prefix_rejected() {
        let err = decode_share_id("aHR0cHM6").unwrap_err();
        assert!(matches!(err, GraphError::InvalidShareId(_)));
    }

    #[test]
    fn test_malformed_base64_rejected() {
        let err = decode_share_id("u!@@not-base64@@").unwrap_err();
        assert!(matches!(err, GraphError::MalformedShareId(_)));
    }

    #[test]
    fn test_invalid_utf8_payload_rejected() {
        // Valid base64 of the bytes FF FE, which is not UTF-8.
        let err = decode_share_id("u!__4").unwrap_err();
        assert!(matches!(err, GraphError::MalformedShareId(_)));
    }
}
