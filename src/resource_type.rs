//! Resource classification for decoded sharing URLs.
//!
//! SharePoint sharing links carry a short type token in their path (`:w:`
//! for Word, `:x:` for Excel, ...); links without a token can still be
//! recognized by library path or file extension. Classification is a
//! best-effort reading of the URL shape, not something the API guarantees.

use std::fmt;

use serde::Serialize;

/// Resource families recognized from a sharing link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceType {
    DocumentText,
    WordDocument,
    ExcelSpreadsheet,
    PowerPointPresentation,
    Image,
    Video,
    ListItem,
    GenericDocument,
    Unknown,
}

impl ResourceType {
    /// Graph sub-resource holding the underlying item, if one applies.
    ///
    /// Document-family types resolve through `driveItem`, list items through
    /// `listItem`; an unknown type has no item endpoint to query.
    pub fn item_segment(self) -> Option<&'static str> {
        match self {
            ResourceType::ListItem => Some("listItem"),
            ResourceType::Unknown => None,
            _ => Some("driveItem"),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceType::DocumentText => "Document (Text)",
            ResourceType::WordDocument => "Word Document",
            ResourceType::ExcelSpreadsheet => "Excel Spreadsheet",
            ResourceType::PowerPointPresentation => "PowerPoint Presentation",
            ResourceType::Image => "Image",
            ResourceType::Video => "Video",
            ResourceType::ListItem => "List Item",
            ResourceType::GenericDocument => "Document",
            ResourceType::Unknown => "Unknown or unsupported type",
        };
        f.write_str(label)
    }
}

/// File extensions treated as documents when no link-type token is present.
const DOCUMENT_EXTENSIONS: [&str; 4] = [".docx", ".pdf", ".xlsx", ".pptx"];

type Predicate = fn(&str) -> bool;

/// Ordered classification rules; the first matching predicate wins.
///
/// Order matters: the type tokens are checked before the path/extension
/// rules because the latter match far broader contexts (a `:t:` link under
/// `/Lists/` is still a text document link).
const CLASSIFICATION_RULES: &[(Predicate, ResourceType)] = &[
    (|url: &str| url.contains(":t:"), ResourceType::DocumentText),
    (|url: &str| url.contains(":w:"), ResourceType::WordDocument),
    (|url: &str| url.contains(":x:"), ResourceType::ExcelSpreadsheet),
    (|url: &str| url.contains(":p:"), ResourceType::PowerPointPresentation),
    (|url: &str| url.contains(":i:"), ResourceType::Image),
    (|url: &str| url.contains(":v:"), ResourceType::Video),
    (|url: &str| url.contains(":li:"), ResourceType::ListItem),
    (
        |url: &str| {
            url.contains("/Shared Documents/")
                || DOCUMENT_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
        },
        ResourceType::GenericDocument,
    ),
    (|url: &str| url.contains("/Lists/"), ResourceType::ListItem),
];

/// Classify a decoded sharing URL into a [`ResourceType`].
///
/// Total over all inputs: anything matching no rule, the empty string
/// included, classifies as [`ResourceType::Unknown`].
///
/// # Examples
///
/// ```
/// use share_inspect::resource_type::{classify, ResourceType};
///
/// let url = "https://contoso.sharepoint.com/:x:/s/Finance/Q3.xlsx";
/// assert_eq!(classify(url), ResourceType::ExcelSpreadsheet);
/// assert_eq!(classify("https://example.com/"), ResourceType::Unknown);
/// ```
pub fn classify(decoded_url: &str) -> ResourceType {
    CLASSIFICATION_RULES
        .iter()
        .find(|(matches, _)| matches(decoded_url))
        .map(|&(_, resource_type)| resource_type)
        .unwrap_or(ResourceType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_token_rule() {
        let cases = [
            (":t:", ResourceType::DocumentText),
            (":w:", ResourceType::WordDocument),
            (":x:", ResourceType::ExcelSpreadsheet),
            (":p:", ResourceType::PowerPointPresentation),
            (":i:", ResourceType::Image),
            (":v:", ResourceType::Video),
            (":li:", ResourceType::ListItem),
        ];
        for (token, expected) in cases {
            let url = format!("https://yourdomain.sharepoint.com/{}/s/Site/Item", token);
            assert_eq!(classify(&url), expected, "token {}", token);
        }
    }

    #[test]
    fn test_shared_documents_path() {
        let url = "https://yourdomain.sharepoint.com/sites/yoursite/Shared Documents/yourfile";
        assert_eq!(classify(url), ResourceType::GenericDocument);
    }

    #[test]
    fn test_document_extensions() {
        for ext in DOCUMENT_EXTENSIONS {
            let url = format!("https://yourdomain.sharepoint.com/sites/s/file{}", ext);
            assert_eq!(classify(&url), ResourceType::GenericDocument, "ext {}", ext);
        }
    }

    #[test]
    fn test_lists_path() {
        let url = "https://yourdomain.sharepoint.com/sites/yoursite/Lists/yourlistitem";
        assert_eq!(classify(url), ResourceType::ListItem);
    }

    #[test]
    fn test_first_match_wins_over_later_rules() {
        // Carries both a :t: token and a /Lists/ path; the token rule is first.
        let url = "https://yourdomain.sharepoint.com/:t:/s/Site/Lists/Entry";
        assert!(url.contains("/Lists/"));
        assert_eq!(classify(url), ResourceType::DocumentText);
    }

    #[test]
    fn test_unmatched_is_unknown() {
        assert_eq!(classify("https://example.com/some/other/page"), ResourceType::Unknown);
        assert_eq!(classify(""), ResourceType::Unknown);
    }

    #[test]
    fn test_item_segments() {
        assert_eq!(ResourceType::DocumentText.item_segment(), Some("driveItem"));
        assert_eq!(ResourceType::ExcelSpreadsheet.item_segment(), Some("driveItem"));
        assert_eq!(ResourceType::GenericDocument.item_segment(), Some("driveItem"));
        assert_eq!(ResourceType::ListItem.item_segment(), Some("listItem"));
        assert_eq!(ResourceType::Unknown.item_segment(), None);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(ResourceType::DocumentText.to_string(), "Document (Text)");
        assert_eq!(ResourceType::GenericDocument.to_string(), "Document");
        assert_eq!(ResourceType::Unknown.to_string(), "Unknown or unsupported type");
    }
}
