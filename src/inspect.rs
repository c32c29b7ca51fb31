//! End-to-end inspection of a single sharing link.

use crate::client::GraphClient;
use crate::error::Result;
use crate::models::InspectionReport;
use crate::resource_type::classify;
use crate::share_id::{decode_share_id, encode_share_url};

/// Drives the full inspection pipeline for a sharing URL.
///
/// Encodes the URL into its share identifier, classifies the link, fetches
/// the share metadata and, when the resource family is known, the matching
/// item sub-resource.
pub struct ShareInspector {
    client: GraphClient,
}

impl ShareInspector {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Inspect one sharing URL and return the collected report.
    ///
    /// The metadata request must succeed for a report to be produced. A
    /// failing item request does not fail the inspection; the error is
    /// recorded on the report instead.
    pub async fn inspect(&self, share_url: &str) -> Result<InspectionReport> {
        let share_id = encode_share_url(share_url);
        // Decoding an identifier we just produced can only fail if the
        // codec itself is broken.
        let decoded_url = decode_share_id(&share_id)?;
        debug_assert_eq!(decoded_url, share_url);

        let resource_type = classify(&decoded_url);
        tracing::debug!(%share_id, %resource_type, "classified sharing link");

        let metadata = self.client.get_share(&share_id).await?;

        let (item, item_error) = match resource_type.item_segment() {
            Some(segment) => match self.client.get_share_item(&share_id, segment).await {
                Ok(result) => (Some(result), None),
                Err(e) => {
                    tracing::warn!(%share_id, segment, error = %e, "item request failed");
                    (None, Some(e.to_string()))
                }
            },
            None => {
                tracing::debug!(%share_id, "unknown resource type; skipping item lookup");
                (None, None)
            }
        };

        Ok(InspectionReport {
            url: share_url.to_string(),
            share_id,
            decoded_url,
            resource_type,
            metadata,
            item,
            item_error,
        })
    }
}
