//! share_inspect - A CLI tool for inspecting SharePoint sharing links via Microsoft Graph.
//!
//! This library provides functionality to:
//! - Encode a sharing URL into the Graph `u!` share identifier (and decode it back)
//! - Classify a sharing link into a resource type from the shape of its URL
//! - Fetch share metadata and the matching drive/list item, riding out API
//!   throttling and transient network failure
//!
//! # Example
//!
//! ```no_run
//! use share_inspect::{Authenticator, GraphClient, ShareInspector};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::from_file("graph-credentials.json")?;
//!     let inspector = ShareInspector::new(GraphClient::new(auth));
//!
//!     let report = inspector
//!         .inspect("https://yourdomain.sharepoint.com/:t:/s/ExampleSite/ExampleFile.txt")
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod inspect;
pub mod models;
pub mod resource_type;
pub mod share_id;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::{GraphClient, RetryPolicy, Sleeper, TokioSleeper};
pub use error::{GraphError, Result};
pub use inspect::ShareInspector;
pub use models::{ApiResult, InspectionReport};
pub use resource_type::{classify, ResourceType};
pub use share_id::{decode_share_id, encode_share_url};
