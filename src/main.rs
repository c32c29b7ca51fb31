//! share_inspect CLI - Inspect SharePoint sharing links via Microsoft Graph.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use share_inspect::{
    classify, decode_share_id, encode_share_url, ApiResult, Authenticator, GraphClient,
    InspectionReport, ShareInspector,
};

/// CLI tool for inspecting SharePoint sharing links.
#[derive(Parser)]
#[command(name = "share_inspect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect sharing links against the Graph API.
    Inspect {
        /// Sharing URLs to inspect.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Path to application credentials JSON file.
        #[arg(long, env = "GRAPH_APPLICATION_CREDENTIALS")]
        credentials: PathBuf,

        /// Graph API base URL override.
        #[arg(long, env = "GRAPH_API_BASE")]
        api_base: Option<String>,

        /// Print each report as JSON instead of the text summary.
        #[arg(long)]
        json: bool,
    },

    /// Encode a sharing URL into its share identifier (offline).
    Encode {
        /// Sharing URL to encode.
        url: String,
    },

    /// Decode a share identifier back into its URL (offline).
    Decode {
        /// Share identifier (u!...) to decode.
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("share_inspect=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            urls,
            credentials,
            api_base,
            json,
        } => {
            // Initialize authenticator
            let auth = Authenticator::from_file(&credentials)
                .with_context(|| format!("Failed to load credentials from {:?}", credentials))?;

            // Create client
            let client = match api_base {
                Some(base) => GraphClient::with_base_url(auth, base),
                None => GraphClient::new(auth),
            };
            let inspector = ShareInspector::new(client);

            for url in &urls {
                match inspector.inspect(url).await {
                    Ok(report) => {
                        if json {
                            println!("{}", serde_json::to_string_pretty(&report)?);
                        } else {
                            print_report(&report);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error inspecting {}: {}", url, e);
                    }
                }
            }
        }

        Commands::Encode { url } => {
            println!("{}", encode_share_url(&url));
        }

        Commands::Decode { id } => {
            let url = decode_share_id(&id)?;
            println!("Decoded URL: {}", url);
            println!("Resource type: {}", classify(&url));
        }
    }

    Ok(())
}

/// Print the text summary for one inspected URL.
fn print_report(report: &InspectionReport) {
    println!("\n--- {} ---", report.url);
    println!("Share identifier: {}", report.share_id);
    println!("Decoded URL: {}", report.decoded_url);
    println!("Resource type: {}", report.resource_type);

    println!("Metadata (HTTP {}):", report.metadata.status);
    print_result(&report.metadata);

    match (&report.item, &report.item_error) {
        (Some(item), _) => {
            let label = report.resource_type.item_segment().unwrap_or("item");
            println!("{} (HTTP {}):", label, item.status);
            print_result(item);
        }
        (None, Some(e)) => println!("Item request failed: {}", e),
        (None, None) => println!("Skipping item retrieval due to unknown resource type."),
    }
}

/// Print a response body, pretty-printed when it parsed as JSON.
fn print_result(result: &ApiResult) {
    match &result.json {
        Some(json) => match serde_json::to_string_pretty(json) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", result.body),
        },
        None => {
            if let Some(e) = &result.parse_error {
                println!("Failed to parse response body: {}", e);
            }
            println!("{}", result.body);
        }
    }
}
