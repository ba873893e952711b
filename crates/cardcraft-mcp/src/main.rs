//! Cardcraft MCP server binary (stdio transport).

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cardcraft_api::ApiClient;
use cardcraft_core::Settings;
use cardcraft_mcp::CardcraftServer;
use cardcraft_mcp::tools::{CardTools, CourseTools, DiagnosticTools, MediaTools};
use cardcraft_media::{AzureImageGenerator, ElevenLabsSpeech, LazyBlobStore, MediaPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the MCP protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env();

    let client = Arc::new(ApiClient::new(settings.api.clone()));
    let pipeline = MediaPipeline::new(
        Arc::new(ElevenLabsSpeech::new(settings.speech)),
        Arc::new(AzureImageGenerator::new(settings.imagegen)),
        Arc::new(LazyBlobStore::new(settings.storage)),
    );

    let server = CardcraftServer::new()
        .with_registry(CourseTools::new(
            Arc::clone(&client),
            settings.api.company_id,
        ))
        .with_registry(CardTools::new(client))
        .with_registry(MediaTools::new(pipeline))
        .with_registry(DiagnosticTools::new());

    tracing::info!("starting Cardcraft MCP server on stdio");
    server.serve_stdio().await
}
