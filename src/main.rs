use anyhow::{Context, Result};
use clap::Parser;
use sitechat::{
    start_servers, ChatService, EnvSource, Profile, ServerArgs, TemplatePicker, UpstreamClient,
};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    // Initialize logging first
    let file_layer = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true) // Clear file on startup
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitechat=info")))
        .init();

    let profile = Profile::load(args.profile.as_deref())?;
    info!("Starting personal site server for {}", profile.name);

    let service = ChatService::new(
        profile,
        Arc::new(UpstreamClient::new()?),
        TemplatePicker::from_entropy(),
        EnvSource::Process,
    );

    start_servers(&args, service).await
}
