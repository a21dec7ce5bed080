use clap::Parser;
use curator::adapters::profile_store::ProfileStore;
use curator::cli::Cli;
use curator::config::{watcher::ProfileWatcher, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Curator dataset profile server on {}:{}", host, port);

    // Load and assemble all profiles; misconfiguration is fatal at startup.
    let store = Arc::new(ProfileStore::load(settings.profiles.clone()).await?);
    info!("Loaded {} profile(s)", store.names().await.len());

    // Start the profile directory watcher
    let _watcher = if settings.profiles.watch {
        let store_for_watcher = store.clone();
        let handle = tokio::runtime::Handle::current();
        Some(ProfileWatcher::new(&settings.profiles.dir, move || {
            match handle.block_on(store_for_watcher.reload()) {
                Ok(()) => info!("Profiles reloaded successfully"),
                Err(e) => error!("Failed to reload profiles: {}", e),
            }
        })?)
    } else {
        None
    };

    // Create application using the library function
    let app = curator::create_app(store);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
