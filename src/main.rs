use std::sync::Arc;
use switchboard::application::{CallListener, SessionSettings};
use switchboard::config::Config;
use switchboard::domain::directory::standard_entries;
use switchboard::domain::platform::SipTransferService;
use switchboard::infrastructure::livekit::LiveKitSipClient;
use switchboard::interface::api::{build_router, init_metrics};
use switchboard::interface::gateway::GatewayState;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Switchboard phone assistant");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    let directory = Arc::new(config.directory(standard_entries())?);
    let settings = Arc::new(SessionSettings::from_config(&config, &directory));
    for department in directory.departments() {
        info!(
            "Menu option {}: {} ({})",
            department.digit,
            department.display_name,
            if department.number.is_some() { "configured" } else { "unavailable" }
        );
    }

    let transfers: Arc<dyn SipTransferService> = Arc::new(LiveKitSipClient::from_config(&config.livekit)?);

    // Start the call listener
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (incoming_tx, incoming_rx) = mpsc::channel(256);
    let listener = CallListener::new(directory, settings, shutdown_rx.clone());
    let listener_handle = tokio::spawn(listener.run(incoming_rx));

    // Start the gateway
    info!("Initializing Prometheus metrics exporter");
    let prometheus_handle = init_metrics()?;
    let app = build_router(
        GatewayState {
            incoming: incoming_tx,
            transfers,
        },
        prometheus_handle,
    );

    let tcp = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Session gateway listening on {}", config.bind_address());

    let mut server_shutdown = shutdown_rx;
    let server = tokio::spawn(async move {
        axum::serve(tcp, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            })
            .await
    });

    // Keep the assistant running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    shutdown_tx.send(true)?;

    server.await??;
    let stats = listener_handle.await?;
    info!(
        "Served {} calls ({} failed)",
        stats.accepted, stats.failed
    );

    Ok(())
}
