use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use station_core::{Engine, TracingEventHandler};
use station_server::{config::Config, create_routes, link, station_manager::StationManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting station server...");

    let config = Config::new();

    let mut engine = Engine::with_system_clock(config.engine_config());
    engine.add_event_handler(Box::new(TracingEventHandler));

    let (manager, outbound) = StationManager::new(engine);
    let manager = Arc::new(manager);

    let routes = create_routes(manager.clone());

    // Block expiry runs on its own clock, independent of link traffic
    let tick_manager = manager.clone();
    let tick_interval = Duration::from_millis(config.tick_interval_ms.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick_interval);
        loop {
            interval.tick().await;
            tick_manager.tick().await;
        }
    });

    info!("Link source: {:?}", config.link);
    tokio::spawn(link::run(config.link.clone(), manager.clone(), outbound));

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (config.host.parse::<std::net::IpAddr>()?, config.port);

    let (addr, server) =
        warp::serve(routes).try_bind_with_graceful_shutdown(addr, shutdown_signal())?;

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handlers: {}", e);
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
        Err(e) => {
            error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
