use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::fmt;

use ladder_bridge::{keep_alive, serve_stdio};
use ladder_core::client::{ApiClient, ClistClient, CodeforcesClient, LeetCodeClient};
use ladder_core::tools::native;
use ladder_core::{Config, Dispatcher, ToolRegistry};

const KEEPALIVE_PERIOD: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    fmt().compact().init();

    let config = Config::from_env()?;

    let api = ApiClient::new();
    let cf = Arc::new(CodeforcesClient::new(api.clone()));
    let leetcode = Arc::new(LeetCodeClient::new(api.clone()));
    let clist = Arc::new(ClistClient::new(api, config.clist_api_key.clone()));

    let registry = Arc::new(ToolRegistry::new());
    native::install(&registry, cf, leetcode, clist, &config);
    tracing::info!(tools = registry.len(), "Tool registry ready");

    let dispatcher = Arc::new(Dispatcher::new(registry, config.defaults()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let keepalive_handle = config.keepalive_url.clone().map(|url| {
        tokio::spawn(keep_alive(url, KEEPALIVE_PERIOD, shutdown_rx.clone()))
    });

    tokio::select! {
        result = serve_stdio(dispatcher, shutdown_rx.clone()) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Serve loop failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, shutting down");
        }
    }

    // Signal background tasks and wait for them to acknowledge before
    // exiting.
    let _ = shutdown_tx.send(true);
    if let Some(handle) = keepalive_handle {
        let _ = handle.await;
    }

    tracing::info!("Ladder bridge stopped");
    Ok(())
}
