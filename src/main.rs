// Roster editor entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the remote clients (state store, champion catalog, icon uploader)
// 4. Fetch the champion catalog
// 5. Load the persisted state and repair it
// 6. Create mpsc channels
// 7. Spawn WebSocket server task
// 8. Run the controller loop
// 9. Cleanup on Ctrl+C

use std::sync::Arc;

use rift_roster::app;
use rift_roster::config;
use rift_roster::remote::catalog::ChampionCatalog;
use rift_roster::remote::store::{HttpStateStore, MemoryStateStore, StateStore};
use rift_roster::remote::upload::IconUploader;
use rift_roster::roster::state::ApplicationState;
use rift_roster::ws_server;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Roster editor starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: port={}, store={}, catalog={}",
        config.ws_port,
        config.store_url.as_deref().unwrap_or("(in-memory)"),
        config.catalog_url.as_deref().unwrap_or("(disabled)"),
    );

    // 3. Build the remote clients
    let store: Arc<dyn StateStore> = match &config.store_url {
        Some(url) => Arc::new(
            HttpStateStore::new(url.clone(), config.request_timeout)
                .context("failed to build the state store client")?,
        ),
        None => {
            warn!("No store endpoint configured; state will not survive a restart");
            Arc::new(MemoryStateStore::new())
        }
    };
    let uploader = match &config.store_url {
        Some(url) => Some(
            IconUploader::new(url.clone(), config.request_timeout)
                .context("failed to build the icon upload client")?,
        ),
        None => None,
    };
    let catalog = ChampionCatalog::new(config.catalog_url.clone(), config.request_timeout)
        .context("failed to build the champion catalog client")?;

    // 4. Fetch the champion catalog (failure degrades to an empty list)
    let champions = catalog.list().await;

    // 5. Load the persisted state and repair it
    let state = match store.load().await {
        Ok(document) => ApplicationState::from_document(document),
        Err(e) => {
            warn!("Could not load persisted state, starting empty: {e}");
            ApplicationState::default()
        }
    };
    info!(
        "State loaded: {} players, {} slots filled",
        state.players.len(),
        rift_roster::roster::player::Team::BOTH
            .iter()
            .map(|&t| state.teams.filled_count(t))
            .sum::<usize>(),
    );

    let app = app::App::new(state, champions, store, uploader);

    // 6. Create mpsc channels
    let (ws_tx, ws_rx) = mpsc::channel(64);
    let (out_tx, out_rx) = mpsc::channel(256);

    // 7. Spawn WebSocket server task
    let ws_port = config.ws_port;
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = ws_server::run(ws_port, ws_tx, out_rx).await {
            error!("WebSocket server error: {e}");
        }
    });

    // 8. Run the controller loop
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(ws_rx, out_tx, app).await {
            error!("Controller loop error: {e}");
        }
    });

    info!("Application ready. WebSocket server listening on 127.0.0.1:{ws_port}");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Ctrl+C received, shutting down");

    // 9. Cleanup: aborting the server drops its command sender, which ends
    // the controller loop; give it a moment to finish.
    ws_handle.abort();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Roster editor shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("rift-roster.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rift_roster=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
