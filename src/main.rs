// Auction console entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load the player list for the offline store
// 4. Seed the in-memory store
// 5. Open the auction session (both lists fetched once)
// 6. Create mpsc channels
// 7. Spawn the app logic task
// 8. Run the TUI event loop (blocking until the operator quits)
// 9. Cleanup on exit

use std::sync::Arc;

use anyhow::Context;
use gavel::app;
use gavel::config;
use gavel::seed;
use gavel::session::AuctionSession;
use gavel::store::{MemoryStore, PlayerStore, TeamStore};
use gavel::tui;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Auction console starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {}, {} teams, increments {:?}",
        config.auction.name,
        config.teams.len(),
        config.auction.bid_increments
    );

    // 3. Load the player list
    let players = seed::load_players(&config.data_paths.players)
        .context("failed to load the player list")?;
    info!("Loaded {} players from {}", players.len(), config.data_paths.players);

    // 4. Seed the in-memory store
    let store = Arc::new(MemoryStore::seeded(players, config.team_records()));
    let player_store: Arc<dyn PlayerStore> = store.clone();
    let team_store: Arc<dyn TeamStore> = store;

    // 5. Open the auction session
    let session = AuctionSession::open(
        player_store.clone(),
        team_store.clone(),
        Box::new(StdRng::from_entropy()),
        config.request_timeout,
    )
    .await
    .context("failed to open the auction session")?;

    // 6. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let ui_options = tui::UiOptions {
        auction_name: config.auction.name.clone(),
        currency: config.auction.currency.clone(),
        bid_increments: config.auction.bid_increments.clone(),
    };

    // 7. Spawn the app logic task
    let app_state = app::AppState::new(config, session, player_store, team_store);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {e}");
        }
    });

    // 8. Run the TUI event loop (blocking until the operator quits)
    if let Err(e) = tui::run(ui_rx, cmd_tx, ui_options).await {
        error!("TUI error: {e}");
    }

    // 9. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Auction console shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gavel.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gavel=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
