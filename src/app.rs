// Application state and orchestration logic.
//
// The event loop that drives one auction run: it receives operator
// commands from the TUI over an mpsc channel, applies them to the
// session, and pushes snapshots and notices back for rendering. Commands
// are handled strictly one at a time, awaiting any store call to
// completion before the next command is taken, so two mutating requests
// can never be in flight together.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::protocol::{
    AuctionSnapshot, Notice, ResultsSnapshot, UiUpdate, UserCommand,
};
use crate::session::{AuctionError, AuctionSession};
use crate::store::{PlayerStore, StoreError, TeamStore};

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub session: AuctionSession,
    /// Store handles for the read-only results queries. The session holds
    /// its own clones for the auction operations.
    pub player_store: Arc<dyn PlayerStore>,
    pub team_store: Arc<dyn TeamStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        session: AuctionSession,
        player_store: Arc<dyn PlayerStore>,
        team_store: Arc<dyn TeamStore>,
    ) -> Self {
        AppState {
            config,
            session,
            player_store,
            team_store,
        }
    }

    /// Capture the auction view state for rendering.
    pub fn auction_snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            phase: self.session.phase(),
            pool_remaining: self.session.pool().len(),
            current: self.session.current_player().cloned(),
            bid: self.session.bid(),
            teams: self.session.teams().to_vec(),
        }
    }

    /// Fetch the results data from the stores.
    async fn results_snapshot(&self) -> Result<ResultsSnapshot, StoreError> {
        let limit = self.config.request_timeout;
        let teams = match tokio::time::timeout(limit, self.team_store.list_with_roster()).await {
            Ok(result) => result?,
            Err(_) => return Err(StoreError::TimedOut(limit)),
        };
        let unsold = match tokio::time::timeout(limit, self.player_store.list_unsold()).await {
            Ok(result) => result?,
            Err(_) => return Err(StoreError::TimedOut(limit)),
        };
        Ok(ResultsSnapshot { teams, unsold })
    }
}

/// Run the application event loop until the command channel closes or a
/// quit command arrives.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    // Initial snapshot so the view has teams and pool count before the
    // first command.
    let _ = ui_tx
        .send(UiUpdate::Auction(Box::new(state.auction_snapshot())))
        .await;

    while let Some(cmd) = cmd_rx.recv().await {
        if cmd == UserCommand::Quit {
            info!("Quit command received, shutting down");
            break;
        }
        handle_command(&mut state, cmd, &ui_tx).await;
    }

    info!("Application event loop exiting");
    Ok(())
}

/// Apply one operator command to the session and report the outcome.
async fn handle_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::PickRandom => match state.session.pick_random().map(|p| p.name.clone()) {
            Ok(name) => {
                let notice = Notice::info(format!("{name} is on the block"));
                let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
            }
            Err(AuctionError::EmptyPool) => {
                let _ = ui_tx
                    .send(UiUpdate::Notice(Notice::error("No more available players!")))
                    .await;
                // Route the operator to the results view.
                push_results(state, ui_tx).await;
            }
            Err(e) => {
                let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
            }
        },

        UserCommand::RaiseBid(step) => {
            if let Err(e) = state.session.raise_bid(step) {
                let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
            }
        }

        UserCommand::RequestSold { bid_entry } => {
            let result = state
                .session
                .set_bid(&bid_entry)
                .and_then(|_| state.session.request_sold());
            if let Err(e) = result {
                let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
            }
        }

        UserCommand::MarkUnsold => {
            let _ = ui_tx.send(UiUpdate::Busy(true)).await;
            let result = state.session.mark_unsold().await;
            let _ = ui_tx.send(UiUpdate::Busy(false)).await;
            match result {
                Ok(player) => {
                    let notice = Notice::info(format!("{} goes unsold", player.name));
                    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                }
                Err(e) => {
                    let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
                }
            }
        }

        UserCommand::Assign(team_id) => {
            let _ = ui_tx.send(UiUpdate::Busy(true)).await;
            let result = state.session.assign(team_id).await;
            let _ = ui_tx.send(UiUpdate::Busy(false)).await;
            match result {
                Ok(sale) => {
                    let notice = Notice::info(format!(
                        "{} sold to {} for {} {}",
                        sale.player.name,
                        sale.team_name,
                        sale.price,
                        state.config.auction.currency
                    ));
                    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                }
                Err(e) => {
                    // The team choice stays open; the reason is relayed
                    // untouched.
                    let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
                }
            }
        }

        UserCommand::CancelAssignment => {
            if let Err(e) = state.session.cancel_assignment() {
                let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
            }
        }

        UserCommand::ShowResults => {
            push_results(state, ui_tx).await;
        }

        UserCommand::EndAuction => match state.session.end_session() {
            Ok(()) => {
                let _ = ui_tx
                    .send(UiUpdate::Notice(Notice::info("Auction ended")))
                    .await;
                push_results(state, ui_tx).await;
            }
            Err(e) => {
                let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
            }
        },

        UserCommand::Quit => {
            // Handled in the main loop.
        }
    }

    let _ = ui_tx
        .send(UiUpdate::Auction(Box::new(state.auction_snapshot())))
        .await;
}

/// Fetch and push the results snapshot, surfacing store failures as
/// notices.
async fn push_results(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx.send(UiUpdate::Busy(true)).await;
    let result = state.results_snapshot().await;
    let _ = ui_tx.send(UiUpdate::Busy(false)).await;
    match result {
        Ok(snapshot) => {
            let _ = ui_tx.send(UiUpdate::Results(Box::new(snapshot))).await;
        }
        Err(e) => {
            warn!("Failed to fetch results: {e}");
            let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
