// Messages exchanged between the app orchestrator and the TUI.
//
// The TUI never touches the session directly: it sends `UserCommand`s and
// renders the `UiUpdate`s pushed back. Snapshots are full copies so the
// render loop never reads shared mutable state.

use rust_decimal::Decimal;

use crate::session::Phase;
use crate::store::{Player, Team, TeamId, TeamRoster};

/// Operator intents sent from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Put a random player on the block.
    PickRandom,
    /// Add a configured increment to the bid.
    RaiseBid(Decimal),
    /// Commit the bid entry and open the team choice.
    RequestSold { bid_entry: String },
    /// Mark the player on the block unsold.
    MarkUnsold,
    /// Sell the player on the block to a team.
    Assign(TeamId),
    /// Close the team choice, keeping player and bid.
    CancelAssignment,
    /// Fetch the results data (rosters and unsold players).
    ShowResults,
    /// Close the auction.
    EndAuction,
    /// Shut down.
    Quit,
}

/// State pushes from the app loop to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Auction(Box<AuctionSnapshot>),
    Results(Box<ResultsSnapshot>),
    Notice(Notice),
    /// A store request is in flight; mutating controls are disabled while
    /// this is true.
    Busy(bool),
}

/// Everything the auction view needs to draw one frame.
#[derive(Debug, Clone)]
pub struct AuctionSnapshot {
    pub phase: Phase,
    pub pool_remaining: usize,
    pub current: Option<Player>,
    pub bid: Option<Decimal>,
    pub teams: Vec<Team>,
}

/// Everything the results view needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ResultsSnapshot {
    pub teams: Vec<TeamRoster>,
    pub unsold: Vec<Player>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A transient, dismissable status-line message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}
