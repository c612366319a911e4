// Store boundary: the data model and trait contracts for durable
// player/team state.
//
// Durable state lives entirely behind these traits; the auction session
// holds only transient snapshots of it. Implementations decide transport.
// The one transactional contract in the system is `TeamStore::assign`,
// which must verify the budget, debit it, record the purchase, and mark
// the player sold as a single indivisible operation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

pub type PlayerId = i64;
pub type TeamId = i64;

/// Where a player stands in the current auction run.
///
/// A player moves away from `Available` at most once per run; `sold_price`
/// on [`Player`] is set if and only if the status becomes `Sold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Available,
    Sold,
    Unsold,
}

/// A player record as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub status: PlayerStatus,
    /// Final hammer price. Present exactly when `status` is `Sold`.
    #[serde(default)]
    pub sold_price: Option<Decimal>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Label of the team the player appeared for last season.
    #[serde(default)]
    pub last_year_team: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub base_price: Option<Decimal>,
}

/// A participating team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Remaining spend capacity. Only the assignment procedure decreases
    /// it; it never goes back up during a run.
    pub budget: Decimal,
}

/// One resolved purchase on a team's roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    pub role: Option<String>,
    pub price: Decimal,
    pub avatar_url: Option<String>,
    pub sold_at: DateTime<Utc>,
}

/// A team joined with its purchases, as consumed by the results view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team: Team,
    pub players: Vec<RosterEntry>,
}

/// Failures surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's procedure refused the operation. The reason text is
    /// shown to the operator verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The request outlived the configured deadline.
    #[error("store request timed out after {0:?}")]
    TimedOut(Duration),
}

/// Read and mutate player records.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Players still eligible to be auctioned.
    async fn list_available(&self) -> Result<Vec<Player>, StoreError>;

    /// Record that a player went unsold.
    async fn mark_unsold(&self, player: PlayerId) -> Result<(), StoreError>;

    /// Players that did not sell, for the results view. Includes players
    /// marked unsold and players never offered.
    async fn list_unsold(&self) -> Result<Vec<Player>, StoreError>;
}

/// Read team records and invoke the atomic assignment procedure.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// All participating teams with their remaining budgets.
    async fn list(&self) -> Result<Vec<Team>, StoreError>;

    /// Sell `player` to `team` for `amount`: verify the team's budget
    /// covers the amount, debit it, record the purchase, and mark the
    /// player sold. Either every effect applies or none does; callers
    /// never see a partial result.
    async fn assign(
        &self,
        player: PlayerId,
        team: TeamId,
        amount: Decimal,
    ) -> Result<(), StoreError>;

    /// Teams joined with their purchases, for the results view.
    async fn list_with_roster(&self) -> Result<Vec<TeamRoster>, StoreError>;
}
