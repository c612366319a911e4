// Auction turn state machine: pool, player on the block, bid, and phase.
//
// The session owns only transient view state; durable records live behind
// the PlayerStore/TeamStore traits. Both lists are read once when the
// session opens, and the stores are touched by exactly two mutating calls
// afterwards: `mark_unsold` and `assign`. Every store call is bounded by
// the configured request timeout, so a stuck request surfaces as a store
// failure instead of hanging the session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, RngCore};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{Player, PlayerId, PlayerStore, StoreError, Team, TeamId, TeamStore};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The discrete state of the auction turn machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No player on the block.
    Idle,
    /// A player is on the block and open for bid entry.
    Selected,
    /// A sale was requested; waiting for the operator to choose a team.
    AwaitingTeamChoice,
    /// The auction is over; no further operations are accepted.
    Ended,
}

impl Phase {
    /// Short label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Selected => "on the block",
            Phase::AwaitingTeamChoice => "choosing team",
            Phase::Ended => "ended",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures reported by session operations.
///
/// None of these are fatal: every variant leaves the session in a usable,
/// retryable state.
#[derive(Debug, Error)]
pub enum AuctionError {
    /// Bid entry missing, unparseable, or not positive where required.
    #[error("{0}")]
    InvalidBid(String),

    /// A pick was requested with nothing left to auction.
    #[error("no players left in the pool")]
    EmptyPool,

    /// A store call failed or was rejected; local state is untouched.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The session was closed with `end_session`.
    #[error("the auction has ended")]
    Ended,

    /// The operation does not apply to the current phase.
    #[error("{0} is not available right now")]
    OutOfPhase(&'static str),
}

// ---------------------------------------------------------------------------
// Sale
// ---------------------------------------------------------------------------

/// Outcome of a successful assignment, for announcement by the caller.
#[derive(Debug, Clone)]
pub struct Sale {
    pub player: Player,
    pub team_id: TeamId,
    pub team_name: String,
    pub price: Decimal,
}

// ---------------------------------------------------------------------------
// AuctionSession
// ---------------------------------------------------------------------------

/// One operator's auction run.
///
/// Created when the auction view opens (both store lists are fetched once)
/// and discarded when the operator leaves; nothing here is persisted.
pub struct AuctionSession {
    player_store: Arc<dyn PlayerStore>,
    team_store: Arc<dyn TeamStore>,
    /// Players still eligible this run. Shrinks by one per resolution,
    /// never grows.
    pool: Vec<Player>,
    /// Team list snapshot. Budgets are debited locally after a successful
    /// assignment; the store is not re-read during a run.
    teams: Vec<Team>,
    /// Lookup key of the player on the block. The owning record stays in
    /// `pool`.
    current: Option<PlayerId>,
    /// Validated bid entry. `None` means the entry is empty.
    bid: Option<Decimal>,
    phase: Phase,
    rng: Box<dyn RngCore + Send + Sync>,
    request_timeout: Duration,
}

impl AuctionSession {
    /// Open a session: fetch the available-player pool and the team list.
    pub async fn open(
        player_store: Arc<dyn PlayerStore>,
        team_store: Arc<dyn TeamStore>,
        rng: Box<dyn RngCore + Send + Sync>,
        request_timeout: Duration,
    ) -> Result<Self, AuctionError> {
        let pool = with_timeout(request_timeout, player_store.list_available()).await?;
        let teams = with_timeout(request_timeout, team_store.list()).await?;
        info!(
            "Auction session opened: {} players available, {} teams",
            pool.len(),
            teams.len()
        );
        Ok(AuctionSession {
            player_store,
            team_store,
            pool,
            teams,
            current: None,
            bid: None,
            phase: Phase::Idle,
            rng,
            request_timeout,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pool(&self) -> &[Player] {
        &self.pool
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn bid(&self) -> Option<Decimal> {
        self.bid
    }

    /// The player on the block, if any.
    pub fn current_player(&self) -> Option<&Player> {
        self.current
            .and_then(|id| self.pool.iter().find(|p| p.id == id))
    }

    /// Put a random player from the pool on the block.
    ///
    /// Uniform over the pool, excluding the player already on the block
    /// unless it is the only one left. Resets the bid entry and dismisses
    /// any pending team choice.
    pub fn pick_random(&mut self) -> Result<&Player, AuctionError> {
        if self.phase == Phase::Ended {
            return Err(AuctionError::Ended);
        }
        if self.pool.is_empty() {
            return Err(AuctionError::EmptyPool);
        }

        let idx = if self.pool.len() == 1 {
            0
        } else {
            // Collect the candidate indices and draw once.
            let candidates: Vec<usize> = self
                .pool
                .iter()
                .enumerate()
                .filter(|(_, p)| Some(p.id) != self.current)
                .map(|(i, _)| i)
                .collect();
            candidates[self.rng.gen_range(0..candidates.len())]
        };

        let id = self.pool[idx].id;
        info!("On the block: {} (id {})", self.pool[idx].name, id);
        self.current = Some(id);
        self.bid = None;
        self.phase = Phase::Selected;
        Ok(&self.pool[idx])
    }

    /// Replace the bid entry. An empty input clears it; anything else must
    /// parse as a non-negative decimal amount or the entry is left alone.
    pub fn set_bid(&mut self, input: &str) -> Result<(), AuctionError> {
        if self.phase == Phase::Ended {
            return Err(AuctionError::Ended);
        }
        if self.phase != Phase::Selected {
            return Err(AuctionError::OutOfPhase("bid entry"));
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            self.bid = None;
            return Ok(());
        }
        let amount: Decimal = trimmed
            .parse()
            .map_err(|_| AuctionError::InvalidBid(format!("not a valid bid amount: {trimmed}")))?;
        if amount < Decimal::ZERO {
            return Err(AuctionError::InvalidBid(format!(
                "bid cannot be negative: {trimmed}"
            )));
        }
        self.bid = Some(amount);
        Ok(())
    }

    /// Add an increment to the bid, treating an empty entry as zero.
    pub fn raise_bid(&mut self, step: Decimal) -> Result<Decimal, AuctionError> {
        if self.phase == Phase::Ended {
            return Err(AuctionError::Ended);
        }
        if self.phase != Phase::Selected {
            return Err(AuctionError::OutOfPhase("bid entry"));
        }
        if step <= Decimal::ZERO {
            return Err(AuctionError::InvalidBid(format!(
                "increment must be positive: {step}"
            )));
        }
        let next = self.bid.unwrap_or(Decimal::ZERO) + step;
        self.bid = Some(next);
        Ok(next)
    }

    /// Open the team choice for the player on the block.
    ///
    /// Purely a local gate: nothing is sent to the stores until a team is
    /// picked. Requires a positive bid.
    pub fn request_sold(&mut self) -> Result<(), AuctionError> {
        if self.phase == Phase::Ended {
            return Err(AuctionError::Ended);
        }
        if self.phase != Phase::Selected {
            return Err(AuctionError::OutOfPhase("sale request"));
        }
        match self.bid {
            Some(amount) if amount > Decimal::ZERO => {
                self.phase = Phase::AwaitingTeamChoice;
                Ok(())
            }
            Some(_) => Err(AuctionError::InvalidBid(
                "bid must be greater than zero".into(),
            )),
            None => Err(AuctionError::InvalidBid("enter a bid amount first".into())),
        }
    }

    /// Close the team choice and return to bid entry, keeping the player
    /// and the bid.
    pub fn cancel_assignment(&mut self) -> Result<(), AuctionError> {
        if self.phase == Phase::Ended {
            return Err(AuctionError::Ended);
        }
        if self.phase != Phase::AwaitingTeamChoice {
            return Err(AuctionError::OutOfPhase("cancel"));
        }
        self.phase = Phase::Selected;
        Ok(())
    }

    /// Mark the player on the block unsold.
    ///
    /// On success the player leaves the pool and the block is cleared. On
    /// failure nothing changes locally and the store's reason is returned.
    pub async fn mark_unsold(&mut self) -> Result<Player, AuctionError> {
        if self.phase == Phase::Ended {
            return Err(AuctionError::Ended);
        }
        if self.phase != Phase::Selected {
            return Err(AuctionError::OutOfPhase("marking unsold"));
        }
        let Some(player) = self.current_player().cloned() else {
            return Err(AuctionError::OutOfPhase("marking unsold"));
        };

        let outcome =
            with_timeout(self.request_timeout, self.player_store.mark_unsold(player.id)).await;
        match outcome {
            Ok(()) => {
                self.pool.retain(|p| p.id != player.id);
                self.current = None;
                self.bid = None;
                self.phase = Phase::Idle;
                info!(
                    "{} goes unsold, {} left in the pool",
                    player.name,
                    self.pool.len()
                );
                Ok(player)
            }
            Err(e) => {
                warn!("Failed to mark {} unsold: {e}", player.name);
                Err(e.into())
            }
        }
    }

    /// Sell the player on the block to `team` for the entered bid.
    ///
    /// The budget check, debit, roster record, and sold marking all happen
    /// inside the store's atomic procedure; this session never applies a
    /// partial result. On success the player leaves the pool, the team's
    /// cached budget is debited, and the block is cleared. On failure the
    /// team choice stays open so the operator can retry or cancel, and the
    /// store's reason is returned untouched.
    pub async fn assign(&mut self, team: TeamId) -> Result<Sale, AuctionError> {
        if self.phase == Phase::Ended {
            return Err(AuctionError::Ended);
        }
        if self.phase != Phase::AwaitingTeamChoice {
            return Err(AuctionError::OutOfPhase("assignment"));
        }
        let Some(player) = self.current_player().cloned() else {
            return Err(AuctionError::OutOfPhase("assignment"));
        };
        let Some(amount) = self.bid.filter(|b| *b > Decimal::ZERO) else {
            return Err(AuctionError::InvalidBid("enter a bid amount first".into()));
        };

        let outcome = with_timeout(
            self.request_timeout,
            self.team_store.assign(player.id, team, amount),
        )
        .await;
        match outcome {
            Ok(()) => {
                self.pool.retain(|p| p.id != player.id);
                self.current = None;
                self.bid = None;
                self.phase = Phase::Idle;
                let team_name = match self.teams.iter_mut().find(|t| t.id == team) {
                    Some(t) => {
                        t.budget -= amount;
                        t.name.clone()
                    }
                    None => format!("team {team}"),
                };
                info!("{} sold to {} for {}", player.name, team_name, amount);
                Ok(Sale {
                    player,
                    team_id: team,
                    team_name,
                    price: amount,
                })
            }
            Err(e) => {
                warn!("Assignment of {} failed: {e}", player.name);
                Err(e.into())
            }
        }
    }

    /// Close the auction. Only valid between players, with nothing on the
    /// block; afterwards every operation reports that the session ended.
    pub fn end_session(&mut self) -> Result<(), AuctionError> {
        match self.phase {
            Phase::Ended => Err(AuctionError::Ended),
            Phase::Idle => {
                self.phase = Phase::Ended;
                info!("Auction ended with {} players unresolved", self.pool.len());
                Ok(())
            }
            _ => Err(AuctionError::OutOfPhase("ending the auction")),
        }
    }
}

/// Bound a store call by `limit`, converting an elapsed timer into a
/// store failure.
async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::TimedOut(limit)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
