// In-memory store backing the offline binary and the test suite.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use super::{
    Player, PlayerId, PlayerStatus, PlayerStore, RosterEntry, StoreError, Team, TeamId,
    TeamRoster, TeamStore,
};

/// A store that keeps all player and team state in memory.
///
/// Every operation takes the single inner lock, so the assignment
/// procedure's verify/debit/record/mark sequence is applied as one
/// critical section: either a caller sees all of its effects or none.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    players: Vec<Player>,
    teams: Vec<Team>,
    purchases: Vec<(TeamId, RosterEntry)>,
}

impl MemoryStore {
    /// Build a store from an initial player list and team table.
    pub fn seeded(players: Vec<Player>, teams: Vec<Team>) -> Self {
        MemoryStore {
            inner: Mutex::new(Inner {
                players,
                teams,
                purchases: Vec::new(),
            }),
        }
    }

    /// Acquire the store state.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn list_available(&self) -> Result<Vec<Player>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .players
            .iter()
            .filter(|p| p.status == PlayerStatus::Available)
            .cloned()
            .collect())
    }

    async fn mark_unsold(&self, player: PlayerId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let Some(record) = inner.players.iter_mut().find(|p| p.id == player) else {
            return Err(StoreError::Rejected("player not found".into()));
        };
        match record.status {
            PlayerStatus::Sold => return Err(StoreError::Rejected("player already sold".into())),
            PlayerStatus::Unsold => {
                return Err(StoreError::Rejected("player already unsold".into()))
            }
            PlayerStatus::Available => {}
        }
        record.status = PlayerStatus::Unsold;
        info!("Store: {} marked unsold", record.name);
        Ok(())
    }

    async fn list_unsold(&self) -> Result<Vec<Player>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .players
            .iter()
            .filter(|p| p.status != PlayerStatus::Sold)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Team>, StoreError> {
        let inner = self.lock();
        Ok(inner.teams.clone())
    }

    async fn assign(
        &self,
        player: PlayerId,
        team: TeamId,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        if amount <= Decimal::ZERO {
            return Err(StoreError::Rejected("amount must be positive".into()));
        }

        let mut inner = self.lock();

        let Some(team_idx) = inner.teams.iter().position(|t| t.id == team) else {
            return Err(StoreError::Rejected("team not found".into()));
        };
        let Some(player_idx) = inner.players.iter().position(|p| p.id == player) else {
            return Err(StoreError::Rejected("player not found".into()));
        };
        match inner.players[player_idx].status {
            PlayerStatus::Sold => return Err(StoreError::Rejected("player already sold".into())),
            PlayerStatus::Unsold => {
                return Err(StoreError::Rejected("player already unsold".into()))
            }
            PlayerStatus::Available => {}
        }
        if inner.teams[team_idx].budget < amount {
            return Err(StoreError::Rejected("insufficient budget".into()));
        }

        // All checks passed: apply every effect before releasing the lock.
        inner.teams[team_idx].budget -= amount;
        let record = &mut inner.players[player_idx];
        record.status = PlayerStatus::Sold;
        record.sold_price = Some(amount);
        let entry = RosterEntry {
            player_id: record.id,
            player_name: record.name.clone(),
            role: record.role.clone(),
            price: amount,
            avatar_url: record.avatar_url.clone(),
            sold_at: Utc::now(),
        };
        let team_name = inner.teams[team_idx].name.clone();
        info!(
            "Store: {} assigned to {} for {}",
            entry.player_name, team_name, amount
        );
        inner.purchases.push((team, entry));
        Ok(())
    }

    async fn list_with_roster(&self) -> Result<Vec<TeamRoster>, StoreError> {
        let inner = self.lock();
        let mut rosters: Vec<TeamRoster> = inner
            .teams
            .iter()
            .map(|t| TeamRoster {
                team: t.clone(),
                players: inner
                    .purchases
                    .iter()
                    .filter(|(team_id, _)| *team_id == t.id)
                    .map(|(_, entry)| entry.clone())
                    .collect(),
            })
            .collect();
        rosters.sort_by(|a, b| a.team.name.cmp(&b.team.name));
        Ok(rosters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn player(id: PlayerId, name: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            status: PlayerStatus::Available,
            sold_price: None,
            avatar_url: None,
            last_year_team: None,
            role: Some("batter".to_string()),
            base_price: Some(dec!(2)),
        }
    }

    fn team(id: TeamId, name: &str, budget: Decimal) -> Team {
        Team {
            id,
            name: name.to_string(),
            budget,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::seeded(
            vec![player(1, "Asha"), player(2, "Binod"), player(3, "Chirag")],
            vec![team(10, "Mumbai", dec!(20)), team(11, "Chennai", dec!(5))],
        )
    }

    #[tokio::test]
    async fn list_available_excludes_resolved_players() {
        let store = store();
        store.mark_unsold(2).await.unwrap();
        store.assign(1, 10, dec!(4)).await.unwrap();

        let available = store.list_available().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, 3);
    }

    #[tokio::test]
    async fn assign_applies_every_effect() {
        let store = store();
        store.assign(1, 10, dec!(7)).await.unwrap();

        let teams = TeamStore::list(&store).await.unwrap();
        assert_eq!(teams[0].budget, dec!(13));

        let rosters = store.list_with_roster().await.unwrap();
        let mumbai = rosters.iter().find(|r| r.team.name == "Mumbai").unwrap();
        assert_eq!(mumbai.players.len(), 1);
        assert_eq!(mumbai.players[0].player_name, "Asha");
        assert_eq!(mumbai.players[0].price, dec!(7));

        let unsold = store.list_unsold().await.unwrap();
        assert!(unsold.iter().all(|p| p.id != 1));
    }

    #[tokio::test]
    async fn assign_rejects_insufficient_budget_without_side_effects() {
        let store = store();
        let err = store.assign(1, 11, dec!(6)).await.unwrap_err();
        assert_eq!(err.to_string(), "insufficient budget");

        let teams = TeamStore::list(&store).await.unwrap();
        assert_eq!(teams[1].budget, dec!(5));
        let available = store.list_available().await.unwrap();
        assert_eq!(available.len(), 3);
        let rosters = store.list_with_roster().await.unwrap();
        assert!(rosters.iter().all(|r| r.players.is_empty()));
    }

    #[tokio::test]
    async fn assign_rejects_unknown_team_and_player() {
        let store = store();
        let err = store.assign(1, 99, dec!(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "team not found");

        let err = store.assign(99, 10, dec!(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "player not found");
    }

    #[tokio::test]
    async fn assign_rejects_double_sale() {
        let store = store();
        store.assign(1, 10, dec!(3)).await.unwrap();
        let err = store.assign(1, 11, dec!(3)).await.unwrap_err();
        assert_eq!(err.to_string(), "player already sold");
    }

    #[tokio::test]
    async fn assign_rejects_non_positive_amount() {
        let store = store();
        let err = store.assign(1, 10, dec!(0)).await.unwrap_err();
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[tokio::test]
    async fn mark_unsold_moves_exactly_once() {
        let store = store();
        store.mark_unsold(1).await.unwrap();
        let err = store.mark_unsold(1).await.unwrap_err();
        assert_eq!(err.to_string(), "player already unsold");
    }

    #[tokio::test]
    async fn list_unsold_includes_never_offered_players() {
        let store = store();
        store.mark_unsold(1).await.unwrap();
        store.assign(2, 10, dec!(2)).await.unwrap();

        let unsold = store.list_unsold().await.unwrap();
        let ids: Vec<PlayerId> = unsold.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn rosters_are_sorted_by_team_name() {
        let store = MemoryStore::seeded(
            vec![player(1, "Asha")],
            vec![
                team(10, "Rajasthan", dec!(10)),
                team(11, "Delhi", dec!(10)),
            ],
        );
        let rosters = store.list_with_roster().await.unwrap();
        assert_eq!(rosters[0].team.name, "Delhi");
        assert_eq!(rosters[1].team.name, "Rajasthan");
    }
}
