// Integration tests for the auction console.
//
// These tests exercise the system end-to-end through the library crate's
// public API: the session state machine running against the in-memory
// store, the app orchestrator's command loop, and the results queries
// consumed by the results view.

use std::sync::Arc;
use std::time::Duration;

use gavel::app::{self, AppState};
use gavel::config::{AuctionConfig, Config, DataPaths, TeamSeed};
use gavel::protocol::{Severity, UiUpdate, UserCommand};
use gavel::session::{AuctionError, AuctionSession, Phase};
use gavel::store::{
    MemoryStore, Player, PlayerId, PlayerStatus, PlayerStore, StoreError, Team, TeamStore,
};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

const TIMEOUT: Duration = Duration::from_secs(5);

fn player(id: PlayerId, name: &str, role: &str) -> Player {
    Player {
        id,
        name: name.to_string(),
        status: PlayerStatus::Available,
        sold_price: None,
        avatar_url: None,
        last_year_team: None,
        role: Some(role.to_string()),
        base_price: Some(dec!(1)),
    }
}

fn four_players() -> Vec<Player> {
    vec![
        player(1, "Asha Rao", "batter"),
        player(2, "Binod Kumar", "bowler"),
        player(3, "Chirag Shah", "all-rounder"),
        player(4, "Devika Nair", "wicket-keeper"),
    ]
}

fn two_teams() -> Vec<Team> {
    vec![
        Team {
            id: 1,
            name: "Mumbai".into(),
            budget: dec!(20),
        },
        Team {
            id: 2,
            name: "Chennai".into(),
            budget: dec!(6),
        },
    ]
}

fn test_config() -> Config {
    Config {
        auction: AuctionConfig {
            name: "Integration Test Auction".into(),
            currency: "Cr".into(),
            bid_increments: vec![dec!(0.5), dec!(1)],
        },
        teams: vec![
            TeamSeed {
                id: 1,
                name: "Mumbai".into(),
                budget: dec!(20),
            },
            TeamSeed {
                id: 2,
                name: "Chennai".into(),
                budget: dec!(6),
            },
        ],
        request_timeout: TIMEOUT,
        data_paths: DataPaths {
            players: "data/players.csv".into(),
        },
    }
}

async fn open_session(store: &Arc<MemoryStore>, seed: u64) -> AuctionSession {
    AuctionSession::open(
        store.clone(),
        store.clone(),
        Box::new(StdRng::seed_from_u64(seed)),
        TIMEOUT,
    )
    .await
    .expect("session should open against a seeded store")
}

// ===========================================================================
// Full auction run
// ===========================================================================

#[tokio::test]
async fn full_auction_run_drains_the_pool_and_settles_the_store() {
    let store = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let mut session = open_session(&store, 42).await;

    // Sell two players to Mumbai, one to Chennai, and pass on the last.
    let mut sold = 0;
    while session.pool().len() > 1 {
        session.pick_random().unwrap();
        session.set_bid("2").unwrap();
        session.request_sold().unwrap();
        let team = if sold < 2 { 1 } else { 2 };
        let sale = session.assign(team).await.unwrap();
        assert_eq!(sale.price, dec!(2));
        sold += 1;
    }
    session.pick_random().unwrap();
    session.mark_unsold().await.unwrap();

    assert!(session.pool().is_empty());
    assert!(matches!(
        session.pick_random(),
        Err(AuctionError::EmptyPool)
    ));
    session.end_session().unwrap();
    assert_eq!(session.phase(), Phase::Ended);

    // The store settled every sale atomically.
    let rosters = store.list_with_roster().await.unwrap();
    let mumbai = rosters.iter().find(|r| r.team.name == "Mumbai").unwrap();
    let chennai = rosters.iter().find(|r| r.team.name == "Chennai").unwrap();
    assert_eq!(mumbai.players.len(), 2);
    assert_eq!(chennai.players.len(), 1);
    assert_eq!(mumbai.team.budget, dec!(16));
    assert_eq!(chennai.team.budget, dec!(4));

    let unsold = store.list_unsold().await.unwrap();
    assert_eq!(unsold.len(), 1);
    assert_eq!(unsold[0].status, PlayerStatus::Unsold);

    // Sold players carry their hammer price.
    for roster in &rosters {
        for entry in &roster.players {
            assert_eq!(entry.price, dec!(2));
        }
    }
}

#[tokio::test]
async fn rejected_assignment_is_retryable_against_another_team() {
    let store = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let mut session = open_session(&store, 7).await;

    session.pick_random().unwrap();
    session.set_bid("10").unwrap();
    session.request_sold().unwrap();

    // Chennai only has 6 available.
    let err = session.assign(2).await.unwrap_err();
    assert_eq!(err.to_string(), "insufficient budget");
    assert_eq!(session.phase(), Phase::AwaitingTeamChoice);
    assert_eq!(session.pool().len(), 4);

    // Retrying against Mumbai succeeds with the same bid.
    let sale = session.assign(1).await.unwrap();
    assert_eq!(sale.team_name, "Mumbai");
    assert_eq!(session.pool().len(), 3);

    // The rejected team was never debited.
    let teams = TeamStore::list(store.as_ref()).await.unwrap();
    assert_eq!(teams.iter().find(|t| t.id == 2).unwrap().budget, dec!(6));
}

#[tokio::test]
async fn session_budget_cache_tracks_the_store() {
    let store = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let mut session = open_session(&store, 9).await;

    session.pick_random().unwrap();
    session.set_bid("3.5").unwrap();
    session.request_sold().unwrap();
    session.assign(1).await.unwrap();

    let cached = session.teams().iter().find(|t| t.id == 1).unwrap().budget;
    let stored = TeamStore::list(store.as_ref())
        .await
        .unwrap()
        .iter()
        .find(|t| t.id == 1)
        .unwrap()
        .budget;
    assert_eq!(cached, dec!(16.5));
    assert_eq!(stored, cached);
}

// ===========================================================================
// Timeout behavior
// ===========================================================================

/// A store whose requests never resolve.
struct BlackHole;

#[async_trait]
impl PlayerStore for BlackHole {
    async fn list_available(&self) -> Result<Vec<Player>, StoreError> {
        std::future::pending().await
    }

    async fn mark_unsold(&self, _player: PlayerId) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn list_unsold(&self) -> Result<Vec<Player>, StoreError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn a_stuck_store_fails_the_open_instead_of_hanging() {
    let players: Arc<dyn PlayerStore> = Arc::new(BlackHole);
    let teams: Arc<dyn TeamStore> =
        Arc::new(MemoryStore::seeded(Vec::new(), two_teams()));

    let result = AuctionSession::open(
        players,
        teams,
        Box::new(StdRng::seed_from_u64(1)),
        Duration::from_secs(3),
    )
    .await;

    match result {
        Err(AuctionError::Store(StoreError::TimedOut(limit))) => {
            assert_eq!(limit, Duration::from_secs(3));
        }
        Err(other) => panic!("expected a timeout, got: {other:?}"),
        Ok(_) => panic!("expected a timeout, got an open session"),
    }
}

// ===========================================================================
// App orchestrator end to end
// ===========================================================================

async fn spawn_app(
    store: Arc<MemoryStore>,
) -> (
    mpsc::Sender<UserCommand>,
    mpsc::Receiver<UiUpdate>,
    tokio::task::JoinHandle<anyhow::Result<()>>,
) {
    let config = test_config();
    let session = AuctionSession::open(
        store.clone(),
        store.clone(),
        Box::new(StdRng::seed_from_u64(23)),
        config.request_timeout,
    )
    .await
    .unwrap();
    let state = AppState::new(config, session, store.clone(), store);

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (ui_tx, ui_rx) = mpsc::channel(512);
    let handle = tokio::spawn(app::run(cmd_rx, ui_tx, state));
    (cmd_tx, ui_rx, handle)
}

#[tokio::test]
async fn command_loop_runs_a_sale_and_reports_results() {
    let store = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let (cmd_tx, mut ui_rx, handle) = spawn_app(store).await;

    cmd_tx.send(UserCommand::PickRandom).await.unwrap();
    cmd_tx.send(UserCommand::RaiseBid(dec!(0.5))).await.unwrap();
    cmd_tx.send(UserCommand::RaiseBid(dec!(1))).await.unwrap();
    cmd_tx
        .send(UserCommand::RequestSold {
            bid_entry: "1.5".into(),
        })
        .await
        .unwrap();
    cmd_tx.send(UserCommand::Assign(1)).await.unwrap();
    cmd_tx.send(UserCommand::ShowResults).await.unwrap();
    cmd_tx.send(UserCommand::Quit).await.unwrap();

    handle.await.unwrap().unwrap();

    let mut updates = Vec::new();
    while let Ok(update) = ui_rx.try_recv() {
        updates.push(update);
    }

    let sale_notice = updates.iter().any(|u| {
        matches!(u, UiUpdate::Notice(n)
            if n.severity == Severity::Info && n.text.contains("sold to Mumbai for 1.5 Cr"))
    });
    assert!(sale_notice, "expected the sale announcement");

    let results = updates
        .iter()
        .rev()
        .find_map(|u| match u {
            UiUpdate::Results(snapshot) => Some(snapshot.as_ref()),
            _ => None,
        })
        .expect("expected a results snapshot");
    let mumbai = results
        .teams
        .iter()
        .find(|r| r.team.name == "Mumbai")
        .unwrap();
    assert_eq!(mumbai.players.len(), 1);
    assert_eq!(mumbai.players[0].price, dec!(1.5));
    assert_eq!(results.unsold.len(), 3);
}

#[tokio::test]
async fn invalid_bid_entry_is_reported_and_leaves_the_block_alone() {
    let store = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let (cmd_tx, mut ui_rx, handle) = spawn_app(store).await;

    cmd_tx.send(UserCommand::PickRandom).await.unwrap();
    cmd_tx
        .send(UserCommand::RequestSold {
            bid_entry: String::new(),
        })
        .await
        .unwrap();
    cmd_tx.send(UserCommand::Quit).await.unwrap();
    handle.await.unwrap().unwrap();

    let mut saw_validation_error = false;
    let mut last_phase = None;
    while let Ok(update) = ui_rx.try_recv() {
        match update {
            UiUpdate::Notice(n) if n.severity == Severity::Error => {
                assert!(n.text.contains("bid"));
                saw_validation_error = true;
            }
            UiUpdate::Auction(snapshot) => last_phase = Some(snapshot.phase),
            _ => {}
        }
    }
    assert!(saw_validation_error);
    assert_eq!(last_phase, Some(Phase::Selected));
}

// ===========================================================================
// Seeded randomness
// ===========================================================================

#[tokio::test]
async fn identical_seeds_produce_identical_pick_sequences() {
    let store_a = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let store_b = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let mut session_a = open_session(&store_a, 99).await;
    let mut session_b = open_session(&store_b, 99).await;

    for _ in 0..10 {
        let a = session_a.pick_random().unwrap().id;
        let b = session_b.pick_random().unwrap().id;
        assert_eq!(a, b);
    }
}

#[tokio::test]
async fn picks_cover_the_whole_pool_over_time() {
    let store = Arc::new(MemoryStore::seeded(four_players(), two_teams()));
    let mut session = open_session(&store, 5).await;

    let mut seen = std::collections::HashSet::new();
    for _ in 0..100 {
        seen.insert(session.pick_random().unwrap().id);
    }
    assert_eq!(seen.len(), 4, "every player should eventually be offered");
}

// ===========================================================================
// Seed file plumbing
// ===========================================================================

#[tokio::test]
async fn bundled_player_list_seeds_a_working_store() {
    let players = gavel::seed::load_players("data/players.csv").unwrap();
    assert!(players.len() >= 10);
    assert!(players.iter().all(|p| p.status == PlayerStatus::Available));

    let store = Arc::new(MemoryStore::seeded(players, two_teams()));
    let session = open_session(&store, 1).await;
    assert_eq!(session.pool().len(), 16);

    let available_amount: Decimal = session
        .pool()
        .iter()
        .filter_map(|p| p.base_price)
        .sum();
    assert!(available_amount > Decimal::ZERO);
}
