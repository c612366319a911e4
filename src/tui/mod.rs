// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the snapshots pushed by the app
// orchestrator over an mpsc channel, plus purely local entry state (bid
// text buffer, cursors, expanded rows). It sends `UserCommand`s back and
// re-renders at ~30 fps. It never touches the session itself.

pub mod input;
pub mod widgets;

use std::collections::HashSet;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::info;

use crate::protocol::{AuctionSnapshot, Notice, ResultsSnapshot, UiUpdate, UserCommand};
use crate::session::Phase;
use crate::store::TeamId;

// ---------------------------------------------------------------------------
// Options and view state
// ---------------------------------------------------------------------------

/// Static display settings handed to the TUI at startup.
#[derive(Debug, Clone)]
pub struct UiOptions {
    pub auction_name: String,
    pub currency: String,
    /// Quick-raise steps, smallest first.
    pub bid_increments: Vec<Decimal>,
}

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Auction,
    Results,
}

/// TUI-local state that mirrors the application state for rendering.
pub struct ViewState {
    pub view: View,
    pub auction: Option<AuctionSnapshot>,
    pub results: Option<ResultsSnapshot>,
    /// Raw bid entry text. Committed to the session when a sale is
    /// requested; re-synced from each auction snapshot.
    pub bid_entry: String,
    /// Cursor into the team list of the team-choice modal.
    pub team_cursor: usize,
    /// Cursor into the team list of the results view.
    pub results_cursor: usize,
    /// Teams whose roster is expanded in the results view.
    pub expanded: HashSet<TeamId>,
    pub notice: Option<Notice>,
    /// A store request is in flight; mutating keys are ignored.
    pub in_flight: bool,
}

impl ViewState {
    pub fn new() -> Self {
        ViewState {
            view: View::Auction,
            auction: None,
            results: None,
            bid_entry: String::new(),
            team_cursor: 0,
            results_cursor: 0,
            expanded: HashSet::new(),
            notice: None,
            in_flight: false,
        }
    }

    /// The phase of the latest auction snapshot, `Idle` before the first
    /// one arrives.
    pub fn phase(&self) -> Phase {
        self.auction.as_ref().map(|s| s.phase).unwrap_or(Phase::Idle)
    }

    /// Apply one update pushed by the app orchestrator.
    pub fn apply_update(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::Auction(snapshot) => {
                self.bid_entry = snapshot
                    .bid
                    .map(|b| b.to_string())
                    .unwrap_or_default();
                let team_count = snapshot.teams.len();
                if team_count > 0 {
                    self.team_cursor = self.team_cursor.min(team_count - 1);
                } else {
                    self.team_cursor = 0;
                }
                self.auction = Some(*snapshot);
            }
            UiUpdate::Results(snapshot) => {
                let team_count = snapshot.teams.len();
                if team_count > 0 {
                    self.results_cursor = self.results_cursor.min(team_count - 1);
                } else {
                    self.results_cursor = 0;
                }
                self.results = Some(*snapshot);
                self.view = View::Results;
            }
            UiUpdate::Notice(notice) => {
                self.notice = Some(notice);
            }
            UiUpdate::Busy(busy) => {
                self.in_flight = busy;
            }
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new()
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the TUI until the operator quits or the update channel closes.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    options: UiOptions,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    let mut view_state = ViewState::new();
    let mut events = EventStream::new();
    let mut redraw = tokio::time::interval(Duration::from_millis(33));

    info!("TUI started");

    loop {
        tokio::select! {
            maybe_update = ui_rx.recv() => {
                match maybe_update {
                    Some(update) => view_state.apply_update(update),
                    None => break,
                }
            }

            maybe_event = events.next() => {
                if let Some(Ok(Event::Key(key))) = maybe_event {
                    if let Some(cmd) = input::handle_key(key, &mut view_state, &options) {
                        let quit = cmd == UserCommand::Quit;
                        let _ = cmd_tx.send(cmd).await;
                        if quit {
                            break;
                        }
                    }
                }
            }

            _ = redraw.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state, &options))?;
            }
        }
    }

    ratatui::restore();
    info!("TUI exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Layout and rendering
// ---------------------------------------------------------------------------

/// Resolved screen areas.
///
/// +--------------------------------------------+
/// | Status bar (1 row)                         |
/// +--------------------------------------------+
/// | Main area                                  |
/// +--------------------------------------------+
/// | Help bar (1 row)                           |
/// +--------------------------------------------+
struct AppLayout {
    status_bar: Rect,
    main: Rect,
    help_bar: Rect,
}

fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main: vertical[1],
        help_bar: vertical[2],
    }
}

/// Draw one frame from the current view state.
pub fn render_frame(frame: &mut Frame, state: &ViewState, options: &UiOptions) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state, options);

    match state.view {
        View::Auction => {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(layout.main);

            widgets::player_card::render(frame, horizontal[0], state, options);
            widgets::teams::render(frame, horizontal[1], state, options);

            if state.phase() == Phase::AwaitingTeamChoice {
                widgets::team_picker::render(frame, layout.main, state, options);
            }
        }
        View::Results => {
            widgets::results::render(frame, layout.main, state, options);
        }
    }

    render_help_bar(frame, layout.help_bar, state);
}

/// Keyboard hints for the current context.
fn render_help_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let hints = match (state.view, state.phase()) {
        (View::Results, _) => " up/down select | enter expand | esc back | q quit",
        (View::Auction, Phase::AwaitingTeamChoice) => {
            " up/down select team | enter assign | esc cancel | q quit"
        }
        (View::Auction, Phase::Selected) => {
            " type bid | +/= raise | s sold | u unsold | p pick again | r results | q quit"
        }
        (View::Auction, Phase::Idle) => {
            " p pick random player | r results | e end auction | q quit"
        }
        (View::Auction, Phase::Ended) => " auction ended | r results | q quit",
    };

    let line = Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(line), area);
}
