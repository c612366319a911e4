// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator, or into local ViewState mutations (bid text editing,
// cursor movement, expand/collapse).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::UserCommand;
use crate::session::Phase;

use super::{UiOptions, View, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to
/// the app orchestrator. Returns `None` when the key press was handled
/// locally by mutating `ViewState` (e.g. bid editing, cursor movement) or
/// ignored.
pub fn handle_key(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    options: &UiOptions,
) -> Option<UserCommand> {
    // On Windows, crossterm emits both Press and Release events for each
    // physical keypress; ignoring non-Press events prevents
    // double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode.
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.view == View::Results {
        return handle_results_key(key_event, view_state);
    }

    // While a store request is in flight, the only accepted key is quit.
    // Anything else would queue a second mutation behind a pending one.
    if view_state.in_flight {
        return match key_event.code {
            KeyCode::Char('q') => Some(UserCommand::Quit),
            _ => None,
        };
    }

    if view_state.phase() == Phase::AwaitingTeamChoice {
        return handle_team_choice_key(key_event, view_state);
    }

    handle_auction_key(key_event, view_state, options)
}

/// Keys for the main auction screen (no modal open).
fn handle_auction_key(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    options: &UiOptions,
) -> Option<UserCommand> {
    let selected = view_state.phase() == Phase::Selected;

    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(UserCommand::PickRandom),
        KeyCode::Char('r') => Some(UserCommand::ShowResults),
        KeyCode::Char('e') => Some(UserCommand::EndAuction),

        // Bid entry is only live while a player is on the block.
        KeyCode::Char(c) if selected && (c.is_ascii_digit() || c == '.') => {
            view_state.bid_entry.push(c);
            None
        }
        KeyCode::Backspace if selected => {
            view_state.bid_entry.pop();
            None
        }
        KeyCode::Char('+') if selected => {
            options.bid_increments.first().copied().map(UserCommand::RaiseBid)
        }
        KeyCode::Char('=') if selected => {
            // Second increment, falling back to the first when only one is
            // configured.
            options
                .bid_increments
                .get(1)
                .or_else(|| options.bid_increments.first())
                .copied()
                .map(UserCommand::RaiseBid)
        }
        KeyCode::Char('s') if selected => Some(UserCommand::RequestSold {
            bid_entry: view_state.bid_entry.clone(),
        }),
        KeyCode::Char('u') if selected => Some(UserCommand::MarkUnsold),

        _ => None,
    }
}

/// Keys while the team-choice modal is open.
fn handle_team_choice_key(
    key_event: KeyEvent,
    view_state: &mut ViewState,
) -> Option<UserCommand> {
    let team_count = view_state
        .auction
        .as_ref()
        .map(|s| s.teams.len())
        .unwrap_or(0);

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.team_cursor = view_state.team_cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if team_count > 0 {
                view_state.team_cursor = (view_state.team_cursor + 1).min(team_count - 1);
            }
            None
        }
        KeyCode::Enter => {
            let team_id = view_state
                .auction
                .as_ref()
                .and_then(|s| s.teams.get(view_state.team_cursor))
                .map(|t| t.id)?;
            Some(UserCommand::Assign(team_id))
        }
        KeyCode::Esc => Some(UserCommand::CancelAssignment),
        KeyCode::Char('q') => Some(UserCommand::Quit),
        _ => None,
    }
}

/// Keys for the results screen.
fn handle_results_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let team_count = view_state
        .results
        .as_ref()
        .map(|r| r.teams.len())
        .unwrap_or(0);

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.results_cursor = view_state.results_cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if team_count > 0 {
                view_state.results_cursor = (view_state.results_cursor + 1).min(team_count - 1);
            }
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let team_id = view_state
                .results
                .as_ref()
                .and_then(|r| r.teams.get(view_state.results_cursor))
                .map(|r| r.team.id);
            if let Some(id) = team_id {
                if !view_state.expanded.remove(&id) {
                    view_state.expanded.insert(id);
                }
            }
            None
        }
        KeyCode::Esc | KeyCode::Char('r') => {
            view_state.view = View::Auction;
            None
        }
        KeyCode::Char('q') => Some(UserCommand::Quit),
        _ => None,
    }
}
