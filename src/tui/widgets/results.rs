// Results screen: every team with its purchases, and the unsold list.
//
// Team rows expand and collapse; the expanded state lives in ViewState.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::{UiOptions, ViewState};

use super::format_amount;

/// Render the results screen into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, options: &UiOptions) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_rosters(frame, horizontal[0], state, options);
    render_unsold(frame, horizontal[1], state);
}

fn render_rosters(frame: &mut Frame, area: Rect, state: &ViewState, options: &UiOptions) {
    let mut lines = Vec::new();

    if let Some(results) = &state.results {
        for (idx, roster) in results.teams.iter().enumerate() {
            let expanded = state.expanded.contains(&roster.team.id);
            let marker = if expanded { "v" } else { ">" };
            let row_style = if idx == state.results_cursor {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            lines.push(Line::from(Span::styled(
                format!(
                    " {marker} {:<16} {} left   {} players",
                    roster.team.name,
                    format_amount(roster.team.budget, &options.currency),
                    roster.players.len()
                ),
                row_style,
            )));

            if expanded {
                if roster.players.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "      no players bought",
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::DIM),
                    )));
                }
                for entry in &roster.players {
                    let role = entry.role.as_deref().unwrap_or("-");
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("      {:<20}", entry.player_name),
                            Style::default().fg(Color::White),
                        ),
                        Span::styled(format!("{role:<12}"), Style::default().fg(Color::Cyan)),
                        Span::styled(
                            format_amount(entry.price, &options.currency),
                            Style::default().fg(Color::Green),
                        ),
                    ]));
                }
            }
        }
    } else {
        lines.push(Line::from(Span::styled(
            "  Loading results...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Final Rosters"));
    frame.render_widget(paragraph, area);
}

fn render_unsold(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut lines = Vec::new();

    if let Some(results) = &state.results {
        if results.unsold.is_empty() {
            lines.push(Line::from(Span::styled(
                " every player was sold",
                Style::default().fg(Color::Green),
            )));
        }
        for player in &results.unsold {
            let role = player.role.as_deref().unwrap_or("-");
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {:<20}", player.name),
                    Style::default().fg(Color::White),
                ),
                Span::styled(role.to_string(), Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Unsold Players"));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
