// Team-choice modal: pick the buying team for the player on the block.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::{UiOptions, ViewState};

use super::format_amount;

/// Render the team-choice modal centered over the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, options: &UiOptions) {
    let Some(snapshot) = &state.auction else {
        return;
    };

    let title = match &snapshot.current {
        Some(player) => format!("Select a team for {}", player.name),
        None => "Select a team".to_string(),
    };

    // Tall enough for every team plus the hint line.
    let height = (snapshot.teams.len() as u16).saturating_add(4).min(area.height);
    let modal = centered_rect(area, 44, height);

    let mut lines = Vec::new();
    for (idx, team) in snapshot.teams.iter().enumerate() {
        let style = if idx == state.team_cursor {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(
            format!(
                " {:<16} {} left ",
                team.name,
                format_amount(team.budget, &options.currency)
            ),
            style,
        )));
    }
    lines.push(Line::from(""));
    let hint = if let Some(bid) = snapshot.bid {
        format!(" selling for {}", format_amount(bid, &options.currency))
    } else {
        String::new()
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Green)),
    );

    frame.render_widget(Clear, modal);
    frame.render_widget(paragraph, modal);
}

/// A centered rectangle of the given width and height inside `area`.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .split(vertical[1]);
    horizontal[1]
}
