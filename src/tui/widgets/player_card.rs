// Player card: the player currently on the block and the bid entry.
//
// When nothing is on the block, shows a dim prompt instead.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::session::Phase;
use crate::store::Player;
use crate::tui::{UiOptions, ViewState};

use super::format_amount;

/// Render the player card into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, options: &UiOptions) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("On the Block")
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = match state.auction.as_ref().and_then(|s| s.current.as_ref()) {
        Some(player) => {
            Paragraph::new(build_card_lines(player, state, options)).block(block)
        }
        None => {
            let prompt = match state.phase() {
                Phase::Ended => "  The auction has ended.",
                _ => "  Press p to put a player on the block.",
            };
            Paragraph::new(Line::from(Span::styled(
                prompt,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            )))
            .block(block)
        }
    };

    frame.render_widget(paragraph, area);
}

fn build_card_lines<'a>(
    player: &Player,
    state: &ViewState,
    options: &UiOptions,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        format!(" {}", player.name),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));

    let mut detail = Vec::new();
    if let Some(role) = &player.role {
        detail.push(Span::styled(
            format!(" {role}"),
            Style::default().fg(Color::Cyan),
        ));
    }
    if let Some(team) = &player.last_year_team {
        detail.push(Span::styled(
            format!("  last year: {team}"),
            Style::default().fg(Color::Gray),
        ));
    }
    if let Some(base) = player.base_price {
        detail.push(Span::styled(
            format!("  base: {}", format_amount(base, &options.currency)),
            Style::default().fg(Color::Gray),
        ));
    }
    if !detail.is_empty() {
        lines.push(Line::from(detail));
    }

    lines.push(Line::from(""));

    // Bid entry line. The raw buffer is shown so the operator sees
    // exactly what will be committed.
    let entry = if state.bid_entry.is_empty() {
        Span::styled(
            "enter bid amount".to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        )
    } else {
        Span::styled(
            format!("{} {}", state.bid_entry, options.currency),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    };
    lines.push(Line::from(vec![
        Span::styled(" Bid: ", Style::default().fg(Color::Gray)),
        entry,
    ]));

    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
