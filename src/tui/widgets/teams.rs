// Teams sidebar: every team with its remaining budget.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::{UiOptions, ViewState};

use super::format_amount;

/// Render the team budget list into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, options: &UiOptions) {
    let mut lines = Vec::new();

    if let Some(snapshot) = &state.auction {
        for team in &snapshot.teams {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<16}", team.name), Style::default().fg(Color::White)),
                Span::styled(
                    format!("{} left", format_amount(team.budget, &options.currency)),
                    Style::default().fg(Color::Green),
                ),
            ]));
        }
    }

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Teams"));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AuctionSnapshot;
    use crate::session::Phase;
    use crate::store::Team;
    use crate::tui::ViewState;

    use rust_decimal_macros::dec;

    fn options() -> UiOptions {
        UiOptions {
            auction_name: "Test Auction".into(),
            currency: "Cr".into(),
            bid_increments: vec![],
        }
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(40, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state, &options()))
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_teams() {
        let backend = ratatui::backend::TestBackend::new(40, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.auction = Some(AuctionSnapshot {
            phase: Phase::Idle,
            pool_remaining: 4,
            current: None,
            bid: None,
            teams: vec![
                Team {
                    id: 1,
                    name: "Mumbai".into(),
                    budget: dec!(120),
                },
                Team {
                    id: 2,
                    name: "Chennai".into(),
                    budget: dec!(87.5),
                },
            ],
        });
        terminal
            .draw(|frame| render(frame, frame.area(), &state, &options()))
            .unwrap();
    }
}
