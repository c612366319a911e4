// Status bar: auction name, phase, pool count, and the latest notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::Severity;
use crate::tui::{UiOptions, ViewState};

/// Render the status bar into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, options: &UiOptions) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", options.auction_name),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    if let Some(snapshot) = &state.auction {
        spans.push(Span::styled(
            format!("{} in pool", snapshot.pool_remaining),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            snapshot.phase.label(),
            Style::default().fg(Color::Cyan),
        ));
    }

    if state.in_flight {
        spans.push(Span::styled(
            "  working...",
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(notice) = &state.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.text.clone(),
            Style::default()
                .fg(notice_color(notice.severity))
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Color for a notice of the given severity.
fn notice_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Green,
        Severity::Error => Color::Red,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
