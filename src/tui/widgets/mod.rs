// TUI widget modules for each screen panel.

pub mod player_card;
pub mod results;
pub mod status_bar;
pub mod team_picker;
pub mod teams;

use rust_decimal::Decimal;

/// Format a money amount with the configured currency unit.
pub(crate) fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{} {}", amount.normalize(), currency)
}
