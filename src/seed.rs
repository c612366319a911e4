// Player list import for the offline store (CSV).
//
// Reads a simple roster CSV: id, name, role, base_price, last_year_team,
// avatar_url. Extra columns are ignored; malformed rows are skipped with
// a warning so one bad line does not sink the whole import.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::store::{Player, PlayerStatus};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

/// One row of the roster CSV. Prices are f64 in the file and converted to
/// decimals after parsing. Unknown columns are absorbed and ignored.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    id: i64,
    name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    base_price: Option<f64>,
    #[serde(default)]
    last_year_team: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

/// Load the auction player list from `path`.
///
/// Every player comes back `Available` with no sold price; resolution
/// state belongs to the store, not the seed file.
pub fn load_players(path: impl AsRef<Path>) -> Result<Vec<Player>, SeedError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let file = std::fs::File::open(path).map_err(|e| SeedError::Io {
        path: display.clone(),
        source: e,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut players = Vec::new();
    let mut seen_ids: HashSet<i64> = HashSet::new();

    for (line, result) in reader.deserialize::<RawPlayerRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping malformed player row {}: {e}", line + 2);
                continue;
            }
        };

        if row.name.trim().is_empty() {
            warn!("Skipping player row {} with empty name", line + 2);
            continue;
        }
        if !seen_ids.insert(row.id) {
            return Err(SeedError::Validation(format!(
                "duplicate player id {} (row {})",
                row.id,
                line + 2
            )));
        }

        let base_price = match row.base_price {
            Some(raw) => match Decimal::from_f64(raw) {
                Some(d) => Some(d),
                None => {
                    warn!(
                        "Ignoring unrepresentable base price {raw} for {}",
                        row.name
                    );
                    None
                }
            },
            None => None,
        };

        players.push(Player {
            id: row.id,
            name: row.name.trim().to_string(),
            status: PlayerStatus::Available,
            sold_price: None,
            avatar_url: row.avatar_url.filter(|s| !s.trim().is_empty()),
            last_year_team: row.last_year_team.filter(|s| !s.trim().is_empty()),
            role: row.role.filter(|s| !s.trim().is_empty()),
            base_price,
        });
    }

    if players.is_empty() {
        return Err(SeedError::Validation(format!(
            "no usable player rows in {display}"
        )));
    }

    Ok(players)
}
