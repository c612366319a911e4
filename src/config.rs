// Configuration loading and parsing (auction.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::store::{Team, TeamId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub auction: AuctionConfig,
    pub teams: Vec<TeamSeed>,
    pub request_timeout: Duration,
    pub data_paths: DataPaths,
}

impl Config {
    /// Materialize the configured team table as store team records.
    pub fn team_records(&self) -> Vec<Team> {
        self.teams
            .iter()
            .map(|t| Team {
                id: t.id,
                name: t.name.clone(),
                budget: t.budget,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// auction.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire auction.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AuctionFile {
    auction: AuctionConfig,
    store: StoreSection,
    data_paths: DataPaths,
    /// Absent table means no teams, which validation rejects.
    #[serde(default)]
    teams: Vec<TeamSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuctionConfig {
    /// Display name of the auction, shown in the title bar.
    pub name: String,
    /// Currency unit label appended to amounts (e.g. "Cr").
    pub currency: String,
    /// Quick-raise steps for the bid entry, smallest first.
    pub bid_increments: Vec<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
struct StoreSection {
    /// Deadline applied to every store request.
    request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// CSV file with the player list for the offline store.
    pub players: String,
}

/// One team as declared in the config's `[[teams]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamSeed {
    pub id: TeamId,
    pub name: String,
    pub budget: Decimal,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/auction.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("auction.toml");
    let text = read_file(&path)?;
    let file: AuctionFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        auction: file.auction,
        teams: file.teams,
        request_timeout: Duration::from_secs(file.store.request_timeout_secs),
        data_paths: file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure `config/auction.toml` exists by copying it from `defaults/` when
/// missing. Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Keep the operator's existing file.
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.auction.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "auction.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.auction.bid_increments.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "auction.bid_increments".into(),
            message: "must list at least one increment".into(),
        });
    }
    for (i, step) in config.auction.bid_increments.iter().enumerate() {
        if *step <= Decimal::ZERO {
            return Err(ConfigError::ValidationError {
                field: format!("auction.bid_increments[{i}]"),
                message: format!("must be > 0, got {step}"),
            });
        }
    }

    if config.request_timeout.is_zero() {
        return Err(ConfigError::ValidationError {
            field: "store.request_timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.teams.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "teams".into(),
            message: "must declare at least one team".into(),
        });
    }
    for team in &config.teams {
        if team.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("teams[id={}].name", team.id),
                message: "must not be empty".into(),
            });
        }
        if team.budget <= Decimal::ZERO {
            return Err(ConfigError::ValidationError {
                field: format!("teams[id={}].budget", team.id),
                message: format!("must be > 0, got {}", team.budget),
            });
        }
    }
    let mut ids: Vec<TeamId> = config.teams.iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != config.teams.len() {
        return Err(ConfigError::ValidationError {
            field: "teams".into(),
            message: "team ids must be unique".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
