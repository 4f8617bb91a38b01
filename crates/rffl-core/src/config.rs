// Configuration loading and parsing (league.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const CONFIG_DIR: &str = "config";
const DEFAULTS_DIR: &str = "defaults";
const LEAGUE_FILE: &str = "league.toml";

/// Slot labels a lineup requirement may name. Anything else is a bench,
/// IR, or league-specific slot that never counts toward the starting lineup.
const STARTER_LABELS: &[&str] = &["QB", "RB", "WR", "TE", "FLEX", "D/ST", "K"];

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

    #[error("no config/league.toml or defaults/league.toml under {base_dir}; pass --base-dir")]
    NoLeagueConfig { base_dir: PathBuf },

    #[error("failed to seed league config at {path}: {source}")]
    SeedError {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub export: ExportConfig,
    pub paths: PathsConfig,
    /// Directory the relative entries in `paths` are resolved against.
    pub base_dir: PathBuf,
}

impl Config {
    /// Absolute location of the team alias mapping file.
    pub fn alias_mapping_path(&self) -> PathBuf {
        self.base_dir.join(&self.paths.alias_mapping)
    }

    /// Absolute location of the canonical team metadata CSV.
    pub fn canonical_teams_path(&self) -> PathBuf {
        self.base_dir.join(&self.paths.canonical_teams)
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    export: ExportConfig,
    paths: PathsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub lineup: LineupConfig,
}

/// Roster-construction rules, as written in `[league.lineup]`.
///
/// Slot order is significant: it is the order starters are written in the
/// export, so the table is an array rather than a map.
#[derive(Debug, Clone, Deserialize)]
pub struct LineupConfig {
    pub slots: Vec<SlotRequirement>,
    pub flex_eligible: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotRequirement {
    pub slot: String,
    pub count: usize,
}

impl LineupConfig {
    /// The RFFL rule set: 1 QB, 2 RB, 2 WR, 1 TE, 1 FLEX, 1 D/ST, 1 K.
    pub fn rffl() -> Self {
        let slots = [("QB", 1), ("RB", 2), ("WR", 2), ("TE", 1), ("FLEX", 1), ("D/ST", 1), ("K", 1)]
            .into_iter()
            .map(|(slot, count)| SlotRequirement {
                slot: slot.to_string(),
                count,
            })
            .collect();
        LineupConfig {
            slots,
            flex_eligible: vec!["RB".into(), "WR".into(), "TE".into()],
        }
    }

    /// Total number of starters a complete lineup carries.
    pub fn required_starters(&self) -> usize {
        self.slots.iter().map(|s| s.count).sum()
    }
}

/// Defaults for the `export` command; CLI flags override them per run.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub fill_missing_slots: bool,
    #[serde(default)]
    pub require_clean: bool,
    #[serde(default)]
    pub tolerance: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            fill_missing_slots: false,
            require_clean: false,
            tolerance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub alias_mapping: String,
    pub canonical_teams: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to
/// `base_dir`.
///
/// This does not seed from defaults; prefer `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = league_path(base_dir);
    let text = read_file(&league_path)?;
    let file: LeagueFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    let config = Config {
        league: file.league,
        export: file.export,
        paths: file.paths,
        base_dir: base_dir.to_path_buf(),
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/league.toml` from `defaults/league.toml` on first run.
///
/// Returns the seeded path, or `None` when the league file already exists.
/// An existing league file is never overwritten.
pub fn seed_league_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = league_path(base_dir);
    if target.exists() {
        return Ok(None);
    }
    let source = base_dir.join(DEFAULTS_DIR).join(LEAGUE_FILE);
    if !source.is_file() {
        return Err(ConfigError::NoLeagueConfig {
            base_dir: base_dir.to_path_buf(),
        });
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::SeedError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::SeedError {
        path: target.clone(),
        source: e,
    })?;
    info!("seeded {} from {}", target.display(), source.display());
    Ok(Some(target))
}

/// Load config relative to `base_dir`, seeding the league file first.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    seed_league_config(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn league_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_DIR).join(LEAGUE_FILE)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let lineup = &config.league.lineup;

    if lineup.slots.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.lineup.slots".into(),
            message: "must list at least one starter slot".into(),
        });
    }

    let mut seen = HashSet::new();
    for req in &lineup.slots {
        let label = req.slot.to_uppercase();
        if !STARTER_LABELS.contains(&label.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "league.lineup.slots".into(),
                message: format!(
                    "unknown starter slot `{}` (expected one of {})",
                    req.slot,
                    STARTER_LABELS.join(", ")
                ),
            });
        }
        if req.count == 0 {
            return Err(ConfigError::ValidationError {
                field: format!("league.lineup.slots.{}", req.slot),
                message: "count must be > 0".into(),
            });
        }
        if !seen.insert(label) {
            return Err(ConfigError::ValidationError {
                field: format!("league.lineup.slots.{}", req.slot),
                message: "slot listed more than once".into(),
            });
        }
    }

    if lineup.flex_eligible.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.lineup.flex_eligible".into(),
            message: "must name at least one position".into(),
        });
    }

    let tol = config.export.tolerance;
    if !tol.is_finite() || tol < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "export.tolerance".into(),
            message: format!("must be a finite value >= 0, got {tol}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
