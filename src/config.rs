// League configuration loading and parsing (config/league.toml).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::StatKind;

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
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

/// A league's valuation rules. `scoring` is required for any meaningful run
/// and is enforced by validation; `roster` and `salary` are genuinely
/// optional and gate the replacement-level and auction stages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeagueConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
    #[serde(default)]
    pub roster: Option<RosterConfig>,
    #[serde(default)]
    pub salary: Option<SalaryConfig>,
}

impl LeagueConfig {
    pub fn has_scoring(&self) -> bool {
        self.scoring.is_some()
    }

    pub fn has_roster(&self) -> bool {
        self.roster.is_some()
    }

    pub fn has_salary(&self) -> bool {
        self.salary.is_some()
    }
}

/// Per-side stat → point-value tables. Both sides must be present in a valid
/// config; the long key spellings `batting`/`pitching` are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    #[serde(default, alias = "batting")]
    pub bat: Option<BTreeMap<String, f64>>,
    #[serde(default, alias = "pitching")]
    pub pit: Option<BTreeMap<String, f64>>,
}

impl ScoringConfig {
    /// The rules for one side of the box score. `None` scores everything 0.
    pub fn side(&self, kind: StatKind) -> Option<&BTreeMap<String, f64>> {
        match kind {
            StatKind::Batting => self.bat.as_ref(),
            StatKind::Pitching => self.pit.as_ref(),
        }
    }
}

/// Team count, either a plain number or a roll call of team names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TeamCount {
    Count(usize),
    Names(Vec<String>),
}

impl TeamCount {
    pub fn count(&self) -> usize {
        match self {
            TeamCount::Count(n) => *n,
            TeamCount::Names(names) => names.len(),
        }
    }
}

impl Default for TeamCount {
    fn default() -> Self {
        TeamCount::Count(12)
    }
}

/// Roster shape. `positions` maps position codes to starter counts and may
/// carry a `bench` pseudo-position; `minors` spots live outside `positions`
/// and only count toward the available-budget math.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub teams: TeamCount,
    #[serde(default)]
    pub positions: BTreeMap<String, u32>,
    #[serde(default)]
    pub minors: u32,
}

impl RosterConfig {
    pub fn team_count(&self) -> usize {
        self.teams.count()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalaryConfig {
    #[serde(default = "default_cap")]
    pub cap: f64,
    #[serde(default = "default_minimum")]
    pub minimum: f64,
    #[serde(default)]
    pub minors_pct: f64,
}

fn default_cap() -> f64 {
    260.0
}

fn default_minimum() -> f64 {
    1.0
}

impl Default for SalaryConfig {
    fn default() -> Self {
        SalaryConfig {
            cap: default_cap(),
            minimum: default_minimum(),
            minors_pct: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate a league file from an explicit path.
pub fn load_league_file(path: &Path) -> Result<LeagueConfig, ConfigError> {
    let text = read_file(path)?;
    let league_file: LeagueFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let league = league_file.league;
    validate(&league)?;
    Ok(league)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
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

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
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
                // File already exists in config/, skip it
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

/// Convenience path for runs without an explicit `--league-file`: bootstrap
/// `config/` from `defaults/` and load `config/league.toml` when it exists.
/// A missing league file is not an error; the pipeline simply runs without
/// league rules.
pub fn load_default_league(base_dir: &Path) -> Result<Option<LeagueConfig>, ConfigError> {
    let _ = ensure_config_files(base_dir)?;
    let league_path = base_dir.join("config").join("league.toml");
    if !league_path.exists() {
        return Ok(None);
    }
    load_league_file(&league_path).map(Some)
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

fn validate(league: &LeagueConfig) -> Result<(), ConfigError> {
    // Scoring is required, with both sides present.
    let Some(scoring) = &league.scoring else {
        return Err(ConfigError::ValidationError {
            field: "league.scoring".into(),
            message: "league config must include a scoring section".into(),
        });
    };
    if scoring.bat.is_none() {
        return Err(ConfigError::ValidationError {
            field: "league.scoring.bat".into(),
            message: "scoring must include batting rules ('bat' or 'batting')".into(),
        });
    }
    if scoring.pit.is_none() {
        return Err(ConfigError::ValidationError {
            field: "league.scoring.pit".into(),
            message: "scoring must include pitching rules ('pit' or 'pitching')".into(),
        });
    }

    // Roster validations (section optional)
    if let Some(roster) = &league.roster {
        if roster.team_count() == 0 {
            return Err(ConfigError::ValidationError {
                field: "league.roster.teams".into(),
                message: "must be greater than 0".into(),
            });
        }
        if roster.positions.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "league.roster.positions".into(),
                message: "roster must include a positions table".into(),
            });
        }
    }

    // Salary validations (section optional)
    if let Some(salary) = &league.salary {
        if salary.cap <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: "league.salary.cap".into(),
                message: format!("must be greater than 0, got {}", salary.cap),
            });
        }
        if salary.minimum < 0.0 {
            return Err(ConfigError::ValidationError {
                field: "league.salary.minimum".into(),
                message: format!("must not be negative, got {}", salary.minimum),
            });
        }
        if !(0.0..1.0).contains(&salary.minors_pct) {
            return Err(ConfigError::ValidationError {
                field: "league.salary.minors_pct".into(),
                message: format!(
                    "must be between 0.0 inclusive and 1.0 exclusive, got {}",
                    salary.minors_pct
                ),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
