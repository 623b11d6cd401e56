// Command-line surface for the parcast binary.

use std::path::PathBuf;

use clap::Parser;

use crate::model::{SourceName, StatKind, ALL_SOURCES};

fn parse_source(value: &str) -> Result<SourceName, String> {
    SourceName::from_str_source(value).ok_or_else(|| {
        let known: Vec<&str> = ALL_SOURCES.iter().map(|s| s.id()).collect();
        format!("unknown projection source `{value}` (known: {})", known.join(", "))
    })
}

fn parse_kind(value: &str) -> Result<StatKind, String> {
    StatKind::from_str_kind(value)
        .ok_or_else(|| format!("unknown stat category `{value}` (expected `bat` or `pit`)"))
}

/// Compute fantasy-baseball auction values from projection CSVs.
#[derive(Debug, Parser)]
#[command(name = "parcast", version, about)]
pub struct Args {
    /// Projection sources to load; all known sources when omitted.
    #[arg(short = 'p', long = "projection-source", value_parser = parse_source, num_args = 1..)]
    pub projection_source: Vec<SourceName>,

    /// Stat categories to value; both when omitted.
    #[arg(short = 's', long = "stat-category", value_parser = parse_kind, num_args = 1..)]
    pub stat_category: Vec<StatKind>,

    /// Leave bench spots out of the replacement-level ranks.
    #[arg(short = 'x', long)]
    pub exclude_bench: bool,

    /// Use rest-of-season projection files instead of preseason ones.
    #[arg(short = 'r', long)]
    pub rest_of_season: bool,

    /// League config file; defaults to config/league.toml when present.
    #[arg(short = 'l', long)]
    pub league_file: Option<PathBuf>,

    /// League host roster export (signed players, salaries, statuses).
    #[arg(short = 'e', long)]
    pub league_export: Option<PathBuf>,

    /// Player id map CSV for resolving export rows to MLBAM/Fangraphs ids.
    #[arg(long)]
    pub player_id_map: Option<PathBuf>,

    /// Directory holding `{source}_{bat|pit}.csv` projection files.
    #[arg(short = 'd', long, default_value = "data/projections")]
    pub data_dir: PathBuf,

    /// Directory the dated output CSVs are written to.
    #[arg(short = 'o', long, default_value = "projections")]
    pub output_dir: PathBuf,

    /// Exponent applied to PAR before budget allocation; 1.0 is linear.
    #[arg(long, default_value_t = 1.0)]
    pub power_factor: f64,
}

impl Args {
    pub fn sources(&self) -> Vec<SourceName> {
        if self.projection_source.is_empty() {
            ALL_SOURCES.to_vec()
        } else {
            self.projection_source.clone()
        }
    }

    pub fn kinds(&self) -> Vec<StatKind> {
        if self.stat_category.is_empty() {
            vec![StatKind::Batting, StatKind::Pitching]
        } else {
            self.stat_category.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
