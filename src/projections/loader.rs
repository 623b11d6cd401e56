// CSV ingestion: projection files, the player id map, and league exports.
// File-level problems are errors; row-level problems are warned and skipped.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::StatKind;
use crate::projections::table::{PlayerRow, ProjectionTable};
use crate::projections::ProjectionError;

// Recognized identity headers. Anything else is a stat-column candidate.
const NAME_HEADERS: &[&str] = &["Name", "PlayerName"];
const MLBAM_HEADERS: &[&str] = &["MlbamId", "xMLBAMID"];
const FANGRAPHS_HEADERS: &[&str] = &["FangraphsId", "PlayerId", "playerid"];
const TEAM_HEADERS: &[&str] = &["Team"];
const LEAGUE_HEADERS: &[&str] = &["League"];
const POSITION_HEADERS: &[&str] = &["Position", "minpos"];
const SHORT_NAME_HEADERS: &[&str] = &["ShortName"];

/// A CSV cell captured as its string spelling. With `#[serde(flatten)]` the
/// csv crate routes every cell through `deserialize_any` and infers numeric
/// types, so plain `String` fields would reject numeric-looking cells; this
/// accepts any scalar and keeps the text.
#[derive(Debug)]
struct Cell(String);

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;
        impl serde::de::Visitor<'_> for CellVisitor {
            type Value = Cell;
            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a CSV cell")
            }
            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Cell, E> {
                Ok(Cell(v.to_string()))
            }
            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Cell, E> {
                Ok(Cell(v.to_string()))
            }
            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Cell, E> {
                Ok(Cell(v.to_string()))
            }
            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Cell, E> {
                Ok(Cell(v.to_string()))
            }
            fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Cell, E> {
                Ok(Cell(v.to_string()))
            }
            fn visit_unit<E: serde::de::Error>(self) -> Result<Cell, E> {
                Ok(Cell(String::new()))
            }
        }
        deserializer.deserialize_any(CellVisitor)
    }
}

impl std::ops::Deref for Cell {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

fn de_opt_cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Cell>::deserialize(deserializer)?.map(|c| c.0))
}

/// One parsed projection record. Identity columns are picked up under any of
/// their provider spellings; everything else lands in `rest` for stat-column
/// classification.
#[derive(Debug, Deserialize)]
struct RawProjectionRow {
    #[serde(rename = "Name", alias = "PlayerName", default, deserialize_with = "de_opt_cell")]
    name: Option<String>,
    #[serde(rename = "MlbamId", alias = "xMLBAMID", default, deserialize_with = "de_opt_cell")]
    mlbam_id: Option<String>,
    #[serde(
        rename = "FangraphsId",
        alias = "PlayerId",
        alias = "playerid",
        default,
        deserialize_with = "de_opt_cell"
    )]
    fangraphs_id: Option<String>,
    #[serde(rename = "Team", default, deserialize_with = "de_opt_cell")]
    team: Option<String>,
    #[serde(rename = "League", default, deserialize_with = "de_opt_cell")]
    league: Option<String>,
    #[serde(rename = "Position", alias = "minpos", default, deserialize_with = "de_opt_cell")]
    position: Option<String>,
    #[serde(rename = "ShortName", default, deserialize_with = "de_opt_cell")]
    short_name: Option<String>,
    #[serde(flatten)]
    rest: BTreeMap<String, Cell>,
}

/// Converts `"Last, First"` to `"First Last"`; other shapes pass through.
pub fn standardize_name(name: &str) -> String {
    let parts: Vec<&str> = name.split(", ").collect();
    if parts.len() == 2 {
        format!("{} {}", parts[1], parts[0])
    } else {
        name.to_string()
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parses provider ids that may arrive as `"545361"` or `"545361.0"`.
fn parse_numeric_id(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
        _ => None,
    }
}

/// Canonicalizes a Fangraphs id string: integral spellings collapse to the
/// plain integer form, non-numeric ids (minor leaguers) pass through.
fn normalize_fangraphs_id(value: &str) -> String {
    match parse_numeric_id(value) {
        Some(id) => id.to_string(),
        None => value.trim().to_string(),
    }
}

/// Parses a dollar-ish cell: `"$12,345.50"`, `"12.5"`, or blank.
fn parse_currency(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Projection files
// ---------------------------------------------------------------------------

/// The conventional file name for one (source, kind) pair.
pub fn projection_file_name(source_id: &str, kind: StatKind) -> String {
    format!("{}_{}.csv", source_id, kind.id())
}

fn identity_headers() -> impl Iterator<Item = &'static str> {
    NAME_HEADERS
        .iter()
        .chain(MLBAM_HEADERS)
        .chain(FANGRAPHS_HEADERS)
        .chain(TEAM_HEADERS)
        .chain(LEAGUE_HEADERS)
        .chain(POSITION_HEADERS)
        .chain(SHORT_NAME_HEADERS)
        .copied()
}

fn load_projections_from<R: Read>(
    reader: R,
    kind: StatKind,
    source: &str,
) -> Result<ProjectionTable, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw_rows: Vec<RawProjectionRow> = Vec::new();
    let mut skipped = 0usize;
    for record in csv_reader.deserialize::<RawProjectionRow>() {
        match record {
            Ok(row) => raw_rows.push(row),
            Err(e) => {
                warn!(source, error = %e, "skipping malformed projection row");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!(source, skipped, "projection rows were skipped");
    }

    // A candidate column is a stat column when every non-empty cell parses
    // as a number and at least one cell carries a value.
    let candidates: Vec<&String> = headers
        .iter()
        .filter(|h| !identity_headers().any(|known| known == h.as_str()))
        .collect();
    let mut stat_columns: Vec<String> = Vec::new();
    for column in candidates {
        let mut populated = false;
        let mut numeric = true;
        for row in &raw_rows {
            if let Some(cell) = row.rest.get(column) {
                let trimmed = cell.trim();
                if trimmed.is_empty() {
                    continue;
                }
                populated = true;
                if trimmed.parse::<f64>().is_err() {
                    numeric = false;
                    break;
                }
            }
        }
        if populated && numeric {
            stat_columns.push(column.clone());
        } else {
            debug!(source, column = %column, "ignoring non-numeric column");
        }
    }

    let has_position_data = headers
        .iter()
        .any(|h| POSITION_HEADERS.contains(&h.as_str()));

    let mut table = ProjectionTable::new(kind);
    table.stat_columns = stat_columns;
    table.has_position_data = has_position_data;

    for raw in raw_rows {
        let Some(name) = none_if_blank(raw.name) else {
            warn!(source, "skipping projection row without a player name");
            continue;
        };

        let mut stats = BTreeMap::new();
        for column in &table.stat_columns {
            if let Some(cell) = raw.rest.get(column) {
                let trimmed = cell.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Ok(value) = trimmed.parse::<f64>() {
                    stats.insert(column.clone(), value);
                }
            }
        }

        table.rows.push(PlayerRow {
            name: standardize_name(&name),
            mlbam_id: none_if_blank(raw.mlbam_id).and_then(|v| parse_numeric_id(&v)),
            fangraphs_id: none_if_blank(raw.fangraphs_id).map(|v| normalize_fangraphs_id(&v)),
            team: none_if_blank(raw.team),
            league: none_if_blank(raw.league),
            short_name: none_if_blank(raw.short_name),
            position: none_if_blank(raw.position),
            source: source.to_string(),
            stats,
            ..Default::default()
        });
    }

    Ok(table)
}

/// Load one projection CSV, tagging every row with `source`.
pub fn load_projection_file(
    path: &Path,
    kind: StatKind,
    source: &str,
) -> Result<ProjectionTable, ProjectionError> {
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_projections_from(file, kind, source).map_err(|e| ProjectionError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load every requested source for one kind from a data directory, folding
/// the per-source tables together. Sources without a file are skipped with a
/// warning; files that exist but cannot be read fail the run.
pub fn load_projection_dir(
    dir: &Path,
    source_ids: &[String],
    kind: StatKind,
) -> Result<ProjectionTable, ProjectionError> {
    let mut combined = ProjectionTable::new(kind);
    for source_id in source_ids {
        let path = dir.join(projection_file_name(source_id, kind));
        if !path.exists() {
            warn!(
                source = %source_id,
                kind = kind.id(),
                path = %path.display(),
                "no projection file for source, skipping"
            );
            continue;
        }
        let table = load_projection_file(&path, kind, source_id)?;
        debug!(source = %source_id, kind = kind.id(), rows = table.rows.len(), "loaded projections");
        combined.append(table);
    }
    Ok(combined)
}

// ---------------------------------------------------------------------------
// Player id map (Smart Fantasy Baseball format)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawIdMapRow {
    #[serde(rename = "MLBID", default)]
    mlbam_id: Option<String>,
    #[serde(rename = "IDFANGRAPHS", default)]
    fangraphs_id: Option<String>,
    #[serde(rename = "FANTRAXID", default)]
    provider_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdMapEntry {
    pub mlbam_id: Option<i64>,
    pub fangraphs_id: Option<String>,
}

/// Cross-provider id mapping keyed by the league host's player id.
#[derive(Debug, Default)]
pub struct PlayerIdMap {
    by_provider: HashMap<String, IdMapEntry>,
}

impl PlayerIdMap {
    pub fn lookup(&self, provider_id: &str) -> Option<&IdMapEntry> {
        self.by_provider.get(provider_id.trim())
    }

    pub fn len(&self) -> usize {
        self.by_provider.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_provider.is_empty()
    }
}

fn load_player_id_map_from<R: Read>(reader: R) -> Result<PlayerIdMap, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut map = PlayerIdMap::default();
    let mut skipped = 0usize;
    for record in csv_reader.deserialize::<RawIdMapRow>() {
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "skipping malformed id map row");
                skipped += 1;
                continue;
            }
        };
        let Some(provider_id) = none_if_blank(raw.provider_id) else {
            continue;
        };
        map.by_provider.insert(
            provider_id,
            IdMapEntry {
                mlbam_id: none_if_blank(raw.mlbam_id).and_then(|v| parse_numeric_id(&v)),
                fangraphs_id: none_if_blank(raw.fangraphs_id).map(|v| normalize_fangraphs_id(&v)),
            },
        );
    }
    if skipped > 0 {
        warn!(skipped, "id map rows were skipped");
    }
    Ok(map)
}

pub fn load_player_id_map(path: &Path) -> Result<PlayerIdMap, ProjectionError> {
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_player_id_map_from(file).map_err(|e| ProjectionError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// League export
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawExportRow {
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "Player", default)]
    player: Option<String>,
    #[serde(rename = "Position", default)]
    position: Option<String>,
    #[serde(rename = "Status", default)]
    status: Option<String>,
    #[serde(rename = "Age", default)]
    age: Option<String>,
    #[serde(rename = "Salary", default)]
    salary: Option<String>,
    #[serde(rename = "Contract", default)]
    contract: Option<String>,
    #[serde(rename = "MlbamId", default)]
    mlbam_id: Option<String>,
    #[serde(rename = "FangraphsId", default)]
    fangraphs_id: Option<String>,
}

/// One roster line from the league host's export.
#[derive(Debug, Clone, Default)]
pub struct ExportRow {
    pub provider_id: Option<String>,
    pub player: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub age: Option<f64>,
    pub salary: Option<f64>,
    pub contract: Option<String>,
    pub mlbam_id: Option<i64>,
    pub fangraphs_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct LeagueExport {
    pub rows: Vec<ExportRow>,
}

impl LeagueExport {
    /// Fill in missing MLBAM/Fangraphs ids from the id map, keyed by the
    /// export's provider id. Exports with direct id columns keep them.
    pub fn resolve_ids(&mut self, id_map: &PlayerIdMap) {
        let mut unresolved = 0usize;
        for row in &mut self.rows {
            if row.mlbam_id.is_some() && row.fangraphs_id.is_some() {
                continue;
            }
            let entry = row
                .provider_id
                .as_deref()
                .and_then(|id| id_map.lookup(id));
            match entry {
                Some(entry) => {
                    if row.mlbam_id.is_none() {
                        row.mlbam_id = entry.mlbam_id;
                    }
                    if row.fangraphs_id.is_none() {
                        row.fangraphs_id = entry.fangraphs_id.clone();
                    }
                }
                None => {
                    if row.mlbam_id.is_none() && row.fangraphs_id.is_none() {
                        unresolved += 1;
                    }
                }
            }
        }
        if unresolved > 0 {
            warn!(
                unresolved,
                "export rows have no resolvable player id and will not match projections"
            );
        }
    }

    /// Find the export line for a projection row: MLBAM id first, then
    /// Fangraphs id.
    pub fn find(&self, mlbam_id: Option<i64>, fangraphs_id: Option<&str>) -> Option<&ExportRow> {
        if let Some(mlbam) = mlbam_id {
            if let Some(row) = self
                .rows
                .iter()
                .find(|r| r.mlbam_id.is_some_and(|id| id == mlbam))
            {
                return Some(row);
            }
        }
        if let Some(fangraphs) = fangraphs_id {
            return self
                .rows
                .iter()
                .find(|r| r.fangraphs_id.as_deref() == Some(fangraphs));
        }
        None
    }
}

fn load_league_export_from<R: Read>(reader: R) -> Result<LeagueExport, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut export = LeagueExport::default();
    let mut skipped = 0usize;
    for record in csv_reader.deserialize::<RawExportRow>() {
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "skipping malformed league export row");
                skipped += 1;
                continue;
            }
        };
        export.rows.push(ExportRow {
            provider_id: none_if_blank(raw.id),
            player: none_if_blank(raw.player),
            position: none_if_blank(raw.position),
            status: none_if_blank(raw.status),
            age: none_if_blank(raw.age).and_then(|v| v.parse::<f64>().ok()),
            salary: none_if_blank(raw.salary).and_then(|v| parse_currency(&v)),
            contract: none_if_blank(raw.contract),
            mlbam_id: none_if_blank(raw.mlbam_id).and_then(|v| parse_numeric_id(&v)),
            fangraphs_id: none_if_blank(raw.fangraphs_id).map(|v| normalize_fangraphs_id(&v)),
        });
    }
    if skipped > 0 {
        warn!(skipped, "league export rows were skipped");
    }
    Ok(export)
}

pub fn load_league_export(path: &Path) -> Result<LeagueExport, ProjectionError> {
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_league_export_from(file).map_err(|e| ProjectionError::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
