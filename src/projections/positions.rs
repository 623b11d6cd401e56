// Position upkeep between loading and valuation: pitcher role assignment,
// league-export overlays, and two-way cleanup.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::RosterConfig;
use crate::projections::loader::LeagueExport;
use crate::projections::table::ProjectionTable;

/// Overwrite pitcher positions from the roster's point of view. Leagues that
/// slot SP/RP separately get per-row roles from games started; everyone else
/// uses the flat `P` pool. Marks the table as carrying position data.
pub fn replace_pitcher_positions(table: &mut ProjectionTable, roster: &RosterConfig) {
    let split_roles =
        roster.positions.contains_key("SP") || roster.positions.contains_key("RP");

    if split_roles && !table.stat_columns.iter().any(|c| c == "GS") {
        warn!("no GS column in pitching projections; every pitcher will be treated as a reliever");
    }

    for row in &mut table.rows {
        let position = if split_roles {
            if row.stat("GS") > 0.0 {
                "SP"
            } else {
                "RP"
            }
        } else {
            "P"
        };
        row.position = Some(position.to_string());
    }
    table.has_position_data = true;
}

/// Replace row positions with the league host's eligibility strings, matching
/// by MLBAM id with a Fangraphs-id fallback. Export positions use commas
/// between codes; they are normalized to the slash form. Rows with no export
/// line keep their loaded position.
pub fn overlay_export_positions(table: &mut ProjectionTable, export: &LeagueExport) {
    let mut by_mlbam: HashMap<i64, String> = HashMap::new();
    let mut by_fangraphs: HashMap<&str, String> = HashMap::new();
    for row in &export.rows {
        let Some(position) = &row.position else {
            continue;
        };
        let normalized = position.replace(',', "/");
        if let Some(mlbam) = row.mlbam_id {
            by_mlbam.entry(mlbam).or_insert_with(|| normalized.clone());
        }
        if let Some(fangraphs) = &row.fangraphs_id {
            by_fangraphs
                .entry(fangraphs.as_str())
                .or_insert_with(|| normalized.clone());
        }
    }

    let mut replaced = 0usize;
    for row in &mut table.rows {
        let overlay = row
            .mlbam_id
            .and_then(|id| by_mlbam.get(&id))
            .or_else(|| {
                row.fangraphs_id
                    .as_deref()
                    .and_then(|id| by_fangraphs.get(id))
            });
        if let Some(position) = overlay {
            row.position = Some(position.clone());
            replaced += 1;
        }
    }

    if replaced > 0 {
        table.has_position_data = true;
    }
    debug!(replaced, "overlaid positions from league export");
}

/// Drop `P` from batting eligibility strings so two-way players value as
/// hitters on the batting side (`DH/P` becomes `DH`). Rows left with nothing
/// lose their position entirely.
pub fn strip_pitcher_codes(table: &mut ProjectionTable) {
    for row in &mut table.rows {
        let Some(position) = &row.position else {
            continue;
        };
        let kept: Vec<&str> = position
            .split('/')
            .map(str::trim)
            .filter(|code| !code.is_empty() && *code != "P")
            .collect();
        row.position = if kept.is_empty() {
            None
        } else {
            Some(kept.join("/"))
        };
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
