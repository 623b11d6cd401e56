// Stage orchestration: one call takes freshly loaded projection tables all
// the way to ranked, auction-valued rows. Which stages run depends on which
// league sections are present.

use tracing::{debug, info};

use crate::config::LeagueConfig;
use crate::model::{blend_tag, SourceName, StatKind};
use crate::output::format::order_and_rank_rows;
use crate::projections::aggregate::add_mean_projection;
use crate::projections::loader::LeagueExport;
use crate::projections::positions::{
    overlay_export_positions, replace_pitcher_positions, strip_pitcher_codes,
};
use crate::projections::table::ProjectionTable;
use crate::valuation::auction::{add_auction_values, calculate_available_budget, AuctionParams};
use crate::valuation::points::add_points;
use crate::valuation::replacement::add_points_above_replacement;

/// Run-level switches that are not part of the league config.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Count bench spots toward replacement ranks.
    pub include_bench: bool,
    /// Rest-of-season projections; changes the blend tag.
    pub ros: bool,
    /// Exponent for the auction allocation curve.
    pub power_factor: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            include_bench: true,
            ros: false,
            power_factor: 1.0,
        }
    }
}

// The blend averages the systems that have earned a seat: oopsy, steamer,
// the BAT (X flavor for hitters), and the zips depth-chart blend.
fn blend_source_ids(kind: StatKind, ros: bool) -> Vec<String> {
    let sources: &[SourceName] = match kind {
        StatKind::Batting => &[
            SourceName::Oopsy,
            SourceName::Steamer,
            SourceName::TheBatX,
            SourceName::ZipsDc,
        ],
        StatKind::Pitching => &[
            SourceName::Oopsy,
            SourceName::Steamer,
            SourceName::TheBat,
            SourceName::ZipsDc,
        ],
    };
    sources.iter().map(|s| s.tag(ros).to_string()).collect()
}

/// Copy roster fields (status, age, salary, contract) from the league export
/// onto matching rows. Matching is by MLBAM id with a Fangraphs-id fallback;
/// rows without an export line are left untouched.
fn merge_league_export(table: &mut ProjectionTable, export: &LeagueExport) {
    let mut merged = 0usize;
    for row in &mut table.rows {
        let Some(line) = export.find(row.mlbam_id, row.fangraphs_id.as_deref()) else {
            continue;
        };
        row.status = line.status.clone();
        row.age = line.age;
        row.salary = line.salary;
        row.contract = line.contract.clone();
        merged += 1;
    }
    debug!(
        kind = table.kind.id(),
        merged, "merged league export fields onto projections"
    );
}

// In-pool means not signed: no status at all, or an explicit free agent.
fn unsigned_mask(table: &ProjectionTable) -> Vec<bool> {
    table
        .rows
        .iter()
        .map(|row| !row.status.as_deref().is_some_and(|status| status != "FA"))
        .collect()
}

/// Run every applicable stage over both tables, in order: blend synthesis,
/// export merge, position upkeep, points, PAR, auction values, ranking.
///
/// Without a league config only the blend and export stages run. Scoring
/// gates points (and ranking); roster gates PAR; salary gates auction values.
/// When an export is present, signed players are masked out of the auction
/// pool and the budget is what the league actually has left to spend.
pub fn augment_projections(
    bat: &mut ProjectionTable,
    pit: &mut ProjectionTable,
    league: Option<&LeagueConfig>,
    export: Option<&LeagueExport>,
    options: &PipelineOptions,
) {
    add_mean_projection(
        bat,
        &blend_source_ids(StatKind::Batting, options.ros),
        blend_tag(options.ros),
    );
    add_mean_projection(
        pit,
        &blend_source_ids(StatKind::Pitching, options.ros),
        blend_tag(options.ros),
    );

    if let Some(export) = export {
        merge_league_export(bat, export);
        merge_league_export(pit, export);
        overlay_export_positions(bat, export);
    }

    // Two-way players hit as hitters on the batting side.
    strip_pitcher_codes(bat);

    let Some(scoring) = league.and_then(|l| l.scoring.as_ref()) else {
        info!("no scoring rules; leaving tables unscored");
        return;
    };

    add_points(bat, scoring, true);
    add_points(pit, scoring, true);

    if let Some(roster) = league.and_then(|l| l.roster.as_ref()) {
        add_points_above_replacement(bat, roster, options.include_bench);
        // Pitcher roles come from the roster shape, not the projections.
        replace_pitcher_positions(pit, roster);
        add_points_above_replacement(pit, roster, options.include_bench);

        if let Some(salary) = league.and_then(|l| l.salary.as_ref()) {
            let mut params = AuctionParams {
                power_factor: options.power_factor,
                ..Default::default()
            };
            if export.is_some() {
                params.bat_pool_mask = Some(unsigned_mask(bat));
                params.pit_pool_mask = Some(unsigned_mask(pit));
                params.total_auction_value =
                    Some(calculate_available_budget(bat, pit, roster, salary));
            }
            add_auction_values(bat, pit, roster, salary, &params);
        }
    }

    order_and_rank_rows(bat);
    order_and_rank_rows(pit);
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
