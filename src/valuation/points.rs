// Points attribution: dot product of the score vector with each row's stats,
// plus a per-game or per-inning rate.

use tracing::debug;

use crate::config::ScoringConfig;
use crate::projections::table::ProjectionTable;
use crate::valuation::scoring::calculate_score_vector;

/// Fill in `points` and `rate` on every row. A stat missing from a row
/// contributes nothing. The rate divides by the kind's usage stat (G for
/// batters, IP for pitchers); zero or missing usage yields an IEEE
/// non-finite rate rather than an error.
pub fn add_points(table: &mut ProjectionTable, scoring: &ScoringConfig, use_stat_proxies: bool) {
    let vector = calculate_score_vector(table.kind, &table.stat_columns, scoring, use_stat_proxies);
    let usage_column = table.kind.usage_column();

    for row in &mut table.rows {
        let points: f64 = vector
            .iter()
            .map(|(stat, coefficient)| coefficient * row.stat(stat))
            .sum();
        let usage = row.stat(usage_column);
        row.points = Some(points);
        row.rate = Some(points / usage);
    }

    debug!(
        kind = table.kind.id(),
        rows = table.rows.len(),
        "attributed points"
    );
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
