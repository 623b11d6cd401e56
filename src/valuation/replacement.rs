// Replacement level: how many players of each position are rostered league
// wide, what the marginal rostered player at each position scores, and each
// player's points above that baseline.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::RosterConfig;
use crate::model::is_known_position;
use crate::projections::table::ProjectionTable;

// Flex slots and the base positions that can fill them, in resolution order.
pub static FLEX_POSITIONS: &[(&str, &[&str])] = &[
    ("CI", &["1B", "3B"]),
    ("MI", &["2B", "SS"]),
    ("UTIL", &["C", "1B", "2B", "SS", "3B", "OF"]),
];

/// Rows averaged to produce a replacement-level threshold.
pub const REPLACEMENT_WINDOW: usize = 5;

/// Pseudo-position key for reserve spots inside a roster's positions table.
const BENCH_KEY: &str = "bench";

/// League-wide rostered count per position: starter counts plus a
/// proportional share of the bench, with flex slots redistributed to their
/// eligible base positions, all times the team count.
///
/// Flex counts divide by the full eligible list, so when an eligible position
/// is not in the roster its share simply vanishes. Unknown position codes are
/// kept as their own buckets.
pub fn calculate_replacement_level_ranks(
    roster: &RosterConfig,
    include_bench: bool,
) -> BTreeMap<String, f64> {
    let team_count = roster.team_count() as f64;

    let mut positions: BTreeMap<String, f64> = roster
        .positions
        .iter()
        .map(|(code, count)| (code.clone(), f64::from(*count)))
        .collect();
    let bench_count = positions.remove(BENCH_KEY);

    let unknown: Vec<String> = positions
        .keys()
        .filter(|code| !is_known_position(code))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        warn!(?unknown, "unrecognized roster position codes, keeping them as-is");
    }

    let starter_count: f64 = positions.values().sum();

    if let Some(bench) = bench_count {
        if include_bench && bench > 0.0 && starter_count > 0.0 {
            for count in positions.values_mut() {
                *count += *count / starter_count * bench;
            }
        }
    }

    for (flex, eligible) in FLEX_POSITIONS {
        let Some(flex_count) = positions.remove(*flex) else {
            continue;
        };
        let share = flex_count / eligible.len() as f64;
        let mut distributed = 0usize;
        for position in eligible.iter() {
            if let Some(count) = positions.get_mut(*position) {
                *count += share;
                distributed += 1;
            }
        }
        if distributed < eligible.len() {
            warn!(
                flex,
                spots = share * (eligible.len() - distributed) as f64,
                "flex spots with no rostered eligible position are dropped"
            );
        }
    }

    positions
        .into_iter()
        .map(|(code, count)| (code, count * team_count))
        .collect()
}

/// Replacement-level points per (source, position).
#[derive(Debug, Default, Clone)]
pub struct ReplacementLevels {
    by_source: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ReplacementLevels {
    pub fn threshold(&self, source: &str, position: &str) -> Option<f64> {
        self.by_source.get(source)?.get(position).copied()
    }

    /// Highest threshold recorded for a source, used when a player matches
    /// none of the source's positions.
    pub fn fallback(&self, source: &str) -> Option<f64> {
        self.by_source
            .get(source)?
            .values()
            .copied()
            .reduce(f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.values().all(|p| p.is_empty())
    }
}

/// For each source and ranked position, the mean points over the window of
/// players around the replacement rank: take the top `ceil(rank + window - 1)`
/// rows by points, then average the bottom `window` of those. Sources with no
/// eligible rows at a position record no threshold there.
pub fn calculate_replacement_level_points(
    table: &ProjectionTable,
    ranks: &BTreeMap<String, f64>,
    window: usize,
) -> ReplacementLevels {
    let mut levels = ReplacementLevels::default();

    for source in table.sources() {
        let mut by_position = BTreeMap::new();
        for (position, rank) in ranks {
            let mut points: Vec<f64> = table
                .rows
                .iter()
                .filter(|row| row.source == source && row.has_position(position))
                .filter_map(|row| row.points)
                .collect();
            if points.is_empty() {
                continue;
            }
            points.sort_by(|a, b| b.total_cmp(a));

            let take = ((rank + window as f64 - 1.0).ceil() as usize).min(points.len());
            let top = &points[..take];
            let tail_len = window.min(top.len());
            let tail = &top[top.len() - tail_len..];
            let threshold = tail.iter().sum::<f64>() / tail_len as f64;
            by_position.insert(position.clone(), threshold);
        }
        levels.by_source.insert(source, by_position);
    }

    levels
}

/// Fill in `par` on every scored row: points minus the lowest threshold among
/// the row's eligible positions for its source. A row matching none of the
/// source's thresholds falls back to the source's highest threshold. A source
/// with no thresholds at all yields NaN.
pub fn add_points_above_replacement(
    table: &mut ProjectionTable,
    roster: &RosterConfig,
    include_bench: bool,
) {
    let ranks = calculate_replacement_level_ranks(roster, include_bench);
    let levels = calculate_replacement_level_points(table, &ranks, REPLACEMENT_WINDOW);

    let mut sourceless = 0usize;
    for row in &mut table.rows {
        let Some(points) = row.points else {
            continue;
        };

        let best = row
            .positions()
            .iter()
            .filter_map(|position| levels.threshold(&row.source, position))
            .reduce(f64::min);

        let threshold = match best.or_else(|| levels.fallback(&row.source)) {
            Some(threshold) => threshold,
            None => {
                sourceless += 1;
                f64::NAN
            }
        };
        row.par = Some(points - threshold);
    }

    if sourceless > 0 {
        warn!(
            rows = sourceless,
            kind = table.kind.id(),
            "rows from sources with no replacement thresholds were given NaN PAR"
        );
    }
    debug!(kind = table.kind.id(), "attributed points above replacement");
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeamCount;
    use crate::model::StatKind;
    use crate::projections::table::PlayerRow;

    fn roster(teams: usize, positions: &[(&str, u32)]) -> RosterConfig {
        RosterConfig {
            teams: TeamCount::Count(teams),
            positions: positions
                .iter()
                .map(|(code, count)| (code.to_string(), *count))
                .collect(),
            minors: 0,
        }
    }

    fn assert_rank(ranks: &BTreeMap<String, f64>, position: &str, expected: f64) {
        let actual = ranks.get(position).copied().unwrap();
        assert!(
            (actual - expected).abs() < 1e-9,
            "rank for {position}: expected {expected}, got {actual}"
        );
    }

    fn scored_row(name: &str, source: &str, position: Option<&str>, points: f64) -> PlayerRow {
        PlayerRow {
            name: name.to_string(),
            source: source.to_string(),
            position: position.map(|p| p.to_string()),
            points: Some(points),
            ..Default::default()
        }
    }

    #[test]
    fn simple_roster_without_bench() {
        let ranks = calculate_replacement_level_ranks(
            &roster(10, &[("C", 1), ("1B", 1), ("SS", 1)]),
            false,
        );

        assert_rank(&ranks, "C", 10.0);
        assert_rank(&ranks, "1B", 10.0);
        assert_rank(&ranks, "SS", 10.0);
    }

    #[test]
    fn bench_distributes_proportionally() {
        let ranks = calculate_replacement_level_ranks(
            &roster(10, &[("C", 1), ("OF", 3), ("bench", 4)]),
            true,
        );

        // 4 starters, 4 bench spots: C gets one extra, OF gets three.
        assert_rank(&ranks, "C", 20.0);
        assert_rank(&ranks, "OF", 60.0);
        assert!(!ranks.contains_key("bench"));
    }

    #[test]
    fn bench_is_ignored_when_excluded() {
        let ranks = calculate_replacement_level_ranks(
            &roster(10, &[("C", 1), ("OF", 3), ("bench", 4)]),
            false,
        );

        assert_rank(&ranks, "C", 10.0);
        assert_rank(&ranks, "OF", 30.0);
    }

    #[test]
    fn corner_infield_flex_distributes() {
        let ranks = calculate_replacement_level_ranks(
            &roster(10, &[("1B", 1), ("3B", 1), ("CI", 2)]),
            false,
        );

        assert_rank(&ranks, "1B", 20.0);
        assert_rank(&ranks, "3B", 20.0);
        assert!(!ranks.contains_key("CI"));
    }

    #[test]
    fn middle_infield_flex_distributes() {
        let ranks = calculate_replacement_level_ranks(
            &roster(12, &[("2B", 1), ("SS", 1), ("MI", 1)]),
            false,
        );

        assert_rank(&ranks, "2B", 18.0);
        assert_rank(&ranks, "SS", 18.0);
    }

    #[test]
    fn team_name_list_collapses_to_count() {
        let shape = RosterConfig {
            teams: TeamCount::Names(vec![
                "Team A".to_string(),
                "Team B".to_string(),
                "Team C".to_string(),
            ]),
            positions: [("C".to_string(), 1)].into_iter().collect(),
            minors: 0,
        };
        let ranks = calculate_replacement_level_ranks(&shape, false);
        assert_rank(&ranks, "C", 3.0);
    }

    #[test]
    fn full_roster_resolves_every_flex_slot() {
        let ranks = calculate_replacement_level_ranks(
            &roster(
                14,
                &[
                    ("C", 1),
                    ("1B", 1),
                    ("2B", 1),
                    ("SS", 1),
                    ("3B", 1),
                    ("CI", 1),
                    ("MI", 1),
                    ("OF", 5),
                    ("UTIL", 1),
                    ("P", 9),
                    ("bench", 13),
                ],
            ),
            true,
        );

        assert!(!ranks.contains_key("CI"));
        assert!(!ranks.contains_key("MI"));
        assert!(!ranks.contains_key("UTIL"));
        assert!(ranks.contains_key("P"));
        assert!(!ranks.contains_key("bench"));
    }

    #[test]
    fn flex_spots_without_eligible_positions_vanish() {
        let ranks =
            calculate_replacement_level_ranks(&roster(10, &[("1B", 1), ("CI", 2)]), false);

        // Half the CI spots go to 1B, the 3B half has nowhere to go.
        assert_rank(&ranks, "1B", 20.0);
        assert!(!ranks.contains_key("CI"));
        assert!(!ranks.contains_key("3B"));
    }

    #[test]
    fn unknown_position_codes_pass_through() {
        let ranks =
            calculate_replacement_level_ranks(&roster(10, &[("C", 1), ("XX", 2)]), false);

        assert_rank(&ranks, "C", 10.0);
        assert_rank(&ranks, "XX", 20.0);
    }

    #[test]
    fn threshold_averages_the_replacement_window() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        for (index, points) in [100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0]
            .into_iter()
            .enumerate()
        {
            table
                .rows
                .push(scored_row(&format!("P{index}"), "steamer", Some("C"), points));
        }

        let ranks = [("C".to_string(), 2.0)].into_iter().collect();
        let levels = calculate_replacement_level_points(&table, &ranks, 5);

        // Top ceil(2 + 4) = 6 rows, bottom 5 of those: 90..50, mean 70.
        let threshold = levels.threshold("steamer", "C").unwrap();
        assert!((threshold - 70.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_window_degrades_with_small_pools() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        for (index, points) in [30.0, 20.0, 10.0].into_iter().enumerate() {
            table
                .rows
                .push(scored_row(&format!("P{index}"), "steamer", Some("C"), points));
        }

        let ranks = [("C".to_string(), 2.0)].into_iter().collect();
        let levels = calculate_replacement_level_points(&table, &ranks, 5);

        assert!((levels.threshold("steamer", "C").unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn positions_without_rows_record_no_threshold() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        table.rows.push(scored_row("A", "steamer", Some("C"), 50.0));

        let ranks = [("C".to_string(), 1.0), ("SS".to_string(), 1.0)]
            .into_iter()
            .collect();
        let levels = calculate_replacement_level_points(&table, &ranks, 5);

        assert!(levels.threshold("steamer", "C").is_some());
        assert!(levels.threshold("steamer", "SS").is_none());
    }

    #[test]
    fn eligibility_is_exact_not_substring() {
        let mut table = ProjectionTable::new(StatKind::Pitching);
        table.rows.push(scored_row("Starter", "steamer", Some("SP"), 90.0));
        table.rows.push(scored_row("Swing", "steamer", Some("P"), 40.0));

        let ranks = [("P".to_string(), 1.0)].into_iter().collect();
        let levels = calculate_replacement_level_points(&table, &ranks, 5);

        // Only the flat P row is eligible for the P bucket.
        assert!((levels.threshold("steamer", "P").unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn par_picks_most_favorable_position() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        // Deep C pool so its threshold lands low; thin OF pool stays high.
        for index in 0..12 {
            table.rows.push(scored_row(
                &format!("C{index}"),
                "steamer",
                Some("C"),
                100.0 - index as f64 * 10.0,
            ));
        }
        for index in 0..12 {
            table.rows.push(scored_row(
                &format!("OF{index}"),
                "steamer",
                Some("OF"),
                150.0 - index as f64 * 2.0,
            ));
        }
        table
            .rows
            .push(scored_row("Both", "steamer", Some("C/OF"), 120.0));

        let shape = roster(1, &[("C", 1), ("OF", 1)]);
        add_points_above_replacement(&mut table, &shape, true);

        let ranks = calculate_replacement_level_ranks(&shape, true);
        let levels = calculate_replacement_level_points(&table, &ranks, REPLACEMENT_WINDOW);
        let c_threshold = levels.threshold("steamer", "C").unwrap();
        let of_threshold = levels.threshold("steamer", "OF").unwrap();
        assert!(c_threshold < of_threshold);

        let both = table.rows.iter().find(|r| r.name == "Both").unwrap();
        assert!((both.par.unwrap() - (120.0 - c_threshold)).abs() < 1e-9);
    }

    #[test]
    fn par_falls_back_to_highest_threshold() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        for index in 0..6 {
            table.rows.push(scored_row(
                &format!("C{index}"),
                "steamer",
                Some("C"),
                60.0 - index as f64 * 10.0,
            ));
        }
        for index in 0..6 {
            table.rows.push(scored_row(
                &format!("OF{index}"),
                "steamer",
                Some("OF"),
                120.0 - index as f64 * 10.0,
            ));
        }
        // DH matches no ranked position.
        table
            .rows
            .push(scored_row("Slugger", "steamer", Some("DH"), 100.0));

        let shape = roster(1, &[("C", 1), ("OF", 1)]);
        add_points_above_replacement(&mut table, &shape, true);

        let ranks = calculate_replacement_level_ranks(&shape, true);
        let levels = calculate_replacement_level_points(&table, &ranks, REPLACEMENT_WINDOW);
        let highest = levels.fallback("steamer").unwrap();

        let slugger = table.rows.iter().find(|r| r.name == "Slugger").unwrap();
        assert!((slugger.par.unwrap() - (100.0 - highest)).abs() < 1e-9);
    }

    #[test]
    fn source_without_thresholds_yields_nan_par() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        // No row carries a position, so no thresholds get recorded.
        table.rows.push(scored_row("A", "steamer", None, 80.0));

        add_points_above_replacement(&mut table, &roster(10, &[("C", 1)]), true);

        assert!(table.rows[0].par.unwrap().is_nan());
    }

    #[test]
    fn unscored_rows_keep_par_unset() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        let mut row = scored_row("A", "steamer", Some("C"), 0.0);
        row.points = None;
        table.rows.push(row);

        add_points_above_replacement(&mut table, &roster(10, &[("C", 1)]), true);
        assert!(table.rows[0].par.is_none());
    }
}
