// Mean-projection synthesis: blends several sources into one composite
// source appended to the table.

use std::collections::BTreeMap;

use tracing::debug;

use crate::projections::table::{PlayerRow, ProjectionTable};

// Grouping key for one player across sources. Ordered so blended rows come
// out in a stable order.
type GroupKey = (
    String,         // name
    Option<i64>,    // mlbam id
    Option<String>, // fangraphs id
    Option<String>, // position, only when the table carries position data
    Option<String>, // league
    Option<String>, // team
    Option<String>, // short name
);

fn group_key(row: &PlayerRow, use_position: bool) -> GroupKey {
    (
        row.name.clone(),
        row.mlbam_id,
        row.fangraphs_id.clone(),
        if use_position {
            row.position.clone()
        } else {
            None
        },
        row.league.clone(),
        row.team.clone(),
        row.short_name.clone(),
    )
}

/// Appends one synthetic row per player averaging the requested sources,
/// tagged with `blend_name`. Rows from other sources are ignored; existing
/// rows are never modified. A stat missing from some of a player's rows is
/// averaged over the rows that carry it.
pub fn add_mean_projection(table: &mut ProjectionTable, source_ids: &[String], blend_name: &str) {
    let use_position = table.has_position_data;

    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (index, row) in table.rows.iter().enumerate() {
        if source_ids.iter().any(|s| *s == row.source) {
            groups.entry(group_key(row, use_position)).or_default().push(index);
        }
    }

    if groups.is_empty() {
        debug!(blend = blend_name, "no rows from the requested sources, nothing to blend");
        return;
    }

    let mut blended: Vec<PlayerRow> = Vec::with_capacity(groups.len());
    for (key, indices) in groups {
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for &index in &indices {
            for (stat, value) in &table.rows[index].stats {
                let entry = sums.entry(stat.clone()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }

        let (name, mlbam_id, fangraphs_id, position, league, team, short_name) = key;
        // Grouping without position data leaves the blended row positionless
        // even when individual rows carried one.
        let position = if use_position {
            position
        } else {
            None
        };
        blended.push(PlayerRow {
            name,
            mlbam_id,
            fangraphs_id,
            team,
            league,
            short_name,
            position,
            source: blend_name.to_string(),
            stats: sums
                .into_iter()
                .map(|(stat, (sum, count))| (stat, sum / count as f64))
                .collect(),
            ..Default::default()
        });
    }

    debug!(blend = blend_name, players = blended.len(), "appended mean projections");
    table.rows.extend(blended);
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatKind;

    fn make_row(name: &str, source: &str, stats: &[(&str, f64)]) -> PlayerRow {
        PlayerRow {
            name: name.to_string(),
            source: source.to_string(),
            stats: stats
                .iter()
                .map(|(stat, value)| (stat.to_string(), *value))
                .collect(),
            ..Default::default()
        }
    }

    fn sources(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blends_requested_sources_per_player() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        table.stat_columns = vec!["HR".to_string()];
        table.rows.push(make_row("A", "steamer", &[("HR", 30.0)]));
        table.rows.push(make_row("A", "zipsdc", &[("HR", 20.0)]));
        table.rows.push(make_row("B", "steamer", &[("HR", 10.0)]));

        add_mean_projection(
            &mut table,
            &sources(&["steamer", "zipsdc"]),
            "zobs",
        );

        assert_eq!(table.rows.len(), 5);
        let blended: Vec<&PlayerRow> =
            table.rows.iter().filter(|r| r.source == "zobs").collect();
        assert_eq!(blended.len(), 2);
        // Sorted by group key, so A before B.
        assert_eq!(blended[0].name, "A");
        assert!((blended[0].stat("HR") - 25.0).abs() < 1e-12);
        assert_eq!(blended[1].name, "B");
        assert!((blended[1].stat("HR") - 10.0).abs() < 1e-12);
    }

    #[test]
    fn ignores_sources_outside_the_requested_set() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        table.rows.push(make_row("A", "steamer", &[("HR", 30.0)]));
        table.rows.push(make_row("A", "atc", &[("HR", 90.0)]));

        add_mean_projection(&mut table, &sources(&["steamer"]), "zobs");

        let blended = table.rows.iter().find(|r| r.source == "zobs").unwrap();
        assert!((blended.stat("HR") - 30.0).abs() < 1e-12);
    }

    #[test]
    fn averages_each_stat_over_rows_that_carry_it() {
        let mut table = ProjectionTable::new(StatKind::Pitching);
        table.rows.push(make_row("A", "steamer", &[("SO", 200.0), ("QS", 20.0)]));
        table.rows.push(make_row("A", "thebat", &[("SO", 180.0)]));

        add_mean_projection(&mut table, &sources(&["steamer", "thebat"]), "zobs");

        let blended = table.rows.iter().find(|r| r.source == "zobs").unwrap();
        assert!((blended.stat("SO") - 190.0).abs() < 1e-12);
        // QS appears in one source, so the mean is over that one row.
        assert!((blended.stat("QS") - 20.0).abs() < 1e-12);
    }

    #[test]
    fn no_matching_sources_appends_nothing() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        table.rows.push(make_row("A", "atc", &[("HR", 30.0)]));

        add_mean_projection(&mut table, &sources(&["steamer"]), "zobs");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn position_splits_groups_only_with_position_data() {
        let mut with_positions = ProjectionTable::new(StatKind::Batting);
        with_positions.has_position_data = true;
        let mut of_row = make_row("A", "steamer", &[("HR", 30.0)]);
        of_row.position = Some("OF".to_string());
        let mut dh_row = make_row("A", "zipsdc", &[("HR", 20.0)]);
        dh_row.position = Some("DH".to_string());
        with_positions.rows.push(of_row.clone());
        with_positions.rows.push(dh_row.clone());

        add_mean_projection(
            &mut with_positions,
            &sources(&["steamer", "zipsdc"]),
            "zobs",
        );
        // Different positions keep the rows in separate groups.
        assert_eq!(
            with_positions.rows.iter().filter(|r| r.source == "zobs").count(),
            2
        );

        let mut without_positions = ProjectionTable::new(StatKind::Batting);
        without_positions.rows.push(of_row);
        without_positions.rows.push(dh_row);

        add_mean_projection(
            &mut without_positions,
            &sources(&["steamer", "zipsdc"]),
            "zobs",
        );
        let blended: Vec<&PlayerRow> = without_positions
            .rows
            .iter()
            .filter(|r| r.source == "zobs")
            .collect();
        assert_eq!(blended.len(), 1);
        assert!((blended[0].stat("HR") - 25.0).abs() < 1e-12);
        assert!(blended[0].position.is_none());
    }

    #[test]
    fn players_without_ids_still_group_by_name() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        table.rows.push(make_row("Free Agent", "steamer", &[("HR", 10.0)]));
        table.rows.push(make_row("Free Agent", "zipsdc", &[("HR", 14.0)]));

        add_mean_projection(&mut table, &sources(&["steamer", "zipsdc"]), "zobs");

        let blended = table.rows.iter().find(|r| r.source == "zobs").unwrap();
        assert!((blended.stat("HR") - 12.0).abs() < 1e-12);
    }
}
