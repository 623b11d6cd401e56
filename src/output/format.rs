// Output column schemas, per-source ranking, and cell formatting.

use crate::model::StatKind;
use crate::projections::table::{PlayerRow, ProjectionTable};

/// How a column's cells render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Truncated toward zero; e.g. ranks, ages, blended game counts.
    Int,
    /// Fixed decimal places.
    Float(usize),
    /// `$1,234.56`, blank when there is nothing sensible to print.
    Currency,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Text,
    }
}

const fn int(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Int,
    }
}

const fn float(name: &'static str, decimals: usize) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Float(decimals),
    }
}

const fn currency(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Currency,
    }
}

/// Batting output schema, in column order. Columns with no data are omitted
/// from the rendered table; stat columns the schema does not name are not
/// written.
pub static BAT_COLUMNS: &[ColumnSpec] = &[
    text("Name"),
    int("Rank"),
    text("ProjectionSource"),
    int("MlbamId"),
    text("FangraphsId"),
    text("Team"),
    text("League"),
    text("ShortName"),
    text("Position"),
    int("Age"),
    text("Status"),
    currency("Salary"),
    text("Contract"),
    float("G", 1),
    float("PA", 1),
    float("AB", 1),
    float("H", 1),
    float("1B", 1),
    float("2B", 1),
    float("3B", 1),
    float("HR", 1),
    float("R", 1),
    float("RBI", 1),
    float("BB", 1),
    float("SO", 1),
    float("HBP", 1),
    float("SB", 1),
    float("CS", 1),
    float("GDP", 1),
    float("TB", 1),
    float("AVG", 3),
    float("OBP", 3),
    float("SLG", 3),
    float("OPS", 3),
    float("Points", 1),
    float("Pts/G", 2),
    float("PAR", 1),
    currency("AuctionValue"),
    currency("ContractValue"),
];

/// Pitching output schema, in column order.
pub static PIT_COLUMNS: &[ColumnSpec] = &[
    text("Name"),
    int("Rank"),
    text("ProjectionSource"),
    int("MlbamId"),
    text("FangraphsId"),
    text("Team"),
    text("League"),
    text("ShortName"),
    text("Position"),
    int("Age"),
    text("Status"),
    currency("Salary"),
    text("Contract"),
    float("W", 1),
    float("L", 1),
    float("G", 1),
    float("GS", 1),
    float("IP", 1),
    float("QS", 1),
    float("CG", 1),
    float("SHO", 1),
    float("SV", 1),
    float("HLD", 1),
    float("BS", 1),
    float("SO", 1),
    float("H", 1),
    float("ER", 1),
    float("BB", 1),
    float("HB", 1),
    float("ERA", 2),
    float("WHIP", 2),
    float("Points", 1),
    float("Pts/IP", 2),
    float("PAR", 1),
    currency("AuctionValue"),
    currency("ContractValue"),
];

pub fn columns_for(kind: StatKind) -> &'static [ColumnSpec] {
    match kind {
        StatKind::Batting => BAT_COLUMNS,
        StatKind::Pitching => PIT_COLUMNS,
    }
}

/// Renders dollars with thousands separators. Non-finite amounts come out
/// blank.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return String::new();
    }
    let negative = amount < 0.0;
    let cents = format!("{:.2}", amount.abs());
    let (whole, fraction) = match cents.split_once('.') {
        Some(parts) => parts,
        None => (cents.as_str(), "00"),
    };

    let mut grouped = String::new();
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if negative {
        format!("$-{grouped}.{fraction}")
    } else {
        format!("${grouped}.{fraction}")
    }
}

enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

fn cell_for(table: &ProjectionTable, row: &PlayerRow, column: &str) -> Cell {
    fn opt_text(value: &Option<String>) -> Cell {
        match value {
            Some(v) => Cell::Text(v.clone()),
            None => Cell::Missing,
        }
    }
    fn opt_number(value: Option<f64>) -> Cell {
        match value {
            Some(v) => Cell::Number(v),
            None => Cell::Missing,
        }
    }

    match column {
        "Name" => Cell::Text(row.name.clone()),
        "Rank" => opt_number(row.rank.map(|r| r as f64)),
        "ProjectionSource" => Cell::Text(row.source.clone()),
        "MlbamId" => opt_number(row.mlbam_id.map(|id| id as f64)),
        "FangraphsId" => opt_text(&row.fangraphs_id),
        "Team" => opt_text(&row.team),
        "League" => opt_text(&row.league),
        "ShortName" => opt_text(&row.short_name),
        "Position" => opt_text(&row.position),
        "Age" => opt_number(row.age),
        "Status" => opt_text(&row.status),
        "Salary" => opt_number(row.salary),
        "Contract" => opt_text(&row.contract),
        "Points" => opt_number(row.points),
        "Pts/G" | "Pts/IP" => opt_number(row.rate),
        "PAR" => opt_number(row.par),
        "AuctionValue" => opt_number(row.auction_value),
        "ContractValue" => opt_number(row.contract_value),
        stat => {
            if table.stat_columns.iter().any(|c| c == stat) {
                opt_number(row.stat_opt(stat))
            } else {
                Cell::Missing
            }
        }
    }
}

fn format_cell(cell: Cell, kind: ColumnKind) -> String {
    match (cell, kind) {
        (Cell::Missing, _) => String::new(),
        (Cell::Text(v), _) => v,
        (Cell::Number(v), ColumnKind::Int) => {
            if v.is_finite() {
                format!("{}", v.trunc() as i64)
            } else {
                String::new()
            }
        }
        (Cell::Number(v), ColumnKind::Float(decimals)) => {
            if v.is_finite() {
                format!("{v:.decimals$}")
            } else {
                String::new()
            }
        }
        (Cell::Number(v), ColumnKind::Currency) => format_currency(v),
        (Cell::Number(v), ColumnKind::Text) => format!("{v}"),
    }
}

/// A table reduced to strings, ready for the CSV writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Apply the kind's schema: keep schema columns that have at least one value,
/// in schema order, and format every cell.
pub fn render_table(table: &ProjectionTable) -> RenderedTable {
    let schema = columns_for(table.kind);

    let live_columns: Vec<&ColumnSpec> = schema
        .iter()
        .filter(|spec| {
            table.rows.iter().any(|row| {
                !matches!(cell_for(table, row, spec.name), Cell::Missing)
            })
        })
        .collect();

    let header = live_columns
        .iter()
        .map(|spec| spec.name.to_string())
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            live_columns
                .iter()
                .map(|spec| format_cell(cell_for(table, row, spec.name), spec.kind))
                .collect()
        })
        .collect();

    RenderedTable { header, rows }
}

/// Sort rows by (source ascending, points descending) and hand out 1-based
/// ranks per source. Rows without points sink to the bottom of their source.
pub fn order_and_rank_rows(table: &mut ProjectionTable) {
    table.rows.sort_by(|a, b| {
        a.source.cmp(&b.source).then_with(|| {
            let a_points = a.points.unwrap_or(f64::NEG_INFINITY);
            let b_points = b.points.unwrap_or(f64::NEG_INFINITY);
            b_points.total_cmp(&a_points)
        })
    });

    let mut rank = 0usize;
    for index in 0..table.rows.len() {
        if index == 0 || table.rows[index].source != table.rows[index - 1].source {
            rank = 0;
        }
        rank += 1;
        table.rows[index].rank = Some(rank);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatKind;

    fn row(name: &str, source: &str) -> PlayerRow {
        PlayerRow {
            name: name.to_string(),
            source: source.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn currency_formats_with_thousands_separators() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-1234.5), "$-1,234.50");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(f64::NAN), "");
        assert_eq!(format_currency(f64::INFINITY), "");
    }

    #[test]
    fn render_omits_columns_with_no_data() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        table.stat_columns = vec!["G".to_string(), "HR".to_string()];
        let mut a = row("A", "steamer");
        a.stats.insert("G".to_string(), 150.0);
        a.stats.insert("HR".to_string(), 40.0);
        a.points = Some(320.0);
        table.rows.push(a);

        let rendered = render_table(&table);

        assert_eq!(
            rendered.header,
            vec!["Name", "ProjectionSource", "G", "HR", "Points"]
        );
        assert_eq!(rendered.rows[0], vec!["A", "steamer", "150.0", "40.0", "320.0"]);
    }

    #[test]
    fn render_formats_each_kind() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        let mut a = row("A", "steamer");
        a.rank = Some(3);
        a.age = Some(32.7);
        a.status = Some("TMA".to_string());
        a.salary = Some(34.5);
        a.points = Some(412.345);
        a.rate = Some(2.71828);
        a.auction_value = Some(1234.567);
        table.rows.push(a);

        let rendered = render_table(&table);

        assert_eq!(
            rendered.header,
            vec![
                "Name",
                "Rank",
                "ProjectionSource",
                "Age",
                "Status",
                "Salary",
                "Points",
                "Pts/G",
                "AuctionValue"
            ]
        );
        assert_eq!(
            rendered.rows[0],
            vec![
                "A",
                "3",
                "steamer",
                "32",
                "TMA",
                "$34.50",
                "412.3",
                "2.72",
                "$1,234.57"
            ]
        );
    }

    #[test]
    fn non_finite_numbers_render_blank() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        let mut a = row("A", "steamer");
        a.points = Some(10.0);
        a.rate = Some(f64::INFINITY);
        a.par = Some(f64::NAN);
        table.rows.push(a);

        let rendered = render_table(&table);
        let rate_index = rendered.header.iter().position(|h| h == "Pts/G").unwrap();
        let par_index = rendered.header.iter().position(|h| h == "PAR").unwrap();

        assert_eq!(rendered.rows[0][rate_index], "");
        assert_eq!(rendered.rows[0][par_index], "");
    }

    #[test]
    fn schema_skips_stat_columns_it_does_not_name() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        table.stat_columns = vec!["HR".to_string(), "xwOBAcon".to_string()];
        let mut a = row("A", "steamer");
        a.stats.insert("HR".to_string(), 30.0);
        a.stats.insert("xwOBAcon".to_string(), 0.41);
        table.rows.push(a);

        let rendered = render_table(&table);
        assert!(rendered.header.iter().all(|h| h != "xwOBAcon"));
        assert!(rendered.header.iter().any(|h| h == "HR"));
    }

    #[test]
    fn pitching_schema_uses_per_inning_rate_label() {
        let mut table = ProjectionTable::new(StatKind::Pitching);
        let mut a = row("A", "steamer");
        a.rate = Some(1.5);
        table.rows.push(a);

        let rendered = render_table(&table);
        assert!(rendered.header.iter().any(|h| h == "Pts/IP"));
        assert!(rendered.header.iter().all(|h| h != "Pts/G"));
    }

    #[test]
    fn ranks_restart_per_source_ordered_by_points() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        let mut rows = vec![
            row("Low", "steamer"),
            row("High", "steamer"),
            row("Only", "atc"),
        ];
        rows[0].points = Some(10.0);
        rows[1].points = Some(99.0);
        rows[2].points = Some(50.0);
        table.rows = rows;

        order_and_rank_rows(&mut table);

        // Sources sort ascending, so atc first.
        assert_eq!(table.rows[0].name, "Only");
        assert_eq!(table.rows[0].rank, Some(1));
        assert_eq!(table.rows[1].name, "High");
        assert_eq!(table.rows[1].rank, Some(1));
        assert_eq!(table.rows[2].name, "Low");
        assert_eq!(table.rows[2].rank, Some(2));
    }

    #[test]
    fn unscored_rows_sink_within_their_source() {
        let mut table = ProjectionTable::new(StatKind::Batting);
        let mut unscored = row("Unscored", "steamer");
        unscored.points = None;
        let mut scored = row("Scored", "steamer");
        scored.points = Some(1.0);
        table.rows = vec![unscored, scored];

        order_and_rank_rows(&mut table);

        assert_eq!(table.rows[0].name, "Scored");
        assert_eq!(table.rows[1].name, "Unscored");
        assert_eq!(table.rows[1].rank, Some(2));
    }
}
