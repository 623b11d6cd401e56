// In-memory projection tables. One table holds every loaded row for one side
// of the box score, across all projection sources.

use std::collections::BTreeMap;

use crate::model::StatKind;

/// A single player's projected line from one source.
///
/// Stats live in `stats`; a stat absent from the map is missing, which the
/// valuation stages treat as zero. Derived columns start as `None` and are
/// filled in by pipeline stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRow {
    pub name: String,
    pub mlbam_id: Option<i64>,
    pub fangraphs_id: Option<String>,
    pub team: Option<String>,
    pub league: Option<String>,
    pub short_name: Option<String>,
    /// Slash-delimited eligibility string, e.g. `"1B/OF"`.
    pub position: Option<String>,
    /// Projection source tag, e.g. `"steamer"` or the blend tag `"zobs"`.
    pub source: String,
    pub stats: BTreeMap<String, f64>,

    // League-export fields, merged on when an export is supplied.
    pub status: Option<String>,
    pub age: Option<f64>,
    pub salary: Option<f64>,
    pub contract: Option<String>,

    // Derived by pipeline stages.
    pub points: Option<f64>,
    pub rate: Option<f64>,
    pub par: Option<f64>,
    pub auction_value: Option<f64>,
    pub contract_value: Option<f64>,
    pub rank: Option<usize>,
}

impl PlayerRow {
    /// Stable identity key for cross-table matching: MLBAM id when known,
    /// then Fangraphs id, then the display name.
    pub fn identity(&self) -> String {
        if let Some(id) = self.mlbam_id {
            return format!("mlbam:{id}");
        }
        if let Some(id) = &self.fangraphs_id {
            return format!("fg:{id}");
        }
        format!("name:{}", self.name)
    }

    /// The row's eligible position codes, split out of the slash string.
    pub fn positions(&self) -> Vec<&str> {
        self.position
            .as_deref()
            .map(|p| {
                p.split('/')
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Exact membership test against the eligibility set. `"OF"` does not
    /// match a row listed only at `"RF"`, and `"B"` matches nothing.
    pub fn has_position(&self, code: &str) -> bool {
        self.positions().iter().any(|p| *p == code)
    }

    /// A stat value for scoring purposes: missing reads as 0.0.
    pub fn stat(&self, name: &str) -> f64 {
        self.stats.get(name).copied().unwrap_or(0.0)
    }

    /// A stat value that distinguishes missing from zero.
    pub fn stat_opt(&self, name: &str) -> Option<f64> {
        self.stats.get(name).copied()
    }
}

/// All loaded rows for one stat kind, with the ordered union of the numeric
/// columns observed across the contributing files.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionTable {
    pub kind: StatKind,
    pub rows: Vec<PlayerRow>,
    /// Stat column names in first-seen order; drives output column order.
    pub stat_columns: Vec<String>,
    /// Whether any contributing file carried position data. Downstream
    /// stages branch on this flag rather than sniffing rows.
    pub has_position_data: bool,
}

impl ProjectionTable {
    pub fn new(kind: StatKind) -> Self {
        ProjectionTable {
            kind,
            rows: Vec::new(),
            stat_columns: Vec::new(),
            has_position_data: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fold another table of the same kind into this one. Stat columns are
    /// unioned preserving first-seen order; position capability is sticky.
    pub fn append(&mut self, other: ProjectionTable) {
        for column in other.stat_columns {
            if !self.stat_columns.contains(&column) {
                self.stat_columns.push(column);
            }
        }
        self.has_position_data |= other.has_position_data;
        self.rows.extend(other.rows);
    }

    /// Distinct source tags in first-appearance order.
    pub fn sources(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.source) {
                seen.push(row.source.clone());
            }
        }
        seen
    }

    /// Register a stat column if it is not already present.
    pub fn add_stat_column(&mut self, name: &str) {
        if !self.stat_columns.iter().any(|c| c == name) {
            self.stat_columns.push(name.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
