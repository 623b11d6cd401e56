// Auction values: the league's spendable budget spread over points above
// replacement, pooled across both sides of the box score.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::config::{RosterConfig, SalaryConfig};
use crate::projections::table::ProjectionTable;

/// Knobs for the dollar allocation. The defaults reproduce the plain
/// budget-proportional split.
#[derive(Debug, Clone)]
pub struct AuctionParams {
    /// Exponent applied to positive PAR before pooling; 1.0 is linear.
    pub power_factor: f64,
    /// Dollars to spread over positive PAR. `None` derives it from the
    /// roster and salary settings.
    pub total_auction_value: Option<f64>,
    /// Per-row inclusion masks for the PAR pool, parallel to each table's
    /// rows. `None` means every row is pooled. Excluded rows still receive
    /// values; they just stop inflating the denominator.
    pub bat_pool_mask: Option<Vec<bool>>,
    pub pit_pool_mask: Option<Vec<bool>>,
}

impl Default for AuctionParams {
    fn default() -> Self {
        AuctionParams {
            power_factor: 1.0,
            total_auction_value: None,
            bat_pool_mask: None,
            pit_pool_mask: None,
        }
    }
}

fn pooled_par(table: &ProjectionTable, source: &str, mask: Option<&[bool]>, power: f64) -> f64 {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(index, row)| {
            row.source == source
                && row.par.is_some_and(|par| par > 0.0)
                && mask.map_or(true, |m| m.get(*index).copied().unwrap_or(true))
        })
        .map(|(_, row)| row.par.unwrap_or(0.0).powf(power))
        .sum()
}

fn apply_values(table: &mut ProjectionTable, rates: &BTreeMap<String, f64>, power: f64, minimum: f64) {
    for row in &mut table.rows {
        let Some(par) = row.par else {
            continue;
        };
        let Some(rate) = rates.get(&row.source) else {
            continue;
        };
        let value = rate * par.max(0.0).powf(power) + minimum;
        row.auction_value = Some(value);
        row.contract_value = Some(value - row.salary.unwrap_or(0.0));
    }
}

/// Fill in `auction_value` and `contract_value` on both tables.
///
/// The budget defaults to `teams * cap * (1 - minors_pct)` minus a minimum
/// salary for every roster spot. Each source's positive PAR (raised to the
/// power factor) splits that budget pro rata; a player's value is their share
/// plus the minimum, with PAR clipped at zero. A source whose pool sums to
/// zero gets a non-finite rate, which is surfaced rather than hidden.
pub fn add_auction_values(
    bat: &mut ProjectionTable,
    pit: &mut ProjectionTable,
    roster: &RosterConfig,
    salary: &SalaryConfig,
    params: &AuctionParams,
) {
    let team_count = roster.team_count() as f64;
    let roster_spots: f64 = roster.positions.values().map(|c| f64::from(*c)).sum();
    let effective_cap = salary.cap * (1.0 - salary.minors_pct);
    let total_budget = team_count * effective_cap;

    let total_auction_value = params
        .total_auction_value
        .unwrap_or_else(|| total_budget - team_count * roster_spots * salary.minimum);

    let mut sources = bat.sources();
    for source in pit.sources() {
        if !sources.contains(&source) {
            sources.push(source);
        }
    }

    let mut rates: BTreeMap<String, f64> = BTreeMap::new();
    for source in sources {
        let total_par = pooled_par(bat, &source, params.bat_pool_mask.as_deref(), params.power_factor)
            + pooled_par(pit, &source, params.pit_pool_mask.as_deref(), params.power_factor);
        let rate = total_auction_value / total_par;
        if !rate.is_finite() {
            warn!(
                source = %source,
                total_par,
                "source has no positive pooled PAR; auction values will not be finite"
            );
        }
        rates.insert(source, rate);
    }

    apply_values(bat, &rates, params.power_factor, salary.minimum);
    apply_values(pit, &rates, params.power_factor, salary.minimum);
    debug!(total_auction_value, "attributed auction values");
}

/// Dollars left to spend across the league: the full cap pool minus signed
/// salaries, minus a minimum salary for every unfilled spot. Signed means a
/// status is present and not `"FA"`. A player appearing in both tables is
/// counted once.
pub fn calculate_available_budget(
    bat: &ProjectionTable,
    pit: &ProjectionTable,
    roster: &RosterConfig,
    salary: &SalaryConfig,
) -> f64 {
    let team_count = roster.team_count() as f64;
    let roster_spots: f64 = roster.positions.values().map(|c| f64::from(*c)).sum::<f64>()
        + f64::from(roster.minors);
    let total_budget = team_count * salary.cap;
    let total_roster_spots = team_count * roster_spots;

    let mut seen: HashSet<String> = HashSet::new();
    let mut signed_salary = 0.0;
    let mut signed_count = 0usize;
    for row in bat.rows.iter().chain(pit.rows.iter()) {
        let signed = row.status.as_deref().is_some_and(|status| status != "FA");
        if !signed {
            continue;
        }
        if !seen.insert(row.identity()) {
            continue;
        }
        signed_salary += row.salary.unwrap_or(0.0);
        signed_count += 1;
    }

    let remaining_spots = total_roster_spots - signed_count as f64;
    total_budget - signed_salary - remaining_spots * salary.minimum
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
