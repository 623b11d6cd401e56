// Score-vector construction: league scoring rules projected onto the stat
// columns a table actually has, with proxy decompositions for stats the
// projection sources do not publish.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ScoringConfig;
use crate::model::StatKind;

// Proxy decompositions, as (scored stat, [(base stat, multiplier)]).
// Multipliers for the rate-style proxies are league-average rates from the
// 2019 season.
pub static BAT_STAT_PROXIES: &[(&str, &[(&str, f64)])] = &[
    ("TB", &[("H", 1.0), ("2B", 1.0), ("3B", 2.0), ("HR", 3.0)]),
    ("1B", &[("H", 1.0), ("2B", -1.0), ("3B", -1.0), ("HR", -1.0)]),
    ("GDP", &[("AB", 0.02)]),
];

pub static PIT_STAT_PROXIES: &[(&str, &[(&str, f64)])] = &[
    ("HB", &[("IP", 0.05)]),
    ("QS", &[("GS", 0.37)]),
    ("CG", &[("GS", 0.01)]),
    ("SHO", &[("GS", 0.01)]),
    ("BS", &[("SV", 0.58)]),
];

fn proxies_for(kind: StatKind) -> &'static [(&'static str, &'static [(&'static str, f64)])] {
    match kind {
        StatKind::Batting => BAT_STAT_PROXIES,
        StatKind::Pitching => PIT_STAT_PROXIES,
    }
}

/// Per-column point coefficients for one side's scoring rules.
///
/// Every entry in `stat_columns` gets a coefficient, default 0.0. A rule
/// whose stat matches a column adds its point value directly; otherwise,
/// with proxies enabled, a registered decomposition contributes
/// `multiplier * points` to each base column that exists. Rules that resolve
/// to nothing are logged and ignored.
pub fn calculate_score_vector(
    kind: StatKind,
    stat_columns: &[String],
    scoring: &ScoringConfig,
    use_stat_proxies: bool,
) -> BTreeMap<String, f64> {
    let proxies = if use_stat_proxies {
        proxies_for(kind)
    } else {
        &[]
    };

    let mut coefficients: BTreeMap<String, f64> =
        stat_columns.iter().map(|c| (c.clone(), 0.0)).collect();

    for (stat, points) in scoring.side(kind).into_iter().flatten() {
        if let Some(coefficient) = coefficients.get_mut(stat) {
            *coefficient += points;
            continue;
        }
        match proxies.iter().find(|(proxy, _)| proxy == stat) {
            Some((_, decomposition)) => {
                for (base, multiplier) in decomposition.iter() {
                    match coefficients.get_mut(*base) {
                        Some(coefficient) => *coefficient += multiplier * points,
                        None => debug!(
                            stat,
                            base, "proxy base stat not in stat columns, contributes nothing"
                        ),
                    }
                }
            }
            None => debug!(stat, "stat not in stat columns or proxies, contributes nothing"),
        }
    }

    coefficients
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
