// Optimal lineup calculation and season-long lineup efficiency.
//
// "Optimal" here is the top-N scorers on the roster, where N is the number of
// starter slots actually used that week. Slot eligibility is ignored: any
// player is assumed able to fill any slot. This overstates the optimum for
// rosters whose best bench players share a position with no open slot, and
// is kept as a known approximation of a full players-by-slots assignment.

use serde::Serialize;

use crate::config::LineupConfig;
use crate::guard::safe_div;
use crate::season::{PlayerEntry, RosterSlot, RosterWeek, SeasonIndex, Week};

// ---------------------------------------------------------------------------
// Single roster-week
// ---------------------------------------------------------------------------

/// Optimal vs. actual points for one roster-week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineupResult {
    pub optimal_points: f64,
    pub actual_points: f64,
    pub points_left_on_bench: f64,
    /// `actual / optimal * 100`, 0 when the optimum is 0.
    pub efficiency_pct: f64,
}

/// Whether a bench player could have been started this week.
///
/// Starters are never filtered: they were fielded, so they are always
/// candidates, which keeps the optimum at or above the actual score.
pub(crate) fn bench_is_available(entry: &PlayerEntry, config: &LineupConfig) -> bool {
    if !config.exclude_injured {
        return true;
    }
    entry.roster_slot() != RosterSlot::Reserve && !entry.is_ruled_out(&config.out_statuses)
}

/// Compute the optimal lineup for a roster-week.
///
/// Algorithm:
/// 1. Candidates = all starters plus every available bench player.
/// 2. N = number of starters this week.
/// 3. Optimal = sum of the N highest candidate scores.
pub fn optimal_lineup(roster: &RosterWeek, config: &LineupConfig) -> LineupResult {
    let slots = roster.starters.len();

    let mut candidates: Vec<f64> = roster
        .starters
        .iter()
        .map(|p| p.points)
        .chain(
            roster
                .bench
                .iter()
                .filter(|p| bench_is_available(p, config))
                .map(|p| p.points),
        )
        .collect();
    candidates.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let optimal_points: f64 = candidates.iter().take(slots).sum();
    let actual_points = roster.actual_points();

    LineupResult {
        optimal_points,
        actual_points,
        points_left_on_bench: optimal_points - actual_points,
        efficiency_pct: safe_div(actual_points, optimal_points, 0.0) * 100.0,
    }
}

// ---------------------------------------------------------------------------
// Season aggregate
// ---------------------------------------------------------------------------

/// The single week where a team left the most points on the bench.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorstWeek {
    pub week: Week,
    pub points_left_on_bench: f64,
}

/// A team's lineup decisions over every week of data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupSeason {
    pub weeks: u32,
    pub actual_points: f64,
    pub optimal_points: f64,
    pub points_left_on_bench: f64,
    /// Season `actual / optimal * 100`.
    pub efficiency_pct: f64,
    /// Weeks with nothing left on the bench.
    pub perfect_weeks: u32,
    pub worst_week: Option<WorstWeek>,
}

/// Aggregate lineup efficiency over a team's regular season. `None` when the
/// team has no regular-season roster-weeks.
pub fn season_lineup(
    index: &SeasonIndex,
    team_id: &str,
    config: &LineupConfig,
) -> Option<LineupSeason> {
    let mut weeks = 0u32;
    let mut actual_points = 0.0;
    let mut optimal_points = 0.0;
    let mut perfect_weeks = 0u32;
    let mut worst_week: Option<WorstWeek> = None;

    for (week, roster) in index.team_regular_weeks(team_id) {
        let result = optimal_lineup(roster, config);
        weeks += 1;
        actual_points += result.actual_points;
        optimal_points += result.optimal_points;
        if result.points_left_on_bench <= f64::EPSILON {
            perfect_weeks += 1;
        }
        let is_worse = worst_week
            .map_or(true, |w| result.points_left_on_bench > w.points_left_on_bench);
        if is_worse {
            worst_week = Some(WorstWeek {
                week,
                points_left_on_bench: result.points_left_on_bench,
            });
        }
    }

    if weeks == 0 {
        return None;
    }

    Some(LineupSeason {
        weeks,
        actual_points,
        optimal_points,
        points_left_on_bench: optimal_points - actual_points,
        efficiency_pct: safe_div(actual_points, optimal_points, 0.0) * 100.0,
        perfect_weeks,
        worst_week,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
