// Dead-start analysis: starters who scored nothing while a bench player could
// have filled in. Most dead starts are bye weeks or late scratches the manager
// did not react to.

use serde::Serialize;

use crate::config::LineupConfig;
use crate::lineup::bench_is_available;
use crate::season::{RosterWeek, SeasonIndex};

/// A team's dead starts across the season. Lower is better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeadStartSummary {
    /// Zero-point starters that an unused scoring bench player could have replaced.
    pub dead_starts: u32,
    /// Points those replacements would have added.
    pub points_lost: f64,
    pub weeks_affected: u32,
}

/// Dead starts and points lost for one roster-week.
///
/// Zero-point starters are paired with available bench players who scored,
/// best bench score first; each bench player covers at most one starter.
pub fn dead_starts_for_week(roster: &RosterWeek, config: &LineupConfig) -> (u32, f64) {
    let zero_starters = roster.starters.iter().filter(|p| p.points == 0.0).count();
    if zero_starters == 0 {
        return (0, 0.0);
    }

    let mut bench_scores: Vec<f64> = roster
        .bench
        .iter()
        .filter(|p| p.points > 0.0 && bench_is_available(p, config))
        .map(|p| p.points)
        .collect();
    bench_scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let replaced = zero_starters.min(bench_scores.len());
    let points_lost = bench_scores.iter().take(replaced).sum();
    (replaced as u32, points_lost)
}

/// Regular-season dead-start summary for a team. `None` when the team has no
/// regular-season roster-weeks.
pub fn season_dead_starts(
    index: &SeasonIndex,
    team_id: &str,
    config: &LineupConfig,
) -> Option<DeadStartSummary> {
    let mut summary = DeadStartSummary::default();
    let mut any_weeks = false;

    for (_, roster) in index.team_regular_weeks(team_id) {
        any_weeks = true;
        let (dead, lost) = dead_starts_for_week(roster, config);
        if dead > 0 {
            summary.dead_starts += dead;
            summary.points_lost += lost;
            summary.weeks_affected += 1;
        }
    }

    any_weeks.then_some(summary)
}
