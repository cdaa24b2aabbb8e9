// "Walked past gold": top finishers a manager passed on with several of their
// own picks before someone else took them.

use serde::Serialize;

use crate::draft::PickGrade;
use crate::season::{PlayerId, Position, TeamId};

/// A top finisher a team could have drafted but did not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassedPlayer {
    pub player_id: PlayerId,
    pub player_name: String,
    pub position: Option<Position>,
    pub total_points: f64,
    pub drafted_overall: u32,
    pub drafted_by: TeamId,
    /// The team's own picks made before this player went.
    pub times_passed: usize,
    /// `times_passed * total_points`
    pub score: f64,
}

/// The top `fraction` of drafted players by season points (at least one).
pub fn gold_pool(picks: &[PickGrade], fraction: f64) -> Vec<&PickGrade> {
    let mut ranked: Vec<&PickGrade> = picks.iter().collect();
    ranked.sort_by(|a, b| {
        b.season_points
            .partial_cmp(&a.season_points)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.overall_pick.cmp(&b.overall_pick))
    });
    let keep = ((ranked.len() as f64 * fraction).ceil() as usize)
        .max(1)
        .min(ranked.len());
    ranked.truncate(keep);
    ranked
}

/// Gold players `team_id` passed on at least `min_times_passed` times,
/// ranked by `times_passed * total_points`.
pub fn walked_past_gold(
    team_id: &str,
    team_picks: &[PickGrade],
    gold: &[&PickGrade],
    min_times_passed: usize,
    limit: usize,
) -> Vec<PassedPlayer> {
    let mut passed: Vec<PassedPlayer> = gold
        .iter()
        .filter(|g| g.team_id != team_id)
        .filter_map(|g| {
            let times_passed = team_picks
                .iter()
                .filter(|own| own.overall_pick < g.overall_pick)
                .count();
            (times_passed >= min_times_passed).then(|| PassedPlayer {
                player_id: g.player_id.clone(),
                player_name: g.player_name.clone(),
                position: g.position,
                total_points: g.season_points,
                drafted_overall: g.overall_pick,
                drafted_by: g.team_id.clone(),
                times_passed,
                score: times_passed as f64 * g.season_points,
            })
        })
        .collect();

    passed.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.drafted_overall.cmp(&b.drafted_overall))
    });
    passed.truncate(limit);
    passed
}
