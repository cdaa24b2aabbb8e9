// Agent of Chaos: the single starter performance that swung a game the most.
//
// A performance qualifies when the player's deviation from their own season
// PPG was at least the final margin: a boom (above average) in a win, or a
// bust (below average) in a loss. Close games weigh heavier.

use serde::Serialize;

use crate::attribution::{Matchup, Outcome};
use crate::config::AttributionConfig;
use crate::season::{PlayerId, SeasonIndex, Week};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaosKind {
    Boom,
    Bust,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChaosPerformance {
    pub player_id: PlayerId,
    pub player_name: String,
    pub week: Week,
    pub kind: ChaosKind,
    pub points: f64,
    pub season_ppg: f64,
    /// `points - season_ppg`
    pub deviation: f64,
    /// Final margin of the game, always positive.
    pub margin: f64,
    pub weighted_score: f64,
}

/// Find the team's Agent of Chaos over its matchups. `None` when no starter
/// ever deviated by more than a game's margin in the matching direction.
pub fn agent_of_chaos(
    index: &SeasonIndex,
    team_id: &str,
    matchups: &[Matchup],
    config: &AttributionConfig,
) -> Option<ChaosPerformance> {
    let mut best: Option<ChaosPerformance> = None;

    for matchup in matchups {
        let kind = match matchup.outcome {
            Outcome::Win => ChaosKind::Boom,
            Outcome::Loss => ChaosKind::Bust,
            Outcome::Tie => continue,
        };
        let Some(roster) = index.roster_week(team_id, matchup.week) else {
            continue;
        };
        let margin = (matchup.points_for - matchup.points_against).abs();
        let weight = if margin < config.close_game_margin {
            config.close_game_weight
        } else {
            1.0
        };

        for starter in &roster.starters {
            let season_ppg = index.season_points(&starter.player_id).ppg;
            let deviation = starter.points - season_ppg;
            let swung = match kind {
                ChaosKind::Boom => deviation > 0.0,
                ChaosKind::Bust => deviation < 0.0,
            };
            if !swung || deviation.abs() < margin {
                continue;
            }

            let weighted_score = deviation.abs() * weight;
            if best.as_ref().map_or(true, |b| weighted_score > b.weighted_score) {
                best = Some(ChaosPerformance {
                    player_id: starter.player_id.clone(),
                    player_name: index.display_name(&starter.player_id).to_string(),
                    week: matchup.week,
                    kind,
                    points: starter.points,
                    season_ppg,
                    deviation,
                    margin,
                    weighted_score,
                });
            }
        }
    }

    best
}
