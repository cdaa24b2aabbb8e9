// Win attribution: splits a manager's record into skill and luck.
//
// Skill components (win-equivalents):
// - draft: league draft rank vs. the median rank
// - lineup: wins the optimal lineup would have added or lost
// - waiver: started waiver points vs. the league average
//
// Luck components:
// - schedule: actual wins minus all-play expected wins
// - opponent mistakes: wins where the opponent benched enough to lose
//
// The "true skill record" removes schedule luck only.

pub mod chaos;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::availability::Availability;
use crate::config::{AttributionConfig, LineupConfig};
use crate::guard::safe_div;
use crate::lineup::optimal_lineup;
use crate::ranking::Standing;
use crate::season::{SeasonIndex, TeamId, Week};

pub use self::chaos::{agent_of_chaos, ChaosKind, ChaosPerformance};

// ---------------------------------------------------------------------------
// Weekly score table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct WeekScore {
    actual: f64,
    optimal: f64,
    opponent: Option<TeamId>,
}

/// Actual and optimal scores for every team in every regular-season week,
/// computed once per run.
#[derive(Debug, Clone, Default)]
pub struct LeagueWeeks {
    weeks: BTreeMap<Week, BTreeMap<TeamId, WeekScore>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

/// One head-to-head game from a team's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub week: Week,
    pub opponent_id: TeamId,
    pub points_for: f64,
    pub points_against: f64,
    pub outcome: Outcome,
    pub optimal_points: f64,
    pub opponent_optimal_points: f64,
    /// Teams this team outscored that week, across the whole league.
    pub teams_beaten: usize,
    /// Other teams that scored that week.
    pub teams_compared: usize,
}

impl Matchup {
    /// Whether this team's optimal lineup beats the opponent's actual score.
    pub fn optimal_win(&self) -> bool {
        self.optimal_points > self.points_against
    }

    /// A win the opponent would have turned into a loss by starting their
    /// optimal lineup.
    pub fn opponent_mistake(&self) -> bool {
        self.outcome == Outcome::Win && self.opponent_optimal_points > self.points_for
    }

    /// Share of the league this team beat: its all-play win fraction.
    pub fn all_play_fraction(&self) -> f64 {
        safe_div(self.teams_beaten as f64, self.teams_compared as f64, 0.0)
    }
}

impl LeagueWeeks {
    pub fn build(index: &SeasonIndex, config: &LineupConfig) -> Self {
        let mut weeks: BTreeMap<Week, BTreeMap<TeamId, WeekScore>> = BTreeMap::new();
        for week in index.regular_season_weeks() {
            let mut scores = BTreeMap::new();
            for team in index.teams() {
                let Some(roster) = index.roster_week(&team.team_id, week) else {
                    continue;
                };
                let lineup = optimal_lineup(roster, config);
                scores.insert(
                    team.team_id.clone(),
                    WeekScore {
                        actual: lineup.actual_points,
                        optimal: lineup.optimal_points,
                        opponent: roster.opponent_id.clone(),
                    },
                );
            }
            if !scores.is_empty() {
                weeks.insert(week, scores);
            }
        }
        LeagueWeeks { weeks }
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    /// A team's regular-season games with a recorded opponent, in week order.
    pub fn team_matchups(&self, team_id: &str) -> Vec<Matchup> {
        let mut matchups = Vec::new();
        for (&week, scores) in &self.weeks {
            let Some(mine) = scores.get(team_id) else {
                continue;
            };
            let Some(opponent_id) = mine.opponent.as_deref() else {
                continue;
            };
            let Some(theirs) = scores.get(opponent_id) else {
                debug!(
                    "week {}: opponent '{}' of '{}' has no roster, skipping",
                    week, opponent_id, team_id
                );
                continue;
            };

            let outcome = if mine.actual > theirs.actual {
                Outcome::Win
            } else if mine.actual < theirs.actual {
                Outcome::Loss
            } else {
                Outcome::Tie
            };
            let teams_beaten = scores
                .iter()
                .filter(|(other, s)| other.as_str() != team_id && s.actual < mine.actual)
                .count();

            matchups.push(Matchup {
                week,
                opponent_id: opponent_id.to_string(),
                points_for: mine.actual,
                points_against: theirs.actual,
                outcome,
                optimal_points: mine.optimal,
                opponent_optimal_points: theirs.optimal,
                teams_beaten,
                teams_compared: scores.len() - 1,
            });
        }
        matchups
    }
}

// ---------------------------------------------------------------------------
// Attribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinAttribution {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// `wins + losses`
    pub games: u32,
    pub weeks_analyzed: u32,

    pub draft_skill: Availability<f64>,
    /// Negative when the bench would have won more games.
    pub lineup_skill: f64,
    pub waiver_skill: Availability<f64>,
    /// Sum of the available skill components.
    pub total_skill: f64,

    pub optimal_lineup_wins: u32,
    pub matchup_wins: u32,
    pub expected_wins: f64,
    pub schedule_luck: f64,
    /// Reported for context; not removed from the true skill record.
    pub opponent_mistakes: u32,

    pub true_skill_wins: u32,
    pub true_skill_losses: u32,
    pub agent_of_chaos: Option<ChaosPerformance>,
}

/// League context the attribution is measured against. Standings come from
/// the ranking phase so every team is judged against the same averages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributionInputs<'a> {
    pub draft: Option<&'a Standing>,
    pub waiver: Option<&'a Standing>,
}

/// Attribute a team's record. `None` when the team has no regular-season
/// game with a recorded opponent.
pub fn attribute_wins(
    index: &SeasonIndex,
    team_id: &str,
    weeks: &LeagueWeeks,
    inputs: AttributionInputs<'_>,
    config: &AttributionConfig,
) -> Option<WinAttribution> {
    let matchups = weeks.team_matchups(team_id);
    if matchups.is_empty() {
        return None;
    }

    let matchup_wins = count(&matchups, |m| m.outcome == Outcome::Win);
    let matchup_losses = count(&matchups, |m| m.outcome == Outcome::Loss);
    let matchup_ties = count(&matchups, |m| m.outcome == Outcome::Tie);
    let optimal_lineup_wins = count(&matchups, Matchup::optimal_win);
    let opponent_mistakes = count(&matchups, Matchup::opponent_mistake);

    // The standings record is trusted only when it covers exactly the games
    // scored here; otherwise luck would be measured over a different season.
    let scored = (matchup_wins, matchup_losses, matchup_ties);
    let (wins, losses, ties) = match index.team(team_id) {
        Some(t) if t.wins + t.losses + t.ties == 0 => scored,
        Some(t) if (t.wins + t.losses + t.ties) as usize == matchups.len() => {
            (t.wins, t.losses, t.ties)
        }
        Some(t) => {
            warn!(
                "team '{}': record {}-{}-{} does not match {} scored matchups, using matchup results",
                team_id,
                t.wins,
                t.losses,
                t.ties,
                matchups.len()
            );
            scored
        }
        None => scored,
    };
    let games = wins + losses;

    let expected_wins: f64 = matchups.iter().map(Matchup::all_play_fraction).sum();
    let schedule_luck = wins as f64 - expected_wins;
    let true_skill_wins = (wins as f64 - schedule_luck)
        .round()
        .clamp(0.0, games as f64) as u32;

    let lineup_skill = -(optimal_lineup_wins as f64 - matchup_wins as f64);

    let draft_skill = match inputs.draft {
        Some(s) => {
            let median_rank = (s.num_teams as f64 + 1.0) / 2.0;
            Availability::Available((median_rank - s.rank as f64) * config.draft_rank_weight)
        }
        None => Availability::unavailable("no draft data"),
    };
    let waiver_skill = match inputs.waiver {
        Some(s) => Availability::Available(
            safe_div(s.gap_to_average, config.waiver_points_divisor, 0.0) * config.waiver_weight,
        ),
        None => Availability::unavailable("no transaction data"),
    };
    let total_skill = lineup_skill
        + draft_skill.value().copied().unwrap_or(0.0)
        + waiver_skill.value().copied().unwrap_or(0.0);

    Some(WinAttribution {
        wins,
        losses,
        ties,
        games,
        weeks_analyzed: matchups.len() as u32,
        draft_skill,
        lineup_skill,
        waiver_skill,
        total_skill,
        optimal_lineup_wins,
        matchup_wins,
        expected_wins,
        schedule_luck,
        opponent_mistakes,
        true_skill_wins,
        true_skill_losses: games - true_skill_wins,
        agent_of_chaos: agent_of_chaos(index, team_id, &matchups, config),
    })
}

fn count(matchups: &[Matchup], pred: impl Fn(&Matchup) -> bool) -> u32 {
    matchups.iter().filter(|m| pred(m)).count() as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ranking::{rank_team, Direction};
    use crate::season::{LeagueInfo, PlayerEntry, RosterWeek, Season, Team};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn entry(id: &str, points: f64) -> PlayerEntry {
        PlayerEntry {
            player_id: id.into(),
            name: id.into(),
            eligible_positions: vec!["RB".into()],
            slot: "RB".into(),
            points,
            injury_status: None,
        }
    }

    fn team(id: &str, wins: u32, losses: u32) -> Team {
        Team {
            team_id: id.into(),
            manager_name: id.into(),
            team_name: String::new(),
            wins,
            losses,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            auction_budget: 0,
        }
    }

    fn week(opponent: &str, starters: &[(&str, f64)], bench: &[(&str, f64)]) -> RosterWeek {
        RosterWeek {
            opponent_id: Some(opponent.into()),
            starters: starters.iter().map(|(id, p)| entry(id, *p)).collect(),
            bench: bench.iter().map(|(id, p)| entry(id, *p)).collect(),
        }
    }

    /// Two teams, three weeks, playing each other every week.
    ///
    /// | week | t1 (opt) | t2 (opt) |
    /// |------|----------|----------|
    /// | 1    | 50 (50)  | 40 (45)  |
    /// | 2    | 25 (45)  | 20 (20)  |
    /// | 3    | 30 (45)  | 32 (32)  |
    pub(crate) fn two_team_index() -> SeasonIndex {
        let mut t1 = BTreeMap::new();
        t1.insert(1, week("t2", &[("star", 40.0), ("flex", 10.0)], &[("sub", 0.0)]));
        t1.insert(2, week("t2", &[("star", 15.0), ("flex", 10.0)], &[("sub", 30.0)]));
        t1.insert(3, week("t2", &[("star", 20.0), ("flex", 10.0)], &[("sub", 25.0)]));

        let mut t2 = BTreeMap::new();
        t2.insert(1, week("t1", &[("rival", 25.0), ("rival2", 15.0)], &[("t2sub", 20.0)]));
        t2.insert(2, week("t1", &[("rival", 15.0), ("rival2", 5.0)], &[("t2sub", 0.0)]));
        t2.insert(3, week("t1", &[("rival", 27.0), ("rival2", 5.0)], &[("t2sub", 0.0)]));

        let mut weekly_data = BTreeMap::new();
        weekly_data.insert("t1".to_string(), t1);
        weekly_data.insert("t2".to_string(), t2);

        SeasonIndex::new(Season {
            league: LeagueInfo::default(),
            teams: vec![team("t1", 2, 1), team("t2", 1, 2)],
            weekly_data,
            draft: vec![],
            transactions: vec![],
        })
        .expect("valid season")
    }

    /// Four teams, one week per `scores` row; the first two and last two
    /// teams play each other.
    fn four_team_index(scores: &[[f64; 4]]) -> SeasonIndex {
        four_team_index_with_records(scores, [(0, 0); 4])
    }

    fn four_team_index_with_records(
        scores: &[[f64; 4]],
        records: [(u32, u32); 4],
    ) -> SeasonIndex {
        let ids = ["a", "b", "c", "d"];
        let opponents = ["b", "a", "d", "c"];
        let mut weekly_data: BTreeMap<TeamId, BTreeMap<Week, RosterWeek>> = BTreeMap::new();
        for (w, row) in scores.iter().enumerate() {
            for (i, &points) in row.iter().enumerate() {
                let player = format!("{}{}", ids[i], w);
                weekly_data.entry(ids[i].to_string()).or_default().insert(
                    w as Week + 1,
                    week(opponents[i], &[(player.as_str(), points)], &[]),
                );
            }
        }
        SeasonIndex::new(Season {
            league: LeagueInfo::default(),
            teams: ids
                .iter()
                .zip(records)
                .map(|(id, (w, l))| team(id, w, l))
                .collect(),
            weekly_data,
            draft: vec![],
            transactions: vec![],
        })
        .expect("valid season")
    }

    #[test]
    fn matchups_pair_actual_and_optimal_scores() {
        let index = two_team_index();
        let weeks = LeagueWeeks::build(&index, &LineupConfig::default());
        let matchups = weeks.team_matchups("t1");
        assert_eq!(matchups.len(), 3);

        let w3 = &matchups[2];
        assert_eq!(w3.outcome, Outcome::Loss);
        assert_eq!(w3.points_for, 30.0);
        assert_eq!(w3.points_against, 32.0);
        assert_eq!(w3.optimal_points, 45.0);
        assert!(w3.optimal_win());
        assert_eq!(w3.teams_compared, 1);
    }

    #[test]
    fn lineup_skill_counts_wins_left_on_the_bench() {
        let index = two_team_index();
        let weeks = LeagueWeeks::build(&index, &LineupConfig::default());
        let attr = attribute_wins(
            &index,
            "t1",
            &weeks,
            AttributionInputs::default(),
            &AttributionConfig::default(),
        )
        .expect("t1 has matchups");

        assert_eq!(attr.matchup_wins, 2);
        assert_eq!(attr.optimal_lineup_wins, 3);
        assert_eq!(attr.lineup_skill, -1.0);
        assert!(!attr.draft_skill.is_available());
        assert!(!attr.waiver_skill.is_available());
        assert_eq!(attr.total_skill, -1.0);
    }

    #[test]
    fn opponent_mistakes_are_reported() {
        let index = two_team_index();
        let weeks = LeagueWeeks::build(&index, &LineupConfig::default());
        let attr = attribute_wins(
            &index,
            "t2",
            &weeks,
            AttributionInputs::default(),
            &AttributionConfig::default(),
        )
        .expect("t2 has matchups");
        // t2 won week 3 by 2; t1's optimal 45 would have won it.
        assert_eq!(attr.opponent_mistakes, 1);
        // Not subtracted from the true skill record.
        assert_eq!(attr.true_skill_wins, 1);
    }

    #[test]
    fn schedule_luck_uses_all_play_record() {
        // Week 1: b scores second-most but loses to a.
        // Week 2: d scores least but beats c.
        let index = four_team_index(&[[100.0, 90.0, 50.0, 40.0], [60.0, 70.0, 30.0, 35.0]]);
        let weeks = LeagueWeeks::build(&index, &LineupConfig::default());
        let config = AttributionConfig::default();

        let b = attribute_wins(&index, "b", &weeks, AttributionInputs::default(), &config)
            .expect("b has matchups");
        // All-play: 2/3 in week 1, 3/3 in week 2.
        assert!(approx_eq(b.expected_wins, 5.0 / 3.0, 1e-9));
        assert_eq!(b.wins, 1);
        assert!(approx_eq(b.schedule_luck, 1.0 - 5.0 / 3.0, 1e-9));
        assert_eq!(b.true_skill_wins, 2);
        assert_eq!(b.true_skill_losses, 0);

        let d = attribute_wins(&index, "d", &weeks, AttributionInputs::default(), &config)
            .expect("d has matchups");
        // All-play: 0/3 then 1/3, but went 1-1.
        assert!(approx_eq(d.schedule_luck, 1.0 - 1.0 / 3.0, 1e-9));
        assert_eq!(d.true_skill_wins, 0);
        assert_eq!(d.true_skill_losses, 2);
    }

    #[test]
    fn record_covering_unscored_weeks_falls_back_to_matchups() {
        // b's standings say 6-2, but only two weeks were scored.
        let scores = [[100.0, 90.0, 50.0, 40.0], [60.0, 70.0, 30.0, 35.0]];
        let index = four_team_index_with_records(&scores, [(1, 1), (6, 2), (2, 0), (1, 1)]);
        let weeks = LeagueWeeks::build(&index, &LineupConfig::default());
        let config = AttributionConfig::default();

        let b = attribute_wins(&index, "b", &weeks, AttributionInputs::default(), &config)
            .expect("b has matchups");
        assert_eq!((b.wins, b.losses, b.games), (1, 1, 2));
        assert!(approx_eq(b.schedule_luck, 1.0 - 5.0 / 3.0, 1e-9));
        assert_eq!(b.true_skill_wins + b.true_skill_losses, 2);

        // A record with as many games as were scored is used as given, even
        // though c went 1-1 in the scored weeks.
        let c = attribute_wins(&index, "c", &weeks, AttributionInputs::default(), &config)
            .expect("c has matchups");
        assert_eq!((c.wins, c.losses), (2, 0));
    }

    #[test]
    fn games_are_conserved_for_every_team() {
        let index = four_team_index(&[
            [100.0, 90.0, 50.0, 40.0],
            [60.0, 70.0, 30.0, 35.0],
            [80.0, 80.0, 10.0, 95.0],
            [20.0, 75.0, 66.0, 12.0],
        ]);
        let weeks = LeagueWeeks::build(&index, &LineupConfig::default());
        for team in ["a", "b", "c", "d"] {
            let attr = attribute_wins(
                &index,
                team,
                &weeks,
                AttributionInputs::default(),
                &AttributionConfig::default(),
            )
            .expect("every team has matchups");
            assert_eq!(attr.true_skill_wins + attr.true_skill_losses, attr.games);
            assert_eq!(attr.games, attr.wins + attr.losses);
            assert!(attr.true_skill_wins <= attr.games);
        }
    }

    #[test]
    fn draft_and_waiver_skill_come_from_standings() {
        let index = two_team_index();
        let weeks = LeagueWeeks::build(&index, &LineupConfig::default());

        let mut draft_scores = BTreeMap::new();
        draft_scores.insert("t1".to_string(), 12.0);
        draft_scores.insert("t2".to_string(), -4.0);
        let draft = rank_team(&draft_scores, "t1", Direction::HigherBetter).unwrap();

        let mut waiver_points = BTreeMap::new();
        waiver_points.insert("t1".to_string(), 300.0);
        waiver_points.insert("t2".to_string(), 100.0);
        let waiver = rank_team(&waiver_points, "t1", Direction::HigherBetter).unwrap();

        let attr = attribute_wins(
            &index,
            "t1",
            &weeks,
            AttributionInputs {
                draft: Some(&draft),
                waiver: Some(&waiver),
            },
            &AttributionConfig::default(),
        )
        .unwrap();

        // Median rank 1.5, rank 1: 0.5 * 0.15.
        assert!(approx_eq(*attr.draft_skill.value().unwrap(), 0.075, 1e-9));
        // (300 - 200) / 100 * 0.5.
        assert!(approx_eq(*attr.waiver_skill.value().unwrap(), 0.5, 1e-9));
        assert!(approx_eq(attr.total_skill, -1.0 + 0.075 + 0.5, 1e-9));
    }

    #[test]
    fn team_without_opponents_has_no_attribution() {
        let mut index_season = BTreeMap::new();
        let mut weeks = BTreeMap::new();
        weeks.insert(
            1,
            RosterWeek {
                opponent_id: None,
                starters: vec![entry("x", 10.0)],
                bench: vec![],
            },
        );
        index_season.insert("solo".to_string(), weeks);
        let index = SeasonIndex::new(Season {
            league: LeagueInfo::default(),
            teams: vec![team("solo", 0, 0)],
            weekly_data: index_season,
            draft: vec![],
            transactions: vec![],
        })
        .unwrap();
        let league_weeks = LeagueWeeks::build(&index, &LineupConfig::default());
        assert!(attribute_wins(
            &index,
            "solo",
            &league_weeks,
            AttributionInputs::default(),
            &AttributionConfig::default()
        )
        .is_none());
    }
}
