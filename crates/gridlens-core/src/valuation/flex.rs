// Flex slot usage: how often each position fills a flex slot.
//
// Replacement levels need to know how many starters each position supplies
// league-wide. Dedicated slots are read from the roster rules; flex slots are
// split between positions by sampling actual flex starts.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::ReplacementConfig;
use crate::guard::safe_div;
use crate::season::{Position, RosterSlot, SeasonIndex, Week};

/// Observed (or default) split of flex slots between positions.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexUsage {
    /// Flex slots each team starts per week.
    pub flex_slots_per_team: usize,
    /// Position -> share of flex starts, summing to ~1 when any flex exists.
    pub shares: BTreeMap<Position, f64>,
    /// Flex starts observed in the sampled weeks (0 means defaults were used).
    pub observations: usize,
    pub sampled_weeks: Vec<Week>,
}

impl FlexUsage {
    /// Estimated league-wide flex slots filled by `position`.
    pub fn estimated_slots(&self, position: Position, team_count: usize) -> f64 {
        let share = self.shares.get(&position).copied().unwrap_or(0.0);
        share * (team_count * self.flex_slots_per_team) as f64
    }
}

/// Pick up to `count` weeks spread evenly from first to last.
pub fn sample_weeks(weeks: &[Week], count: usize) -> Vec<Week> {
    if count == 0 || weeks.is_empty() {
        return Vec::new();
    }
    if weeks.len() <= count {
        return weeks.to_vec();
    }
    let last = weeks.len() - 1;
    let steps = (count - 1).max(1);
    (0..count).map(|i| weeks[i * last / steps]).collect()
}

/// Count flex slots per team in a roster configuration.
pub fn flex_slots_per_team(roster_positions: &BTreeMap<String, usize>) -> usize {
    roster_positions
        .iter()
        .filter(|(key, _)| matches!(RosterSlot::parse(key), RosterSlot::Flex(_)))
        .map(|(_, &count)| count)
        .sum()
}

/// Estimate the flex split from a sample of weeks.
///
/// Every starter sitting in a flex slot during a sampled week counts toward
/// its primary position, as long as that position may fill the slot. With flex slots configured but no flex starts
/// observed, the configured default shares apply.
pub fn estimate_flex_usage(
    index: &SeasonIndex,
    roster_positions: &BTreeMap<String, usize>,
    config: &ReplacementConfig,
) -> FlexUsage {
    let flex_slots = flex_slots_per_team(roster_positions);
    let sampled_weeks = sample_weeks(index.weeks(), config.flex_sample_weeks);

    let mut counts: BTreeMap<Position, usize> = BTreeMap::new();
    for &week in &sampled_weeks {
        for team in index.teams() {
            let Some(roster) = index.roster_week(&team.team_id, week) else {
                continue;
            };
            for entry in &roster.starters {
                let RosterSlot::Flex(kind) = entry.roster_slot() else {
                    continue;
                };
                match entry.primary_position() {
                    Some(pos) if kind.eligible().contains(&pos) => {
                        *counts.entry(pos).or_insert(0) += 1;
                    }
                    other => debug!(
                        "week {}: {} in a {:?} flex slot with position {:?}, not counted",
                        week, entry.player_id, kind, other
                    ),
                }
            }
        }
    }

    let observations: usize = counts.values().sum();
    let shares = if observations > 0 {
        counts
            .iter()
            .map(|(&pos, &n)| (pos, safe_div(n as f64, observations as f64, 0.0)))
            .collect()
    } else if flex_slots > 0 {
        warn!(
            "no flex starts observed in weeks {:?}; using default flex shares",
            sampled_weeks
        );
        config.default_shares()
    } else {
        BTreeMap::new()
    };

    debug!(
        "Flex usage: {} slots/team, {} observations, shares {:?}",
        flex_slots, observations, shares
    );

    FlexUsage {
        flex_slots_per_team: flex_slots,
        shares,
        observations,
        sampled_weeks,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::season::{LeagueInfo, PlayerEntry, RosterWeek, Season, Team};

    fn team(id: &str) -> Team {
        Team {
            team_id: id.into(),
            manager_name: id.into(),
            team_name: String::new(),
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            auction_budget: 0,
        }
    }

    /// Starters for one team-week from `(position, slot)` pairs.
    pub(crate) fn lineup(team: usize, slots: &[(&str, &str)]) -> Vec<PlayerEntry> {
        slots
            .iter()
            .enumerate()
            .map(|(i, (pos, slot))| PlayerEntry {
                player_id: format!("t{team}_{}_{i}", pos.to_lowercase()),
                name: String::new(),
                eligible_positions: vec![pos.to_string()],
                slot: slot.to_string(),
                points: 10.0,
                injury_status: None,
            })
            .collect()
    }

    /// Two teams (t0, t1) playing each other for `weeks` weeks. `starters`
    /// gives each team-week's lineup.
    pub(crate) fn flex_index(
        roster_positions: &[(&str, usize)],
        weeks: Week,
        starters: impl Fn(usize, Week) -> Vec<PlayerEntry>,
    ) -> SeasonIndex {
        let mut weekly_data = BTreeMap::new();
        for t in 0..2 {
            let mut team_weeks = BTreeMap::new();
            for week in 1..=weeks {
                team_weeks.insert(
                    week,
                    RosterWeek {
                        opponent_id: Some(format!("t{}", 1 - t)),
                        starters: starters(t, week),
                        bench: vec![],
                    },
                );
            }
            weekly_data.insert(format!("t{t}"), team_weeks);
        }

        SeasonIndex::new(Season {
            league: LeagueInfo {
                roster_positions: roster_positions
                    .iter()
                    .map(|(k, n)| (k.to_string(), *n))
                    .collect(),
                ..Default::default()
            },
            teams: vec![team("t0"), team("t1")],
            weekly_data,
            draft: vec![],
            transactions: vec![],
        })
        .expect("valid season")
    }

    const ONE_FLEX: &[(&str, usize)] = &[("QB", 1), ("RB", 1), ("WR", 1), ("FLEX", 1), ("BE", 2)];

    #[test]
    fn samples_span_first_to_last_week() {
        let weeks: Vec<Week> = (1..=14).collect();
        assert_eq!(sample_weeks(&weeks, 4), vec![1, 5, 9, 14]);
        assert_eq!(sample_weeks(&weeks, 1), vec![1]);
        assert_eq!(sample_weeks(&[3, 4], 4), vec![3, 4]);
        assert!(sample_weeks(&[], 4).is_empty());
    }

    #[test]
    fn counts_all_flex_kinds() {
        let mut roster = BTreeMap::new();
        roster.insert("QB".to_string(), 1);
        roster.insert("FLEX".to_string(), 2);
        roster.insert("SUPER_FLEX".to_string(), 1);
        roster.insert("BE".to_string(), 6);
        assert_eq!(flex_slots_per_team(&roster), 3);
    }

    #[test]
    fn estimated_slots_scale_with_league() {
        let mut shares = BTreeMap::new();
        shares.insert(Position::RunningBack, 0.5);
        shares.insert(Position::WideReceiver, 0.5);
        let usage = FlexUsage {
            flex_slots_per_team: 1,
            shares,
            observations: 10,
            sampled_weeks: vec![1],
        };
        assert_eq!(usage.estimated_slots(Position::RunningBack, 12), 6.0);
        assert_eq!(usage.estimated_slots(Position::TightEnd, 12), 0.0);
    }

    #[test]
    fn shares_come_from_sampled_weeks_only() {
        // 8 weeks sampled 4 at a time -> weeks 1, 3, 5, 8. t1 starts a TE in
        // the flex only in weeks that are never sampled.
        let index = flex_index(ONE_FLEX, 8, |team, week| {
            let flex = match (team, week) {
                (0, _) => "RB",
                (_, 1 | 3 | 5 | 8) => "WR",
                _ => "TE",
            };
            let mut slots = vec![("QB", "QB"), ("RB", "RB"), ("WR", "WR"), (flex, "FLEX")];
            if team == 1 && week == 1 {
                // A QB cannot fill a standard flex; it is not counted.
                slots.push(("QB", "FLEX"));
            }
            lineup(team, &slots)
        });
        let roster: BTreeMap<String, usize> =
            ONE_FLEX.iter().map(|(k, n)| (k.to_string(), *n)).collect();

        let usage = estimate_flex_usage(&index, &roster, &ReplacementConfig::default());
        assert_eq!(usage.sampled_weeks, vec![1, 3, 5, 8]);
        assert_eq!(usage.flex_slots_per_team, 1);
        assert_eq!(usage.observations, 8);
        assert_eq!(usage.shares.get(&Position::RunningBack), Some(&0.5));
        assert_eq!(usage.shares.get(&Position::WideReceiver), Some(&0.5));
        assert!(!usage.shares.contains_key(&Position::TightEnd));
        assert!(!usage.shares.contains_key(&Position::Quarterback));
    }

    #[test]
    fn no_flex_starts_fall_back_to_default_shares() {
        let index = flex_index(ONE_FLEX, 3, |team, _| {
            lineup(team, &[("QB", "QB"), ("RB", "RB"), ("WR", "WR")])
        });
        let roster: BTreeMap<String, usize> =
            ONE_FLEX.iter().map(|(k, n)| (k.to_string(), *n)).collect();
        let config = ReplacementConfig::default();

        let usage = estimate_flex_usage(&index, &roster, &config);
        assert_eq!(usage.observations, 0);
        assert_eq!(usage.shares, config.default_shares());
    }

    #[test]
    fn no_flex_slots_means_no_shares() {
        let index = flex_index(&[("QB", 1), ("RB", 2)], 2, |team, _| {
            lineup(team, &[("QB", "QB"), ("RB", "RB"), ("RB", "RB")])
        });
        let roster: BTreeMap<String, usize> =
            [("QB".to_string(), 1), ("RB".to_string(), 2)].into_iter().collect();
        let usage = estimate_flex_usage(&index, &roster, &ReplacementConfig::default());
        assert_eq!(usage.flex_slots_per_team, 0);
        assert!(usage.shares.is_empty());
    }
}
