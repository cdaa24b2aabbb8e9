// Value Over Replacement (VOR) from actual season scoring.
//
// Every player's points-per-game is compared with the points-per-game of the
// "next tier" at their position: the band of players ranked just below all
// startable players league-wide. This makes a TE and a WR with the same PPG
// comparable despite different positional depth.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ReplacementConfig;
use crate::guard::mean_or;
use crate::season::{
    PlayerId, PlayerSeasonPoints, Position, RosterSlot, SeasonIndex, STANDARD_POSITIONS,
};
use crate::valuation::flex::{estimate_flex_usage, FlexUsage};

// ---------------------------------------------------------------------------
// VOR grades
// ---------------------------------------------------------------------------

/// Tier of a player's VOR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VorGrade {
    BelowReplacement,
    Replacement,
    Solid,
    Strong,
    Elite,
}

impl VorGrade {
    /// Grade a VOR (points per game over replacement).
    pub fn from_vor(vor: f64) -> Self {
        if vor >= 8.0 {
            VorGrade::Elite
        } else if vor >= 5.0 {
            VorGrade::Strong
        } else if vor >= 2.0 {
            VorGrade::Solid
        } else if vor >= 0.0 {
            VorGrade::Replacement
        } else {
            VorGrade::BelowReplacement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VorGrade::Elite => "Elite",
            VorGrade::Strong => "Strong",
            VorGrade::Solid => "Solid",
            VorGrade::Replacement => "Replacement",
            VorGrade::BelowReplacement => "Below Replacement",
        }
    }
}

// ---------------------------------------------------------------------------
// Replacement levels
// ---------------------------------------------------------------------------

/// Replacement baseline for one position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacementLevel {
    pub position: Position,
    /// League-wide starters at this position (dedicated + estimated flex).
    pub starting_slots: usize,
    /// 1-based rank where the replacement band begins.
    pub band_start: usize,
    pub band_size: usize,
    pub players_ranked: usize,
    /// Mean PPG of the replacement band.
    pub replacement_ppg: f64,
    /// The position was too thin for a full band; the bottom quartile was used.
    pub used_fallback: bool,
}

/// League-wide starters per position: `teams * dedicated + round(flex estimate)`.
pub fn starting_slots(
    roster_positions: &BTreeMap<String, usize>,
    team_count: usize,
    flex: &FlexUsage,
) -> BTreeMap<Position, usize> {
    let mut dedicated: BTreeMap<Position, usize> = BTreeMap::new();
    for (key, &count) in roster_positions {
        if let RosterSlot::Dedicated(pos) = RosterSlot::parse(key) {
            *dedicated.entry(pos).or_insert(0) += count;
        }
    }

    let mut slots = BTreeMap::new();
    for &pos in STANDARD_POSITIONS {
        let per_team = dedicated.get(&pos).copied().unwrap_or(0);
        let flex_estimate = flex.estimated_slots(pos, team_count).round() as usize;
        let total = per_team * team_count + flex_estimate;
        if total > 0 {
            slots.insert(pos, total);
        }
    }
    slots
}

/// Compute the replacement level for a position.
///
/// `ranked` must be sorted by season total points, best first.
///
/// Algorithm:
/// 1. The band starts right after the last startable player
///    (`band_start = starting_slots + 1`) and is `starting_slots` wide.
/// 2. Replacement PPG = mean PPG of the players in the band.
/// 3. If the position has no more players than starting slots, the bottom
///    quartile stands in for the band.
/// 4. No players at all: replacement PPG is 0.
pub fn replacement_level(
    position: Position,
    ranked: &[PlayerSeasonPoints],
    starting_slots: usize,
) -> ReplacementLevel {
    let band_start = starting_slots + 1;
    let band_size = starting_slots.max(1);

    let (band, used_fallback): (&[PlayerSeasonPoints], bool) = if ranked.len() >= band_start {
        let end = (starting_slots + band_size).min(ranked.len());
        (&ranked[starting_slots..end], false)
    } else if !ranked.is_empty() {
        let quartile = ranked.len().div_ceil(4).max(1);
        (&ranked[ranked.len() - quartile..], true)
    } else {
        (&[], false)
    };

    let ppgs: Vec<f64> = band.iter().map(|p| p.ppg).collect();

    ReplacementLevel {
        position,
        starting_slots,
        band_start,
        band_size,
        players_ranked: ranked.len(),
        replacement_ppg: mean_or(&ppgs, 0.0),
        used_fallback,
    }
}

// ---------------------------------------------------------------------------
// Per-player values
// ---------------------------------------------------------------------------

/// A player's season value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerValue {
    pub player_id: PlayerId,
    pub position: Position,
    pub total_points: f64,
    pub games_played: u32,
    pub ppg: f64,
    pub vor: f64,
    pub grade: VorGrade,
}

/// Replacement levels plus VOR for every rostered or drafted player with a
/// known position.
#[derive(Debug, Clone, Default)]
pub struct VorTable {
    levels: BTreeMap<Position, ReplacementLevel>,
    players: HashMap<PlayerId, PlayerValue>,
}

impl VorTable {
    /// Build replacement levels and player values from the season index.
    pub fn build(index: &SeasonIndex, config: &ReplacementConfig) -> Self {
        let roster_positions = roster_config(index);
        let flex = estimate_flex_usage(index, &roster_positions, config);
        let slots = starting_slots(&roster_positions, index.team_count(), &flex);

        // Group players by position, keeping their season totals.
        let mut by_position: BTreeMap<Position, Vec<(&PlayerId, PlayerSeasonPoints)>> =
            BTreeMap::new();
        for player_id in index.players() {
            if let Some(pos) = index.player_position(player_id) {
                by_position
                    .entry(pos)
                    .or_default()
                    .push((player_id, index.season_points(player_id)));
            }
        }

        let mut levels = BTreeMap::new();
        let mut players = HashMap::new();

        for (&pos, &starting) in &slots {
            let mut pool = by_position.remove(&pos).unwrap_or_default();
            pool.sort_by(|a, b| {
                b.1.total_points
                    .partial_cmp(&a.1.total_points)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            });
            let ranked: Vec<PlayerSeasonPoints> = pool.iter().map(|(_, pts)| *pts).collect();

            let level = replacement_level(pos, &ranked, starting);
            if level.used_fallback {
                warn!(
                    "{}: only {} players for {} starting slots, using bottom quartile",
                    pos, level.players_ranked, starting
                );
            }
            debug!(
                "{} replacement: {:.2} ppg (band {}..+{})",
                pos, level.replacement_ppg, level.band_start, level.band_size
            );

            for (player_id, pts) in pool {
                let vor = pts.ppg - level.replacement_ppg;
                players.insert(
                    player_id.clone(),
                    PlayerValue {
                        player_id: player_id.clone(),
                        position: pos,
                        total_points: pts.total_points,
                        games_played: pts.games_played,
                        ppg: pts.ppg,
                        vor,
                        grade: VorGrade::from_vor(vor),
                    },
                );
            }
            levels.insert(pos, level);
        }

        // Drafted players cut before they ever appeared on a roster scored
        // nothing. They are valued against the levels above but never join a
        // ranking, so they cannot drag a replacement band down to zero.
        for pick in index.draft() {
            if players.contains_key(&pick.player_id) {
                continue;
            }
            let Some(pos) = index.player_position(&pick.player_id) else {
                continue;
            };
            let Some(level) = levels.get(&pos) else {
                continue;
            };
            let pts = index.season_points(&pick.player_id);
            let vor = pts.ppg - level.replacement_ppg;
            debug!("{} never rostered, valued at {:.2} VOR", pick.player_id, vor);
            players.insert(
                pick.player_id.clone(),
                PlayerValue {
                    player_id: pick.player_id.clone(),
                    position: pos,
                    total_points: pts.total_points,
                    games_played: pts.games_played,
                    ppg: pts.ppg,
                    vor,
                    grade: VorGrade::from_vor(vor),
                },
            );
        }

        info!(
            "Computed replacement levels for {} positions, VOR for {} players",
            levels.len(),
            players.len()
        );

        VorTable { levels, players }
    }

    pub fn level(&self, position: Position) -> Option<&ReplacementLevel> {
        self.levels.get(&position)
    }

    pub fn levels(&self) -> impl Iterator<Item = &ReplacementLevel> {
        self.levels.values()
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerValue> {
        self.players.get(player_id)
    }

    pub fn vor(&self, player_id: &str) -> Option<f64> {
        self.players.get(player_id).map(|p| p.vor)
    }
}

/// The league's roster rules, or rules inferred from observed starting
/// lineups when the ingestion layer supplied none.
///
/// Inference takes, for each starting slot name, the most starters any team
/// used in that slot in a single week. Unmodelled slots are ignored.
fn roster_config(index: &SeasonIndex) -> BTreeMap<String, usize> {
    let declared = &index.league().roster_positions;
    if !declared.is_empty() {
        return declared.clone();
    }

    warn!("league has no roster position configuration; inferring from lineups");
    let mut inferred: BTreeMap<String, usize> = BTreeMap::new();
    for team in index.teams() {
        for (_, roster) in index.team_weeks(&team.team_id) {
            let mut week_counts: BTreeMap<String, usize> = BTreeMap::new();
            for entry in roster
                .starters
                .iter()
                .filter(|e| e.roster_slot().is_starting())
            {
                *week_counts.entry(entry.slot.trim().to_uppercase()).or_insert(0) += 1;
            }
            for (slot, count) in week_counts {
                let best = inferred.entry(slot).or_insert(0);
                *best = (*best).max(count);
            }
        }
    }
    inferred
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::flex::tests::{flex_index, lineup};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// Players with one game each, so PPG equals total points.
    fn ranked_pool(totals: &[f64]) -> Vec<PlayerSeasonPoints> {
        totals
            .iter()
            .map(|&t| PlayerSeasonPoints {
                total_points: t,
                games_played: 1,
                ppg: t,
            })
            .collect()
    }

    fn no_flex() -> FlexUsage {
        FlexUsage {
            flex_slots_per_team: 0,
            shares: BTreeMap::new(),
            observations: 0,
            sampled_weeks: vec![],
        }
    }

    #[test]
    fn band_follows_last_starter() {
        // 2 starting slots -> band is ranks 3..4.
        let ranked = ranked_pool(&[20.0, 18.0, 10.0, 8.0, 2.0]);
        let level = replacement_level(Position::TightEnd, &ranked, 2);
        assert_eq!(level.band_start, 3);
        assert_eq!(level.band_size, 2);
        assert!(!level.used_fallback);
        assert!(approx_eq(level.replacement_ppg, 9.0, 1e-9));
    }

    #[test]
    fn band_truncates_at_pool_end() {
        let ranked = ranked_pool(&[20.0, 18.0, 10.0]);
        let level = replacement_level(Position::TightEnd, &ranked, 2);
        assert!(!level.used_fallback);
        assert!(approx_eq(level.replacement_ppg, 10.0, 1e-9));
    }

    #[test]
    fn thin_position_uses_bottom_quartile() {
        // 5 players, 6 starting slots -> bottom ceil(5/4) = 2 players.
        let ranked = ranked_pool(&[30.0, 25.0, 20.0, 12.0, 6.0]);
        let level = replacement_level(Position::Quarterback, &ranked, 6);
        assert!(level.used_fallback);
        assert!(approx_eq(level.replacement_ppg, 9.0, 1e-9));
    }

    #[test]
    fn empty_position_has_zero_replacement() {
        let level = replacement_level(Position::Kicker, &[], 12);
        assert_eq!(level.replacement_ppg, 0.0);
        assert_eq!(level.players_ranked, 0);
    }

    #[test]
    fn starting_slots_combine_dedicated_and_flex() {
        let mut roster = BTreeMap::new();
        roster.insert("QB".to_string(), 1);
        roster.insert("RB".to_string(), 2);
        roster.insert("WR".to_string(), 2);
        roster.insert("TE".to_string(), 1);
        roster.insert("FLEX".to_string(), 1);
        roster.insert("BE".to_string(), 6);

        let mut shares = BTreeMap::new();
        shares.insert(Position::RunningBack, 0.5);
        shares.insert(Position::WideReceiver, 0.4);
        shares.insert(Position::TightEnd, 0.1);
        let flex = FlexUsage {
            flex_slots_per_team: 1,
            shares,
            observations: 40,
            sampled_weeks: vec![1, 5, 9, 14],
        };

        let slots = starting_slots(&roster, 10, &flex);
        assert_eq!(slots[&Position::Quarterback], 10);
        assert_eq!(slots[&Position::RunningBack], 25);
        assert_eq!(slots[&Position::WideReceiver], 24);
        assert_eq!(slots[&Position::TightEnd], 11);
        assert!(!slots.contains_key(&Position::Kicker));

        let plain = starting_slots(&roster, 10, &no_flex());
        assert_eq!(plain[&Position::RunningBack], 20);
    }

    #[test]
    fn observed_flex_split_feeds_starting_slots() {
        // Both teams fill their flex with an RB in half the sampled weeks and a
        // WR in the rest: 2 teams * 1 flex * 0.5 = 1 extra slot each.
        let roster = &[("QB", 1), ("RB", 1), ("WR", 1), ("FLEX", 1), ("BE", 2)];
        let index = flex_index(roster, 4, |team, week| {
            let flex = if week % 2 == 0 { "RB" } else { "WR" };
            lineup(team, &[("QB", "QB"), ("RB", "RB"), ("WR", "WR"), (flex, "FLEX")])
        });

        let table = VorTable::build(&index, &ReplacementConfig::default());
        assert_eq!(table.level(Position::Quarterback).unwrap().starting_slots, 2);
        assert_eq!(table.level(Position::RunningBack).unwrap().starting_slots, 3);
        assert_eq!(table.level(Position::WideReceiver).unwrap().starting_slots, 3);
        assert!(table.level(Position::TightEnd).is_none());
    }

    #[test]
    fn default_flex_split_applies_without_flex_starts() {
        // Defaults RB .45 / WR .45 / TE .10 over 2 flex slots: RB and WR round
        // up to one extra slot, TE rounds to none.
        let roster = &[("RB", 1), ("WR", 1), ("FLEX", 1)];
        let index = flex_index(roster, 2, |team, _| lineup(team, &[("RB", "RB"), ("WR", "WR")]));

        let table = VorTable::build(&index, &ReplacementConfig::default());
        assert_eq!(table.level(Position::RunningBack).unwrap().starting_slots, 3);
        assert_eq!(table.level(Position::WideReceiver).unwrap().starting_slots, 3);
        assert!(table.level(Position::TightEnd).is_none());
    }

    #[test]
    fn roster_rules_are_inferred_from_lineups() {
        let index = flex_index(&[], 2, |team, week| {
            let mut slots = vec![("QB", "QB"), ("RB", "RB"), ("WR", "WR"), ("WR", "FLEX")];
            if team == 0 && week == 2 {
                slots.push(("RB", "RB"));
            }
            // Unmodelled starting slots are not roster rules.
            slots.push(("LB", "DL"));
            lineup(team, &slots)
        });

        let inferred = roster_config(&index);
        let expected: BTreeMap<String, usize> = [("QB", 1), ("RB", 2), ("WR", 1), ("FLEX", 1)]
            .iter()
            .map(|(k, n)| (k.to_string(), *n))
            .collect();
        assert_eq!(inferred, expected);

        // Every observed flex start was a WR: 2 teams * (1 dedicated + 1 flex).
        let table = VorTable::build(&index, &ReplacementConfig::default());
        assert_eq!(table.level(Position::RunningBack).unwrap().starting_slots, 4);
        assert_eq!(table.level(Position::WideReceiver).unwrap().starting_slots, 4);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(VorGrade::from_vor(8.0), VorGrade::Elite);
        assert_eq!(VorGrade::from_vor(7.99), VorGrade::Strong);
        assert_eq!(VorGrade::from_vor(5.0), VorGrade::Strong);
        assert_eq!(VorGrade::from_vor(2.0), VorGrade::Solid);
        assert_eq!(VorGrade::from_vor(0.0), VorGrade::Replacement);
        assert_eq!(VorGrade::from_vor(-0.01), VorGrade::BelowReplacement);
        assert_eq!(VorGrade::BelowReplacement.label(), "Below Replacement");
    }

    #[test]
    fn grades_are_monotonic_in_vor() {
        let mut vors: Vec<f64> = (-40..=40).map(|i| i as f64 * 0.37).collect();
        vors.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in vors.windows(2) {
            assert!(
                VorGrade::from_vor(pair[1]) >= VorGrade::from_vor(pair[0]),
                "grade dropped between {} and {}",
                pair[0],
                pair[1]
            );
        }
    }
}
