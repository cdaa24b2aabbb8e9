// Snake draft grading: finish ranks, round differentials, value score.

use std::collections::{BTreeMap, HashMap};

use crate::draft::expected_round::expected_round;
use crate::draft::PickGrade;
use crate::season::{PlayerId, Position};

/// Rank every drafted player by season points within their position
/// (1 = best). Players with unknown positions are ranked together.
pub fn finish_ranks(picks: &[PickGrade]) -> HashMap<PlayerId, usize> {
    let mut by_position: BTreeMap<Option<Position>, Vec<&PickGrade>> = BTreeMap::new();
    for pick in picks {
        by_position.entry(pick.position).or_default().push(pick);
    }

    let mut ranks = HashMap::new();
    for group in by_position.values_mut() {
        group.sort_by(|a, b| {
            b.season_points
                .partial_cmp(&a.season_points)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.overall_pick.cmp(&b.overall_pick))
        });
        for (i, pick) in group.iter().enumerate() {
            ranks.entry(pick.player_id.clone()).or_insert(i + 1);
        }
    }
    ranks
}

/// Fill finish rank, expected round and round differential on every pick.
pub fn apply_round_model(picks: &mut [PickGrade], league_size: usize) {
    let ranks = finish_ranks(picks);
    for pick in picks.iter_mut() {
        let Some(&rank) = ranks.get(&pick.player_id) else {
            continue;
        };
        let expected = expected_round(pick.position, rank, league_size);
        pick.finish_rank = Some(rank);
        pick.expected_round = Some(expected);
        pick.round_diff = Some(pick.round as i32 - expected as i32);
    }
}

/// Early rounds count more: rounds 1-3 x3, rounds 4-6 x2, later x1.
pub fn round_weight(round: u32) -> f64 {
    match round {
        0..=3 => 3.0,
        4..=6 => 2.0,
        _ => 1.0,
    }
}

/// Sum of round-weighted round differentials for a team's picks.
pub fn value_score(picks: &[PickGrade]) -> f64 {
    picks
        .iter()
        .filter_map(|p| p.round_diff.map(|diff| diff as f64 * round_weight(p.round)))
        .sum()
}

/// Picks that went at least `threshold` rounds later than expected, biggest
/// steal first.
pub fn round_steals(picks: &[PickGrade], threshold: i32, limit: usize) -> Vec<PickGrade> {
    let mut steals: Vec<&PickGrade> = picks
        .iter()
        .filter(|p| p.round_diff.is_some_and(|d| d >= threshold))
        .collect();
    steals.sort_by(|a, b| {
        b.round_diff
            .cmp(&a.round_diff)
            .then_with(|| a.overall_pick.cmp(&b.overall_pick))
    });
    steals.into_iter().take(limit).cloned().collect()
}

/// Picks that went at least `threshold` rounds earlier than expected, biggest
/// reach first.
pub fn round_busts(picks: &[PickGrade], threshold: i32, limit: usize) -> Vec<PickGrade> {
    let mut busts: Vec<&PickGrade> = picks
        .iter()
        .filter(|p| p.round_diff.is_some_and(|d| d <= -threshold))
        .collect();
    busts.sort_by(|a, b| {
        a.round_diff
            .cmp(&b.round_diff)
            .then_with(|| a.overall_pick.cmp(&b.overall_pick))
    });
    busts.into_iter().take(limit).cloned().collect()
}
