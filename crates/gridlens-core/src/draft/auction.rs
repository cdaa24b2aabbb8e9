// Auction draft grading: dollars spent per fantasy point scored.
//
// Lower $/point is better. A pick that scored nothing gets a fixed sentinel
// ratio instead of a division by zero, so it always sorts as the worst value.

use serde::Serialize;

use crate::draft::PickGrade;
use crate::guard::safe_div;

/// A team's auction spending efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuctionSummary {
    pub total_spend: u32,
    pub total_points: f64,
    /// Points per dollar (0 with no spend); higher is better.
    pub points_per_dollar: f64,
}

/// `cost / points`, or `zero_point_ratio` when the player scored nothing.
pub fn dollars_per_point(cost: u32, points: f64, zero_point_ratio: f64) -> f64 {
    if points <= 0.0 {
        return zero_point_ratio;
    }
    cost as f64 / points
}

/// Fill `dollars_per_point` on every pick.
pub fn apply_cost_model(picks: &mut [PickGrade], zero_point_ratio: f64) {
    for pick in picks.iter_mut() {
        pick.dollars_per_point = Some(dollars_per_point(
            pick.cost,
            pick.season_points,
            zero_point_ratio,
        ));
    }
}

pub fn summarize(picks: &[PickGrade]) -> AuctionSummary {
    let total_spend: u32 = picks.iter().map(|p| p.cost).sum();
    let total_points: f64 = picks.iter().map(|p| p.season_points).sum();
    AuctionSummary {
        total_spend,
        total_points,
        points_per_dollar: safe_div(total_points, total_spend as f64, 0.0),
    }
}

/// Cheapest points: lowest $/point among paid picks that scored.
pub fn cost_steals(picks: &[PickGrade], limit: usize) -> Vec<PickGrade> {
    let mut steals: Vec<&PickGrade> = picks
        .iter()
        .filter(|p| p.cost >= 1 && p.season_points > 0.0)
        .collect();
    steals.sort_by(|a, b| {
        ratio(a)
            .partial_cmp(&ratio(b))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.overall_pick.cmp(&b.overall_pick))
    });
    steals.into_iter().take(limit).cloned().collect()
}

/// Most expensive points: highest $/point among picks costing at least
/// `min_spend`. Cheap throwaway picks are never busts.
pub fn cost_busts(picks: &[PickGrade], min_spend: u32, limit: usize) -> Vec<PickGrade> {
    let mut busts: Vec<&PickGrade> = picks.iter().filter(|p| p.cost >= min_spend).collect();
    busts.sort_by(|a, b| {
        ratio(b)
            .partial_cmp(&ratio(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.cost.cmp(&a.cost))
    });
    busts.into_iter().take(limit).cloned().collect()
}

fn ratio(pick: &PickGrade) -> f64 {
    pick.dollars_per_point.unwrap_or(f64::INFINITY)
}
