// Expected-round model: the round a player's finish rank says they "should"
// have been drafted in.
//
// Each position has its own scarcity curve, expressed as rank bands for a
// 12-team league. Other league sizes rescale the finish rank first, so the
// 5th RB in an 8-team league is treated like the ~8th RB in a 12-team league.

use crate::season::Position;

/// League size the bands are written for.
const REFERENCE_LEAGUE_SIZE: usize = 12;

/// A position's finish-rank -> round curve.
#[derive(Debug, Clone, Copy)]
pub struct RoundCurve {
    /// `(last rank in band, expected round)`, ascending by rank.
    bands: &'static [(usize, u32)],
    /// Round for ranks past the last band.
    tail_round: u32,
}

impl RoundCurve {
    /// Expected round for a finish rank (1 = best) in a league of `league_size`.
    pub fn expected_round(&self, finish_rank: usize, league_size: usize) -> u32 {
        let rank = scale_rank(finish_rank, league_size);
        self.bands
            .iter()
            .find(|(last_rank, _)| rank <= *last_rank)
            .map_or(self.tail_round, |(_, round)| *round)
    }
}

/// QB: deep position, even the QB1 goes after the elite RBs and WRs.
const QB_CURVE: RoundCurve = RoundCurve {
    bands: &[(2, 3), (5, 5), (8, 7), (12, 9), (18, 11)],
    tail_round: 13,
};

/// RB: front-loaded, the top backs go in round 1.
const RB_CURVE: RoundCurve = RoundCurve {
    bands: &[(3, 1), (8, 2), (14, 3), (20, 4), (26, 5), (32, 6), (40, 8)],
    tail_round: 11,
};

const WR_CURVE: RoundCurve = RoundCurve {
    bands: &[(4, 1), (10, 2), (16, 3), (22, 4), (28, 5), (36, 7), (48, 9)],
    tail_round: 12,
};

/// TE: one or two difference makers, then a flat tier.
const TE_CURVE: RoundCurve = RoundCurve {
    bands: &[(1, 2), (3, 4), (6, 8), (12, 11)],
    tail_round: 14,
};

const K_CURVE: RoundCurve = RoundCurve {
    bands: &[(3, 14)],
    tail_round: 16,
};

const DEF_CURVE: RoundCurve = RoundCurve {
    bands: &[(3, 13)],
    tail_round: 15,
};

/// Curve for a position.
pub fn curve_for(position: Position) -> &'static RoundCurve {
    match position {
        Position::Quarterback => &QB_CURVE,
        Position::RunningBack => &RB_CURVE,
        Position::WideReceiver => &WR_CURVE,
        Position::TightEnd => &TE_CURVE,
        Position::Kicker => &K_CURVE,
        Position::Defense => &DEF_CURVE,
    }
}

/// Expected round for a finish rank. Positions without a curve use one
/// round per `league_size` ranks.
pub fn expected_round(position: Option<Position>, finish_rank: usize, league_size: usize) -> u32 {
    match position {
        Some(pos) => curve_for(pos).expected_round(finish_rank, league_size),
        None => generic_round(finish_rank, league_size),
    }
}

/// `((rank - 1) / league_size) + 1`
pub fn generic_round(finish_rank: usize, league_size: usize) -> u32 {
    let league_size = league_size.max(1);
    (finish_rank.max(1) - 1) as u32 / league_size as u32 + 1
}

fn scale_rank(finish_rank: usize, league_size: usize) -> usize {
    let league_size = league_size.max(1);
    (finish_rank.max(1) * REFERENCE_LEAGUE_SIZE)
        .div_ceil(league_size)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::STANDARD_POSITIONS;

    #[test]
    fn rb1_is_a_first_rounder() {
        assert_eq!(expected_round(Some(Position::RunningBack), 1, 12), 1);
    }

    #[test]
    fn qb_is_flatter_and_later_than_rb() {
        for rank in 1..=12 {
            assert!(
                expected_round(Some(Position::Quarterback), rank, 12)
                    >= expected_round(Some(Position::RunningBack), rank, 12),
                "QB{rank} should not be expected earlier than RB{rank}"
            );
        }
    }

    #[test]
    fn te_drops_steeply_after_the_top() {
        assert_eq!(expected_round(Some(Position::TightEnd), 1, 12), 2);
        assert_eq!(expected_round(Some(Position::TightEnd), 5, 12), 8);
        assert_eq!(expected_round(Some(Position::TightEnd), 30, 12), 14);
    }

    #[test]
    fn kickers_and_defenses_always_late() {
        for rank in 1..=32 {
            assert!(expected_round(Some(Position::Kicker), rank, 12) >= 14);
            assert!(expected_round(Some(Position::Defense), rank, 12) >= 13);
        }
    }

    #[test]
    fn curves_never_decrease_with_rank() {
        for &pos in STANDARD_POSITIONS {
            for league_size in [8, 10, 12, 14] {
                let mut prev = 0;
                for rank in 1..=80 {
                    let round = expected_round(Some(pos), rank, league_size);
                    assert!(round >= prev, "{pos} rank {rank} in {league_size}-team");
                    prev = round;
                }
            }
        }
    }

    #[test]
    fn smaller_leagues_push_ranks_later() {
        // RB4 in a 12-team league is a 2nd-rounder; in 8 teams it is RB6-equivalent.
        assert_eq!(expected_round(Some(Position::RunningBack), 4, 12), 2);
        assert_eq!(expected_round(Some(Position::RunningBack), 3, 8), 2);
        assert_eq!(expected_round(Some(Position::RunningBack), 3, 12), 1);
    }

    #[test]
    fn unknown_positions_use_linear_fallback() {
        assert_eq!(expected_round(None, 1, 10), 1);
        assert_eq!(expected_round(None, 10, 10), 1);
        assert_eq!(expected_round(None, 11, 10), 2);
        assert_eq!(generic_round(25, 12), 3);
        assert_eq!(generic_round(5, 0), 5);
    }
}
