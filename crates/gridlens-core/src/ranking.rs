// League ranking and percentile normalization.
//
// Every per-team metric goes through here to become a rank, a percentile,
// and a letter grade. Nothing in this module knows which metric it is
// ranking; the caller supplies the direction.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::guard::{mean_or, safe_div};
use crate::season::TeamId;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl Direction {
    /// Whether `a` is strictly better than `b`.
    fn better(self, a: f64, b: f64) -> bool {
        match self {
            Direction::HigherBetter => a > b,
            Direction::LowerBetter => a < b,
        }
    }
}

// ---------------------------------------------------------------------------
// Standing
// ---------------------------------------------------------------------------

/// One team's position in the league for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Standing {
    pub value: f64,
    /// 1 = best. Tied teams share a rank.
    pub rank: usize,
    /// 0..=100. Tied peers count as half below.
    pub percentile: f64,
    pub grade: LetterGrade,
    pub league_average: f64,
    /// `value - league_average`.
    pub gap_to_average: f64,
    pub num_teams: usize,
}

/// Standing of `team_id` among `values`. `None` when the team has no finite
/// value in the map. Non-finite values are ignored for every team.
pub fn rank_team(
    values: &BTreeMap<TeamId, f64>,
    team_id: &str,
    direction: Direction,
) -> Option<Standing> {
    let finite = finite_values(values);
    let &value = finite.get(team_id)?;
    Some(standing_among(&finite, value, direction))
}

/// Standings for every team with a finite value.
pub fn rank_league(
    values: &BTreeMap<TeamId, f64>,
    direction: Direction,
) -> BTreeMap<TeamId, Standing> {
    let finite = finite_values(values);
    finite
        .iter()
        .map(|(&team_id, &value)| {
            (
                team_id.to_string(),
                standing_among(&finite, value, direction),
            )
        })
        .collect()
}

fn finite_values(values: &BTreeMap<TeamId, f64>) -> BTreeMap<&str, f64> {
    values
        .iter()
        .filter_map(|(team_id, &value)| {
            if value.is_finite() {
                Some((team_id.as_str(), value))
            } else {
                warn!("dropping non-finite metric value {} for team '{}'", value, team_id);
                None
            }
        })
        .collect()
}

/// `values` must contain the team whose `value` is being placed.
fn standing_among(values: &BTreeMap<&str, f64>, value: f64, direction: Direction) -> Standing {
    let num_teams = values.len();
    let better = values.values().filter(|&&v| direction.better(v, value)).count();
    let worse = values.values().filter(|&&v| direction.better(value, v)).count();
    // Everyone else who is neither better nor worse, excluding the team itself.
    let tied_peers = num_teams.saturating_sub(better + worse + 1);

    let percentile = if num_teams <= 1 {
        50.0
    } else {
        let below = worse as f64 + 0.5 * tied_peers as f64;
        (safe_div(below, (num_teams - 1) as f64, 0.5) * 100.0).clamp(0.0, 100.0)
    };

    let all: Vec<f64> = values.values().copied().collect();
    let league_average = mean_or(&all, 0.0);

    Standing {
        value,
        rank: better + 1,
        percentile,
        grade: LetterGrade::from_percentile(percentile),
        league_average,
        gap_to_average: value - league_average,
        num_teams,
    }
}

// ---------------------------------------------------------------------------
// Letter grades
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LetterGrade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

/// `(minimum percentile, grade)`, best first.
const GRADE_THRESHOLDS: &[(f64, LetterGrade)] = &[
    (95.0, LetterGrade::APlus),
    (90.0, LetterGrade::A),
    (85.0, LetterGrade::AMinus),
    (80.0, LetterGrade::BPlus),
    (75.0, LetterGrade::B),
    (70.0, LetterGrade::BMinus),
    (65.0, LetterGrade::CPlus),
    (60.0, LetterGrade::C),
    (55.0, LetterGrade::CMinus),
    (50.0, LetterGrade::DPlus),
    (40.0, LetterGrade::D),
    (30.0, LetterGrade::DMinus),
];

impl LetterGrade {
    pub fn from_percentile(percentile: f64) -> Self {
        GRADE_THRESHOLDS
            .iter()
            .find(|(min, _)| percentile >= *min)
            .map_or(LetterGrade::F, |(_, grade)| *grade)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
