// Draft value analysis: grades every pick against what the player actually
// produced.
//
// Two mutually exclusive framings, picked by draft type:
// - snake: rounds vs. the expected-round model
// - auction: dollars per point
// Both also get a VOR framing (steals, busts, surplus over the league's
// average pick) and the "walked past gold" list.

pub mod auction;
pub mod expected_round;
pub mod gold;
pub mod snake;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::availability::Availability;
use crate::config::DraftConfig;
use crate::guard::safe_div;
use crate::season::{DraftPick, PlayerId, Position, SeasonIndex, TeamId};
use crate::valuation::vor::{VorGrade, VorTable};

use self::auction::AuctionSummary;
use self::gold::PassedPlayer;

// ---------------------------------------------------------------------------
// Draft mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftMode {
    Snake,
    Auction,
}

/// Auction when any pick cost more than $1 or any auction budget is set.
pub fn detect_mode(index: &SeasonIndex) -> DraftMode {
    let paid_picks = index.draft().iter().any(|p| p.cost > 1);
    let league_budget = index.league().auction_budget > 0;
    let team_budget = index.teams().iter().any(|t| t.auction_budget > 0);
    if paid_picks || league_budget || team_budget {
        DraftMode::Auction
    } else {
        DraftMode::Snake
    }
}

// ---------------------------------------------------------------------------
// Pick grades
// ---------------------------------------------------------------------------

/// One draft pick with everything known about its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickGrade {
    pub team_id: TeamId,
    pub overall_pick: u32,
    pub round: u32,
    pub player_id: PlayerId,
    pub player_name: String,
    pub position: Option<Position>,
    pub cost: u32,
    pub is_keeper: bool,
    pub season_points: f64,
    pub vor: Option<f64>,
    pub vor_grade: Option<VorGrade>,
    /// Snake only: rank by season points among drafted players at the position.
    pub finish_rank: Option<usize>,
    pub expected_round: Option<u32>,
    /// `round - expected_round`; positive means the player went later than
    /// their production warranted.
    pub round_diff: Option<i32>,
    /// Auction only.
    pub dollars_per_point: Option<f64>,
}

impl PickGrade {
    fn from_pick(pick: &DraftPick, index: &SeasonIndex, vor: &VorTable) -> Self {
        let value = vor.player(&pick.player_id);
        PickGrade {
            team_id: pick.team_id.clone(),
            overall_pick: pick.overall_pick,
            round: pick.round,
            player_id: pick.player_id.clone(),
            player_name: index.display_name(&pick.player_id).to_string(),
            position: index.player_position(&pick.player_id),
            cost: pick.cost,
            is_keeper: pick.is_keeper,
            season_points: index.season_points(&pick.player_id).total_points,
            vor: value.map(|v| v.vor),
            vor_grade: value.map(|v| v.grade),
            finish_rank: None,
            expected_round: None,
            round_diff: None,
            dollars_per_point: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// VOR framing of a team's draft, independent of rounds and dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VorDraftSummary {
    /// High-VOR players taken in the middle or late rounds.
    pub steals: Vec<PickGrade>,
    /// Below-replacement players taken in the early or middle rounds.
    pub busts: Vec<PickGrade>,
    pub total_vor: f64,
    /// League-average VOR per pick times this team's pick count.
    pub expected_vor: f64,
    pub surplus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDraftReport {
    pub team_id: TeamId,
    pub mode: DraftMode,
    pub picks: Vec<PickGrade>,
    /// The mode's ranking metric: snake value score or auction points per
    /// dollar. Higher is better in both modes.
    pub draft_score: f64,
    pub steals: Vec<PickGrade>,
    pub busts: Vec<PickGrade>,
    pub auction: Option<AuctionSummary>,
    pub vor: VorDraftSummary,
    pub walked_past_gold: Vec<PassedPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftAnalysis {
    pub mode: DraftMode,
    pub total_picks: usize,
    pub league_avg_vor_per_pick: f64,
    pub teams: BTreeMap<TeamId, TeamDraftReport>,
}

impl DraftAnalysis {
    pub fn team(&self, team_id: &str) -> Option<&TeamDraftReport> {
        self.teams.get(team_id)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Grade the whole draft. Unavailable (not an error) when the season has no
/// draft data, since offline and keeper-only drafts are valid setups.
pub fn analyze_draft(
    index: &SeasonIndex,
    vor: &VorTable,
    config: &DraftConfig,
) -> Availability<DraftAnalysis> {
    if !index.has_draft() {
        warn!("no draft data; draft analysis unavailable");
        return Availability::unavailable("no draft data for this league");
    }

    let mode = detect_mode(index);
    let mut picks: Vec<PickGrade> = index
        .draft()
        .iter()
        .map(|p| PickGrade::from_pick(p, index, vor))
        .collect();

    match mode {
        DraftMode::Snake => snake::apply_round_model(&mut picks, index.team_count()),
        DraftMode::Auction => auction::apply_cost_model(&mut picks, config.zero_point_cost_ratio),
    }

    // Picks without a VOR (no replacement level at their position) count as 0.
    let league_vor: f64 = picks.iter().filter_map(|p| p.vor).sum();
    let league_avg_vor_per_pick = safe_div(league_vor, picks.len() as f64, 0.0);
    let pool = gold::gold_pool(&picks, config.gold_top_fraction);

    let mut teams = BTreeMap::new();
    for team in index.teams() {
        let team_picks: Vec<PickGrade> = picks
            .iter()
            .filter(|p| p.team_id == team.team_id)
            .cloned()
            .collect();
        if team_picks.is_empty() {
            warn!("team '{}' has no draft picks", team.team_id);
        }
        let report = team_report(
            &team.team_id,
            mode,
            team_picks,
            &pool,
            league_avg_vor_per_pick,
            config,
        );
        teams.insert(team.team_id.clone(), report);
    }

    info!(
        "Draft analyzed: {:?} mode, {} picks, league avg VOR/pick {:.2}",
        mode,
        picks.len(),
        league_avg_vor_per_pick
    );

    Availability::Available(DraftAnalysis {
        mode,
        total_picks: picks.len(),
        league_avg_vor_per_pick,
        teams,
    })
}

fn team_report(
    team_id: &str,
    mode: DraftMode,
    picks: Vec<PickGrade>,
    pool: &[&PickGrade],
    league_avg_vor_per_pick: f64,
    config: &DraftConfig,
) -> TeamDraftReport {
    let limit = config.highlight_count;

    let (draft_score, steals, busts, auction_summary) = match mode {
        DraftMode::Snake => (
            snake::value_score(&picks),
            snake::round_steals(&picks, config.round_steal_threshold, limit),
            snake::round_busts(&picks, config.round_steal_threshold, limit),
            None,
        ),
        DraftMode::Auction => {
            let summary = auction::summarize(&picks);
            (
                summary.points_per_dollar,
                auction::cost_steals(&picks, limit),
                auction::cost_busts(&picks, config.min_bust_spend, limit),
                Some(summary),
            )
        }
    };

    let vor = vor_summary(&picks, league_avg_vor_per_pick, config);
    let walked_past_gold =
        gold::walked_past_gold(team_id, &picks, pool, config.gold_min_times_passed, limit);

    TeamDraftReport {
        team_id: team_id.to_string(),
        mode,
        picks,
        draft_score,
        steals,
        busts,
        auction: auction_summary,
        vor,
        walked_past_gold,
    }
}

/// VOR steals (VOR >= 5 taken in round 4 or later), VOR busts (negative VOR
/// taken in round 8 or earlier), and surplus over the league-average pick.
fn vor_summary(
    picks: &[PickGrade],
    league_avg_vor_per_pick: f64,
    config: &DraftConfig,
) -> VorDraftSummary {
    let mut steals: Vec<&PickGrade> = picks
        .iter()
        .filter(|p| {
            p.vor.is_some_and(|v| v >= config.vor_steal_min) && p.round >= config.vor_steal_min_round
        })
        .collect();
    steals.sort_by(|a, b| {
        b.vor
            .partial_cmp(&a.vor)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut busts: Vec<&PickGrade> = picks
        .iter()
        .filter(|p| p.vor.is_some_and(|v| v < 0.0) && p.round <= config.vor_bust_max_round)
        .collect();
    busts.sort_by(|a, b| {
        a.vor
            .partial_cmp(&b.vor)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_vor: f64 = picks.iter().filter_map(|p| p.vor).sum();
    let expected_vor = league_avg_vor_per_pick * picks.len() as f64;

    VorDraftSummary {
        steals: steals
            .into_iter()
            .take(config.highlight_count)
            .cloned()
            .collect(),
        busts: busts
            .into_iter()
            .take(config.highlight_count)
            .cloned()
            .collect(),
        total_vor,
        expected_vor,
        surplus: total_vor - expected_vor,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
