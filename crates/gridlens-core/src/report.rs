// League report assembly.
//
// Two phases:
// 1. `TeamMetricsCache::compute` runs every per-team analysis for the whole
//    league exactly once.
// 2. `assemble` ranks each metric family across the league from the cache,
//    then runs win attribution against those standings.
//
// The cache borrows the season index, so it cannot outlive the data it was
// computed from.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::attribution::{attribute_wins, AttributionInputs, LeagueWeeks, WinAttribution};
use crate::availability::Availability;
use crate::byes::{season_dead_starts, DeadStartSummary};
use crate::config::EngineConfig;
use crate::draft::{analyze_draft, DraftAnalysis, DraftMode, TeamDraftReport};
use crate::lineup::{season_lineup, LineupSeason};
use crate::ranking::{rank_league, Direction, LetterGrade, Standing};
use crate::season::{SeasonIndex, TeamId, Week};
use crate::valuation::vor::{ReplacementLevel, VorTable};
use crate::waiver::{team_waivers, WaiverSummary};

// ---------------------------------------------------------------------------
// Metric families
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    LineupEfficiency,
    DraftValue,
    VorSurplus,
    WaiverPoints,
    ByeWeekManagement,
}

pub const METRIC_FAMILIES: &[MetricFamily] = &[
    MetricFamily::LineupEfficiency,
    MetricFamily::DraftValue,
    MetricFamily::VorSurplus,
    MetricFamily::WaiverPoints,
    MetricFamily::ByeWeekManagement,
];

impl MetricFamily {
    pub fn direction(&self) -> Direction {
        match self {
            MetricFamily::ByeWeekManagement => Direction::LowerBetter,
            _ => Direction::HigherBetter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricFamily::LineupEfficiency => "lineup efficiency",
            MetricFamily::DraftValue => "draft value",
            MetricFamily::VorSurplus => "VOR surplus",
            MetricFamily::WaiverPoints => "waiver points",
            MetricFamily::ByeWeekManagement => "bye-week management",
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw metric value normalized against the league.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricRecord {
    pub family: MetricFamily,
    pub value: f64,
    pub rank: usize,
    pub percentile: f64,
    pub grade: LetterGrade,
    pub league_average: f64,
    pub gap_to_average: f64,
    pub num_teams: usize,
}

impl MetricRecord {
    fn new(family: MetricFamily, standing: &Standing) -> Self {
        MetricRecord {
            family,
            value: standing.value,
            rank: standing.rank,
            percentile: standing.percentile,
            grade: standing.grade,
            league_average: standing.league_average,
            gap_to_average: standing.gap_to_average,
            num_teams: standing.num_teams,
        }
    }
}

/// A normalized record plus the raw summary it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport<T> {
    pub record: MetricRecord,
    pub summary: T,
}

// ---------------------------------------------------------------------------
// Phase 1: per-team cache
// ---------------------------------------------------------------------------

/// Every team's raw metrics, computed once per run.
#[derive(Debug)]
pub struct TeamMetricsCache<'a> {
    index: &'a SeasonIndex,
    lineup: BTreeMap<TeamId, LineupSeason>,
    byes: BTreeMap<TeamId, DeadStartSummary>,
    waivers: BTreeMap<TeamId, WaiverSummary>,
    draft: Availability<DraftAnalysis>,
    weeks: LeagueWeeks,
}

impl<'a> TeamMetricsCache<'a> {
    pub fn compute(index: &'a SeasonIndex, vor: &VorTable, config: &EngineConfig) -> Self {
        let mut lineup = BTreeMap::new();
        let mut byes = BTreeMap::new();
        let mut waivers = BTreeMap::new();

        if !index.has_transactions() {
            warn!("no transaction data; waiver metrics unavailable");
        }

        for team in index.teams() {
            let id = &team.team_id;
            match season_lineup(index, id, &config.lineup) {
                Some(season) => {
                    lineup.insert(id.clone(), season);
                }
                None => warn!("team '{}' has no roster weeks", id),
            }
            if let Some(dead) = season_dead_starts(index, id, &config.lineup) {
                byes.insert(id.clone(), dead);
            }
            if let Some(summary) = team_waivers(index, id) {
                waivers.insert(id.clone(), summary);
            }
        }

        let draft = analyze_draft(index, vor, &config.draft);
        let weeks = LeagueWeeks::build(index, &config.lineup);

        info!(
            "Phase 1 complete: {} teams, {} regular-season weeks",
            index.teams().len(),
            weeks.week_count()
        );

        TeamMetricsCache {
            index,
            lineup,
            byes,
            waivers,
            draft,
            weeks,
        }
    }

    pub fn index(&self) -> &'a SeasonIndex {
        self.index
    }

    pub fn lineup(&self, team_id: &str) -> Option<&LineupSeason> {
        self.lineup.get(team_id)
    }

    pub fn dead_starts(&self, team_id: &str) -> Option<&DeadStartSummary> {
        self.byes.get(team_id)
    }

    pub fn waivers(&self, team_id: &str) -> Option<&WaiverSummary> {
        self.waivers.get(team_id)
    }

    pub fn draft(&self) -> &Availability<DraftAnalysis> {
        &self.draft
    }

    pub fn team_draft(&self, team_id: &str) -> Option<&TeamDraftReport> {
        self.draft.value().and_then(|d| d.team(team_id))
    }

    pub fn weeks(&self) -> &LeagueWeeks {
        &self.weeks
    }

    /// Raw values of one metric family for every team that has it.
    pub fn metric_values(&self, family: MetricFamily) -> BTreeMap<TeamId, f64> {
        match family {
            MetricFamily::LineupEfficiency => self
                .lineup
                .iter()
                .map(|(id, s)| (id.clone(), s.efficiency_pct))
                .collect(),
            MetricFamily::DraftValue => self
                .draft
                .value()
                .map(|d| {
                    d.teams
                        .iter()
                        .map(|(id, t)| (id.clone(), t.draft_score))
                        .collect()
                })
                .unwrap_or_default(),
            MetricFamily::VorSurplus => self
                .draft
                .value()
                .map(|d| {
                    d.teams
                        .iter()
                        .map(|(id, t)| (id.clone(), t.vor.surplus))
                        .collect()
                })
                .unwrap_or_default(),
            MetricFamily::WaiverPoints => self
                .waivers
                .iter()
                .map(|(id, w)| (id.clone(), w.points_started))
                .collect(),
            MetricFamily::ByeWeekManagement => self
                .byes
                .iter()
                .map(|(id, b)| (id.clone(), b.dead_starts as f64))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 2: league report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamReport {
    pub team_id: TeamId,
    pub manager_name: String,
    pub team_name: String,
    pub lineup_efficiency: Availability<MetricReport<LineupSeason>>,
    pub draft: Availability<MetricReport<TeamDraftReport>>,
    pub vor_surplus: Availability<MetricRecord>,
    pub waiver: Availability<MetricReport<WaiverSummary>>,
    pub bye_weeks: Availability<MetricReport<DeadStartSummary>>,
    pub win_attribution: Availability<WinAttribution>,
}

impl TeamReport {
    /// The normalized record for a family, when available.
    pub fn record(&self, family: MetricFamily) -> Option<&MetricRecord> {
        match family {
            MetricFamily::LineupEfficiency => self.lineup_efficiency.value().map(|m| &m.record),
            MetricFamily::DraftValue => self.draft.value().map(|m| &m.record),
            MetricFamily::VorSurplus => self.vor_surplus.value(),
            MetricFamily::WaiverPoints => self.waiver.value().map(|m| &m.record),
            MetricFamily::ByeWeekManagement => self.bye_weeks.value().map(|m| &m.record),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueReport {
    pub league_name: String,
    pub num_teams: usize,
    pub regular_season_weeks: Vec<Week>,
    pub draft_mode: Option<DraftMode>,
    pub replacement_levels: Vec<ReplacementLevel>,
    pub teams: Vec<TeamReport>,
}

impl LeagueReport {
    pub fn team(&self, team_id: &str) -> Option<&TeamReport> {
        self.teams.iter().find(|t| t.team_id == team_id)
    }
}

/// Rank every metric family and build each team's report from the cache.
pub fn assemble(cache: &TeamMetricsCache<'_>, vor: &VorTable, config: &EngineConfig) -> LeagueReport {
    let index = cache.index();

    let standings: BTreeMap<MetricFamily, BTreeMap<TeamId, Standing>> = METRIC_FAMILIES
        .iter()
        .map(|&family| {
            let values = cache.metric_values(family);
            (family, rank_league(&values, family.direction()))
        })
        .collect();
    let standing =
        |family: MetricFamily, team_id: &str| standing_for(&standings, family, team_id);

    let draft_reason = match cache.draft() {
        Availability::Unavailable { reason } => reason.clone(),
        Availability::Available(_) => "team has no draft picks".to_string(),
    };

    let mut teams = Vec::with_capacity(index.teams().len());
    for team in index.teams() {
        let id = team.team_id.as_str();

        let lineup_efficiency = Availability::from_option(
            paired(
                MetricFamily::LineupEfficiency,
                standing(MetricFamily::LineupEfficiency, id),
                cache.lineup(id),
            ),
            "no roster weeks for this team",
        );
        let draft = Availability::from_option(
            paired(
                MetricFamily::DraftValue,
                standing(MetricFamily::DraftValue, id),
                cache.team_draft(id),
            ),
            draft_reason.clone(),
        );
        let vor_surplus = Availability::from_option(
            standing(MetricFamily::VorSurplus, id).map(|s| MetricRecord::new(MetricFamily::VorSurplus, s)),
            draft_reason.clone(),
        );
        let waiver = Availability::from_option(
            paired(
                MetricFamily::WaiverPoints,
                standing(MetricFamily::WaiverPoints, id),
                cache.waivers(id),
            ),
            "no transaction data",
        );
        let bye_weeks = Availability::from_option(
            paired(
                MetricFamily::ByeWeekManagement,
                standing(MetricFamily::ByeWeekManagement, id),
                cache.dead_starts(id),
            ),
            "no roster weeks for this team",
        );

        let inputs = AttributionInputs {
            draft: standing(MetricFamily::DraftValue, id),
            waiver: standing(MetricFamily::WaiverPoints, id),
        };
        let win_attribution = Availability::from_option(
            attribute_wins(index, id, cache.weeks(), inputs, &config.attribution),
            "no regular-season matchups with a recorded opponent",
        );
        if !win_attribution.is_available() {
            warn!("team '{}': win attribution unavailable", id);
        }

        teams.push(TeamReport {
            team_id: team.team_id.clone(),
            manager_name: team.manager_name.clone(),
            team_name: team.team_name.clone(),
            lineup_efficiency,
            draft,
            vor_surplus,
            waiver,
            bye_weeks,
            win_attribution,
        });
    }

    info!("League report assembled for {} teams", teams.len());

    LeagueReport {
        league_name: index.league().name.clone(),
        num_teams: index.team_count(),
        regular_season_weeks: index.regular_season_weeks(),
        draft_mode: cache.draft().value().map(|d| d.mode),
        replacement_levels: vor.levels().cloned().collect(),
        teams,
    }
}

fn standing_for<'s>(
    standings: &'s BTreeMap<MetricFamily, BTreeMap<TeamId, Standing>>,
    family: MetricFamily,
    team_id: &str,
) -> Option<&'s Standing> {
    standings.get(&family).and_then(|s| s.get(team_id))
}

fn paired<T: Clone>(
    family: MetricFamily,
    standing: Option<&Standing>,
    summary: Option<&T>,
) -> Option<MetricReport<T>> {
    Some(MetricReport {
        record: MetricRecord::new(family, standing?),
        summary: summary?.clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
