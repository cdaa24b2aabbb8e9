// Season data index: lookup tables built once from raw season data.
//
// Every other component reads season data through this index. It is
// immutable after construction.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::model::{
    DraftPick, LeagueInfo, PlayerId, RosterWeek, Season, Team, TeamId, Transaction, Week,
};
use super::position::Position;
use crate::guard::safe_div;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SeasonError {
    /// A required top-level collection is missing or empty. Fatal.
    #[error("data integrity error: {message}")]
    DataIntegrity { message: String },

    #[error("failed to read season file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse season data: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Derived per-player totals
// ---------------------------------------------------------------------------

/// Season-long scoring for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerSeasonPoints {
    pub total_points: f64,
    /// Weeks with nonzero points (byes and DNPs excluded).
    pub games_played: u32,
    /// `total_points / games_played`, 0 when no games were played.
    pub ppg: f64,
}

impl PlayerSeasonPoints {
    fn from_weeks(weeks: &BTreeMap<Week, f64>) -> Self {
        let total_points: f64 = weeks.values().sum();
        let games_played = weeks.values().filter(|&&p| p != 0.0).count() as u32;
        PlayerSeasonPoints {
            total_points,
            games_played,
            ppg: safe_div(total_points, games_played as f64, 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// SeasonIndex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SeasonIndex {
    season: Season,
    team_count: usize,
    weeks: Vec<Week>,
    points_by_player_week: HashMap<PlayerId, BTreeMap<Week, f64>>,
    season_points: HashMap<PlayerId, PlayerSeasonPoints>,
    player_names: HashMap<PlayerId, String>,
    player_positions: HashMap<PlayerId, Position>,
    draft: Vec<DraftPick>,
    picks_by_team: BTreeMap<TeamId, Vec<DraftPick>>,
    transactions_by_team: BTreeMap<TeamId, Vec<usize>>,
}

impl SeasonIndex {
    /// Build the index. Fails only when teams or weekly data are missing;
    /// absent draft and transaction data are valid states.
    pub fn new(season: Season) -> Result<Self, SeasonError> {
        if season.teams.is_empty() {
            return Err(SeasonError::DataIntegrity {
                message: "season has no teams".into(),
            });
        }
        let has_weeks = season.weekly_data.values().any(|weeks| !weeks.is_empty());
        if !has_weeks {
            return Err(SeasonError::DataIntegrity {
                message: "season has no weekly roster data".into(),
            });
        }

        let known_teams: HashSet<&str> = season.teams.iter().map(|t| t.team_id.as_str()).collect();
        for team_id in season.weekly_data.keys() {
            if !known_teams.contains(team_id.as_str()) {
                warn!("weekly data references unknown team '{}'", team_id);
            }
        }

        let team_count = if season.league.team_count > 0 {
            season.league.team_count
        } else {
            season.teams.len()
        };

        let mut weeks = BTreeSet::new();
        let mut points_by_player_week: HashMap<PlayerId, BTreeMap<Week, f64>> = HashMap::new();
        let mut player_names: HashMap<PlayerId, String> = HashMap::new();
        let mut player_positions: HashMap<PlayerId, Position> = HashMap::new();

        for (team_id, team_weeks) in &season.weekly_data {
            for (&week, roster) in team_weeks {
                weeks.insert(week);
                let mut seen: HashSet<&str> = HashSet::new();
                for entry in roster.all_players() {
                    if !seen.insert(entry.player_id.as_str()) {
                        warn!(
                            "player '{}' listed twice on team '{}' in week {}, keeping first",
                            entry.player_id, team_id, week
                        );
                        continue;
                    }
                    let player_weeks = points_by_player_week
                        .entry(entry.player_id.clone())
                        .or_default();
                    if player_weeks.contains_key(&week) {
                        debug!(
                            "player '{}' already recorded for week {}, ignoring team '{}'",
                            entry.player_id, week, team_id
                        );
                    } else {
                        player_weeks.insert(week, entry.points);
                    }
                    if !entry.name.is_empty() {
                        player_names
                            .entry(entry.player_id.clone())
                            .or_insert_with(|| entry.name.clone());
                    }
                    if let Some(pos) = entry.primary_position() {
                        player_positions.entry(entry.player_id.clone()).or_insert(pos);
                    }
                }
            }
        }

        let mut draft = season.draft.clone();
        draft.sort_by_key(|p| p.overall_pick);
        check_pick_sequence(&draft);

        let mut picks_by_team: BTreeMap<TeamId, Vec<DraftPick>> = BTreeMap::new();
        for pick in &draft {
            picks_by_team
                .entry(pick.team_id.clone())
                .or_default()
                .push(pick.clone());
            if let Some(name) = pick.player_name.as_ref().filter(|n| !n.is_empty()) {
                player_names
                    .entry(pick.player_id.clone())
                    .or_insert_with(|| name.clone());
            }
            if let Some(pos) = pick.position.as_deref().and_then(Position::from_str_pos) {
                player_positions.entry(pick.player_id.clone()).or_insert(pos);
            }
        }

        let mut transactions_by_team: BTreeMap<TeamId, Vec<usize>> = BTreeMap::new();
        for (idx, tx) in season.transactions.iter().enumerate() {
            let mut involved: BTreeSet<&str> = BTreeSet::new();
            for movement in &tx.movements {
                involved.extend(movement.from_team.as_deref());
                involved.extend(movement.to_team.as_deref());
                if let Some(name) = movement.player_name.as_ref().filter(|n| !n.is_empty()) {
                    player_names
                        .entry(movement.player_id.clone())
                        .or_insert_with(|| name.clone());
                }
            }
            for team_id in involved {
                transactions_by_team
                    .entry(team_id.to_string())
                    .or_default()
                    .push(idx);
            }
        }

        let season_points = points_by_player_week
            .iter()
            .map(|(id, weeks)| (id.clone(), PlayerSeasonPoints::from_weeks(weeks)))
            .collect();

        if draft.is_empty() {
            warn!("season has no draft data; draft metrics will be unavailable");
        }
        if season.transactions.is_empty() {
            warn!("season has no transactions; waiver metrics will be unavailable");
        }
        info!(
            "Season indexed: {} teams, {} weeks, {} players, {} picks, {} transactions",
            team_count,
            weeks.len(),
            points_by_player_week.len(),
            draft.len(),
            season.transactions.len()
        );

        Ok(SeasonIndex {
            season,
            team_count,
            weeks: weeks.into_iter().collect(),
            points_by_player_week,
            season_points,
            player_names,
            player_positions,
            draft,
            picks_by_team,
            transactions_by_team,
        })
    }

    // ---- League and teams ----

    pub fn league(&self) -> &LeagueInfo {
        &self.season.league
    }

    pub fn teams(&self) -> &[Team] {
        &self.season.teams
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.season.teams.iter().find(|t| t.team_id == team_id)
    }

    /// League size used for scarcity math: the declared team count, or the
    /// number of teams when none was declared.
    pub fn team_count(&self) -> usize {
        self.team_count
    }

    // ---- Weeks ----

    /// Every week that appears in the weekly data, ascending.
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    /// Whether `week` is a completed regular-season week.
    pub fn is_regular_season(&self, week: Week) -> bool {
        let league = &self.season.league;
        let before_playoffs = league.playoff_start_week.map_or(true, |start| week < start);
        let completed = league.current_week == 0 || week <= league.current_week;
        before_playoffs && completed
    }

    pub fn regular_season_weeks(&self) -> Vec<Week> {
        self.weeks
            .iter()
            .copied()
            .filter(|&w| self.is_regular_season(w))
            .collect()
    }

    // ---- Rosters ----

    pub fn roster_week(&self, team_id: &str, week: Week) -> Option<&RosterWeek> {
        self.season.weekly_data.get(team_id)?.get(&week)
    }

    /// A team's roster-weeks in week order. Empty for unknown teams.
    pub fn team_weeks(&self, team_id: &str) -> impl Iterator<Item = (Week, &RosterWeek)> {
        self.season
            .weekly_data
            .get(team_id)
            .into_iter()
            .flat_map(|weeks| weeks.iter().map(|(&w, r)| (w, r)))
    }

    /// A team's regular-season roster-weeks in week order. Every team-level
    /// metric reads this window.
    pub fn team_regular_weeks(&self, team_id: &str) -> impl Iterator<Item = (Week, &RosterWeek)> {
        self.team_weeks(team_id)
            .filter(move |&(week, _)| self.is_regular_season(week))
    }

    // ---- Players ----

    /// Points a player scored in a week; 0 when the player was not rostered.
    pub fn points(&self, player_id: &str, week: Week) -> f64 {
        self.points_by_player_week
            .get(player_id)
            .and_then(|weeks| weeks.get(&week))
            .copied()
            .unwrap_or(0.0)
    }

    /// Season totals; all zero for a player never seen on a roster.
    pub fn season_points(&self, player_id: &str) -> PlayerSeasonPoints {
        self.season_points
            .get(player_id)
            .copied()
            .unwrap_or_default()
    }

    /// Every player seen on any roster.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.points_by_player_week.keys()
    }

    /// First-seen name for a player.
    pub fn player_name(&self, player_id: &str) -> Option<&str> {
        self.player_names.get(player_id).map(String::as_str)
    }

    /// Display name, falling back to the id.
    pub fn display_name<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.player_name(player_id).unwrap_or(player_id)
    }

    pub fn player_position(&self, player_id: &str) -> Option<Position> {
        self.player_positions.get(player_id).copied()
    }

    // ---- Draft ----

    /// Draft picks ordered by overall pick number.
    pub fn draft(&self) -> &[DraftPick] {
        &self.draft
    }

    pub fn has_draft(&self) -> bool {
        !self.draft.is_empty()
    }

    pub fn picks_for_team(&self, team_id: &str) -> &[DraftPick] {
        self.picks_by_team
            .get(team_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ---- Transactions ----

    pub fn has_transactions(&self) -> bool {
        !self.season.transactions.is_empty()
    }

    /// Transactions in which the team sent or received a player.
    pub fn transactions_for_team(&self, team_id: &str) -> impl Iterator<Item = &Transaction> {
        self.transactions_by_team
            .get(team_id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.season.transactions[idx])
    }
}

/// Warn when overall pick numbers are not a gapless increasing sequence.
fn check_pick_sequence(draft: &[DraftPick]) {
    for pair in draft.windows(2) {
        let (prev, next) = (pair[0].overall_pick, pair[1].overall_pick);
        if next != prev + 1 {
            warn!(
                "draft pick sequence broken between overall picks {} and {}",
                prev, next
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
