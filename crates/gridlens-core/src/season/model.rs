// Season data contract: the in-memory shape produced by the ingestion layer.
//
// Field names follow the ingestion layer's camelCase JSON. Optional
// collections default to empty so that missing draft or transaction data
// surfaces later as an "unavailable" metric instead of a parse failure.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::index::SeasonError;
use super::position::{Position, RosterSlot};

pub type TeamId = String;
pub type PlayerId = String;
pub type Week = u32;

// ---------------------------------------------------------------------------
// Season root
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub league: LeagueInfo,
    #[serde(default)]
    pub teams: Vec<Team>,
    /// Roster-weeks keyed by team id, then week number.
    #[serde(default)]
    pub weekly_data: BTreeMap<TeamId, BTreeMap<Week, RosterWeek>>,
    #[serde(default)]
    pub draft: Vec<DraftPick>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Season {
    /// Parse a season from the ingestion layer's JSON.
    pub fn from_json_str(json: &str) -> Result<Self, SeasonError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a season JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, SeasonError> {
        let text = std::fs::read_to_string(path).map_err(|source| SeasonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueInfo {
    #[serde(default)]
    pub name: String,
    /// Declared team count. Zero means "use the number of teams".
    #[serde(default)]
    pub team_count: usize,
    /// Last completed week. Zero means "all weeks present".
    #[serde(default)]
    pub current_week: Week,
    #[serde(default)]
    pub playoff_start_week: Option<Week>,
    /// Roster slot name -> slots per team (e.g. "RB" -> 2, "FLEX" -> 1).
    #[serde(default)]
    pub roster_positions: BTreeMap<String, usize>,
    #[serde(default)]
    pub scoring_type: String,
    #[serde(default)]
    pub auction_budget: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: TeamId,
    #[serde(default)]
    pub manager_name: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub points_for: f64,
    #[serde(default)]
    pub points_against: f64,
    #[serde(default)]
    pub auction_budget: u32,
}

// ---------------------------------------------------------------------------
// Weekly rosters
// ---------------------------------------------------------------------------

/// One team's roster for one week.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterWeek {
    #[serde(default)]
    pub opponent_id: Option<TeamId>,
    #[serde(default)]
    pub starters: Vec<PlayerEntry>,
    #[serde(default)]
    pub bench: Vec<PlayerEntry>,
}

impl RosterWeek {
    /// Team score for the week: the sum of starter points.
    pub fn actual_points(&self) -> f64 {
        self.starters.iter().map(|p| p.points).sum()
    }

    /// Starters followed by bench, in roster order.
    pub fn all_players(&self) -> impl Iterator<Item = &PlayerEntry> {
        self.starters.iter().chain(self.bench.iter())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub eligible_positions: Vec<String>,
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub injury_status: Option<String>,
}

impl PlayerEntry {
    /// First recognizable standard position: eligibility list first, then the
    /// assigned slot.
    pub fn primary_position(&self) -> Option<Position> {
        self.eligible_positions
            .iter()
            .find_map(|p| Position::from_str_pos(p))
            .or_else(|| Position::from_str_pos(&self.slot))
    }

    pub fn roster_slot(&self) -> RosterSlot {
        RosterSlot::parse(&self.slot)
    }

    /// Whether the injury status is one of `out_statuses` (case-insensitive).
    pub fn is_ruled_out(&self, out_statuses: &[String]) -> bool {
        self.injury_status.as_deref().is_some_and(|status| {
            out_statuses
                .iter()
                .any(|out| out.eq_ignore_ascii_case(status.trim()))
        })
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPick {
    pub team_id: TeamId,
    pub round: u32,
    #[serde(default)]
    pub pick_in_round: u32,
    pub overall_pick: u32,
    pub player_id: PlayerId,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    /// Auction price. Zero (or $1 placeholders) in snake drafts.
    #[serde(default)]
    pub cost: u32,
    #[serde(default)]
    pub is_keeper: bool,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "waiver", alias = "free_agent")]
    Add,
    Drop,
    Trade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Add,
    Drop,
    Trade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    #[serde(default)]
    pub movements: Vec<PlayerMovement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMovement {
    pub player_id: PlayerId,
    #[serde(default)]
    pub player_name: Option<String>,
    pub movement: MovementType,
    #[serde(default)]
    pub from_team: Option<TeamId>,
    #[serde(default)]
    pub to_team: Option<TeamId>,
}
