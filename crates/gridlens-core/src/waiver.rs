// Waiver-wire analysis: free-agent adds and what those players produced in
// the acquiring team's starting lineup.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::guard::safe_div;
use crate::season::{MovementType, PlayerId, SeasonIndex, TransactionKind};

/// The pickup that contributed the most started points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaiverPickup {
    pub player_id: PlayerId,
    pub player_name: String,
    pub points_started: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaiverSummary {
    /// Add movements into this team (trades excluded).
    pub adds: u32,
    /// Points the added players scored in weeks this team started them.
    pub points_started: f64,
    /// `points_started / adds`, 0 with no adds.
    pub points_per_add: f64,
    pub best_pickup: Option<WaiverPickup>,
}

/// Waiver summary for one team. `None` only when the league has no
/// transaction log at all; a team that never added anyone gets explicit
/// zeros.
pub fn team_waivers(index: &SeasonIndex, team_id: &str) -> Option<WaiverSummary> {
    if !index.has_transactions() {
        return None;
    }

    let mut adds = 0u32;
    let mut acquired: BTreeSet<&str> = BTreeSet::new();
    for txn in index.transactions_for_team(team_id) {
        if txn.kind != TransactionKind::Add {
            continue;
        }
        for movement in &txn.movements {
            if movement.movement == MovementType::Add
                && movement.to_team.as_deref() == Some(team_id)
            {
                adds += 1;
                acquired.insert(movement.player_id.as_str());
            }
        }
    }

    let mut points_started = 0.0;
    let mut best_pickup: Option<WaiverPickup> = None;
    for player_id in acquired {
        let drafted = index
            .picks_for_team(team_id)
            .iter()
            .any(|p| p.player_id == player_id);
        let started = started_points(index, team_id, player_id, drafted);
        points_started += started;
        if started > 0.0 && best_pickup.as_ref().map_or(true, |b| started > b.points_started) {
            best_pickup = Some(WaiverPickup {
                player_id: player_id.to_string(),
                player_name: index.display_name(player_id).to_string(),
                points_started: started,
            });
        }
    }

    Some(WaiverSummary {
        adds,
        points_started,
        points_per_add: safe_div(points_started, adds as f64, 0.0),
        best_pickup,
    })
}

/// Points a player scored in `team_id`'s regular-season starting lineup
/// after being picked up.
///
/// Transactions carry a timestamp but weeks carry no dates, so the pickup is
/// located by roster stints instead: a stint is a run of consecutive weeks on
/// this team's roster. When the team drafted the player, the stint opening
/// the season is the drafted one and does not count.
fn started_points(index: &SeasonIndex, team_id: &str, player_id: &str, drafted: bool) -> f64 {
    let mut total = 0.0;
    let mut first_week = true;
    let mut on_roster = false;
    let mut draft_stint = false;

    for (_, roster) in index.team_regular_weeks(team_id) {
        let here = roster.all_players().any(|p| p.player_id == player_id);
        if here && !on_roster {
            draft_stint = drafted && first_week;
        }
        if here && !draft_stint {
            total += roster
                .starters
                .iter()
                .find(|p| p.player_id == player_id)
                .map_or(0.0, |p| p.points);
        }
        on_roster = here;
        first_week = false;
    }
    total
}
