// Football positions and roster slot parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard fantasy-football positions used for replacement levels and the
/// expected-round model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Kicker,
    Defense,
}

/// Every standard position, in display order.
pub const STANDARD_POSITIONS: &[Position] = &[
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
    Position::Kicker,
    Position::Defense,
];

impl Position {
    /// Parse a position string into a Position enum.
    ///
    /// Handles platform abbreviations: "D/ST", "DST" and "D" all map to
    /// Defense, "PK" to Kicker. Returns `None` for slot names (FLEX, BE, IR)
    /// and for positions outside the standard set (IDP positions, etc.).
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "DEF" | "D/ST" | "DST" | "D" => Some(Position::Defense),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DEF",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Roster slots
// ---------------------------------------------------------------------------

/// The flavours of flexible starting slot a league can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlexKind {
    /// RB/WR/TE
    Standard,
    /// QB/RB/WR/TE
    Super,
    /// RB/WR
    WrRb,
    /// WR/TE
    Receiver,
}

impl FlexKind {
    /// Positions allowed to fill this flex slot.
    pub fn eligible(&self) -> &'static [Position] {
        match self {
            FlexKind::Standard => &[
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
            FlexKind::Super => &[
                Position::Quarterback,
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
            FlexKind::WrRb => &[Position::RunningBack, Position::WideReceiver],
            FlexKind::Receiver => &[Position::WideReceiver, Position::TightEnd],
        }
    }
}

/// A parsed roster slot name (the `slot` of a player entry, or a key of the
/// league's roster position configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterSlot {
    Dedicated(Position),
    Flex(FlexKind),
    Bench,
    Reserve,
    /// Anything the engine does not model (IDP slots, taxi squads, ...).
    Other,
}

impl RosterSlot {
    /// Parse a slot string. Never fails; unknown names become `Other`.
    pub fn parse(s: &str) -> Self {
        if let Some(pos) = Position::from_str_pos(s) {
            return RosterSlot::Dedicated(pos);
        }
        match s.trim().to_uppercase().as_str() {
            "FLEX" | "RB/WR/TE" | "W/R/T" => RosterSlot::Flex(FlexKind::Standard),
            "SUPER_FLEX" | "SUPERFLEX" | "OP" | "Q/W/R/T" => RosterSlot::Flex(FlexKind::Super),
            "WRRB_FLEX" | "RB/WR" | "W/R" => RosterSlot::Flex(FlexKind::WrRb),
            "REC_FLEX" | "WR/TE" | "W/T" => RosterSlot::Flex(FlexKind::Receiver),
            "BE" | "BN" | "BENCH" => RosterSlot::Bench,
            "IR" | "IL" | "RES" => RosterSlot::Reserve,
            _ => RosterSlot::Other,
        }
    }

    /// Whether a player in this slot counts toward the team score.
    pub fn is_starting(&self) -> bool {
        matches!(self, RosterSlot::Dedicated(_) | RosterSlot::Flex(_))
    }
}
