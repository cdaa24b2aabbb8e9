// Season data: input contract, positions, and the lookup index.

pub mod index;
pub mod model;
pub mod position;

pub use index::{PlayerSeasonPoints, SeasonError, SeasonIndex};
pub use model::{
    DraftPick, LeagueInfo, MovementType, PlayerEntry, PlayerId, PlayerMovement, RosterWeek,
    Season, Team, TeamId, Transaction, TransactionKind, Week,
};
pub use position::{FlexKind, Position, RosterSlot, STANDARD_POSITIONS};
