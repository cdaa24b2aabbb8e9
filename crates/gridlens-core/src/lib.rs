// Library root: re-exports all modules so integration tests and the CLI can
// access the crate's public API.

pub mod attribution;
pub mod availability;
pub mod byes;
pub mod config;
pub mod draft;
pub mod engine;
pub mod guard;
pub mod lineup;
pub mod ranking;
pub mod report;
pub mod season;
pub mod valuation;
pub mod waiver;

pub use availability::Availability;
pub use config::{load_config, load_config_from, EngineConfig};
pub use engine::MetricsEngine;
pub use report::{LeagueReport, MetricFamily, TeamReport};
pub use season::{Season, SeasonError};
