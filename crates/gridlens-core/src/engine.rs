// Metrics engine: owns the season index and the VOR table for one season.
//
// Reloading season data means building a new engine; nothing computed from
// the old data survives that.

use std::path::Path;

use tracing::info;

use crate::config::EngineConfig;
use crate::lineup::{optimal_lineup, LineupResult};
use crate::report::{assemble, LeagueReport, TeamMetricsCache};
use crate::season::{Season, SeasonError, SeasonIndex, Week};
use crate::valuation::vor::VorTable;

#[derive(Debug, Clone)]
pub struct MetricsEngine {
    index: SeasonIndex,
    vor: VorTable,
    config: EngineConfig,
}

impl MetricsEngine {
    /// Index the season and compute replacement levels. Fails only on data
    /// integrity errors (no teams, no weekly data).
    pub fn new(season: Season, config: EngineConfig) -> Result<Self, SeasonError> {
        let index = SeasonIndex::new(season)?;
        let vor = VorTable::build(&index, &config.replacement);
        info!(
            "Metrics engine ready: {} teams, {} weeks",
            index.teams().len(),
            index.weeks().len()
        );
        Ok(MetricsEngine { index, vor, config })
    }

    /// Load a season JSON file and build the engine.
    pub fn from_json_file(path: &Path, config: EngineConfig) -> Result<Self, SeasonError> {
        let season = Season::from_json_file(path)?;
        Self::new(season, config)
    }

    pub fn index(&self) -> &SeasonIndex {
        &self.index
    }

    pub fn vor_table(&self) -> &VorTable {
        &self.vor
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Optimal lineup for one team-week. `None` when the team has no roster
    /// that week.
    pub fn optimal_lineup(&self, team_id: &str, week: Week) -> Option<LineupResult> {
        self.index
            .roster_week(team_id, week)
            .map(|roster| optimal_lineup(roster, &self.config.lineup))
    }

    /// Run both phases and build the league report.
    pub fn generate_report(&self) -> LeagueReport {
        let cache = TeamMetricsCache::compute(&self.index, &self.vor, &self.config);
        assemble(&cache, &self.vor, &self.config)
    }
}
