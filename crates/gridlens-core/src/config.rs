// Configuration loading and parsing (config/metrics.toml).
//
// Every field has a default, so a missing file or a partial file is valid.
// The defaults are the tuned constants the metrics were calibrated with.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::season::Position;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// metrics.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lineup: LineupConfig,
    pub replacement: ReplacementConfig,
    pub draft: DraftConfig,
    pub attribution: AttributionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineupConfig {
    /// Drop bench players ruled out (or parked in IR) from the optimal lineup.
    pub exclude_injured: bool,
    /// Injury statuses that mean the player could not have been started.
    pub out_statuses: Vec<String>,
}

impl Default for LineupConfig {
    fn default() -> Self {
        LineupConfig {
            exclude_injured: true,
            out_statuses: vec![
                "OUT".into(),
                "IR".into(),
                "INJURY_RESERVE".into(),
                "SUSPENSION".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplacementConfig {
    /// How many weeks to sample when estimating who fills flex slots.
    pub flex_sample_weeks: usize,
    /// Position -> share of flex slots, used when no flex starts are observed.
    pub default_flex_share: BTreeMap<String, f64>,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        let mut default_flex_share = BTreeMap::new();
        default_flex_share.insert("RB".into(), 0.45);
        default_flex_share.insert("WR".into(), 0.45);
        default_flex_share.insert("TE".into(), 0.10);
        ReplacementConfig {
            flex_sample_weeks: 4,
            default_flex_share,
        }
    }
}

impl ReplacementConfig {
    /// Default flex shares keyed by parsed position. Unknown keys are dropped
    /// (validation rejects them at load time).
    pub fn default_shares(&self) -> BTreeMap<Position, f64> {
        self.default_flex_share
            .iter()
            .filter_map(|(key, &share)| Position::from_str_pos(key).map(|pos| (pos, share)))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// $/point assigned to auction picks that scored nothing.
    pub zero_point_cost_ratio: f64,
    /// Minimum auction price for a pick to be considered a bust.
    pub min_bust_spend: u32,
    /// Rounds of difference needed to tag a snake pick as steal or bust.
    pub round_steal_threshold: i32,
    pub vor_steal_min: f64,
    pub vor_steal_min_round: u32,
    pub vor_bust_max_round: u32,
    /// Fraction of drafted players (by season points) eligible as "gold".
    pub gold_top_fraction: f64,
    pub gold_min_times_passed: usize,
    /// Length of every steals/busts/gold highlight list.
    pub highlight_count: usize,
}

impl Default for DraftConfig {
    fn default() -> Self {
        DraftConfig {
            zero_point_cost_ratio: 999.0,
            min_bust_spend: 10,
            round_steal_threshold: 2,
            vor_steal_min: 5.0,
            vor_steal_min_round: 4,
            vor_bust_max_round: 8,
            gold_top_fraction: 0.20,
            gold_min_times_passed: 2,
            highlight_count: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttributionConfig {
    /// Win-equivalents per draft rank above the league median.
    pub draft_rank_weight: f64,
    /// Waiver points per "unit" of waiver skill.
    pub waiver_points_divisor: f64,
    pub waiver_weight: f64,
    /// Margin under which a game counts as close.
    pub close_game_margin: f64,
    /// Multiplier for deviations in close games.
    pub close_game_weight: f64,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        AttributionConfig {
            draft_rank_weight: 0.15,
            waiver_points_divisor: 100.0,
            waiver_weight: 0.5,
            close_game_margin: 15.0,
            close_game_weight: 1.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate a metrics.toml document. `path` is only used for
/// error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load `config/metrics.toml` relative to `base_dir`. A missing file yields
/// the validated defaults.
pub fn load_config_from(base_dir: &Path) -> Result<EngineConfig, ConfigError> {
    let path = base_dir.join("config").join("metrics.toml");
    if !path.exists() {
        info!("No {} found, using default metric settings", path.display());
        return Ok(EngineConfig::default());
    }
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    parse_config(&text, &path)
}

/// Convenience wrapper: loads config relative to the current working directory.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let repl = &config.replacement;
    if repl.flex_sample_weeks == 0 {
        return Err(ConfigError::ValidationError {
            field: "replacement.flex_sample_weeks".into(),
            message: "must be greater than 0".into(),
        });
    }
    for (key, &share) in &repl.default_flex_share {
        if Position::from_str_pos(key).is_none() {
            return Err(ConfigError::ValidationError {
                field: format!("replacement.default_flex_share.{key}"),
                message: "not a recognized position".into(),
            });
        }
        if !(0.0..=1.0).contains(&share) {
            return Err(ConfigError::ValidationError {
                field: format!("replacement.default_flex_share.{key}"),
                message: format!("must be between 0.0 and 1.0 inclusive, got {share}"),
            });
        }
    }

    let draft = &config.draft;
    if !(draft.zero_point_cost_ratio > 0.0) {
        return Err(ConfigError::ValidationError {
            field: "draft.zero_point_cost_ratio".into(),
            message: format!("must be > 0, got {}", draft.zero_point_cost_ratio),
        });
    }
    if draft.round_steal_threshold <= 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.round_steal_threshold".into(),
            message: format!("must be > 0, got {}", draft.round_steal_threshold),
        });
    }
    if !(draft.gold_top_fraction > 0.0 && draft.gold_top_fraction <= 1.0) {
        return Err(ConfigError::ValidationError {
            field: "draft.gold_top_fraction".into(),
            message: format!("must be in (0.0, 1.0], got {}", draft.gold_top_fraction),
        });
    }
    if draft.highlight_count == 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.highlight_count".into(),
            message: "must be greater than 0".into(),
        });
    }

    let attr = &config.attribution;
    let positive_fields: &[(&str, f64)] = &[
        ("attribution.draft_rank_weight", attr.draft_rank_weight),
        ("attribution.waiver_points_divisor", attr.waiver_points_divisor),
        ("attribution.waiver_weight", attr.waiver_weight),
        ("attribution.close_game_margin", attr.close_game_margin),
        ("attribution.close_game_weight", attr.close_game_weight),
    ];
    for (name, val) in positive_fields {
        if !(*val > 0.0) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<EngineConfig, ConfigError> {
        parse_config(text, Path::new("metrics.toml"))
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty config is valid");
        assert!(config.lineup.exclude_injured);
        assert_eq!(config.replacement.flex_sample_weeks, 4);
        assert_eq!(config.draft.min_bust_spend, 10);
        assert_eq!(config.attribution.draft_rank_weight, 0.15);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [draft]
            min_bust_spend = 25

            [attribution]
            close_game_margin = 10.0
            "#,
        )
        .expect("partial config is valid");
        assert_eq!(config.draft.min_bust_spend, 25);
        assert_eq!(config.draft.highlight_count, 3);
        assert_eq!(config.attribution.close_game_margin, 10.0);
        assert_eq!(config.attribution.close_game_weight, 1.5);
    }

    #[test]
    fn rejects_unknown_flex_position() {
        let err = parse(
            r#"
            [replacement.default_flex_share]
            LB = 0.5
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "replacement.default_flex_share.LB")
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_weights() {
        let err = parse("[attribution]\nwaiver_points_divisor = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = parse("[draft\nmin_bust_spend = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("gridlens-config-test-missing");
        let config = load_config_from(&dir).expect("defaults load");
        assert_eq!(config.draft.zero_point_cost_ratio, 999.0);
    }

    #[test]
    fn shipped_defaults_match_built_in_defaults() {
        let shipped = parse(include_str!("../../../defaults/metrics.toml"))
            .expect("defaults/metrics.toml is valid");
        let built_in = EngineConfig::default();
        assert_eq!(shipped.lineup.out_statuses, built_in.lineup.out_statuses);
        assert_eq!(
            shipped.replacement.default_flex_share,
            built_in.replacement.default_flex_share
        );
        assert_eq!(shipped.draft.gold_top_fraction, built_in.draft.gold_top_fraction);
        assert_eq!(shipped.draft.vor_bust_max_round, built_in.draft.vor_bust_max_round);
        assert_eq!(
            shipped.attribution.close_game_weight,
            built_in.attribution.close_game_weight
        );
    }

    #[test]
    fn default_shares_parse_positions() {
        let shares = ReplacementConfig::default().default_shares();
        assert_eq!(shares.get(&Position::RunningBack), Some(&0.45));
        assert_eq!(shares.get(&Position::TightEnd), Some(&0.10));
    }
}
