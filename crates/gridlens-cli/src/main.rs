// gridlens batch runner.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout stays clean JSON)
// 2. Load config/metrics.toml, or defaults
// 3. Load the season file named on the command line
// 4. Build the engine and generate the league report
// 5. Print the report as pretty JSON

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;

use gridlens_core::config;
use gridlens_core::MetricsEngine;

const USAGE: &str = "usage: gridlens <season.json> [config-dir]";

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    let mut args = std::env::args().skip(1);
    let Some(season_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let config_dir = args.next().map(PathBuf::from);

    // 2. Load config
    let config = match &config_dir {
        Some(dir) => config::load_config_from(dir),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;

    // 3-4. Load the season and run the engine
    let engine = MetricsEngine::from_json_file(&season_path, config)
        .with_context(|| format!("failed to load season from {}", season_path.display()))?;
    let report = engine.generate_report();
    info!(
        "Report generated for '{}' ({} teams)",
        report.league_name,
        report.teams.len()
    );

    // 5. Print
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridlens=info,gridlens_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
