// parcast entry point.
//
// Run sequence:
// 1. Initialize tracing (stderr)
// 2. Parse CLI arguments
// 3. Load the league config (explicit file, or bootstrapped config/league.toml)
// 4. Load projection CSVs for the requested sources and kinds
// 5. Load the league export and player id map when given
// 6. Augment: blend, score, PAR, auction values, ranks
// 7. Write dated CSV files and print their paths

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use valuation_assistant::cli::Args;
use valuation_assistant::config;
use valuation_assistant::model::StatKind;
use valuation_assistant::output::writer::write_projections_file;
use valuation_assistant::pipeline::{self, PipelineOptions};
use valuation_assistant::projections::loader;
use valuation_assistant::projections::table::ProjectionTable;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;

    // 2. Parse CLI arguments
    let args = Args::parse();
    info!("parcast starting up");

    // 3. Load the league config
    let league = match &args.league_file {
        Some(path) => Some(
            config::load_league_file(path)
                .with_context(|| format!("failed to load league file {}", path.display()))?,
        ),
        None => {
            let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
            match config::load_default_league(&base_dir) {
                Ok(league) => league,
                Err(config::ConfigError::DefaultsCopyError { message }) => {
                    warn!(message, "no config bootstrap available; running without a league");
                    None
                }
                Err(e) => {
                    return Err(e).context("failed to load default league config");
                }
            }
        }
    };
    match &league {
        Some(league) => info!(league = %league.name, "league config loaded"),
        None => info!("no league config; projections will not be scored"),
    }

    // 4. Load projection CSVs
    let ros = args.rest_of_season;
    let source_ids: Vec<String> = args
        .sources()
        .iter()
        .map(|s| s.tag(ros).to_string())
        .collect();
    let kinds = args.kinds();

    let mut bat = load_kind(&args, &source_ids, &kinds, StatKind::Batting)?;
    let mut pit = load_kind(&args, &source_ids, &kinds, StatKind::Pitching)?;
    info!(
        bat_rows = bat.rows.len(),
        pit_rows = pit.rows.len(),
        "projections loaded"
    );

    // 5. Load the league export and player id map
    let export = match &args.league_export {
        Some(path) => {
            let mut export = loader::load_league_export(path)
                .with_context(|| format!("failed to load league export {}", path.display()))?;
            if let Some(map_path) = &args.player_id_map {
                let id_map = loader::load_player_id_map(map_path).with_context(|| {
                    format!("failed to load player id map {}", map_path.display())
                })?;
                export.resolve_ids(&id_map);
            }
            info!(rows = export.rows.len(), "league export loaded");
            Some(export)
        }
        None => None,
    };

    // 6. Augment
    let options = PipelineOptions {
        include_bench: !args.exclude_bench,
        ros,
        power_factor: args.power_factor,
    };
    pipeline::augment_projections(&mut bat, &mut pit, league.as_ref(), export.as_ref(), &options);

    // 7. Write output files
    let league_name = league
        .as_ref()
        .map(|l| l.name.as_str())
        .filter(|name| !name.is_empty());
    let custom = ros.then_some("ros");
    for kind in &kinds {
        let table = match kind {
            StatKind::Batting => &bat,
            StatKind::Pitching => &pit,
        };
        let path = write_projections_file(table, &args.output_dir, league_name, custom)
            .with_context(|| format!("failed to write {} projections", kind.id()))?;
        println!("{}", path.display());
    }

    info!("parcast finished");
    Ok(())
}

fn load_kind(
    args: &Args,
    source_ids: &[String],
    kinds: &[StatKind],
    kind: StatKind,
) -> anyhow::Result<ProjectionTable> {
    if !kinds.contains(&kind) {
        return Ok(ProjectionTable::new(kind));
    }
    loader::load_projection_dir(&args.data_dir, source_ids, kind).with_context(|| {
        format!(
            "failed to load {} projections from {}",
            kind.id(),
            args.data_dir.display()
        )
    })
}

/// Initialize tracing to stderr, so stdout stays clean for the output paths.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("valuation_assistant=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
