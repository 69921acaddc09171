//! Shipfit - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use shipfit_core::catalog::FitSelection;
use shipfit_core::hull::generate_grid_from_hull;
use shipfit_core::session::FitSession;
use shipfit_tools::report::{
    parse_hull_class, render_bandwidth, render_fit, render_grid, render_stats, render_summary_ron,
    FitSummary,
};
use shipfit_tools::validate::{
    load_config_beside, validate_catalog_file, validate_data_directory, ToolError, ToolResult,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shipfit-tools")]
#[command(about = "Development tools for the ship fitting core")]
struct Cli {
    /// Catalog file used by the fit commands
    #[arg(long, global = true, default_value = "assets/data/catalog.ron")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Ron,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: String,
    },
    /// Generate and print a slot grid
    Generate {
        /// Hull class (frigate, destroyer, cruiser, capital)
        #[arg(long, default_value = "frigate")]
        size: String,
        /// Primary archetype id
        #[arg(long)]
        primary: Option<String>,
        /// Secondary system ids
        #[arg(long = "secondary")]
        secondaries: Vec<String>,
        /// Seed string
        #[arg(long, default_value = "")]
        seed: String,
        /// Stamp a fixed hull instead of generating
        #[arg(long, conflicts_with_all = ["primary", "secondaries"])]
        hull: Option<String>,
    },
    /// Print derived stats of a permalink
    Stats {
        /// Permalink code
        code: String,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Decode a permalink and show the fit
    Decode {
        /// Permalink code
        code: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {path}");
            validate_data_directory(Path::new(&path)).map(|()| tracing::info!("Validation passed"))
        }
        Commands::Generate {
            size,
            primary,
            secondaries,
            seed,
            hull,
        } => generate(&cli.catalog, &size, primary, secondaries, &seed, hull.as_deref()),
        Commands::Stats { code, format } => stats(&cli.catalog, &code, format),
        Commands::Decode { code } => decode(&cli.catalog, &code),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn generate(
    catalog_path: &Path,
    size: &str,
    primary: Option<String>,
    secondaries: Vec<String>,
    seed: &str,
    hull: Option<&str>,
) -> ToolResult<()> {
    let catalog = validate_catalog_file(catalog_path)?;

    if let Some(id) = hull {
        let hull = catalog.require_hull(id)?;
        print!("{}", render_grid(&generate_grid_from_hull(hull)));
        return Ok(());
    }

    let primary = primary
        .or_else(|| catalog.primaries.first().map(|p| p.id.clone()))
        .ok_or_else(|| ToolError::Argument("catalog has no primaries".to_string()))?;
    let selection = FitSelection {
        size: parse_hull_class(size)?,
        primary,
        secondaries,
    };
    let config = load_config_beside(catalog_path)?;
    let session = FitSession::new(&catalog, selection, seed, config)?;
    print!("{}", render_grid(session.grid()));
    println!("permalink: {}", session.permalink()?);
    Ok(())
}

fn stats(catalog_path: &Path, code: &str, format: Format) -> ToolResult<()> {
    let catalog = validate_catalog_file(catalog_path)?;
    let config = load_config_beside(catalog_path)?;
    let (session, dropped) = FitSession::from_permalink(&catalog, code, config)?;
    if !dropped.is_empty() {
        tracing::warn!(dropped = dropped.len(), "Permalink placements no longer fit");
    }

    let report = session.bandwidth();
    match format {
        Format::Text => {
            print!("{}", render_stats(session.stats()));
            print!("{}", render_bandwidth(&report));
        }
        Format::Ron => {
            let summary = FitSummary {
                seed: session.seed(),
                selection: session.selection(),
                stats: session.stats().to_named_map(),
                bandwidth: &report,
            };
            println!("{}", render_summary_ron(&summary)?);
        }
    }
    Ok(())
}

fn decode(catalog_path: &Path, code: &str) -> ToolResult<()> {
    let catalog = validate_catalog_file(catalog_path)?;
    let config = load_config_beside(catalog_path)?;
    let (session, dropped) = FitSession::from_permalink(&catalog, code, config)?;

    let selection = session.selection();
    println!(
        "{:?} / {} / [{}]",
        selection.size,
        selection.primary,
        selection.secondaries.join(", ")
    );
    print!("{}", render_grid(session.grid()));
    print!("{}", render_fit(session.grid(), session.placed(), session.registry()));
    for (index, placement) in session.placed().iter().enumerate() {
        println!(
            "[{index:>2}] {} at ({}, {}) rot {}",
            placement.module_id,
            placement.anchor.row,
            placement.anchor.col,
            placement.rotation.degrees()
        );
    }
    for drop in &dropped {
        println!(
            "dropped {} at ({}, {}): {:?}",
            drop.placement.module_id,
            drop.placement.anchor.row,
            drop.placement.anchor.col,
            drop.reason
        );
    }
    Ok(())
}
