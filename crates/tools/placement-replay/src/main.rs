mod backend;
mod replay;
mod scenario;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use placement::PlacementConfig;
use tracing_subscriber::EnvFilter;

use crate::replay::{Replay, StepReport};
use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "placement-replay")]
#[command(about = "Replay scripted AR sessions through the placement controller", long_about = None)]
struct Cli {
    /// Log every state transition
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print the model transform after each step
    Run {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Placement config TOML file (defaults if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a placement config file
    Check {
        /// Placement config TOML file
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run { scenario, config } => run(&scenario, config.as_deref()),
        Commands::Check { config } => {
            let config = load_config(&config)?;
            println!("{:#?}", config);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<PlacementConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    PlacementConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))
}

fn run(scenario_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(scenario_path)
        .with_context(|| format!("Failed to read scenario {}", scenario_path.display()))?;
    let scenario = Scenario::from_toml_str(&content)?;

    let config = match config_path {
        Some(path) => load_config(path)?,
        None => PlacementConfig::default(),
    };

    let mut replay = Replay::new(&scenario, config).context("Failed to create controller")?;
    let reports = replay.run(&scenario.steps);

    println!(
        "{:>4}  {:<14} {:<10} {:<6} {:<28} {:>6}  visible",
        "step", "input", "state", "gesture", "position", "scale"
    );
    for report in &reports {
        print_report(report);
    }

    Ok(())
}

fn print_report(report: &StepReport) {
    let position = format!(
        "({:.3}, {:.3}, {:.3})",
        report.position.x, report.position.y, report.position.z
    );
    println!(
        "{:>4}  {:<14} {:<10} {:<6} {:<28} {:>6.3}  {}",
        report.index,
        report.label,
        report.state.to_string(),
        report.gesture.to_string(),
        position,
        report.scale,
        report.visible
    );
}
