use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pn_project::{ProjectResult, RunOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pn-cli")]
#[command(about = "pipenet CLI - gas/liquid pipe network scenarios", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Apply scripted events, tick, and print every network
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Number of ticks (defaults to the scenario's)
        #[arg(long)]
        ticks: Option<u32>,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
        /// Equilibrate networks in parallel
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            ticks,
            json,
            parallel,
        } => cmd_run(&scenario_path, RunOptions { ticks, parallel }, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(scenario_path: &Path) -> ProjectResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = pn_project::load(scenario_path)?;
    println!(
        "✓ Scenario '{}' is valid ({} networks, {} events, {} ticks)",
        scenario.name,
        scenario.networks.len(),
        scenario.events.len(),
        scenario.ticks
    );
    Ok(())
}

fn cmd_run(scenario_path: &Path, opts: RunOptions, json: bool) -> ProjectResult<()> {
    let scenario = pn_project::load(scenario_path)?;
    tracing::debug!(path = %scenario_path.display(), name = %scenario.name, "loaded scenario");
    let run = pn_project::run_scenario(&scenario, opts)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run.summary)?);
        return Ok(());
    }

    let summary = &run.summary;
    println!(
        "✓ {} after {} ticks ({} events applied, {} unconverged solves)",
        summary.scenario, summary.ticks, summary.events_applied, summary.unconverged
    );
    for volume in run.networks.registry().iter() {
        let segments: Vec<String> = volume.members().map(|(s, _)| s.to_string()).collect();
        println!();
        match volume.anchor() {
            Some(anchor) => println!("{} on {} [{}]", volume.id(), anchor, segments.join(", ")),
            None => println!("{} [{}]", volume.id(), segments.join(", ")),
        }
        println!("{}", volume.snapshot());
    }
    Ok(())
}
