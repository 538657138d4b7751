//! Static equilibrium CLI.
//!
//! Loads a TOML scenario (see `scenarios/`) and runs one kind of query:
//! - `robustness`: robustness of every listed and sampled CoM
//! - `check`: half-space membership of the same CoMs
//! - `line`: extremal CoM along the scenario's line
//! - `info`: print crate versions and available algorithms

mod scenario;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stance_core::types::Algorithm;
use stance_equilibrium::StaticEquilibrium;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::scenario::{ScenarioConfig, ScenarioError};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Robust static equilibrium queries for multi-contact rigid bodies.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the robustness of each query CoM.
    Robustness {
        /// Scenario file.
        scenario: PathBuf,

        /// Override the scenario's algorithm.
        #[arg(short, long, value_parser = parse_algorithm)]
        algorithm: Option<Algorithm>,
    },

    /// Test each query CoM against the half-space form of the wrench cone.
    Check {
        /// Scenario file.
        scenario: PathBuf,
    },

    /// Find the extremal CoM along the scenario's line.
    Line {
        /// Scenario file.
        scenario: PathBuf,

        /// Override the scenario's algorithm.
        #[arg(short, long, value_parser = parse_algorithm)]
        algorithm: Option<Algorithm>,

        /// Override the line's robustness threshold.
        #[arg(short, long)]
        e_max: Option<f64>,
    },

    /// Print crate information.
    Info,
}

fn parse_algorithm(value: &str) -> Result<Algorithm, String> {
    Algorithm::ALL
        .into_iter()
        .find(|a| a.label() == value)
        .ok_or_else(|| {
            let labels: Vec<_> = Algorithm::ALL.iter().map(|a| a.label()).collect();
            format!("unknown algorithm '{value}', expected one of: {}", labels.join(", "))
        })
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

/// Load the scenario and configure an engine with its contacts.
fn load(path: &Path, algorithm: Option<Algorithm>) -> Result<(ScenarioConfig, StaticEquilibrium), ScenarioError> {
    let scenario = ScenarioConfig::from_file(path)?;
    let algorithm = algorithm.unwrap_or(scenario.engine.algorithm);
    let mut engine = StaticEquilibrium::from_config(&scenario.engine)?;
    let (points, normals) = scenario.contacts();
    engine.set_new_contacts(&points, &normals, scenario.friction, algorithm)?;
    info!(
        "{}: {} contacts, {} generators, algorithm={algorithm}",
        engine.name(),
        points.len(),
        engine.generators().ncols()
    );
    Ok((scenario, engine))
}

fn run_robustness(path: &Path, algorithm: Option<Algorithm>) -> Result<(), ScenarioError> {
    let (scenario, engine) = load(path, algorithm)?;
    for com in scenario.query_points() {
        let outcome = engine.compute_equilibrium_robustness(&com)?;
        match outcome.value {
            Some(robustness) => println!(
                "com=[{:.4}, {:.4}, {:.4}] robustness={robustness:.6}",
                com.x, com.y, com.z
            ),
            None => println!(
                "com=[{:.4}, {:.4}, {:.4}] status={}",
                com.x, com.y, com.z, outcome.status
            ),
        }
    }
    Ok(())
}

fn run_check(path: &Path) -> Result<(), ScenarioError> {
    let (scenario, engine) = load(path, Some(Algorithm::PolytopeProjection))?;
    if let Some(hs) = engine.half_spaces() {
        info!("{} half-spaces", hs.len());
    }
    for com in scenario.query_points() {
        let outcome = engine.check_robust_equilibrium(&com, 0.0)?;
        println!(
            "com=[{:.4}, {:.4}, {:.4}] equilibrium={} status={}",
            com.x, com.y, com.z, outcome.value, outcome.status
        );
    }
    Ok(())
}

fn run_line(path: &Path, algorithm: Option<Algorithm>, e_max: Option<f64>) -> Result<(), ScenarioError> {
    let (scenario, engine) = load(path, algorithm)?;
    let Some(line) = &scenario.line else {
        return Err(ScenarioError::InvalidValue {
            field: "line".into(),
            message: "scenario has no [line] section".into(),
        });
    };
    let e_max = e_max.unwrap_or(line.e_max);
    let outcome = engine.find_extremum_over_line(
        &line.direction.into(),
        &line.origin.into(),
        e_max,
    )?;
    let com = outcome.value;
    println!(
        "extremum com=[{:.4}, {:.4}, {:.4}] e_max={e_max} status={}",
        com.x, com.y, com.z, outcome.status
    );
    Ok(())
}

fn run_info() {
    println!("stance v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("algorithms:");
    for algorithm in Algorithm::ALL {
        let note = if algorithm.is_implemented() { "" } else { " (not implemented)" };
        println!("  {algorithm}{note}");
    }
    println!();
    println!("solvers:");
    println!("  clarabel");
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stance=info,stance_equilibrium=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Robustness {
            scenario,
            algorithm,
        } => run_robustness(&scenario, algorithm),
        Commands::Check { scenario } => run_check(&scenario),
        Commands::Line {
            scenario,
            algorithm,
            e_max,
        } => run_line(&scenario, algorithm, e_max),
        Commands::Info => {
            run_info();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_algorithm_labels() {
        for algorithm in Algorithm::ALL {
            assert_eq!(parse_algorithm(algorithm.label()), Ok(algorithm));
        }
        assert!(parse_algorithm("simplex").is_err());
    }

    #[test]
    fn line_subcommand_arguments() {
        let cli = Cli::try_parse_from([
            "stance",
            "line",
            "scenario.toml",
            "--algorithm",
            "dual_lp",
            "--e-max",
            "0.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Line {
                algorithm, e_max, ..
            } => {
                assert_eq!(algorithm, Some(Algorithm::DualLp));
                assert_eq!(e_max, Some(0.5));
            }
            _ => panic!("expected line subcommand"),
        }
    }

    #[test]
    fn bundled_square_scenario_runs() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/square.toml");
        let (scenario, engine) = load(&path, None).unwrap();
        let center = scenario.query_points()[0];
        let outcome = engine.compute_equilibrium_robustness(&center).unwrap();
        assert!(outcome.value.unwrap() > 0.0);
        assert!(run_check(&path).is_ok());
        assert!(run_line(&path, Some(Algorithm::DualLp), None).is_ok());
    }
}
