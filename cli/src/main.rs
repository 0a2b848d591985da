use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;
use maxrate_core::{
    format_solution, parse_cluster, BruteForceSolver, ClosureSolver, FractionalSolver, ParametricSolver,
    RelabelPolicy, Solution,
};
use serde_json::json;

#[derive(Parser)]
#[command(name = "maxrate")]
#[command(version)]
#[command(about = "Maximum feerate closure of a dependency cluster")]
#[command(long_about = "Reads `N M`, N `fee size` lines and M `a b` dependency pairs (a depends on b), \
                        and prints the closure with the highest aggregate fee/size")]
struct Cli {
    /// Solving method
    #[arg(long, value_enum, default_value = "ggt")]
    method: Method,

    /// JSON solver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed-point scale for weight assignment (overrides the config)
    #[arg(long)]
    scale: Option<u64>,

    /// Relabel policy: increment or min-neighbor (overrides the config)
    #[arg(long)]
    relabel: Option<RelabelPolicy>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Problem file; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    /// Parametric push-relabel
    #[value(name = "ggt")]
    Ggt,
    /// Fractional programming
    #[value(name = "fp")]
    Fp,
    /// Exhaustive enumeration
    #[value(name = "bf")]
    Bf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

fn main() -> anyhow::Result<()> {
    maxrate_cli::init_logging();
    let cli = Cli::parse();

    let mut config = maxrate_cli::load_config(cli.config.as_deref())?;
    if let Some(scale) = cli.scale {
        config.scale = scale;
    }
    if let Some(relabel) = cli.relabel {
        config.relabel = relabel;
    }
    config.validate()?;

    let input = maxrate_cli::read_input(cli.input.as_deref())?;
    let cluster = parse_cluster(&input, &config).context("parsing problem")?;

    let mut solver: Box<dyn ClosureSolver> = match cli.method {
        Method::Ggt => Box::new(ParametricSolver::new(config.clone())),
        Method::Fp => Box::new(FractionalSolver::new(config.clone())),
        Method::Bf => Box::new(BruteForceSolver::from_config(&config)),
    };
    info!("solving {} items with {}: {}", cluster.len(), solver.name(), solver.description());
    let solution = solver
        .solve(&cluster)
        .with_context(|| format!("{} solver failed", solver.name()))?;

    match cli.format {
        OutputFormat::Text => print!("{}", format_solution(&solution)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report(solver.name(), &solution))?),
    }
    Ok(())
}

fn report(method: &str, solution: &Solution) -> serde_json::Value {
    json!({
        "method": method,
        "rate": solution.rate.as_f64(),
        "fee": solution.rate.fee,
        "size": solution.rate.size,
        "closure": solution.closure.to_vec(),
    })
}
