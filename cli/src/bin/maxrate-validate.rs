//! Reads a problem followed by a claimed solution and checks the claim.
//!
//! Exit status: 0 accepted, 1 rejected, 2 unreadable input or configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use maxrate_cli::Verdict;

#[derive(Parser)]
#[command(name = "maxrate-validate")]
#[command(version)]
#[command(about = "Check a claimed maximum feerate closure against an independent solve")]
struct Cli {
    /// JSON solver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Problem and claim; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    maxrate_cli::init_logging();
    let cli = Cli::parse();

    let verdict = match maxrate_cli::load_config(cli.config.as_deref())
        .and_then(|config| Ok((maxrate_cli::read_input(cli.input.as_deref())?, config)))
    {
        Ok((input, config)) => maxrate_cli::check_claim(&input, &config),
        Err(err) => Verdict::Malformed(err),
    };

    match verdict {
        Verdict::Malformed(_) => eprintln!("{}", verdict),
        _ => println!("{}", verdict),
    }
    ExitCode::from(verdict.exit_status())
}
