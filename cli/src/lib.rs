//! Shared plumbing for the `maxrate` binaries: logging, configuration
//! loading, input reading and the validator's verdicts.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use maxrate_core::protocol::parse_problem_and_claim;
use maxrate_core::validation::{reference_solver, validate, Rejection};
use maxrate_core::SolverConfig;

/// Logs go to stderr; `RUST_LOG` overrides the default level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Defaults, overlaid by `path` when given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SolverConfig> {
    let config = match path {
        Some(path) => SolverConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SolverConfig::default(),
    };
    debug!("configuration: {:?}", config);
    Ok(config)
}

/// Whole contents of `path`, or of stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).context("reading stdin")?;
            Ok(input)
        }
    }
}

/// Outcome of checking one problem-and-claim input.
#[derive(Debug)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
    /// Unreadable input, or no reference optimum to compare against
    Malformed(anyhow::Error),
}

impl Verdict {
    pub const ACCEPTED: u8 = 0;
    pub const REJECTED: u8 = 1;
    pub const MALFORMED: u8 = 2;

    pub fn exit_status(&self) -> u8 {
        match self {
            Verdict::Accepted => Self::ACCEPTED,
            Verdict::Rejected(_) => Self::REJECTED,
            Verdict::Malformed(_) => Self::MALFORMED,
        }
    }
}

impl From<Result<(), Rejection>> for Verdict {
    fn from(outcome: Result<(), Rejection>) -> Self {
        match outcome {
            Ok(()) => Verdict::Accepted,
            Err(Rejection::Reference(err)) => Verdict::Malformed(anyhow::Error::new(err).context("reference solve failed")),
            Err(rejection) => Verdict::Rejected(rejection),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::Rejected(rejection) => write!(f, "rejected: {}", rejection),
            Verdict::Malformed(err) => write!(f, "malformed: {:#}", err),
        }
    }
}

/// Parses a problem followed by a claim and judges the claim.
pub fn check_claim(input: &str, config: &SolverConfig) -> Verdict {
    let (cluster, claim) = match parse_problem_and_claim(input, config) {
        Ok(parsed) => parsed,
        Err(err) => return Verdict::Malformed(anyhow::Error::new(err).context("parsing problem and claim")),
    };
    let mut reference = reference_solver(&cluster, config);
    info!("checking claim {} against {}", claim.rate, reference.name());
    validate(&cluster, &claim, reference.as_mut()).into()
}
