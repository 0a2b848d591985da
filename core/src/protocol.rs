//! Text protocol
//!
//! Problems arrive as whitespace-separated integers:
//!
//! ```text
//! N M
//! fee_0 size_0
//! ...
//! a_0 b_0        (item a depends on item b)
//! ...
//! ```
//!
//! Solutions are written as two lines, `rate fee size` and
//! `count i_1 i_2 ...`, where `rate` is the float ratio or `NAN` for a zero
//! size. The validator reads a problem followed by a solution from the same
//! stream, so both readers share one [`TokenReader`].

use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

use crate::algorithm::traits::Solution;
use crate::config::SolverConfig;
use crate::data_structures::{Cluster, ClusterBuilder, ClusterError, FeeRate};
use crate::validation::Claim;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("input ended while reading {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("expected {expected}, found '{token}'")]
    InvalidToken { token: String, expected: &'static str },

    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// Cursor over the whitespace-separated tokens of one input.
#[derive(Debug, Clone)]
pub struct TokenReader<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> TokenReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: input.split_whitespace(),
        }
    }

    fn next_token(&mut self, expected: &'static str) -> Result<&'a str, ProtocolError> {
        self.tokens.next().ok_or(ProtocolError::UnexpectedEnd { expected })
    }

    fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ProtocolError> {
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| ProtocolError::InvalidToken {
            token: token.to_string(),
            expected,
        })
    }

    /// Reads one problem instance and validates it into a [`Cluster`].
    pub fn cluster(&mut self, config: &SolverConfig) -> Result<Cluster, ProtocolError> {
        let items: usize = self.next("item count")?;
        let pairs: usize = self.next("dependency count")?;
        if items > config.max_items {
            return Err(ClusterError::TooManyItems {
                count: items,
                max: config.max_items,
            }
            .into());
        }

        let mut builder = ClusterBuilder::new(config.max_items);
        for _ in 0..items {
            let fee = self.next("fee")?;
            let size = self.next("size")?;
            builder.item(fee, size);
        }
        for _ in 0..pairs {
            let child = self.next("dependent index")?;
            let parent = self.next("dependency index")?;
            builder.depends(child, parent);
        }
        Ok(builder.build()?)
    }

    /// Reads a printed solution back.
    ///
    /// The float rate is checked for syntax only; the exact `fee size` pair
    /// is what the claim carries.
    pub fn claim(&mut self) -> Result<Claim, ProtocolError> {
        let ratio = self.next_token("rate")?;
        if !ratio.eq_ignore_ascii_case("nan") && ratio.parse::<f64>().is_err() {
            return Err(ProtocolError::InvalidToken {
                token: ratio.to_string(),
                expected: "rate",
            });
        }
        let rate = FeeRate::new(self.next("claimed fee")?, self.next("claimed size")?);

        let count: usize = self.next("closure size")?;
        let indices = (0..count)
            .map(|_| self.next("closure index"))
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(Claim { rate, indices })
    }

    /// Fails if any token is left.
    pub fn finish(mut self) -> Result<(), ProtocolError> {
        match self.tokens.next() {
            Some(token) => Err(ProtocolError::TrailingInput(token.to_string())),
            None => Ok(()),
        }
    }
}

pub fn parse_cluster(input: &str, config: &SolverConfig) -> Result<Cluster, ProtocolError> {
    let mut reader = TokenReader::new(input);
    let cluster = reader.cluster(config)?;
    reader.finish()?;
    Ok(cluster)
}

pub fn parse_claim(input: &str) -> Result<Claim, ProtocolError> {
    let mut reader = TokenReader::new(input);
    let claim = reader.claim()?;
    reader.finish()?;
    Ok(claim)
}

/// A problem immediately followed by a claimed solution, as the validator
/// receives them.
pub fn parse_problem_and_claim(input: &str, config: &SolverConfig) -> Result<(Cluster, Claim), ProtocolError> {
    let mut reader = TokenReader::new(input);
    let cluster = reader.cluster(config)?;
    let claim = reader.claim()?;
    reader.finish()?;
    Ok((cluster, claim))
}

pub fn format_solution(solution: &Solution) -> String {
    let members: Vec<String> = solution.closure.iter().map(|item| item.to_string()).collect();
    let mut out = format!("{}\n{}", solution.rate, members.len());
    for member in &members {
        out.push(' ');
        out.push_str(member);
    }
    out.push('\n');
    out
}
