//! The capability contract every solver backend implements.

use thiserror::Error;

use crate::problem::{MilpProblem, ProblemError};
use crate::solution::Solution;

/// Errors raised while configuring a solver or loading a problem into it.
///
/// Solving itself never fails: an unsolved problem is reported through
/// [`Solution::feasible`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("[PROBLEM_INVALID] Invalid problem: {0}")]
    InvalidProblem(#[from] ProblemError),
    #[error("[CONFIG_INVALID] Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::InvalidProblem(_) => "PROBLEM_INVALID",
            SolverError::InvalidConfig(_) => "CONFIG_INVALID",
        }
    }
}

/// Trait for solver backends.
///
/// A backend keeps a private copy of the loaded problem, so the caller may
/// keep mutating its own instance after `load_problem` returns. The trait is
/// object safe; callers are expected to hold a `Box<dyn LpSolver>` and never
/// depend on a particular backend.
pub trait LpSolver {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Snapshot `problem` for the next solve, replacing any earlier snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidProblem`] if the problem breaks a
    /// structural invariant. The previous snapshot is kept in that case.
    fn load_problem(&mut self, problem: &MilpProblem) -> Result<(), SolverError>;

    /// Advisory wall-clock limit. Backends whose search is statically bounded
    /// may ignore it.
    fn set_time_limit(&mut self, seconds: f64);

    /// Solve the current snapshot (the empty problem if nothing was loaded).
    fn solve(&mut self) -> Solution;
}
