mod config;
mod grid;
mod problem;
mod solution;
mod solver;

pub use config::{DEFAULT_BOUND, DEFAULT_MAX_GRID_VARS, DEFAULT_STEPS, DEFAULT_TOLERANCE, GridSearchConfig};
pub use grid::{GridSearchSolver, SearchStats};
pub use problem::{Constraint, MilpProblem, ProblemError, Variable};
pub use solution::Solution;
pub use solver::{LpSolver, SolverError};
