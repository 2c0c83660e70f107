//! Grid-search solver configuration.

use crate::solver::SolverError;

/// Default number of grid intervals per dimension.
pub const DEFAULT_STEPS: usize = 50;
/// Default largest variable count that is searched on the grid.
pub const DEFAULT_MAX_GRID_VARS: usize = 6;
/// Default symmetric feasibility tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;
/// Default half-width of the search box used in place of infinite bounds.
pub const DEFAULT_BOUND: f64 = 10.0;

/// Configuration for [`GridSearchSolver`](crate::GridSearchSolver).
///
/// The resolution/tolerance trade-off lives here: more `steps` find points
/// closer to the true optimum at `O((steps + 1)^n)` cost.
///
/// # Examples
///
/// ```
/// use milp_solver::GridSearchConfig;
///
/// let config = GridSearchConfig::default()
///     .with_steps(100)
///     .with_max_grid_vars(4)
///     .with_tolerance(1e-7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchConfig {
    /// Equal intervals per dimension; each dimension gets `steps + 1` candidates.
    pub steps: usize,

    /// Problems with more variables than this skip the grid and evaluate a
    /// single bound-derived point.
    pub max_grid_vars: usize,

    /// Symmetric tolerance for constraint checks and bound pruning.
    pub tolerance: f64,

    /// Infinite bounds are searched as `[-default_bound, default_bound]`.
    pub default_bound: f64,

    /// Advisory time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            max_grid_vars: DEFAULT_MAX_GRID_VARS,
            tolerance: DEFAULT_TOLERANCE,
            default_bound: DEFAULT_BOUND,
            time_limit: None,
        }
    }
}

impl GridSearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_max_grid_vars(mut self, n: usize) -> Self {
        self.max_grid_vars = n;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_default_bound(mut self, bound: f64) -> Self {
        self.default_bound = bound;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.steps == 0 {
            return Err(SolverError::InvalidConfig("steps must be at least 1".into()));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.default_bound.is_finite() || self.default_bound <= 0.0 {
            return Err(SolverError::InvalidConfig(format!(
                "default_bound must be finite and positive, got {}",
                self.default_bound
            )));
        }
        if let Some(limit) = self.time_limit {
            if limit.is_nan() || limit < 0.0 {
                return Err(SolverError::InvalidConfig(format!(
                    "time_limit must be non-negative, got {limit}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridSearchConfig::default();
        assert_eq!(config.steps, 50);
        assert_eq!(config.max_grid_vars, 6);
        assert!((config.tolerance - 1e-9).abs() < 1e-20);
        assert_eq!(config.default_bound, 10.0);
        assert_eq!(config.time_limit, None);
    }

    #[test]
    fn test_validate_ok() {
        assert!(GridSearchConfig::default().validate().is_ok());
        assert!(GridSearchConfig::default().with_tolerance(0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_zero_steps() {
        assert!(GridSearchConfig::default().with_steps(0).validate().is_err());
    }

    #[test]
    fn test_validate_bad_tolerance() {
        assert!(GridSearchConfig::default().with_tolerance(-1.0).validate().is_err());
        assert!(GridSearchConfig::default().with_tolerance(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_bad_default_bound() {
        assert!(GridSearchConfig::default().with_default_bound(0.0).validate().is_err());
        assert!(
            GridSearchConfig::default()
                .with_default_bound(f64::INFINITY)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_negative_time_limit() {
        let config = GridSearchConfig::default().with_time_limit(-5.0);
        assert!(matches!(config.validate(), Err(SolverError::InvalidConfig(_))));
    }
}
