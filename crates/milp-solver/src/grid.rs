use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::GridSearchConfig;
use crate::problem::MilpProblem;
use crate::solution::Solution;
use crate::solver::{LpSolver, SolverError};

/// Counters from the most recent solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Complete points whose constraints were evaluated
    pub points_evaluated: u64,
    /// Points that satisfied every constraint
    pub feasible_points: u64,
    /// Times the incumbent improved
    pub improvements: u64,
}

/// Bounded grid-search solver for the LP relaxation of small problems.
///
/// Integrality annotations are ignored. Up to `max_grid_vars` variables the
/// full `(steps + 1)^n` grid is enumerated; larger problems are evaluated at a
/// single bound-derived point without any search. Both paths are
/// resolution-limited: an off-grid optimum may be missed or reported as
/// infeasible.
pub struct GridSearchSolver {
    config: GridSearchConfig,
    problem: MilpProblem,
    last_stats: SearchStats,
}

impl Default for GridSearchSolver {
    fn default() -> Self {
        Self {
            config: GridSearchConfig::default(),
            problem: MilpProblem::default(),
            last_stats: SearchStats::default(),
        }
    }
}

impl GridSearchSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GridSearchConfig) -> Result<Self, SolverError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &GridSearchConfig {
        &self.config
    }

    /// The private snapshot the next solve will use.
    pub fn problem(&self) -> &MilpProblem {
        &self.problem
    }

    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    /// Fallback for large problems: one heuristic point, no search.
    fn solve_single_point(&self, problem: &MilpProblem) -> (Solution, SearchStats) {
        let x: Vec<f64> = problem
            .vars
            .iter()
            .map(|v| match (v.lb.is_finite(), v.ub.is_finite()) {
                (true, true) => 0.5 * (v.lb + v.ub),
                (true, false) => v.lb,
                (false, true) => v.ub,
                (false, false) => 0.0,
            })
            .collect();

        let feasible = problem
            .cons
            .iter()
            .all(|c| c.is_satisfied(&x, self.config.tolerance));
        let obj_value = directed(problem, problem.objective_value(&x));

        let stats = SearchStats {
            points_evaluated: 1,
            feasible_points: u64::from(feasible),
            improvements: 0,
        };
        (
            Solution {
                x,
                obj_value,
                feasible,
            },
            stats,
        )
    }

    fn solve_grid(&self, problem: &MilpProblem) -> (Solution, SearchStats) {
        let mut search = GridSearch::new(problem, &self.config);
        search.descend(0);
        (search.best, search.stats)
    }
}

impl LpSolver for GridSearchSolver {
    fn name(&self) -> &str {
        "grid-search"
    }

    fn load_problem(&mut self, problem: &MilpProblem) -> Result<(), SolverError> {
        problem.validate()?;
        self.problem = problem.clone();

        debug!(
            component = "solver",
            operation = "load_problem",
            status = "success",
            name = %self.problem.name,
            variables = self.problem.num_vars() as u64,
            constraints = self.problem.num_cons() as u64,
            integer_variables = self.problem.num_integer_vars() as u64,
            "Loaded problem snapshot"
        );
        Ok(())
    }

    fn set_time_limit(&mut self, seconds: f64) {
        // The grid is bounded up front, so the limit is recorded but never consulted.
        if seconds.is_nan() || seconds < 0.0 {
            warn!(
                component = "solver",
                operation = "set_time_limit",
                seconds,
                "Ignoring invalid time limit"
            );
            return;
        }
        self.config.time_limit = if seconds.is_finite() { Some(seconds) } else { None };
    }

    fn solve(&mut self) -> Solution {
        let started = Instant::now();
        let n = self.problem.num_vars();

        let (strategy, (solution, stats)) = if n == 0 {
            ("empty", (Solution::empty_optimal(), SearchStats::default()))
        } else if n > self.config.max_grid_vars {
            ("single_point", self.solve_single_point(&self.problem))
        } else {
            ("grid", self.solve_grid(&self.problem))
        };
        self.last_stats = stats;

        debug!(
            component = "solver",
            operation = "solve",
            strategy,
            variables = n as u64,
            points_evaluated = stats.points_evaluated,
            feasible_points = stats.feasible_points,
            feasible = solution.feasible,
            objective = solution.obj_value,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Solve finished"
        );

        solution
    }
}

/// Objective in minimize sense.
fn directed(problem: &MilpProblem, raw: f64) -> f64 {
    if problem.minimize { raw } else { -raw }
}

/// Depth-first enumeration state. `current` is the single candidate buffer
/// reused across the whole walk.
struct GridSearch<'a> {
    problem: &'a MilpProblem,
    steps: usize,
    tolerance: f64,
    /// Search-box lower corner per variable
    origin: Vec<f64>,
    /// Grid spacing per variable
    step: Vec<f64>,
    current: Vec<f64>,
    best: Solution,
    stats: SearchStats,
}

impl<'a> GridSearch<'a> {
    fn new(problem: &'a MilpProblem, config: &GridSearchConfig) -> Self {
        let n = problem.num_vars();
        let mut origin = Vec::with_capacity(n);
        let mut step = Vec::with_capacity(n);

        for var in &problem.vars {
            let lo = if var.lb.is_finite() { var.lb } else { -config.default_bound };
            let hi = if var.ub.is_finite() { var.ub } else { config.default_bound };
            let width = (hi - lo) / config.steps as f64;
            origin.push(lo);
            step.push(if width > 0.0 { width } else { 1.0 });
        }

        Self {
            problem,
            steps: config.steps,
            tolerance: config.tolerance,
            origin,
            step,
            current: vec![0.0; n],
            best: Solution::unsolved(n),
            stats: SearchStats::default(),
        }
    }

    fn descend(&mut self, depth: usize) {
        if depth == self.current.len() {
            self.evaluate();
            return;
        }

        let var = &self.problem.vars[depth];
        let (lb, ub) = (var.lb, var.ub);

        for s in 0..=self.steps {
            let value = self.origin[depth] + s as f64 * self.step[depth];
            // Candidates ascend: below lb may still reach it, above ub never returns.
            if value < lb - self.tolerance {
                continue;
            }
            if value > ub + self.tolerance {
                break;
            }
            self.current[depth] = value;
            self.descend(depth + 1);
        }
    }

    fn evaluate(&mut self) {
        self.stats.points_evaluated += 1;

        let tolerance = self.tolerance;
        let current = &self.current;
        if !self.problem.cons.iter().all(|c| c.is_satisfied(current, tolerance)) {
            return;
        }
        self.stats.feasible_points += 1;

        let value = directed(self.problem, self.problem.objective_value(current));
        // Strict: ties keep the first point visited.
        if value < self.best.obj_value {
            self.best.obj_value = value;
            self.best.x.clone_from(current);
            self.best.feasible = true;
            self.stats.improvements += 1;
            trace!(
                component = "solver",
                operation = "grid_search",
                objective = value,
                points_evaluated = self.stats.points_evaluated,
                "Incumbent improved"
            );
        }
    }
}
