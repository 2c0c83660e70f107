use std::fs::File;

use milp_solver::{Constraint, MilpProblem, Variable};
use thiserror::Error;
use tracing::{debug, warn};

/// Source key that selects the built-in demo instance.
pub const DEMO_KEY: &str = "example";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("Cannot open file {path}: {reason}")]
    NotFound { path: String, reason: String },
    #[error("Unsupported problem format: {path} (use 'example' for the demo instance, or read MPS files with MpsReader)")]
    UnsupportedFormat { path: String },
}

/// Turns a source string into a populated problem.
///
/// Only the canned demo instance is understood here; any real file is
/// reported as unsupported rather than silently producing an empty problem.
pub struct ProblemReader;

impl ProblemReader {
    /// Load `source` into `out`.
    ///
    /// `""` and `"example"` append the demo instance and always succeed. A
    /// path is never parsed: a missing file gives [`IngestError::NotFound`],
    /// an existing one [`IngestError::UnsupportedFormat`]. `out` is left
    /// untouched on failure.
    pub fn load(source: &str, out: &mut MilpProblem) -> Result<(), IngestError> {
        if source.is_empty() || source == DEMO_KEY {
            append_demo(out);
            debug!(
                component = "ingest",
                operation = "load",
                status = "success",
                source = DEMO_KEY,
                variables = out.num_vars() as u64,
                constraints = out.num_cons() as u64,
                "Loaded demo instance"
            );
            return Ok(());
        }

        if let Err(e) = File::open(source) {
            warn!(
                component = "ingest",
                operation = "load",
                status = "error",
                path = source,
                error = %e,
                "Cannot open problem file"
            );
            return Err(IngestError::NotFound {
                path: source.to_string(),
                reason: e.to_string(),
            });
        }

        warn!(
            component = "ingest",
            operation = "load",
            status = "error",
            path = source,
            "Problem file format not supported"
        );
        Err(IngestError::UnsupportedFormat {
            path: source.to_string(),
        })
    }

    /// Load `source` into a fresh problem.
    pub fn read(source: &str) -> Result<MilpProblem, IngestError> {
        let mut problem = MilpProblem::default();
        Self::load(source, &mut problem)?;
        Ok(problem)
    }

    /// The demo instance on its own.
    pub fn demo_problem() -> MilpProblem {
        let mut problem = MilpProblem::default();
        append_demo(&mut problem);
        problem
    }
}

/// minimize x0 + 2*x1  s.t.  x0 + 2*x1 >= 3,  0 <= x0, x1 <= 10
fn append_demo(out: &mut MilpProblem) {
    out.name = "demo_example".to_string();
    let x0 = out.add_variable(Variable::continuous(0.0, 10.0).with_name("x0"));
    let x1 = out.add_variable(Variable::continuous(0.0, 10.0).with_name("x1"));
    out.set_obj_coef(x0, 1.0);
    out.set_obj_coef(x1, 2.0);
    out.add_constraint(Constraint::new(vec![(x0, 1.0), (x1, 2.0)], 3.0, f64::INFINITY).with_name("c0"));
}
