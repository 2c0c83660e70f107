use std::fmt;

use thiserror::Error;

/// Reasons a problem cannot be handed to a solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Objective has {found} coefficients but the problem has {expected} variables")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Variable {index} ({name}) has invalid bounds [{lb}, {ub}]")]
    InvalidVariableBounds {
        index: usize,
        name: String,
        lb: f64,
        ub: f64,
    },
    #[error("Constraint {index} ({name}) has invalid bounds [{lb}, {ub}]")]
    InvalidConstraintBounds {
        index: usize,
        name: String,
        lb: f64,
        ub: f64,
    },
    #[error("Constraint {constraint} references variable {variable}, but only {num_vars} exist")]
    VariableOutOfRange {
        constraint: usize,
        variable: usize,
        num_vars: usize,
    },
    #[error("Non-finite coefficient {value} in {location}")]
    NonFiniteCoefficient { location: String, value: f64 },
}

/// A decision variable. Its identity is its index in the owning problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Lower bound (may be `-inf`)
    pub lb: f64,
    /// Upper bound (may be `+inf`)
    pub ub: f64,
    /// Integrality annotation; ignored by relaxation solvers
    pub is_integer: bool,
    /// Display name
    pub name: String,
}

impl Default for Variable {
    fn default() -> Self {
        Self {
            lb: 0.0,
            ub: f64::INFINITY,
            is_integer: false,
            name: String::new(),
        }
    }
}

impl Variable {
    pub fn continuous(lb: f64, ub: f64) -> Self {
        Self {
            lb,
            ub,
            ..Self::default()
        }
    }

    pub fn integer(lb: f64, ub: f64) -> Self {
        Self {
            lb,
            ub,
            is_integer: true,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A linear row `lb <= sum(coef * x[idx]) <= ub`.
///
/// Terms are kept in insertion order. A variable may appear more than once;
/// each occurrence contributes independently to the row activity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// `(variable_index, coefficient)` pairs
    pub terms: Vec<(usize, f64)>,
    /// Lower bound of the row range
    pub lb: f64,
    /// Upper bound of the row range
    pub ub: f64,
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            lb: f64::NEG_INFINITY,
            ub: f64::INFINITY,
            name: String::new(),
        }
    }
}

impl Constraint {
    pub fn new(terms: Vec<(usize, f64)>, lb: f64, ub: f64) -> Self {
        Self {
            terms,
            lb,
            ub,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Left-hand side value at `x`. Indices past the end of `x` contribute nothing.
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(idx, coef)| x.get(idx).map_or(0.0, |v| coef * v))
            .sum()
    }

    /// Double-sided range check with a symmetric tolerance.
    pub fn is_satisfied(&self, x: &[f64], tolerance: f64) -> bool {
        let lhs = self.activity(x);
        !(lhs + tolerance < self.lb || lhs - tolerance > self.ub)
    }
}

/// A mixed-integer linear program.
///
/// Built incrementally. Nothing is validated while building; call
/// [`MilpProblem::validate`] (solvers do this on load) to check the invariants.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MilpProblem {
    /// Variables, addressed by index
    pub vars: Vec<Variable>,
    /// Constraints, addressed by index
    pub cons: Vec<Constraint>,
    /// Dense objective coefficients, parallel to `vars`
    pub obj: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
    /// Problem name
    pub name: String,
}

impl Default for MilpProblem {
    fn default() -> Self {
        Self {
            vars: Vec::new(),
            cons: Vec::new(),
            obj: Vec::new(),
            minimize: true,
            name: String::new(),
        }
    }
}

impl MilpProblem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_cons(&self) -> usize {
        self.cons.len()
    }

    /// Append a variable with a zero objective coefficient and return its index.
    pub fn add_variable(&mut self, var: Variable) -> usize {
        self.vars.push(var);
        self.obj.push(0.0);
        self.vars.len() - 1
    }

    /// Append a constraint and return its index.
    pub fn add_constraint(&mut self, con: Constraint) -> usize {
        self.cons.push(con);
        self.cons.len() - 1
    }

    /// Set one objective coefficient. Out-of-range indices are ignored.
    pub fn set_obj_coef(&mut self, var: usize, coef: f64) {
        if let Some(slot) = self.obj.get_mut(var) {
            *slot = coef;
        }
    }

    pub fn obj_coef(&self, var: usize) -> Option<f64> {
        self.obj.get(var).copied()
    }

    pub fn set_minimize(&mut self, minimize: bool) {
        self.minimize = minimize;
    }

    /// Objective at `x` in the problem's own sense (not direction-adjusted).
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.obj.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// The LP relaxation: a copy with every integrality annotation dropped.
    pub fn relaxed(&self) -> MilpProblem {
        let mut relaxed = self.clone();
        for var in &mut relaxed.vars {
            var.is_integer = false;
        }
        relaxed
    }

    pub fn num_integer_vars(&self) -> usize {
        self.vars.iter().filter(|v| v.is_integer).count()
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<(), ProblemError> {
        if self.obj.len() != self.vars.len() {
            return Err(ProblemError::ObjectiveLength {
                expected: self.vars.len(),
                found: self.obj.len(),
            });
        }

        for (index, var) in self.vars.iter().enumerate() {
            if var.lb.is_nan() || var.ub.is_nan() || var.lb > var.ub {
                return Err(ProblemError::InvalidVariableBounds {
                    index,
                    name: var.name.clone(),
                    lb: var.lb,
                    ub: var.ub,
                });
            }
        }

        for (index, &coef) in self.obj.iter().enumerate() {
            if !coef.is_finite() {
                return Err(ProblemError::NonFiniteCoefficient {
                    location: format!("objective coefficient of v{}", index),
                    value: coef,
                });
            }
        }

        let num_vars = self.vars.len();
        for (index, con) in self.cons.iter().enumerate() {
            if con.lb.is_nan() || con.ub.is_nan() || con.lb > con.ub {
                return Err(ProblemError::InvalidConstraintBounds {
                    index,
                    name: con.name.clone(),
                    lb: con.lb,
                    ub: con.ub,
                });
            }
            for &(variable, coef) in &con.terms {
                if variable >= num_vars {
                    return Err(ProblemError::VariableOutOfRange {
                        constraint: index,
                        variable,
                        num_vars,
                    });
                }
                if !coef.is_finite() {
                    return Err(ProblemError::NonFiniteCoefficient {
                        location: format!("constraint c{} term v{}", index, variable),
                        value: coef,
                    });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for MilpProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MILPProblem: {}", self.name)?;
        writeln!(
            f,
            "Variables: {} ({})",
            self.num_vars(),
            if self.minimize { "minimize" } else { "maximize" }
        )?;
        for (i, var) in self.vars.iter().enumerate() {
            writeln!(
                f,
                " v{} ({}) lb={} ub={} int={} obj={}",
                i,
                var.name,
                var.lb,
                var.ub,
                u8::from(var.is_integer),
                self.obj.get(i).copied().unwrap_or(0.0)
            )?;
        }
        writeln!(f, "Constraints: {}", self.num_cons())?;
        for (i, con) in self.cons.iter().enumerate() {
            let terms: Vec<String> = con
                .terms
                .iter()
                .map(|(idx, coef)| format!("{}*v{}", coef, idx))
                .collect();
            writeln!(f, " c{} ({}): {} in [{}, {}]", i, con.name, terms.join(" + "), con.lb, con.ub)?;
        }
        Ok(())
    }
}
