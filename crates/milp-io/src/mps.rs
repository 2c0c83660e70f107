//! Free-format MPS reader.
//!
//! Sections understood: `NAME`, `OBJSENSE`, `ROWS`, `COLUMNS`, `RHS`,
//! `RANGES`, `BOUNDS` and `ENDATA`. The first `N` row becomes the dense
//! objective; every other row becomes a [`Constraint`].

use std::collections::HashMap;
use std::path::Path;

use milp_solver::{Constraint, MilpProblem, Variable};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MpsError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Line {line}: unknown section {section}")]
    UnknownSection { line: usize, section: String },
    #[error("Line {line}: data outside of any section")]
    DataOutsideSection { line: usize },
    #[error("Line {line}: unknown row type {kind}")]
    UnknownRowType { line: usize, kind: String },
    #[error("Line {line}: duplicate row {row}")]
    DuplicateRow { line: usize, row: String },
    #[error("Line {line}: unknown row {row}")]
    UnknownRow { line: usize, row: String },
    #[error("Line {line}: unknown column {column}")]
    UnknownColumn { line: usize, column: String },
    #[error("Line {line}: unknown bound type {kind}")]
    UnknownBoundType { line: usize, kind: String },
    #[error("Line {line}: unknown objective sense {sense}")]
    UnknownSense { line: usize, sense: String },
    #[error("Line {line}: invalid number {text}")]
    InvalidNumber { line: usize, text: String },
    #[error("Line {line}: missing {expected}")]
    MissingField { line: usize, expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ObjSense,
    Rows,
    Columns,
    Rhs,
    Ranges,
    Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Le,
    Ge,
    Eq,
}

#[derive(Debug, Clone, Copy)]
enum Row {
    Objective,
    /// Extra `N` rows carry no meaning for the model
    Free,
    Constraint(usize),
}

/// Right-hand side and range of one constraint row, resolved into bounds at the end.
#[derive(Debug, Clone, Copy)]
struct RowData {
    kind: RowKind,
    rhs: f64,
    range: Option<f64>,
}

impl RowData {
    fn bounds(&self) -> (f64, f64) {
        let rhs = self.rhs;
        match (self.kind, self.range) {
            (RowKind::Le, None) => (f64::NEG_INFINITY, rhs),
            (RowKind::Ge, None) => (rhs, f64::INFINITY),
            (RowKind::Eq, None) => (rhs, rhs),
            (RowKind::Le, Some(r)) => (rhs - r.abs(), rhs),
            (RowKind::Ge, Some(r)) => (rhs, rhs + r.abs()),
            (RowKind::Eq, Some(r)) if r < 0.0 => (rhs + r, rhs),
            (RowKind::Eq, Some(r)) => (rhs, rhs + r),
        }
    }
}

/// Reader for MPS models.
pub struct MpsReader {
    problem: MilpProblem,
    section: Option<Section>,
    rows: HashMap<String, Row>,
    row_data: Vec<RowData>,
    columns: HashMap<String, usize>,
    in_integer_block: bool,
    line: usize,
}

impl MpsReader {
    fn new() -> Self {
        Self {
            problem: MilpProblem::default(),
            section: None,
            rows: HashMap::new(),
            row_data: Vec::new(),
            columns: HashMap::new(),
            in_integer_block: false,
            line: 0,
        }
    }

    /// Parse MPS text into a problem.
    pub fn parse(source: &str) -> Result<MilpProblem, MpsError> {
        let mut reader = MpsReader::new();
        for (i, raw) in source.lines().enumerate() {
            reader.line = i + 1;
            if !reader.parse_line(raw)? {
                break;
            }
        }
        Ok(reader.finish())
    }

    /// Read and parse an MPS file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<MilpProblem, MpsError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| MpsError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&source)
    }

    /// Returns `false` once `ENDATA` is reached.
    fn parse_line(&mut self, raw: &str) -> Result<bool, MpsError> {
        let line = raw.trim_end();
        if line.trim_start().is_empty() || line.starts_with('*') {
            return Ok(true);
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let head = fields[0];
        let indented = line.starts_with(char::is_whitespace);

        if !indented {
            match head {
                "NAME" => {
                    self.problem.name = fields[1..].join(" ");
                    self.section = None;
                    return Ok(true);
                }
                "OBJSENSE" => {
                    self.section = Some(Section::ObjSense);
                    if let Some(sense) = fields.get(1) {
                        self.parse_sense(sense)?;
                    }
                    return Ok(true);
                }
                "ROWS" => return self.enter(Section::Rows),
                "COLUMNS" => return self.enter(Section::Columns),
                "RHS" => return self.enter(Section::Rhs),
                "RANGES" => return self.enter(Section::Ranges),
                "BOUNDS" => return self.enter(Section::Bounds),
                "ENDATA" => return Ok(false),
                _ if self.section.is_none() => {
                    return Err(MpsError::UnknownSection {
                        line: self.line,
                        section: head.to_string(),
                    });
                }
                // Unindented data lines are tolerated inside a section.
                _ => {}
            }
        }

        match self.section {
            None => Err(MpsError::DataOutsideSection { line: self.line }),
            Some(Section::ObjSense) => self.parse_sense(head).map(|_| true),
            Some(Section::Rows) => self.parse_row(&fields).map(|_| true),
            Some(Section::Columns) => self.parse_column(&fields).map(|_| true),
            Some(Section::Rhs) => self.parse_rhs(&fields).map(|_| true),
            Some(Section::Ranges) => self.parse_range(&fields).map(|_| true),
            Some(Section::Bounds) => self.parse_bound(&fields).map(|_| true),
        }
    }

    fn enter(&mut self, section: Section) -> Result<bool, MpsError> {
        self.section = Some(section);
        Ok(true)
    }

    fn parse_sense(&mut self, sense: &str) -> Result<(), MpsError> {
        match sense {
            "MAX" | "MAXIMIZE" => self.problem.minimize = false,
            "MIN" | "MINIMIZE" => self.problem.minimize = true,
            _ => {
                return Err(MpsError::UnknownSense {
                    line: self.line,
                    sense: sense.to_string(),
                });
            }
        }
        Ok(())
    }

    fn parse_row(&mut self, fields: &[&str]) -> Result<(), MpsError> {
        let kind = fields[0];
        let name = self.field(fields, 1, "row name")?;
        if self.rows.contains_key(name) {
            return Err(MpsError::DuplicateRow {
                line: self.line,
                row: name.to_string(),
            });
        }

        let row = match kind {
            "N" | "n" => {
                if self.rows.values().any(|r| matches!(r, Row::Objective)) {
                    Row::Free
                } else {
                    Row::Objective
                }
            }
            "L" | "l" => self.push_constraint(name, RowKind::Le),
            "G" | "g" => self.push_constraint(name, RowKind::Ge),
            "E" | "e" => self.push_constraint(name, RowKind::Eq),
            _ => {
                return Err(MpsError::UnknownRowType {
                    line: self.line,
                    kind: kind.to_string(),
                });
            }
        };
        self.rows.insert(name.to_string(), row);
        Ok(())
    }

    fn push_constraint(&mut self, name: &str, kind: RowKind) -> Row {
        let index = self
            .problem
            .add_constraint(Constraint::default().with_name(name));
        self.row_data.push(RowData {
            kind,
            rhs: 0.0,
            range: None,
        });
        Row::Constraint(index)
    }

    fn parse_column(&mut self, fields: &[&str]) -> Result<(), MpsError> {
        if fields.get(1) == Some(&"'MARKER'") {
            match fields.get(2).copied() {
                Some("'INTORG'") => self.in_integer_block = true,
                Some("'INTEND'") => self.in_integer_block = false,
                _ => {
                    return Err(MpsError::MissingField {
                        line: self.line,
                        expected: "'INTORG' or 'INTEND' marker",
                    });
                }
            }
            return Ok(());
        }

        let name = fields[0];
        let column = match self.columns.get(name) {
            Some(&index) => index,
            None => {
                let var = Variable {
                    is_integer: self.in_integer_block,
                    ..Variable::default()
                }
                .with_name(name);
                let index = self.problem.add_variable(var);
                self.columns.insert(name.to_string(), index);
                index
            }
        };

        for (row_name, value) in self.pairs(fields)? {
            match self.row(row_name)? {
                Row::Objective => self.problem.set_obj_coef(column, value),
                Row::Free => {}
                Row::Constraint(index) => self.problem.cons[index].terms.push((column, value)),
            }
        }
        Ok(())
    }

    fn parse_rhs(&mut self, fields: &[&str]) -> Result<(), MpsError> {
        for (row_name, value) in self.pairs(fields)? {
            match self.row(row_name)? {
                Row::Objective | Row::Free => {
                    debug!(
                        component = "mps",
                        operation = "parse_rhs",
                        line = self.line as u64,
                        row = row_name,
                        "Ignoring right-hand side on objective row"
                    );
                }
                Row::Constraint(index) => self.row_data[index].rhs = value,
            }
        }
        Ok(())
    }

    fn parse_range(&mut self, fields: &[&str]) -> Result<(), MpsError> {
        for (row_name, value) in self.pairs(fields)? {
            if let Row::Constraint(index) = self.row(row_name)? {
                self.row_data[index].range = Some(value);
            }
        }
        Ok(())
    }

    fn parse_bound(&mut self, fields: &[&str]) -> Result<(), MpsError> {
        let kind = fields[0];
        let takes_value = !matches!(kind, "FR" | "MI" | "PL" | "BV");

        // The bound-set label is optional: `UP BND x 4` and `UP x 4` are both accepted.
        let (column_name, value_text) = if takes_value {
            match fields.len() {
                0..=2 => {
                    return Err(MpsError::MissingField {
                        line: self.line,
                        expected: "bound column and value",
                    });
                }
                3 => (fields[1], Some(fields[2])),
                _ => (fields[2], Some(fields[3])),
            }
        } else {
            match fields.len() {
                1 => {
                    return Err(MpsError::MissingField {
                        line: self.line,
                        expected: "bound column",
                    });
                }
                2 => (fields[1], None),
                _ => (fields[2], None),
            }
        };

        let column = *self.columns.get(column_name).ok_or_else(|| MpsError::UnknownColumn {
            line: self.line,
            column: column_name.to_string(),
        })?;
        let value = value_text.map(|t| self.number(t)).transpose()?.unwrap_or(0.0);
        let line = self.line;
        let var = &mut self.problem.vars[column];

        match kind {
            "UP" => {
                if value < 0.0 && var.lb == 0.0 {
                    warn!(
                        component = "mps",
                        operation = "parse_bound",
                        line = line as u64,
                        column = column_name,
                        "Negative upper bound with zero lower bound; lower bound set to -inf"
                    );
                    var.lb = f64::NEG_INFINITY;
                }
                var.ub = value;
            }
            "LO" => var.lb = value,
            "FX" => {
                var.lb = value;
                var.ub = value;
            }
            "FR" => {
                var.lb = f64::NEG_INFINITY;
                var.ub = f64::INFINITY;
            }
            "MI" => var.lb = f64::NEG_INFINITY,
            "PL" => var.ub = f64::INFINITY,
            "BV" => {
                var.is_integer = true;
                var.lb = 0.0;
                var.ub = 1.0;
            }
            "LI" => {
                var.is_integer = true;
                var.lb = value;
            }
            "UI" => {
                var.is_integer = true;
                var.ub = value;
            }
            _ => {
                return Err(MpsError::UnknownBoundType {
                    line,
                    kind: kind.to_string(),
                });
            }
        }
        Ok(())
    }

    /// `label row value [row value]`: the trailing one or two pairs.
    fn pairs<'f>(&self, fields: &[&'f str]) -> Result<Vec<(&'f str, f64)>, MpsError> {
        let rest = match fields.len() {
            3 | 5 => &fields[1..],
            // A missing RHS/RANGES set label leaves the pairs starting at field 0.
            2 | 4 => fields,
            _ => {
                return Err(MpsError::MissingField {
                    line: self.line,
                    expected: "row/value pair",
                });
            }
        };
        rest.chunks(2)
            .map(|pair| self.number(pair[1]).map(|value| (pair[0], value)))
            .collect()
    }

    fn row(&self, name: &str) -> Result<Row, MpsError> {
        self.rows.get(name).copied().ok_or_else(|| MpsError::UnknownRow {
            line: self.line,
            row: name.to_string(),
        })
    }

    fn field<'f>(&self, fields: &[&'f str], index: usize, expected: &'static str) -> Result<&'f str, MpsError> {
        fields.get(index).copied().ok_or(MpsError::MissingField {
            line: self.line,
            expected,
        })
    }

    fn number(&self, text: &str) -> Result<f64, MpsError> {
        text.parse::<f64>().map_err(|_| MpsError::InvalidNumber {
            line: self.line,
            text: text.to_string(),
        })
    }

    fn finish(mut self) -> MilpProblem {
        for (con, data) in self.problem.cons.iter_mut().zip(&self.row_data) {
            let (lb, ub) = data.bounds();
            con.lb = lb;
            con.ub = ub;
        }

        debug!(
            component = "mps",
            operation = "parse",
            status = "success",
            name = %self.problem.name,
            variables = self.problem.num_vars() as u64,
            constraints = self.problem.num_cons() as u64,
            integer_variables = self.problem.num_integer_vars() as u64,
            minimize = self.problem.minimize,
            "Parsed MPS model"
        );
        self.problem
    }
}
