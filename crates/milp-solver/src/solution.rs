use std::fmt;

/// The result of one solve attempt.
///
/// `obj_value` is always in minimize sense: a maximization problem reports
/// the negated maximum. `obj_value == +inf` with `feasible == false` means no
/// solution was found, which is a normal outcome rather than an error.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Variable values, parallel to the problem's variables
    pub x: Vec<f64>,
    /// Direction-adjusted objective value
    #[cfg_attr(feature = "serde", serde(with = "objective_serde"))]
    pub obj_value: f64,
    /// Whether `x` satisfies every constraint within tolerance
    pub feasible: bool,
}

impl Default for Solution {
    fn default() -> Self {
        Self {
            x: Vec::new(),
            obj_value: f64::INFINITY,
            feasible: false,
        }
    }
}

impl Solution {
    /// No solution yet: an all-zero vector of length `n`.
    pub fn unsolved(n: usize) -> Self {
        Self {
            x: vec![0.0; n],
            ..Self::default()
        }
    }

    /// The trivially optimal result of a problem with no variables.
    pub fn empty_optimal() -> Self {
        Self {
            x: Vec::new(),
            obj_value: 0.0,
            feasible: true,
        }
    }

    pub fn has_value(&self) -> bool {
        self.obj_value.is_finite()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Solution feasible={} obj={}",
            if self.feasible { "yes" } else { "no" },
            significant(self.obj_value, 6)
        )?;
        for (i, value) in self.x.iter().enumerate() {
            writeln!(f, " x{} = {}", i, significant(*value, 6))?;
        }
        Ok(())
    }
}

/// Format with at most `digits` significant digits, trailing zeros dropped.
/// Exponent form is used when the exponent is below -4 or at least `digits`.
fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let precision = digits.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// JSON has no infinity: `+inf` is written as `null`, other non-finite values
/// as strings, and both are read back.
#[cfg(feature = "serde")]
mod objective_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if *value == f64::INFINITY {
            serializer.serialize_none()
        } else {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(f64::INFINITY),
            Some(Repr::Number(value)) => Ok(value),
            Some(Repr::Text(text)) => text
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid objective value {text:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_no_solution() {
        let solution = Solution::default();
        assert!(!solution.feasible);
        assert_eq!(solution.obj_value, f64::INFINITY);
        assert!(!solution.has_value());
    }

    #[test]
    fn test_unsolved_has_zero_vector() {
        let solution = Solution::unsolved(3);
        assert_eq!(solution.x, vec![0.0; 3]);
        assert!(!solution.feasible);
    }

    #[test]
    fn test_display() {
        let solution = Solution {
            x: vec![3.0, 0.0, 1.0 / 3.0],
            obj_value: 3.0,
            feasible: true,
        };
        assert_eq!(
            solution.to_string(),
            "Solution feasible=yes obj=3\n x0 = 3\n x1 = 0\n x2 = 0.333333\n"
        );
        assert_eq!(Solution::default().to_string(), "Solution feasible=no obj=inf\n");
    }

    #[test]
    fn test_significant_digits() {
        assert_eq!(significant(1234.5678, 6), "1234.57");
        assert_eq!(significant(-0.2, 6), "-0.2");
        assert_eq!(significant(2.5e7, 6), "2.5e+07");
        assert_eq!(significant(999999.0, 6), "999999");
        assert_eq!(significant(1.5e-5, 6), "1.5e-05");
        assert_eq!(significant(0.0001, 6), "0.0001");
    }

    #[test]
    fn test_display_rounds_objective() {
        let solution = Solution {
            x: vec![0.2, 1.4],
            obj_value: 3.0000000000000004,
            feasible: true,
        };
        assert!(solution.to_string().starts_with("Solution feasible=yes obj=3\n"));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_unsolved_round_trips_through_json() {
        let solution = Solution::unsolved(1);

        let text = serde_json::to_string(&solution).unwrap();
        assert_eq!(text, r#"{"x":[0.0],"obj_value":null,"feasible":false}"#);

        let back: Solution = serde_json::from_str(&text).unwrap();
        assert_eq!(back, solution);
        assert_eq!(back.obj_value, f64::INFINITY);
    }

    #[test]
    fn test_finite_and_negative_infinite_objectives() {
        let solution = Solution {
            x: vec![3.0],
            obj_value: -2.5,
            feasible: true,
        };
        let back: Solution = serde_json::from_str(&serde_json::to_string(&solution).unwrap()).unwrap();
        assert_eq!(back, solution);

        let text = r#"{"x":[],"obj_value":"-inf","feasible":false}"#;
        let parsed: Solution = serde_json::from_str(text).unwrap();
        assert_eq!(parsed.obj_value, f64::NEG_INFINITY);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), text);
    }
}
