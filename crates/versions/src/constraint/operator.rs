//! Comparison operators for version constraints

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::version::Version;

/// Error raised when a token is not one of the six recognized operators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid operator {0:?}")]
pub struct InvalidOperator(pub String);

/// A version constraint operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
}

impl Operator {
    /// Get the canonical token of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    /// Apply the operator's predicate to two versions.
    pub fn compare(&self, a: &Version, b: &Version) -> bool {
        match self {
            Operator::Equal => a == b,
            Operator::NotEqual => a != b,
            Operator::LessThan => a < b,
            Operator::LessThanOrEqual => a <= b,
            Operator::GreaterThan => a > b,
            Operator::GreaterThanOrEqual => a >= b,
        }
    }
}

impl FromStr for Operator {
    type Err = InvalidOperator;

    fn from_str(token: &str) -> Result<Operator, InvalidOperator> {
        match token {
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            _ => Err(InvalidOperator(token.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
