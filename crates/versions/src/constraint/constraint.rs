//! Single version constraint

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::constraints::{Constraints, ConstraintsError, ExclusiveConstraints};
use super::operator::{InvalidOperator, Operator};
use crate::version::{InvalidVersionExpression, Version};

lazy_static! {
    // <= and >= must precede < and > in the alternation.
    static ref CONSTRAINT_RE: Regex =
        Regex::new(r"^\s*(?P<operator>==|!=|<=|>=|<|>)\s*(?P<version>[0-9A-Za-z_\-.+]+)\s*$")
            .unwrap();
}

/// Error raised when a constraint expression does not match
/// `OPERATOR VERSION`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidConstraint {
    #[error("Invalid constraint {0:?}")]
    Expression(String),
    #[error(transparent)]
    Version(#[from] InvalidVersionExpression),
    #[error(transparent)]
    Operator(#[from] InvalidOperator),
}

/// A single constraint on a package version, e.g. `>=1.2.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    operator: Operator,
    version: Version,
}

impl Constraint {
    pub fn new(operator: Operator, version: Version) -> Constraint {
        Constraint { operator, version }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Check whether `version` satisfies this constraint.
    pub fn matches(&self, version: &Version) -> bool {
        self.operator.compare(version, &self.version)
    }

    /// Parse `version` as a version expression and match it.
    pub fn matches_str(&self, version: &str) -> Result<bool, InvalidVersionExpression> {
        Ok(self.matches(&version.parse()?))
    }

    /// Combine with another constraint into a merged collection.
    pub fn and(&self, other: Constraint) -> Result<Constraints, ExclusiveConstraints> {
        Constraints::merge([self.clone(), other])
    }

    /// Parse `expression` as a constraint and combine with it.
    pub fn and_str(&self, expression: &str) -> Result<Constraints, ConstraintsError> {
        let other: Constraint = expression.parse()?;
        Ok(self.and(other)?)
    }
}

impl FromStr for Constraint {
    type Err = InvalidConstraint;

    fn from_str(expression: &str) -> Result<Constraint, InvalidConstraint> {
        let captures = CONSTRAINT_RE
            .captures(expression)
            .ok_or_else(|| InvalidConstraint::Expression(expression.to_string()))?;

        let operator: Operator = captures["operator"].parse()?;
        let version: Version = captures["version"].parse()?;

        Ok(Constraint::new(operator, version))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}
