//! Ordered, pre-merged collections of constraints

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::constraint::{Constraint, InvalidConstraint};
use super::operator::Operator;
use crate::version::{InvalidVersionExpression, Version};

/// Error raised when a set of constraints has no satisfying version.
///
/// Carries the offending constraint and the constraints it conflicts with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Constraint {constraint} conflicts with constraints {}", display_list(.conflicts))]
pub struct ExclusiveConstraints {
    pub constraint: Constraint,
    pub conflicts: Vec<Constraint>,
}

fn display_list(constraints: &[Constraint]) -> String {
    constraints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error raised by [`Constraints::from_str`]: either a piece failed to
/// parse, or the parsed pieces are mutually exclusive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintsError {
    #[error(transparent)]
    Invalid(#[from] InvalidConstraint),
    #[error(transparent)]
    Exclusive(#[from] ExclusiveConstraints),
}

/// An AND-combined collection of constraints.
///
/// Always stored pre-merged: at most one effective lower bound, at most one
/// effective upper bound, deduplicated `!=` exclusions, and an `==` only as
/// the sole element.
///
/// ```
/// use versions::Constraints;
///
/// let constraints: Constraints = ">1,<2".parse().unwrap();
/// assert!(constraints.matches_str("1.5").unwrap());
/// assert!(!constraints.matches_str("2.0").unwrap());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Constraints {
    constraints: Vec<Constraint>,
}

impl Constraints {
    /// Create an empty collection, satisfied by every version.
    pub fn new() -> Constraints {
        Constraints::default()
    }

    /// Merge an iterable of constraints into a minimal equivalent
    /// collection, or fail if the set is unsatisfiable.
    pub fn merge(
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Result<Constraints, ExclusiveConstraints> {
        Ok(Constraints {
            constraints: merge_all(constraints)?,
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn as_slice(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Check whether `version` satisfies every constraint in the
    /// collection.
    pub fn matches(&self, version: &Version) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.matches(version))
    }

    /// Parse `version` as a version expression and match it.
    pub fn matches_str(&self, version: &str) -> Result<bool, InvalidVersionExpression> {
        Ok(self.matches(&version.parse()?))
    }

    /// Return a new collection merged with one more constraint.
    pub fn with(&self, constraint: Constraint) -> Result<Constraints, ExclusiveConstraints> {
        Constraints::merge(self.constraints.iter().cloned().chain([constraint]))
    }

    /// Return a new collection merged with another collection.
    pub fn with_all(&self, other: &Constraints) -> Result<Constraints, ExclusiveConstraints> {
        Constraints::merge(
            self.constraints
                .iter()
                .chain(other.constraints.iter())
                .cloned(),
        )
    }

    /// Parse `expression` as constraints and return the merged collection.
    pub fn with_str(&self, expression: &str) -> Result<Constraints, ConstraintsError> {
        let other: Constraints = expression.parse()?;
        Ok(self.with_all(&other)?)
    }

    /// Merge one more constraint into the collection in place.
    pub fn push(&mut self, constraint: Constraint) -> Result<(), ExclusiveConstraints> {
        self.constraints = merge_all(self.constraints.iter().cloned().chain([constraint]))?;
        Ok(())
    }
}

impl FromStr for Constraints {
    type Err = ConstraintsError;

    fn from_str(expression: &str) -> Result<Constraints, ConstraintsError> {
        let constraints = expression
            .split(',')
            .map(|piece| piece.parse::<Constraint>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Constraints::merge(constraints)?)
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for constraint in &self.constraints {
            write!(f, "{}{}", separator, constraint)?;
            separator = ",";
        }
        Ok(())
    }
}

impl IntoIterator for Constraints {
    type Item = Constraint;
    type IntoIter = std::vec::IntoIter<Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.into_iter()
    }
}

impl<'a> IntoIterator for &'a Constraints {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

/// Per-operator version buckets. Sets keep the buckets deduplicated and
/// give min/max and output order deterministically.
#[derive(Default)]
struct Buckets {
    eq: BTreeSet<Version>,
    ne: BTreeSet<Version>,
    lt: BTreeSet<Version>,
    le: BTreeSet<Version>,
    gt: BTreeSet<Version>,
    ge: BTreeSet<Version>,
}

impl Buckets {
    fn collect(constraints: impl IntoIterator<Item = Constraint>) -> Buckets {
        let mut buckets = Buckets::default();
        for constraint in constraints {
            let version = constraint.version().clone();
            match constraint.operator() {
                Operator::Equal => buckets.eq.insert(version),
                Operator::NotEqual => buckets.ne.insert(version),
                Operator::LessThan => buckets.lt.insert(version),
                Operator::LessThanOrEqual => buckets.le.insert(version),
                Operator::GreaterThan => buckets.gt.insert(version),
                Operator::GreaterThanOrEqual => buckets.ge.insert(version),
            };
        }
        buckets
    }
}

/// Reduce `constraints` to the minimal equivalent list.
///
/// The result holds the `!=` exclusions in version order, then the tightest
/// lower bound, then the tightest upper bound; a consistent `==` supersedes
/// everything. Fails with [`ExclusiveConstraints`] when no version can
/// satisfy the whole set.
fn merge_all(
    constraints: impl IntoIterator<Item = Constraint>,
) -> Result<Vec<Constraint>, ExclusiveConstraints> {
    let mut buckets = Buckets::collect(constraints);

    // Least version required by < and <= constraints.
    let lt_ver = buckets.lt.iter().next().cloned();
    let le_ver = buckets.le.iter().next().cloned();
    // Most recent version required by > and >= constraints.
    let gt_ver = buckets.gt.iter().next_back().cloned();
    let ge_ver = buckets.ge.iter().next_back().cloned();

    // Most restrictive upper bound.
    let mut upper = match (le_ver, lt_ver) {
        (Some(le), Some(lt)) => {
            if le < lt {
                // <=1, <2
                Some(Constraint::new(Operator::LessThanOrEqual, le))
            } else {
                // <=2, <1 and <=2, <2
                Some(Constraint::new(Operator::LessThan, lt))
            }
        }
        (Some(le), None) => Some(Constraint::new(Operator::LessThanOrEqual, le)),
        (None, Some(lt)) => Some(Constraint::new(Operator::LessThan, lt)),
        (None, None) => None,
    };
    // Most restrictive lower bound.
    let mut lower = match (ge_ver, gt_ver) {
        (Some(ge), Some(gt)) => {
            if ge <= gt {
                // >=1, >2 and >=2, >2
                Some(Constraint::new(Operator::GreaterThan, gt))
            } else {
                // >=2, >1
                Some(Constraint::new(Operator::GreaterThanOrEqual, ge))
            }
        }
        (Some(ge), None) => Some(Constraint::new(Operator::GreaterThanOrEqual, ge)),
        (None, Some(gt)) => Some(Constraint::new(Operator::GreaterThan, gt)),
        (None, None) => None,
    };

    if let (Some(g), Some(l)) = (&lower, &upper) {
        if g.version() == l.version() {
            if g.operator() == Operator::GreaterThanOrEqual
                && l.operator() == Operator::LessThanOrEqual
            {
                // >= and <= meeting at one version collapse to ==.
                buckets.eq.insert(g.version().clone());
                lower = None;
                upper = None;
            } else {
                return Err(ExclusiveConstraints {
                    constraint: g.clone(),
                    conflicts: vec![l.clone()],
                });
            }
        } else if g.version() > l.version() {
            // Empty range.
            return Err(ExclusiveConstraints {
                constraint: g.clone(),
                conflicts: vec![l.clone()],
            });
        }
    }

    if let Some(eq_ver) = buckets.eq.iter().next() {
        let eq_constraint = Constraint::new(Operator::Equal, eq_ver.clone());
        let mut conflicts: Vec<Constraint> = buckets
            .eq
            .iter()
            .skip(1)
            .map(|version| Constraint::new(Operator::Equal, version.clone()))
            .collect();
        conflicts.extend(
            buckets
                .ne
                .iter()
                .map(|version| Constraint::new(Operator::NotEqual, version.clone())),
        );
        conflicts.extend(lower.clone());
        conflicts.extend(upper.clone());

        if !conflicts.is_empty() {
            return Err(ExclusiveConstraints {
                constraint: eq_constraint,
                conflicts,
            });
        }

        // A consistent == supersedes everything else.
        return Ok(vec![eq_constraint]);
    }

    let mut result: Vec<Constraint> = buckets
        .ne
        .iter()
        .map(|version| Constraint::new(Operator::NotEqual, version.clone()))
        .collect();
    result.extend(lower);
    result.extend(upper);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(expression: &str) -> Constraint {
        expression.parse().unwrap()
    }

    fn constraints(expression: &str) -> Constraints {
        expression.parse().unwrap()
    }

    fn merge(pieces: &[&str]) -> Result<Constraints, ExclusiveConstraints> {
        Constraints::merge(pieces.iter().map(|piece| constraint(piece)))
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            constraints(">1,<2").as_slice(),
            &[constraint(">1.0.0"), constraint("<2.0.0")]
        );
        assert_eq!(constraints("==1").as_slice(), &[constraint("==1.0.0")]);
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(constraints(">1 , <2"), constraints(">1,<2"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "".parse::<Constraints>().unwrap_err(),
            ConstraintsError::Invalid(_)
        ));
        assert!(matches!(
            ">2,<1".parse::<Constraints>().unwrap_err(),
            ConstraintsError::Exclusive(_)
        ));
    }

    #[test]
    fn test_match() {
        let parsed = constraints(">1,<2");
        assert!(parsed.matches(&Version::new(1, 5, 0)));
        assert!(parsed.matches_str("1.5").unwrap());
        assert!(!parsed.matches_str("2.0").unwrap());
        assert!(!parsed.matches_str("0.9").unwrap());
    }

    #[test]
    fn test_match_empty() {
        assert!(Constraints::new().matches(&Version::new(1, 0, 0)));
    }

    #[test]
    fn test_merge_keeps_range() {
        assert_eq!(merge(&[">1", "<2"]).unwrap(), constraints(">1.0.0,<2.0.0"));
        assert_eq!(merge(&["<2", ">=1"]).unwrap(), constraints(">=1.0.0,<2.0.0"));
    }

    #[test]
    fn test_merge_drops_looser_bounds() {
        assert_eq!(merge(&["<2", "<3"]).unwrap(), constraints("<2.0.0"));
        assert_eq!(merge(&[">=2", ">2"]).unwrap(), constraints(">2.0.0"));
        assert_eq!(merge(&[">1", ">=2"]).unwrap(), constraints(">=2.0.0"));
        assert_eq!(merge(&["<2", "<=1"]).unwrap(), constraints("<=1.0.0"));
        assert_eq!(merge(&["<=2", "<1"]).unwrap(), constraints("<1.0.0"));
        assert_eq!(merge(&["<=2", "<2"]).unwrap(), constraints("<2.0.0"));
    }

    #[test]
    fn test_merge_collapses_to_equality() {
        assert_eq!(merge(&["<=2", ">=2"]).unwrap(), constraints("==2.0.0"));
    }

    #[test]
    fn test_merge_conflicting_ranges() {
        let error = merge(&[">2", "<1"]).unwrap_err();
        assert_eq!(error.constraint, constraint(">2.0.0"));
        assert_eq!(error.conflicts, vec![constraint("<1.0.0")]);

        assert!(merge(&[">2", "<2"]).is_err());
        assert!(merge(&[">2", "<=2"]).is_err());
        assert!(merge(&[">=2", "<2"]).is_err());
    }

    #[test]
    fn test_merge_conflicting_equalities() {
        assert!(merge(&["==1", "==2"]).is_err());
        assert!(merge(&["==1", ">2"]).is_err());
        assert!(merge(&["==1", "!=2"]).is_err());
    }

    #[test]
    fn test_merge_single_equality() {
        assert_eq!(merge(&["==1"]).unwrap(), constraints("==1.0.0"));
        assert_eq!(merge(&["==1", "==1.0"]).unwrap(), constraints("==1.0.0"));
    }

    #[test]
    fn test_merge_keeps_negative_constraints() {
        let merged = merge(&["!=1", "!=2"]).unwrap();
        assert_eq!(
            merged.as_slice(),
            &[constraint("!=1.0.0"), constraint("!=2.0.0")]
        );

        let merged = merge(&["!=2", ">1", "!=1.5", "<3"]).unwrap();
        assert_eq!(
            merged.as_slice(),
            &[
                constraint("!=1.5.0"),
                constraint("!=2.0.0"),
                constraint(">1.0.0"),
                constraint("<3.0.0"),
            ]
        );
    }

    #[test]
    fn test_merge_dedupes_negative_constraints() {
        assert_eq!(merge(&["!=1", "!=1.0.0"]).unwrap(), constraints("!=1"));
    }

    #[test]
    fn test_merge_idempotent() {
        for expression in [">1,<2", "!=1,!=2", "==1", ">=1,<=3,!=2", "<2"] {
            let merged = constraints(expression);
            assert_eq!(
                Constraints::merge(merged.iter().cloned()).unwrap(),
                merged
            );
        }
    }

    #[test]
    fn test_with() {
        let merged = Constraints::new().with(constraint(">1")).unwrap();
        assert_eq!(merged, constraints(">1"));
        assert_eq!(
            merged.with(constraint("<2")).unwrap(),
            constraints(">1,<2")
        );
    }

    #[test]
    fn test_with_all() {
        assert_eq!(
            constraints(">1").with_all(&constraints("<2,!=1.5")).unwrap(),
            constraints(">1,<2,!=1.5")
        );
    }

    #[test]
    fn test_with_str() {
        assert_eq!(
            constraints(">1").with_str("<2").unwrap(),
            constraints(">1,<2")
        );
        assert!(constraints(">2").with_str("<1").is_err());
        assert!(constraints(">1").with_str("junk").is_err());
    }

    #[test]
    fn test_push() {
        let mut merged = Constraints::new();
        merged.push(constraint(">1")).unwrap();
        merged.push(constraint("<2")).unwrap();
        assert_eq!(merged, constraints(">1,<2"));

        // A failed push leaves the collection untouched.
        let before = merged.clone();
        assert!(merged.push(constraint("==3")).is_err());
        assert_eq!(merged, before);
    }

    #[test]
    fn test_display() {
        assert_eq!(constraints(">1,<2").to_string(), ">1.0.0,<2.0.0");
        assert_eq!(Constraints::new().to_string(), "");
    }
}
