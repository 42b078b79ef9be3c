//! Constraint types for version matching

mod constraint;
mod constraints;
mod operator;

pub use constraint::{Constraint, InvalidConstraint};
pub use constraints::{Constraints, ConstraintsError, ExclusiveConstraints};
pub use operator::{InvalidOperator, Operator};
