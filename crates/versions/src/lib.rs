//! Package version parsing, comparison, and constraint merging
//!
//! This crate models software package versions in the spirit of semantic
//! versioning, with a loose superset of the syntax (`1`, `1.0.1a`,
//! `2.8.12.3`) for real-world version strings, and provides a constraint
//! algebra that merges requirement sets into a minimal equivalent form or
//! reports why they conflict.

pub mod constraint;
mod package;
mod repository;
mod requirement;
mod version;

pub use constraint::{
    Constraint, Constraints, ConstraintsError, ExclusiveConstraints, InvalidConstraint,
    InvalidOperator, Operator,
};
pub use package::{InvalidPackage, Package};
pub use repository::{Pool, Repository};
pub use requirement::{InvalidRequirement, Requirement};
pub use version::{Identifier, InvalidVersionExpression, Release, Version};
