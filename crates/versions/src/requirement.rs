//! Package requirements

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::constraint::{Constraints, ConstraintsError};
use crate::package::Package;

lazy_static! {
    /// Regex used to parse package requirements:
    /// `NAME ([BUILD_OPTIONS])? (CONSTRAINTS)?`.
    static ref REQUIREMENT_RE: Regex = Regex::new(
        r"(?x)^
        \s*
        (?P<name>[A-Za-z0-9_\-]+)
        \s*
        (?:
            \[
            \s*
            (?P<build_options>[A-Za-z0-9_\-,\ ]+)
            \]
        )?
        \s*
        (?P<constraints>[0-9A-Za-z_\-,!=<>.\ ]+)?
        \s*
        $"
    )
    .unwrap();
}

/// Error raised when a requirement expression cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRequirement {
    #[error("Invalid requirement {0:?}")]
    Expression(String),
    #[error(transparent)]
    Constraints(#[from] ConstraintsError),
}

/// A dependency from one package to another: a required package name,
/// optional version constraints, and optional required build options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    version_constraints: Option<Constraints>,
    build_options: Option<BTreeSet<String>>,
}

impl Requirement {
    pub fn new(
        name: impl Into<String>,
        version_constraints: Option<Constraints>,
        build_options: Option<BTreeSet<String>>,
    ) -> Requirement {
        Requirement {
            name: name.into(),
            version_constraints,
            build_options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_constraints(&self) -> Option<&Constraints> {
        self.version_constraints.as_ref()
    }

    pub fn build_options(&self) -> Option<&BTreeSet<String>> {
        self.build_options.as_ref()
    }

    /// Check whether `package` satisfies this requirement: same name,
    /// version inside the constraints, and every required build option
    /// present among the package's build options.
    pub fn matches(&self, package: &Package) -> bool {
        if self.name != package.name() {
            return false;
        }

        if let Some(constraints) = &self.version_constraints {
            if !constraints.matches(package.version()) {
                return false;
            }
        }

        if let Some(required) = &self.build_options {
            match package.build_options() {
                Some(available) => {
                    if !required.is_subset(available) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        true
    }
}

impl FromStr for Requirement {
    type Err = InvalidRequirement;

    fn from_str(expression: &str) -> Result<Requirement, InvalidRequirement> {
        let captures = REQUIREMENT_RE
            .captures(expression)
            .ok_or_else(|| InvalidRequirement::Expression(expression.to_string()))?;

        let version_constraints = captures
            .name("constraints")
            .map(|m| m.as_str().parse::<Constraints>())
            .transpose()?;

        let build_options = captures.name("build_options").map(|m| {
            m.as_str()
                .split(',')
                .map(|option| option.trim().to_string())
                .collect()
        });

        Ok(Requirement {
            name: captures["name"].to_string(),
            version_constraints,
            build_options,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(build_options) = &self.build_options {
            let mut separator = '[';
            for option in build_options {
                write!(f, "{}{}", separator, option)?;
                separator = ',';
            }
            write!(f, "]")?;
        }
        if let Some(constraints) = &self.version_constraints {
            write!(f, "{}", constraints)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(expression: &str) -> Requirement {
        expression.parse().unwrap()
    }

    fn package(expression: &str) -> Package {
        expression.parse().unwrap()
    }

    #[test]
    fn test_parse_bare_name() {
        let parsed = requirement("foo");
        assert_eq!(parsed.name(), "foo");
        assert_eq!(parsed.version_constraints(), None);
        assert_eq!(parsed.build_options(), None);
    }

    #[test]
    fn test_parse_full() {
        let parsed = requirement("vim [python, ruby] >=7, <8");
        assert_eq!(parsed.name(), "vim");
        assert_eq!(
            parsed.version_constraints(),
            Some(&">=7,<8".parse().unwrap())
        );
        let options: Vec<_> = parsed.build_options().unwrap().iter().cloned().collect();
        assert_eq!(options, vec!["python".to_string(), "ruby".to_string()]);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "@($%#$*)@".parse::<Requirement>().unwrap_err(),
            InvalidRequirement::Expression(_)
        ));
        // Constraint pieces must still parse and merge.
        assert!("foo bar".parse::<Requirement>().is_err());
        assert!(matches!(
            "foo >2, <1".parse::<Requirement>().unwrap_err(),
            InvalidRequirement::Constraints(_)
        ));
    }

    #[test]
    fn test_matches_name() {
        assert!(requirement("foo").matches(&package("foo-1.0")));
        assert!(!requirement("foo").matches(&package("bar-1.0")));
    }

    #[test]
    fn test_matches_constraints() {
        let parsed = requirement("foo >=1, <2");
        assert!(parsed.matches(&package("foo-1.5")));
        assert!(!parsed.matches(&package("foo-2.0")));
    }

    #[test]
    fn test_matches_build_options() {
        let parsed = requirement("vim[ruby]>7");
        assert!(parsed.matches(&package("vim-7.4+perl.ruby.python")));
        assert!(!parsed.matches(&package("vim-7.4+perl.python")));
        assert!(!parsed.matches(&package("vim-7.4")));
        assert!(!parsed.matches(&package("vim-6.0+perl.ruby.python")));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            requirement("vim [ruby] >=7, <8").to_string(),
            "vim[ruby]>=7.0.0,<8.0.0"
        );
        assert_eq!(requirement("foo").to_string(), "foo");
    }
}
