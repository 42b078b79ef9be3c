//! Named, versioned packages

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

use crate::version::Version;

/// Error raised when a package expression does not match `NAME-VERSION`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid package expression {0:?}")]
pub struct InvalidPackage(pub String);

/// A package: a name and a version.
///
/// The build options of a package are the build metadata identifiers of its
/// version; requirements match against them. Unlike version ordering,
/// package identity includes the build metadata, so two builds of the same
/// version stay distinct in a repository.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    version: Version,
}

impl Package {
    pub fn new(name: impl Into<String>, version: Version) -> Package {
        Package {
            name: name.into(),
            version,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Build options derived from the version's build metadata.
    pub fn build_options(&self) -> Option<&BTreeSet<String>> {
        self.version.build_metadata()
    }
}

impl FromStr for Package {
    type Err = InvalidPackage;

    /// Split `NAME-VERSION` at the leftmost `-` whose suffix parses as a
    /// version, so names may themselves contain dashes (`foo-bar-1.0`).
    fn from_str(expression: &str) -> Result<Package, InvalidPackage> {
        for (offset, _) in expression.match_indices('-') {
            let name = &expression[..offset];
            if name.is_empty() {
                continue;
            }
            if let Ok(version) = expression[offset + 1..].parse::<Version>() {
                return Ok(Package::new(name, version));
            }
        }
        Err(InvalidPackage(expression.to_string()))
    }
}

impl Ord for Package {
    fn cmp(&self, other: &Package) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.version.build_metadata().cmp(&other.version.build_metadata()))
    }
}

impl PartialOrd for Package {
    fn partial_cmp(&self, other: &Package) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Package) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.version.build_metadata().hash(state);
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(expression: &str) -> Package {
        expression.parse().unwrap()
    }

    #[test]
    fn test_parse() {
        let parsed = package("foo-1.0");
        assert_eq!(parsed.name(), "foo");
        assert_eq!(parsed.version(), &Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_dashed_name() {
        let parsed = package("foo-bar-1.0");
        assert_eq!(parsed.name(), "foo-bar");
        assert_eq!(parsed.version(), &Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_prerelease_version() {
        let parsed = package("foo-1.0.0-alpha");
        assert_eq!(parsed.name(), "foo");
        assert_eq!(parsed.version(), &"1.0.0-alpha".parse::<Version>().unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        assert!("foo".parse::<Package>().is_err());
        assert!("-1.0".parse::<Package>().is_err());
        assert!("foo-bar".parse::<Package>().is_err());
    }

    #[test]
    fn test_build_options() {
        let parsed = package("vim-7.4+perl.python");
        let options: Vec<_> = parsed.build_options().unwrap().iter().cloned().collect();
        assert_eq!(options, vec!["perl".to_string(), "python".to_string()]);
        assert_eq!(package("vim-7.4").build_options(), None);
    }

    #[test]
    fn test_ord() {
        let mut packages = vec![package("foo-2.0"), package("bar-1.0"), package("foo-1.0")];
        packages.sort();
        assert_eq!(
            packages,
            vec![package("bar-1.0"), package("foo-1.0"), package("foo-2.0")]
        );
    }

    #[test]
    fn test_identity_includes_build_metadata() {
        assert_ne!(
            package("vim-7.4+perl.python"),
            package("vim-7.4+perl.ruby.python")
        );
        assert_eq!(package("vim-7.4"), package("vim-7.4.0"));
    }

    #[test]
    fn test_display() {
        assert_eq!(package("foo-1.0").to_string(), "foo-1.0.0");
    }
}
