//! Version parsing, ordering, and rendering

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// Regex used to parse version expressions. It parses semantic versions
    /// and normalizes loose ones (`1`, `1.0.1a`, `2.8.12.3`) into the same
    /// structure.
    static ref VERSION_RE: Regex = Regex::new(
        r"(?x)^
        (?P<major>\d+)
        (?:
            \.
            (?P<minor>\d+)
            (?:
                \.
                (?P<patch>\d+)
            )?
        )?
        (?:
            (?P<postrelease_alpha>[A-Za-z]+)?
            |
            (?:
                \.
                (?P<postrelease_digit>\d+)?
            )?
        )?
        (?:
            -
            (?P<prerelease>[0-9A-Za-z.-]*)
        )?
        (?:
            \+
            (?P<build_metadata>[0-9A-Za-z.-]*)
        )?
        $"
    )
    .unwrap();
}

/// Error raised when a version expression does not match the grammar, or
/// carries both a pre- and a post-release marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid version expression {0:?}")]
pub struct InvalidVersionExpression(pub String);

/// A pre- or post-release identifier.
///
/// Numeric identifiers compare numerically, textual ones lexicographically,
/// and a numeric identifier always sorts below a textual one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    Number(u64),
    Text(String),
}

impl Identifier {
    /// Classify a raw identifier: a full digit run becomes `Number`,
    /// anything else `Text`.
    fn classify(raw: &str) -> Identifier {
        match raw.parse::<u64>() {
            Ok(number) => Identifier::Number(number),
            Err(_) => Identifier::Text(raw.to_string()),
        }
    }
}

impl From<u64> for Identifier {
    fn from(number: u64) -> Identifier {
        Identifier::Number(number)
    }
}

impl From<&str> for Identifier {
    fn from(text: &str) -> Identifier {
        Identifier::classify(text)
    }
}

impl From<String> for Identifier {
    fn from(text: String) -> Identifier {
        Identifier::classify(&text)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(number) => write!(f, "{}", number),
            Identifier::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Release marker of a version.
///
/// A version carries at most one marker, so the "never both a pre- and a
/// post-release" invariant is part of the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Release {
    /// Plain release, no marker.
    #[default]
    Plain,
    /// Pre-release marker: sorts below the plain version.
    Pre(Identifier),
    /// Post-release marker: sorts above the plain version.
    Post(Identifier),
}

impl Release {
    pub fn prerelease(&self) -> Option<&Identifier> {
        match self {
            Release::Pre(identifier) => Some(identifier),
            _ => None,
        }
    }

    pub fn postrelease(&self) -> Option<&Identifier> {
        match self {
            Release::Post(identifier) => Some(identifier),
            _ => None,
        }
    }
}

/// A package version.
///
/// Parsed from a version expression (see [`FromStr`]) or built with
/// [`Version::new`] and the `with_*` methods. Immutable once constructed.
///
/// ```
/// use versions::Version;
///
/// let version: Version = "1.2.0-rc.1".parse().unwrap();
/// assert!(version < "1.2.0".parse().unwrap());
/// assert_eq!(version.to_string(), "1.2.0-rc.1");
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    release: Release,
    build_metadata: Option<BTreeSet<String>>,
}

impl Version {
    /// Create a plain version.
    pub fn new(major: u64, minor: u64, patch: u64) -> Version {
        Version {
            major,
            minor,
            patch,
            release: Release::Plain,
            build_metadata: None,
        }
    }

    /// Replace the release marker with a pre-release identifier.
    pub fn with_prerelease(mut self, identifier: impl Into<Identifier>) -> Version {
        self.release = Release::Pre(identifier.into());
        self
    }

    /// Replace the release marker with a post-release identifier.
    pub fn with_postrelease(mut self, identifier: impl Into<Identifier>) -> Version {
        self.release = Release::Post(identifier.into());
        self
    }

    /// Attach build metadata identifiers. Metadata never participates in
    /// ordering, equality, or hashing.
    pub fn with_build_metadata<I, S>(mut self, identifiers: I) -> Version
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_metadata = Some(identifiers.into_iter().map(Into::into).collect());
        self
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn release(&self) -> &Release {
        &self.release
    }

    pub fn prerelease(&self) -> Option<&Identifier> {
        self.release.prerelease()
    }

    pub fn postrelease(&self) -> Option<&Identifier> {
        self.release.postrelease()
    }

    /// Build metadata identifiers, if any. Package layers derive build
    /// options from this set.
    pub fn build_metadata(&self) -> Option<&BTreeSet<String>> {
        self.build_metadata.as_ref()
    }
}

impl FromStr for Version {
    type Err = InvalidVersionExpression;

    fn from_str(expression: &str) -> Result<Version, InvalidVersionExpression> {
        let captures = VERSION_RE
            .captures(expression)
            .ok_or_else(|| InvalidVersionExpression(expression.to_string()))?;

        let postrelease = if let Some(digits) = captures.name("postrelease_digit") {
            Some(Identifier::classify(digits.as_str()))
        } else {
            captures
                .name("postrelease_alpha")
                .map(|alpha| Identifier::Text(alpha.as_str().to_string()))
        };
        let prerelease = captures
            .name("prerelease")
            .filter(|m| !m.as_str().is_empty())
            .map(|m| Identifier::classify(m.as_str()));

        // A well-defined version cannot carry both a pre- and a
        // post-release marker.
        let release = match (postrelease, prerelease) {
            (Some(_), Some(_)) => {
                return Err(InvalidVersionExpression(expression.to_string()));
            }
            (Some(identifier), None) => Release::Post(identifier),
            (None, Some(identifier)) => Release::Pre(identifier),
            (None, None) => Release::Plain,
        };

        let number = |name: &str| {
            captures
                .name(name)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map_err(|_| InvalidVersionExpression(expression.to_string()))
        };

        let build_metadata = captures
            .name("build_metadata")
            .filter(|m| !m.as_str().is_empty())
            .map(|m| m.as_str().split('.').map(str::to_string).collect());

        Ok(Version {
            major: number("major")?.unwrap_or(0),
            minor: number("minor")?.unwrap_or(0),
            patch: number("patch")?.unwrap_or(0),
            release,
            build_metadata,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Version) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| cmp_release(&self.release, &other.release))
    }
}

/// Compare release markers of two versions with equal numeric parts.
///
/// Post-release markers take precedence: absent < numeric < textual. Only
/// when neither side has one do pre-release markers apply, with the inverse
/// placement of "absent": numeric < textual < absent.
fn cmp_release(a: &Release, b: &Release) -> Ordering {
    let (post_a, post_b) = (a.postrelease(), b.postrelease());
    if post_a.is_some() || post_b.is_some() {
        return post_a.cmp(&post_b);
    }

    match (a.prerelease(), b.prerelease()) {
        (Some(pre_a), Some(pre_b)) => pre_a.cmp(pre_b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Version) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    // Build metadata is excluded, matching equality.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.release.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        match &self.release {
            Release::Plain => {}
            Release::Pre(identifier) => write!(f, "-{}", identifier)?,
            Release::Post(Identifier::Number(number)) => write!(f, ".{}", number)?,
            Release::Post(Identifier::Text(text)) => write!(f, "{}", text)?,
        }

        if let Some(build_metadata) = &self.build_metadata {
            let mut separator = '+';
            for identifier in build_metadata {
                write!(f, "{}{}", separator, identifier)?;
                separator = '.';
            }
        }

        Ok(())
    }
}
