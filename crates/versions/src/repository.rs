//! Package repositories and repository pools

use std::collections::BTreeSet;

use crate::package::Package;
use crate::requirement::Requirement;

/// A collection of packages, queried by requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    packages: BTreeSet<Package>,
}

impl Repository {
    pub fn new(packages: impl IntoIterator<Item = Package>) -> Repository {
        Repository {
            packages: packages.into_iter().collect(),
        }
    }

    pub fn add(&mut self, package: Package) {
        self.packages.insert(package);
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    /// Find packages matching `requirement`, in name and version order.
    pub fn get(&self, requirement: &Requirement) -> Vec<Package> {
        self.packages
            .iter()
            .filter(|package| requirement.matches(package))
            .cloned()
            .collect()
    }
}

impl FromIterator<Package> for Repository {
    fn from_iter<I: IntoIterator<Item = Package>>(packages: I) -> Repository {
        Repository::new(packages)
    }
}

/// A pool of repositories. Queries go to every repository and the results
/// are merged, deduplicated, and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    repositories: Vec<Repository>,
}

impl Pool {
    pub fn new(repositories: impl IntoIterator<Item = Repository>) -> Pool {
        Pool {
            repositories: repositories.into_iter().collect(),
        }
    }

    pub fn add(&mut self, repository: Repository) {
        self.repositories.push(repository);
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Find packages matching `requirement` across all repositories.
    pub fn get(&self, requirement: &Requirement) -> Vec<Package> {
        let packages: BTreeSet<Package> = self
            .repositories
            .iter()
            .flat_map(|repository| repository.get(requirement))
            .collect();
        packages.into_iter().collect()
    }
}
