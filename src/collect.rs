use std::collections::BTreeSet;

use log::{debug, info, trace, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    model::dependency_set::DependencySet,
    toolchain::{Toolchain, ToolchainError},
};

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Could not list the dependencies of {package}: {source}")]
    ListDeps {
        package: String,
        source: ToolchainError,
    },
    #[error("Could not resolve import {import_path}: {source}")]
    Resolve {
        import_path: String,
        source: ToolchainError,
    },
}

/// What to do when a toolchain query fails during collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectPolicy {
    /// Log the failure and carry on. A package that cannot be listed contributes
    /// no imports and an import that cannot be resolved is left out.
    #[default]
    BestEffort,
    /// Abort on the first failure.
    Strict,
}

impl CollectPolicy {
    fn tolerate(self, error: CollectError) -> Result<(), CollectError> {
        match self {
            CollectPolicy::BestEffort => {
                warn!("{}, skipping", error);
                Ok(())
            }
            CollectPolicy::Strict => Err(error),
        }
    }
}

/// Computes the third-party dependencies of `packages`: the union of their transitive
/// imports without anything that belongs to the standard library.
pub fn collect<T: Toolchain + ?Sized>(
    toolchain: &T,
    packages: &[String],
    policy: CollectPolicy,
) -> Result<DependencySet, CollectError> {
    let mut imports = BTreeSet::new();
    for package in packages {
        debug!("Listing dependencies of {}", package);
        match toolchain.list_deps(package) {
            Ok(deps) => imports.extend(deps),
            Err(source) => policy.tolerate(CollectError::ListDeps {
                package: package.clone(),
                source,
            })?,
        }
    }

    let mut dependencies = DependencySet::new();
    for import_path in imports {
        match toolchain.is_standard(&import_path) {
            Ok(true) => trace!("{} is part of the standard library", import_path),
            Ok(false) => {
                dependencies.insert(import_path);
            }
            Err(source) => policy.tolerate(CollectError::Resolve {
                import_path,
                source,
            })?,
        }
    }

    info!(
        "Found {} third-party dependencies for {} packages",
        dependencies.len(),
        packages.len()
    );
    Ok(dependencies)
}
