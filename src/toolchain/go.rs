use std::{
    collections::BTreeMap,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, trace};
use serde::Deserialize;

use super::{Toolchain, ToolchainError};

/// The subset of a `go list -json` object we care about.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
struct ListedPackage {
    import_path: String,
    #[serde(default)]
    deps: Vec<String>,
    #[serde(default)]
    goroot: bool,
    #[serde(default)]
    standard: bool,
    /// Set by `-e` when the package itself cannot be loaded.
    #[serde(default)]
    error: Option<PackageError>,
    /// Set by `-e` for dependencies that cannot be loaded.
    #[serde(default)]
    deps_errors: Vec<PackageError>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
struct PackageError {
    err: String,
}

/// Answers toolchain queries by running the `go` command.
pub struct GoToolchain {
    binary: PathBuf,
    working_directory: PathBuf,
    env: BTreeMap<String, OsString>,
}

impl GoToolchain {
    pub fn new(binary: impl Into<PathBuf>, working_directory: impl Into<PathBuf>) -> Self {
        GoToolchain {
            binary: binary.into(),
            working_directory: working_directory.into(),
            env: BTreeMap::new(),
        }
    }

    /// Overrides an environment variable for every query.
    pub fn env(mut self, key: impl Into<String>, value: impl AsRef<OsStr>) -> Self {
        self.env.insert(key.into(), value.as_ref().to_os_string());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command_line(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary.display(), args.join(" "))
    }

    fn query(&self, args: &[&str]) -> Result<String, ToolchainError> {
        let command = self.command_line(args);
        trace!("Running {} in {}", command, self.working_directory.display());
        let output = Command::new(&self.binary)
            .args(args)
            .envs(&self.env)
            .current_dir(&self.working_directory)
            .output()
            .map_err(|source| ToolchainError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolchainError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn list(&self, args: &[&str]) -> Result<Vec<ListedPackage>, ToolchainError> {
        let stdout = self.query(args)?;
        let listed =
            parse_listed_packages(&stdout).map_err(|source| ToolchainError::Output {
                command: self.command_line(args),
                source,
            })?;
        if listed.is_empty() {
            return Err(ToolchainError::NoPackages(self.command_line(args)));
        }
        Ok(listed)
    }
}

impl Toolchain for GoToolchain {
    fn list_deps(&self, package: &str) -> Result<Vec<String>, ToolchainError> {
        // -e keeps dependencies that cannot be found in Deps instead of failing the whole listing
        let mut deps = Vec::new();
        for listed in self.list(&["list", "-e", "-json", package])? {
            if let Some(error) = listed.error {
                return Err(ToolchainError::Package {
                    import_path: listed.import_path,
                    message: error.err,
                });
            }
            for error in &listed.deps_errors {
                debug!("{}: {}", listed.import_path, error.err);
            }
            debug!("{} has {} dependencies", listed.import_path, listed.deps.len());
            deps.extend(listed.deps);
        }
        Ok(deps)
    }

    fn is_standard(&self, import_path: &str) -> Result<bool, ToolchainError> {
        // -find skips resolving the dependencies of the package itself
        let listed = self.list(&["list", "-find", "-json", import_path])?;
        Ok(listed.iter().all(|p| p.goroot || p.standard))
    }

    fn version(&self) -> Result<String, ToolchainError> {
        let version = self.query(&["env", "GOVERSION"])?;
        let version = version.trim();
        if !version.is_empty() {
            return Ok(version.to_string());
        }

        // GOVERSION is not reported before go1.16
        let output = self.query(&["version"])?;
        parse_version_output(&output).ok_or(ToolchainError::UnknownVersion(output))
    }
}

/// `go list -json` prints one object per matched package, back to back.
fn parse_listed_packages(stdout: &str) -> Result<Vec<ListedPackage>, serde_json::Error> {
    serde_json::Deserializer::from_str(stdout)
        .into_iter::<ListedPackage>()
        .collect()
}

/// Extracts `go1.4.2` from `go version go1.4.2 linux/amd64`.
fn parse_version_output(output: &str) -> Option<String> {
    let mut words = output.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("go"), Some("version"), Some(version)) => Some(version.to_string()),
        _ => None,
    }
}
