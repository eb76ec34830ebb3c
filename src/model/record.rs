use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::{dependency_set::DependencySet, ParseError};

pub const RECORD_FILE_NAME: &str = "gopackage.json";

/// Snapshot of a `load`: the target packages, the Go version they were loaded with
/// and their third-party dependencies. It is read back verbatim by `get` and `install`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepsRecord {
    /// Import paths of the packages to build.
    pub packages: Vec<String>,
    /// Minimum Go version needed to build the packages.
    pub go_version: String,
    pub dependencies: DependencySet,
}

impl DepsRecord {
    pub fn new(packages: Vec<String>, go_version: String, dependencies: DependencySet) -> Self {
        DepsRecord {
            packages,
            go_version,
            dependencies,
        }
    }

    pub fn from_file(path: &Path) -> Result<DepsRecord, ParseError> {
        debug!("Reading dependency record {}", path.display());
        DepsRecord::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_json_str(s: &str) -> Result<DepsRecord, ParseError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), ParseError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
