mod go;

use thiserror::Error;

pub use go::GoToolchain;

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` failed with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Could not parse the output of `{command}`: {source}")]
    Output {
        command: String,
        source: serde_json::Error,
    },
    #[error("Could not determine the Go version from `{0}`")]
    UnknownVersion(String),
    #[error("{import_path}: {message}")]
    Package {
        import_path: String,
        message: String,
    },
    #[error("`{0}` matched no packages")]
    NoPackages(String),
}

/// Queries answered by the build toolchain.
pub trait Toolchain {
    /// Direct and indirect imports of a package.
    fn list_deps(&self, package: &str) -> Result<Vec<String>, ToolchainError>;

    /// Whether an import path belongs to the standard library of the installed toolchain.
    fn is_standard(&self, import_path: &str) -> Result<bool, ToolchainError>;

    /// Version string of the installed toolchain, e.g. `go1.22.3`.
    fn version(&self) -> Result<String, ToolchainError>;
}

/// Writes an executable shell script standing in for the `go` command.
#[cfg(all(test, unix))]
pub(crate) fn fake_go(dir: &std::path::Path, script: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("go");
    std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
