use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{error, info, warn};
use thiserror::Error;

use crate::{
    flock::{FileLock, LockError},
    model::{record::DepsRecord, version::satisfies},
    process::{Invocation, ProcessError, Runner},
    toolchain::{Toolchain, ToolchainError},
};

pub const BUILD_DIRECTORY_NAME: &str = "gopackage";
const LOCK_FILE_NAME: &str = ".lock";
const LOCK_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum VendorError {
    #[error("Go version is not satisfied: system Go version '{actual}', expected '{required}'")]
    UnsatisfiedGoVersion { required: String, actual: String },
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),
    #[error("Cannot build GOPATH: {0}")]
    GoPath(#[from] std::env::JoinPathsError),
    #[error("Build directory lock cannot be acquired: {0}")]
    Lock(#[from] LockError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// How `install_packages` reacts to a toolchain older than the recorded one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionGate {
    #[default]
    Enforce,
    Warn,
}

/// Directories the vendored build works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    /// Directory the `go` commands run in.
    pub root: PathBuf,
    /// GOPATH tree the dependencies are downloaded into.
    pub build_gopath: PathBuf,
    /// GOPATH of the user, searched after the build tree on install.
    pub current_gopath: OsString,
}

impl BuildPaths {
    pub fn new(root: PathBuf, build_gopath: PathBuf, current_gopath: OsString) -> Self {
        BuildPaths {
            root,
            build_gopath,
            current_gopath,
        }
    }

    /// GOPATH used by `go install`: the build tree first, then the user's GOPATH.
    pub fn install_gopath(&self) -> Result<OsString, VendorError> {
        if self.build_gopath.as_os_str() == self.current_gopath {
            return Ok(self.build_gopath.clone().into_os_string());
        }
        let mut paths = vec![self.build_gopath.clone()];
        paths.extend(std::env::split_paths(&self.current_gopath));
        Ok(std::env::join_paths(paths)?)
    }

    /// Each package gets its own GOBIN, named after the last element of its import path.
    pub fn bin_directory(&self, package: &str) -> PathBuf {
        self.build_gopath.join(package_base_name(package))
    }

    fn lock(&self) -> Result<FileLock, VendorError> {
        std::fs::create_dir_all(&self.build_gopath)?;
        Ok(FileLock::acquire(
            &self.build_gopath.join(LOCK_FILE_NAME),
            LOCK_TIMEOUT,
        )?)
    }
}

fn package_base_name(package: &str) -> &str {
    let trimmed = package.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => package,
    }
}

/// Outcome of a batch of `go` invocations. Failures are reported, not fatal.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, target: &str, result: Result<(), ProcessError>) {
        match result {
            Ok(()) => self.succeeded.push(target.to_string()),
            Err(err) => {
                error!("{}", err);
                self.failed.push(target.to_string());
            }
        }
    }
}

/// Downloads every recorded dependency into the build GOPATH with `go get -d`.
pub fn get_dependencies<R: Runner + ?Sized>(
    record: &DepsRecord,
    paths: &BuildPaths,
    runner: &R,
    go: &Path,
) -> Result<RunSummary, VendorError> {
    let _lock = paths.lock()?;
    info!(
        "Fetching {} dependencies into {}",
        record.dependencies.len(),
        paths.build_gopath.display()
    );

    let mut summary = RunSummary::default();
    for dependency in &record.dependencies {
        info!("go get {}", dependency);
        let invocation = Invocation::new(go)
            .args(["get", "-d", dependency.as_str()])
            .current_dir(&paths.root)
            .env("GOPATH", &paths.build_gopath)
            .env("GO111MODULE", "off");
        summary.record(dependency, runner.run(&invocation));
    }
    Ok(summary)
}

/// Installs every recorded package against the build GOPATH, after checking the
/// installed toolchain against the recorded Go version.
pub fn install_packages<T, R>(
    record: &DepsRecord,
    paths: &BuildPaths,
    toolchain: &T,
    runner: &R,
    go: &Path,
    gate: VersionGate,
) -> Result<RunSummary, VendorError>
where
    T: Toolchain + ?Sized,
    R: Runner + ?Sized,
{
    let actual = toolchain.version()?;
    if !satisfies(&record.go_version, &actual) {
        let error = VendorError::UnsatisfiedGoVersion {
            required: record.go_version.clone(),
            actual,
        };
        match gate {
            VersionGate::Enforce => return Err(error),
            VersionGate::Warn => warn!("{}, installing anyway", error),
        }
    }

    let gopath = paths.install_gopath()?;
    let _lock = paths.lock()?;

    let mut summary = RunSummary::default();
    for package in &record.packages {
        let bin = paths.bin_directory(package);
        std::fs::create_dir_all(&bin)?;
        info!("Installing {} into {}", package, bin.display());
        let invocation = Invocation::new(go)
            .args(["install", package.as_str()])
            .current_dir(&paths.root)
            .env("GOPATH", &gopath)
            .env("GOBIN", &bin)
            .env("GO111MODULE", "off");
        summary.record(package, runner.run(&invocation));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeSet};

    use super::*;

    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingRunner {
        failing: BTreeSet<String>,
        invocations: RefCell<Vec<Invocation>>,
    }

    impl RecordingRunner {
        fn failing(target: &str) -> Self {
            RecordingRunner {
                failing: BTreeSet::from([target.to_string()]),
                ..Default::default()
            }
        }
    }

    impl Runner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> Result<(), ProcessError> {
            self.invocations.borrow_mut().push(invocation.clone());
            match invocation.args.last() {
                Some(target) if self.failing.contains(target) => Err(ProcessError::Failed {
                    command: invocation.to_string(),
                    status: "exit status: 1".to_string(),
                }),
                _ => Ok(()),
            }
        }
    }

    struct FixedVersion(&'static str);

    impl Toolchain for FixedVersion {
        fn list_deps(&self, _package: &str) -> Result<Vec<String>, ToolchainError> {
            Ok(vec![])
        }

        fn is_standard(&self, _import_path: &str) -> Result<bool, ToolchainError> {
            Ok(false)
        }

        fn version(&self) -> Result<String, ToolchainError> {
            Ok(self.0.to_string())
        }
    }

    fn record() -> DepsRecord {
        DepsRecord::new(
            vec!["app/cmd1".to_string(), "app/cmd2/".to_string()],
            "go1.21.0".to_string(),
            ["github.com/x/b", "github.com/x/a"].into_iter().collect(),
        )
    }

    fn paths(root: &Path) -> BuildPaths {
        BuildPaths::new(
            root.to_path_buf(),
            root.join(BUILD_DIRECTORY_NAME),
            OsString::from("/home/user/go"),
        )
    }

    #[test]
    fn base_names() {
        assert_eq!(package_base_name("app/cmd1"), "cmd1");
        assert_eq!(package_base_name("github.com/x/tool/"), "tool");
        assert_eq!(package_base_name("tool"), "tool");
        assert_eq!(package_base_name("/"), "/");
    }

    #[cfg(unix)]
    #[test]
    fn install_gopath_prepends_build_tree() {
        let paths = BuildPaths::new(
            "/work".into(),
            "/work/gopackage".into(),
            OsString::from("/home/user/go:/opt/go"),
        );
        assert_eq!(
            paths.install_gopath().unwrap(),
            OsString::from("/work/gopackage:/home/user/go:/opt/go")
        );
    }

    #[test]
    fn install_gopath_without_duplicate() {
        let paths = BuildPaths::new(
            "/work".into(),
            "/work/gopackage".into(),
            OsString::from("/work/gopackage"),
        );
        assert_eq!(
            paths.install_gopath().unwrap(),
            OsString::from("/work/gopackage")
        );
    }

    #[test]
    fn get_uses_isolated_gopath() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let runner = RecordingRunner::default();
        let summary = get_dependencies(&record(), &paths, &runner, Path::new("go")).unwrap();

        assert_eq!(summary.succeeded, vec!["github.com/x/a", "github.com/x/b"]);
        assert!(paths.build_gopath.is_dir());
        let invocations = runner.invocations.into_inner();
        assert_eq!(
            invocations.iter().map(|i| i.to_string()).collect::<Vec<_>>(),
            vec!["go get -d github.com/x/a", "go get -d github.com/x/b"]
        );
        for invocation in &invocations {
            assert_eq!(
                invocation.env["GOPATH"],
                paths.build_gopath.clone().into_os_string()
            );
            assert_eq!(invocation.current_dir.as_deref(), Some(dir.path()));
        }
    }

    #[test]
    fn get_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::failing("github.com/x/a");
        let summary =
            get_dependencies(&record(), &paths(dir.path()), &runner, Path::new("go")).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                succeeded: vec!["github.com/x/b".to_string()],
                failed: vec!["github.com/x/a".to_string()],
            }
        );
    }

    #[test]
    fn install_sets_gobin_per_package() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let runner = RecordingRunner::failing("app/cmd1");
        let summary = install_packages(
            &record(),
            &paths,
            &FixedVersion("go1.22.3"),
            &runner,
            Path::new("go"),
            VersionGate::Enforce,
        )
        .unwrap();

        assert_eq!(summary.failed, vec!["app/cmd1"]);
        assert_eq!(summary.succeeded, vec!["app/cmd2/"]);
        let invocations = runner.invocations.into_inner();
        assert_eq!(invocations.len(), 2);
        for (invocation, name) in invocations.iter().zip(["cmd1", "cmd2"]) {
            let bin = paths.build_gopath.join(name);
            assert!(bin.is_dir());
            assert_eq!(invocation.env["GOBIN"], bin.into_os_string());
            assert_eq!(invocation.env["GOPATH"], paths.install_gopath().unwrap());
        }
    }

    #[test]
    fn install_rejects_older_toolchain() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default();
        let error = install_packages(
            &record(),
            &paths(dir.path()),
            &FixedVersion("go1.20.5"),
            &runner,
            Path::new("go"),
            VersionGate::Enforce,
        )
        .unwrap_err();

        assert!(
            matches!(&error, VendorError::UnsatisfiedGoVersion { required, actual }
                if required == "go1.21.0" && actual == "go1.20.5"),
            "{error:?}"
        );
        assert_eq!(
            error.to_string(),
            "Go version is not satisfied: system Go version 'go1.20.5', expected 'go1.21.0'"
        );
        assert!(runner.invocations.into_inner().is_empty());
    }

    #[test]
    fn install_with_warning_gate_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default();
        let summary = install_packages(
            &record(),
            &paths(dir.path()),
            &FixedVersion("go1.20.5"),
            &runner,
            Path::new("go"),
            VersionGate::Warn,
        )
        .unwrap();
        assert_eq!(summary.succeeded.len(), 2);
    }
}
