use std::{error::Error, path::PathBuf};

use crate::{
    cli::command_handlers::{do_clean, do_get, do_install, do_load, do_show},
    collect::CollectPolicy,
    model::record::DepsRecord,
    process::SystemRunner,
    toolchain::GoToolchain,
    vendor::{BuildPaths, RunSummary, VersionGate},
};

mod builder;

pub use builder::GoPackageBuilder;

pub struct GoPackage {
    toolchain: GoToolchain,
    paths: BuildPaths,
    record_path: PathBuf,
    collect_policy: CollectPolicy,
}

impl GoPackage {
    pub fn builder() -> GoPackageBuilder {
        GoPackageBuilder::default()
    }

    /// Collects the third-party dependencies of `packages` and writes the record
    pub fn load(&self, packages: &[String]) -> Result<DepsRecord, Box<dyn Error>> {
        do_load(
            &self.toolchain,
            self.collect_policy,
            packages,
            &self.record_path,
        )
    }

    /// Downloads the recorded dependencies into the build GOPATH
    pub fn get(&self) -> Result<RunSummary, Box<dyn Error>> {
        do_get(
            &SystemRunner,
            self.toolchain.binary(),
            &self.paths,
            &self.record_path,
        )
    }

    /// Installs the recorded packages, each into its own directory of the build GOPATH
    pub fn install(&self, gate: VersionGate) -> Result<RunSummary, Box<dyn Error>> {
        do_install(
            &self.toolchain,
            &SystemRunner,
            self.toolchain.binary(),
            &self.paths,
            &self.record_path,
            gate,
        )
    }

    /// Reads the record without recomputing anything
    pub fn show(&self) -> Result<DepsRecord, Box<dyn Error>> {
        do_show(&self.record_path)
    }

    /// Delete the build GOPATH and the record
    pub fn clean(&self) -> Result<(), Box<dyn Error>> {
        do_clean(&self.paths.build_gopath, &self.record_path)
    }
}
