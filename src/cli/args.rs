use std::{ffi::OsString, path::PathBuf};

use clap::{Parser, Subcommand};

/// Records and replays the third-party dependencies of Go packages.
#[derive(Debug, Parser)]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub cmd: Command,
    /// Project root, all other paths are relative to it.
    /// Defaults to the current directory.
    #[arg(short, long)]
    pub root: Option<PathBuf>,
    /// Name of the dependency record file.
    /// Defaults to `gopackage.json`.
    #[arg(long)]
    pub record: Option<PathBuf>,
    /// Name of the GOPATH tree the dependencies are vendored into.
    /// Defaults to `gopackage`.
    #[arg(short, long)]
    pub build_directory: Option<PathBuf>,
    /// The go command to run.
    #[arg(long)]
    pub go: Option<PathBuf>,
    /// GOPATH searched after the build tree when installing.
    #[arg(long, env = "GOPATH", hide_env_values = true)]
    pub gopath: Option<OsString>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collects the third-party dependencies of the given packages and records them
    Load {
        #[arg(required = true)]
        packages: Vec<String>,
        /// Fail when a package or one of its imports cannot be resolved
        #[arg(long)]
        strict: bool,
        /// Download the dependencies right after recording them
        #[arg(short, long)]
        get: bool,
    },
    /// Downloads the recorded dependencies into the build GOPATH
    Get,
    /// Installs the recorded packages against the build GOPATH
    Install {
        /// Install even if the Go toolchain is older than the recorded version
        #[arg(short, long)]
        force: bool,
    },
    /// Prints the dependency record
    Show,
    /// Deletes the build GOPATH and the dependency record
    Clean,
}
