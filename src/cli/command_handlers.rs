use log::{debug, info, warn};

use crate::{
    collect::{collect, CollectPolicy},
    model::{record::DepsRecord, ParseError},
    process::Runner,
    toolchain::Toolchain,
    vendor::{self, BuildPaths, RunSummary, VersionGate},
};
use std::{error::Error, path::Path};

/// Handler to load command
/// Collects the third-party dependencies of the packages and writes the record
pub fn do_load<T: Toolchain + ?Sized>(
    toolchain: &T,
    policy: CollectPolicy,
    packages: &[String],
    record_path: &Path,
) -> Result<DepsRecord, Box<dyn Error>> {
    debug!("Collecting dependencies with policy {:?}", policy);
    let dependencies = collect(toolchain, packages, policy)?;
    let go_version = toolchain.version()?;

    let record = DepsRecord::new(packages.to_vec(), go_version, dependencies);
    debug!("Generated dependency record: {:?}", record);

    record.to_file(record_path)?;
    info!("Wrote dependency record to {}", record_path.display());

    Ok(record)
}

/// Handler to get command
pub fn do_get<R: Runner + ?Sized>(
    runner: &R,
    go: &Path,
    paths: &BuildPaths,
    record_path: &Path,
) -> Result<RunSummary, Box<dyn Error>> {
    let record = read_record(record_path)?;
    let summary = vendor::get_dependencies(&record, paths, runner, go)?;
    report("fetched", &summary);
    Ok(summary)
}

/// Handler to install command
pub fn do_install<T, R>(
    toolchain: &T,
    runner: &R,
    go: &Path,
    paths: &BuildPaths,
    record_path: &Path,
    gate: VersionGate,
) -> Result<RunSummary, Box<dyn Error>>
where
    T: Toolchain + ?Sized,
    R: Runner + ?Sized,
{
    let record = read_record(record_path)?;
    let summary = vendor::install_packages(&record, paths, toolchain, runner, go, gate)?;
    report("installed", &summary);
    Ok(summary)
}

pub fn do_show(record_path: &Path) -> Result<DepsRecord, Box<dyn Error>> {
    read_record(record_path)
}

/// Delete the build GOPATH and the record
pub fn do_clean(build_gopath: &Path, record_path: &Path) -> Result<(), Box<dyn Error>> {
    info!(
        "Cleaning gopackage build directory {}.",
        build_gopath.display()
    );
    let output1 = std::fs::remove_dir_all(build_gopath);
    let output2 = std::fs::remove_file(record_path);

    for (output, path) in [(output1, build_gopath), (output2, record_path)] {
        match output {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("{} is already removed, nothing to do", path.display());
                Ok(())
            }
            otherwise => otherwise,
        }?;
    }

    Ok(())
}

fn read_record(record_path: &Path) -> Result<DepsRecord, Box<dyn Error>> {
    match DepsRecord::from_file(record_path) {
        Err(ParseError::IO(err)) if err.kind() == std::io::ErrorKind::NotFound => Err(format!(
            "Dependency record {} does not exist, run `gopackage load` first",
            record_path.display()
        )
        .into()),
        otherwise => Ok(otherwise?),
    }
}

fn report(action: &str, summary: &RunSummary) {
    if summary.failed.is_empty() {
        info!("Successfully {} {} packages", action, summary.succeeded.len());
    } else {
        warn!(
            "{} {} packages, {} failed: {}",
            action,
            summary.succeeded.len(),
            summary.failed.len(),
            summary.failed.join(", ")
        );
    }
}
