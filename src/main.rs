use std::error::Error;

use clap::Parser;
use gopackage::{
    cli::args::{CliArgs, Command},
    collect::CollectPolicy,
    vendor::VersionGate,
    GoPackage,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();

    let mut builder = GoPackage::builder();
    if let Some(root) = cli_args.root {
        builder = builder.root(root);
    }
    if let Some(record) = cli_args.record {
        builder = builder.record_file_name(record);
    }
    if let Some(build_directory) = cli_args.build_directory {
        builder = builder.build_directory_name(build_directory);
    }
    if let Some(go) = cli_args.go {
        builder = builder.go_binary(go);
    }
    if let Some(gopath) = cli_args.gopath {
        builder = builder.gopath(gopath);
    }

    match cli_args.cmd {
        Command::Load {
            packages,
            strict,
            get,
        } => {
            if strict {
                builder = builder.collect_policy(CollectPolicy::Strict);
            }
            let gopackage = builder.try_build()?;
            gopackage.load(&packages)?;
            if get {
                gopackage.get()?;
            }
            Ok(())
        }
        Command::Get => {
            builder.try_build()?.get()?;
            Ok(())
        }
        Command::Install { force } => {
            let gate = if force {
                VersionGate::Warn
            } else {
                VersionGate::Enforce
            };
            builder.try_build()?.install(gate)?;
            Ok(())
        }
        Command::Show => {
            let record = builder.try_build()?.show()?;
            println!("packages:");
            for package in &record.packages {
                println!("  {package}");
            }
            println!("go version: {}", record.go_version);
            println!("dependencies ({}):", record.dependencies.len());
            for dependency in &record.dependencies {
                println!("  {dependency}");
            }
            Ok(())
        }
        Command::Clean => builder.try_build()?.clean(),
    }
}
