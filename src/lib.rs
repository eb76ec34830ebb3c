pub mod cli;
pub mod collect;
pub mod model;
pub mod process;
pub mod toolchain;
pub mod vendor;

mod api;
mod config;
mod flock;

pub use api::{GoPackage, GoPackageBuilder};
