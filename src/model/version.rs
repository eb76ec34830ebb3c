use std::str::FromStr;

use regex_lite::Regex;

use crate::model::ParseError;

/// Release stage of a Go toolchain. Pre-releases order before the final release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Beta(u32),
    Rc(u32),
    Release,
}

/// A Go toolchain version as reported by `go env GOVERSION` or `runtime.Version()`.
///
/// Only the `go<major>[.<minor>[.<patch>]][(beta|rc)<n>]` shape is understood.
/// Missing components are treated as zero, so `go1.20` and `go1.20.0` are equal.
/// Anything after the first whitespace (`go1.22.3 X:boringcrypto`) is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GoVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub stage: Stage,
}

impl FromStr for GoVersion {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidGoVersion(value.to_string());
        let tag = value.split_whitespace().next().ok_or_else(invalid)?;
        let re: Regex = Regex::new(
            r"^go(?P<major>\d+)(?:\.(?P<minor>\d+)(?:\.(?P<patch>\d+))?)?(?:(?P<stage>beta|rc)(?P<number>\d+))?$",
        )
        .unwrap();
        let captures = re.captures(tag).ok_or_else(invalid)?;

        let component = |name: &str| -> Result<u32, ParseError> {
            match captures.name(name) {
                Some(m) => m.as_str().parse::<u32>().map_err(|_| invalid()),
                None => Ok(0),
            }
        };

        let stage = match captures.name("stage").map(|m| m.as_str()) {
            Some("beta") => Stage::Beta(component("number")?),
            Some("rc") => Stage::Rc(component("number")?),
            _ => Stage::Release,
        };

        Ok(GoVersion {
            major: component("major")?,
            minor: component("minor")?,
            patch: component("patch")?,
            stage,
        })
    }
}

/// Development builds report `devel go1.23-abcdef ...` and are taken to be newer than any release.
fn is_development_build(version: &str) -> bool {
    version.trim_start().starts_with("devel")
}

/// Returns true when `actual` is the same as or newer than `required`.
///
/// Identical strings always satisfy each other. Otherwise both strings have to parse
/// as a [`GoVersion`], except that a development build satisfies any requirement.
pub fn satisfies(required: &str, actual: &str) -> bool {
    if required == actual || is_development_build(actual) {
        return true;
    }
    match (required.parse::<GoVersion>(), actual.parse::<GoVersion>()) {
        (Ok(required), Ok(actual)) => actual >= required,
        _ => false,
    }
}
