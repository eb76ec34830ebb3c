use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::collect::CollectPolicy;

/// Settings read from `GOPACKAGE_*` environment variables.
pub struct GoPackageConfig {
    pub go_binary: Option<PathBuf>,
    pub collect_policy: Option<CollectPolicy>,
}

impl GoPackageConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            go_binary: raw_config.go.binary,
            collect_policy: raw_config.collect.policy,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    go: GoConfig,
    #[serde(default)]
    collect: CollectConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct GoConfig {
    binary: Option<PathBuf>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct CollectConfig {
    policy: Option<CollectPolicy>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("GOPACKAGE")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let env = HashMap::from([]);
        let config = RawConfig::load(Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                go: GoConfig { binary: None },
                collect: CollectConfig { policy: None }
            }
        )
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            ("GOPACKAGE_GO_BINARY".to_owned(), "/usr/local/go/bin/go".to_owned()),
            ("GOPACKAGE_COLLECT_POLICY".to_owned(), "strict".to_owned()),
            ("GOPATH".to_owned(), "/home/user/go".to_owned()),
        ]);
        let config = RawConfig::load(Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                go: GoConfig {
                    binary: Some("/usr/local/go/bin/go".into())
                },
                collect: CollectConfig {
                    policy: Some(CollectPolicy::Strict)
                }
            }
        )
    }

    #[test]
    fn load_invalid_policy() {
        let env = HashMap::from([(
            "GOPACKAGE_COLLECT_POLICY".to_owned(),
            "sometimes".to_owned(),
        )]);
        assert!(RawConfig::load(Some(env)).is_err());
    }
}
