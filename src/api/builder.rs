use std::{env, error::Error, ffi::OsString, path::PathBuf};

use crate::{
    collect::CollectPolicy,
    config::GoPackageConfig,
    model::record::RECORD_FILE_NAME,
    toolchain::GoToolchain,
    vendor::{BuildPaths, BUILD_DIRECTORY_NAME},
    GoPackage,
};

#[derive(Default)]
pub struct GoPackageBuilder {
    // All other paths are relative to `root`
    root: Option<PathBuf>,
    record_file_name: Option<PathBuf>,
    build_directory_name: Option<PathBuf>,
    go_binary: Option<PathBuf>,
    gopath: Option<OsString>,
    collect_policy: Option<CollectPolicy>,
}

impl GoPackageBuilder {
    /// Project root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the dependency record file.
    ///
    /// Defaults to `gopackage.json`.
    pub fn record_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_file_name = Some(path.into());
        self
    }

    /// Name of the GOPATH tree dependencies are downloaded into.
    ///
    /// Defaults to `gopackage`.
    pub fn build_directory_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.build_directory_name = Some(path.into());
        self
    }

    /// The go command.
    ///
    /// Defaults to `$GOPACKAGE_GO_BINARY`, then `go` from `PATH`.
    pub fn go_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.go_binary = Some(path.into());
        self
    }

    /// GOPATH of the user, searched after the build tree on install.
    ///
    /// Defaults to `$GOPATH`.
    pub fn gopath(mut self, gopath: impl Into<OsString>) -> Self {
        self.gopath = Some(gopath.into());
        self
    }

    /// Defaults to `$GOPACKAGE_COLLECT_POLICY`, then [`CollectPolicy::BestEffort`].
    pub fn collect_policy(mut self, policy: CollectPolicy) -> Self {
        self.collect_policy = Some(policy);
        self
    }

    pub fn try_build(self) -> Result<GoPackage, Box<dyn Error>> {
        let Self {
            root,
            record_file_name,
            build_directory_name,
            go_binary,
            gopath,
            collect_policy,
        } = self;
        let config = GoPackageConfig::load()?;

        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let current_gopath = gopath
            .or_else(|| env::var_os("GOPATH"))
            .filter(|gopath| !gopath.is_empty())
            .ok_or("GOPATH is not set")?;

        let record_path =
            root.join(record_file_name.unwrap_or_else(|| PathBuf::from(RECORD_FILE_NAME)));

        let build_gopath = root.join(
            build_directory_name.unwrap_or_else(|| PathBuf::from(BUILD_DIRECTORY_NAME)),
        );

        let go_binary = go_binary
            .or(config.go_binary)
            .unwrap_or_else(|| PathBuf::from("go"));

        let collect_policy = collect_policy
            .or(config.collect_policy)
            .unwrap_or_default();

        // queries must see the same GOPATH layout that get and install build into
        let toolchain = GoToolchain::new(go_binary, &root)
            .env("GOPATH", &current_gopath)
            .env("GO111MODULE", "off");

        Ok(GoPackage {
            toolchain,
            paths: BuildPaths::new(root, build_gopath, current_gopath),
            record_path,
            collect_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_options() {
        let gopackage = GoPackageBuilder::default()
            .root("/work")
            .record_file_name("deps.json")
            .build_directory_name("vendor-gopath")
            .go_binary("/opt/go/bin/go")
            .gopath("/home/user/go")
            .collect_policy(CollectPolicy::Strict)
            .try_build()
            .unwrap();

        assert_eq!(gopackage.record_path, PathBuf::from("/work/deps.json"));
        assert_eq!(
            gopackage.paths,
            BuildPaths::new(
                "/work".into(),
                "/work/vendor-gopath".into(),
                "/home/user/go".into()
            )
        );
        assert_eq!(
            gopackage.toolchain.binary(),
            std::path::Path::new("/opt/go/bin/go")
        );
        assert_eq!(gopackage.collect_policy, CollectPolicy::Strict);
    }

    #[test]
    fn empty_gopath_is_rejected() {
        let error = GoPackageBuilder::default()
            .root("/work")
            .gopath("")
            .try_build()
            .err()
            .unwrap();
        assert_eq!(error.to_string(), "GOPATH is not set");
    }

    #[cfg(unix)]
    #[test]
    fn queries_run_in_gopath_mode() {
        use crate::toolchain::{fake_go, Toolchain};

        let dir = tempfile::tempdir().unwrap();
        let go = fake_go(dir.path(), r#"echo "go1.22.3 X:$GO111MODULE:$GOPATH""#);
        let gopackage = GoPackageBuilder::default()
            .root(dir.path())
            .go_binary(go)
            .gopath("/home/user/go")
            .try_build()
            .unwrap();

        assert_eq!(
            gopackage.toolchain.version().unwrap(),
            "go1.22.3 X:off:/home/user/go"
        );
    }
}
