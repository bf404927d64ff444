use std::path::PathBuf;

use crate::error::Error;

/// Environment variable consulted for packages named by import path.
pub const GOPATH_VAR: &str = "GOPATH";
/// Environment variable holding a `tracing` filter directive.
pub const LOG_VAR: &str = "GOPROFILE_LOG";

/// Everything a build needs, gathered from flags and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Instrumented binary. Defaults to `<name>.profile`.
    pub output: Option<PathBuf>,
    /// Profile written by the instrumented program. Defaults to `<name>.pprof`.
    pub profile: Option<String>,
    pub in_place: bool,
    /// Print the work directory and keep it after the build.
    pub keep_work: bool,
    /// Extra arguments for `go build`.
    pub build_flags: Vec<String>,
    /// Source files, a package directory, or a GOPATH import path.
    pub args: Vec<PathBuf>,
    pub gopath: Option<PathBuf>,
}

/// Split `--buildflags` the way a POSIX shell would.
pub fn parse_build_flags(flags: &str) -> Result<Vec<String>, Error> {
    Ok(shell_words::split(flags)?)
}

/// `$GOPATH`, treating an empty value as unset.
pub fn gopath_from_env() -> Option<PathBuf> {
    std::env::var_os(GOPATH_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
