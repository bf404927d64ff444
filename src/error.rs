use std::path::PathBuf;

use crate::syntax::SyntaxError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create {}: {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to truncate {}: {source}", path.display())]
    TruncateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to duplicate {}: {source}", path.display())]
    Duplicate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot access {}: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list {}: {message}", path.display())]
    ListDir { path: PathBuf, message: String },

    #[error("couldn't find a main() function to instrument")]
    NoEntryPoint,

    #[error("empty GOPATH environment variable")]
    EmptyGopath,

    #[error(
        "named files must all be in one directory; have '{}' and '{}'",
        first.display(),
        second.display()
    )]
    MixedDirectories { first: PathBuf, second: PathBuf },

    #[error("failed to parse --buildflags: {0}")]
    InvalidBuildFlags(#[from] shell_words::ParseError),

    #[error("failed to run go build: {0}")]
    SpawnBuild(#[source] std::io::Error),

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
