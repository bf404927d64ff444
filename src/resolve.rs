use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::Error;

/// File name endings `go build` consumes from a package directory.
pub const RELEVANT_ENDINGS: &[&str] = &[
    ".go", ".c", ".cc", ".cpp", ".cxx", ".m", ".h", ".hh", ".hpp", ".hxx", ".s", ".swig",
    ".swigcxx", ".syso",
];

/// Module files carried along so module-aware builds work in the work directory.
pub const MODULE_FILES: &[&str] = &["go.mod", "go.sum"];

pub fn has_relevant_ending(name: &str) -> bool {
    RELEVANT_ENDINGS.iter().any(|ending| name.ends_with(ending)) || MODULE_FILES.contains(&name)
}

/// The files to instrument or carry over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    pub paths: Vec<PathBuf>,
    /// Files were named individually on the command line, so `go build`
    /// must be given them explicitly. Otherwise they form a package.
    pub listed: bool,
}

impl FileSet {
    /// Directory holding the files. All paths share it.
    pub fn dir(&self) -> PathBuf {
        match self.paths.first().and_then(|p| p.parent()) {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Compute the file set from the command-line arguments.
///
/// - no arguments: the relevant files of the current directory
/// - one existing file: that file alone
/// - one existing directory: its relevant files
/// - one other argument: the package `$GOPATH/src/<arg>`
/// - several arguments: each named file, all in one directory
pub fn resolve_file_set(args: &[PathBuf], gopath: Option<&Path>) -> Result<FileSet, Error> {
    match args {
        [] => package(Path::new(".")),
        [arg] => match std::fs::metadata(arg) {
            Ok(meta) if meta.is_dir() => package(arg),
            Ok(_) => Ok(FileSet {
                paths: vec![arg.clone()],
                listed: true,
            }),
            Err(_) => {
                let gopath = gopath.ok_or(Error::EmptyGopath)?;
                package(&gopath.join("src").join(arg))
            }
        },
        _ => listed(args),
    }
}

fn package(dir: &Path) -> Result<FileSet, Error> {
    Ok(FileSet {
        paths: relevant_files(dir)?,
        listed: false,
    })
}

fn listed(args: &[PathBuf]) -> Result<FileSet, Error> {
    let mut first_dir: Option<PathBuf> = None;
    for arg in args {
        std::fs::metadata(arg).map_err(|source| Error::MissingInput {
            path: arg.clone(),
            source,
        })?;
        let dir = clean_dir(arg.parent().unwrap_or(Path::new("")));
        if let Some(first) = &first_dir {
            if *first != dir {
                return Err(Error::MixedDirectories {
                    first: first.clone(),
                    second: dir,
                });
            }
        } else {
            first_dir = Some(dir);
        }
    }
    Ok(FileSet {
        paths: args.to_vec(),
        listed: true,
    })
}

/// `dir` without `.` components; the empty path becomes `.`.
fn clean_dir(dir: &Path) -> PathBuf {
    let cleaned: PathBuf = dir
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Non-directory entries of `dir` with a relevant name, sorted by name.
/// Hidden and ignored files are not filtered out.
fn relevant_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::ListDir {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.depth() == 0 || entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        if has_relevant_ending(&entry.file_name().to_string_lossy()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Base name for the binary and profile: the current directory's name when
/// there are no arguments, otherwise the first argument's file name without
/// its last extension.
pub fn output_name(args: &[PathBuf], cwd: &Path) -> String {
    match args.first() {
        None => base_name(cwd),
        Some(first) => {
            let name = base_name(first);
            match name.rfind('.') {
                Some(end) => name[..end].to_string(),
                None => name,
            }
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
