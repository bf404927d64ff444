use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::Error;
use crate::process::{ProcessingTask, process_file, process_file_in_place};

/// Where instrumented sources are written before compiling.
#[derive(Debug)]
pub enum WorkDir {
    /// The sources are rewritten where they are.
    InPlace(PathBuf),
    /// Temporary directory removed on drop.
    Temp(TempDir),
    /// Temporary directory left behind for inspection.
    Kept(PathBuf),
}

impl WorkDir {
    /// Create the work directory for a build. `source_dir` is where the
    /// sources live and is used as is in place.
    pub fn create(in_place: bool, keep: bool, source_dir: &Path) -> Result<Self, Error> {
        if in_place {
            return Ok(Self::InPlace(source_dir.to_path_buf()));
        }
        let temp = tempfile::Builder::new().prefix("goprofile").tempdir()?;
        if keep {
            Ok(Self::Kept(temp.keep()))
        } else {
            Ok(Self::Temp(temp))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::InPlace(dir) | Self::Kept(dir) => dir,
            Self::Temp(temp) => temp.path(),
        }
    }

    pub fn is_in_place(&self) -> bool {
        matches!(self, Self::InPlace(_))
    }
}

/// One task per path, sorted by source path. Destinations are
/// `<work dir>/<file name>`, or the absolute source path in place.
pub fn plan_tasks(
    paths: &[PathBuf],
    work_dir: &WorkDir,
    profile_path: &str,
) -> Result<Vec<ProcessingTask>, Error> {
    let mut tasks = Vec::with_capacity(paths.len());
    for source in paths {
        let destination = match work_dir {
            WorkDir::InPlace(_) => std::path::absolute(source)?,
            _ => match source.file_name() {
                Some(name) => work_dir.path().join(name),
                None => continue,
            },
        };
        tasks.push(ProcessingTask {
            source: source.clone(),
            destination,
            profile_path: profile_path.to_string(),
        });
    }
    tasks.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(tasks)
}

/// Run every task, stopping at the first error. Returns how many files had
/// their `main` instrumented; finding none is an error.
pub fn instrument_all(tasks: &[ProcessingTask], in_place: bool) -> Result<usize, Error> {
    let mut instrumented = 0;
    for task in tasks {
        let found = if in_place {
            process_file_in_place(&task.source, &task.profile_path)?
        } else {
            process_file(task)?
        };
        if found {
            info!("found and instrumented main() in {}", task.source.display());
            instrumented += 1;
        }
    }
    if instrumented == 0 {
        return Err(Error::NoEntryPoint);
    }
    Ok(instrumented)
}

/// Arguments for `go build`. Explicitly listed files are passed by their
/// destination path; a package is built from the current directory.
pub fn go_build_args(
    build_flags: &[String],
    output: &Path,
    listed: Option<&[ProcessingTask]>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["build".into()];
    args.extend(build_flags.iter().map(OsString::from));
    args.push("-o".into());
    args.push(output.into());
    for task in listed.unwrap_or_default() {
        debug!("to: {}", task.destination.display());
        args.push(task.destination.clone().into());
    }
    args
}

/// Run `go` with `args` in `dir`, forwarding its output.
pub fn build_instrumented(dir: &Path, args: &[OsString]) -> Result<(), Error> {
    info!("successfully instrumented code, compiling with go build");
    let status = Command::new("go")
        .args(args)
        .current_dir(dir)
        .status()
        .map_err(Error::SpawnBuild)?;

    if !status.success() {
        return Err(Error::BuildFailed(format!("go build exited with {status}")));
    }
    Ok(())
}
