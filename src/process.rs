use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;
use crate::inspect::has_entry_point;
use crate::rewrite::instrument;
use crate::syntax::{SourceFile, parse_file};

/// Suffix of files the engine parses. Everything else is passed through.
pub const SOURCE_SUFFIX: &str = ".go";

/// One file to process: where it comes from, where the result goes, and the
/// profile path to embed if it turns out to contain `func main()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingTask {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub profile_path: String,
}

pub fn is_go_source(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .ends_with(SOURCE_SUFFIX.as_bytes())
}

/// Process `task.source` into the new file `task.destination`.
///
/// Go files with an entry point are instrumented; every other file is
/// duplicated unchanged. Returns whether an entry point was instrumented.
pub fn process_file(task: &ProcessingTask) -> Result<bool, Error> {
    if is_go_source(&task.source) {
        return process_go_file(task);
    }
    duplicate(&task.source, &task.destination)?;
    Ok(false)
}

/// Parse a Go file and write its instrumented form to `task.destination`,
/// which must not exist yet. Files without an entry point are duplicated
/// instead of re-printed, so they stay byte-for-byte identical.
pub fn process_go_file(task: &ProcessingTask) -> Result<bool, Error> {
    let Some(mut file) = parse_entry_file(&task.source)? else {
        duplicate(&task.source, &task.destination)?;
        return Ok(false);
    };

    instrument(&mut file, &task.profile_path);
    let out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&task.destination)
        .map_err(|source| Error::CreateOutput {
            path: task.destination.clone(),
            source,
        })?;
    write_output(out, &file, &task.destination)?;
    Ok(true)
}

/// Instrument `path` by rewriting it in place.
///
/// Only `.go` files are considered. Anything else is left alone (never
/// truncated), as is any Go file without an entry point.
pub fn process_file_in_place(path: &Path, profile_path: &str) -> Result<bool, Error> {
    if !is_go_source(path) {
        return Ok(false);
    }
    let Some(mut file) = parse_entry_file(path)? else {
        return Ok(false);
    };

    instrument(&mut file, profile_path);
    let out = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| Error::TruncateOutput {
            path: path.to_path_buf(),
            source,
        })?;
    write_output(out, &file, path)?;
    Ok(true)
}

/// Parse `path`, returning the tree only if it has an entry point.
fn parse_entry_file(path: &Path) -> Result<Option<SourceFile>, Error> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_file(source).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(has_entry_point(&file).then_some(file))
}

fn write_output(out: File, file: &SourceFile, path: &Path) -> Result<(), Error> {
    let mut writer = BufWriter::new(out);
    writer
        .write_all(file.to_source().as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|source| Error::WriteOutput {
            path: path.to_path_buf(),
            source,
        })
}

fn duplicate(from: &Path, to: &Path) -> Result<(), Error> {
    debug!(from = %from.display(), to = %to.display(), "duplicating unchanged file");
    duplicate_file(from, to).map_err(|source| Error::Duplicate {
        path: from.to_path_buf(),
        source,
    })
}

/// Duplicate a file by symlinking `to` to the absolute path of `from`,
/// falling back to a byte copy where links are not possible. Fails if `to`
/// already exists.
pub fn duplicate_file(from: &Path, to: &Path) -> io::Result<()> {
    let absolute = std::path::absolute(from)?;
    if symlink(&absolute, to).is_err() {
        copy_file(from, to)?;
    }
    Ok(())
}

/// Copy `from` to the new file `to`. Fails if `to` already exists.
pub fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    let mut input = File::open(from)?;
    let mut output = OpenOptions::new().write(true).create_new(true).open(to)?;
    io::copy(&mut input, &mut output)?;
    Ok(())
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_original: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const HELLO: &str = "package main\n\nfunc main() {\n\tprint(\"abc\")\n}\n";

    fn task(dir: &TempDir, source: &str, destination: &str) -> ProcessingTask {
        ProcessingTask {
            source: dir.path().join(source),
            destination: dir.path().join(destination),
            profile_path: "bla.prof".into(),
        }
    }

    #[test]
    fn instruments_into_new_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.go"), HELLO).unwrap();

        let found = process_file(&task(&dir, "main.go", "out.go")).unwrap();

        assert!(found);
        let out = fs::read_to_string(dir.path().join("out.go")).unwrap();
        assert!(out.contains("import \"runtime/pprof\""), "Got:\n{out}");
        assert!(out.contains("os.Create(\"bla.prof\")"), "Got:\n{out}");
        assert_eq!(fs::read_to_string(dir.path().join("main.go")).unwrap(), HELLO);
    }

    #[test]
    fn file_without_entry_point_is_duplicated_verbatim() {
        let dir = TempDir::new().unwrap();
        let src = "package lib   // odd spacing kept\n\nfunc main() {}\n";
        fs::write(dir.path().join("lib.go"), src).unwrap();

        let found = process_file(&task(&dir, "lib.go", "out.go")).unwrap();

        assert!(!found);
        assert_eq!(fs::read_to_string(dir.path().join("out.go")).unwrap(), src);
    }

    #[test]
    fn non_go_files_are_duplicated_without_parsing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("asm.s"), "not go at all {{{").unwrap();

        let found = process_file(&task(&dir, "asm.s", "copy.s")).unwrap();

        assert!(!found);
        assert_eq!(
            fs::read_to_string(dir.path().join("copy.s")).unwrap(),
            "not go at all {{{"
        );
    }

    #[test]
    fn existing_destination_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.go"), HELLO).unwrap();
        fs::write(dir.path().join("out.go"), "keep me").unwrap();

        let err = process_file(&task(&dir, "main.go", "out.go")).unwrap_err();

        assert!(matches!(err, Error::CreateOutput { .. }), "{err}");
        assert_eq!(fs::read_to_string(dir.path().join("out.go")).unwrap(), "keep me");
    }

    #[test]
    fn existing_destination_for_duplicate_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.go"), "package lib\n").unwrap();
        fs::write(dir.path().join("out.go"), "keep me").unwrap();

        let err = process_file(&task(&dir, "lib.go", "out.go")).unwrap_err();

        assert!(matches!(err, Error::Duplicate { .. }), "{err}");
        assert_eq!(fs::read_to_string(dir.path().join("out.go")).unwrap(), "keep me");
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.go"), "package main\n\nfunc main( {\n").unwrap();

        let err = process_file(&task(&dir, "bad.go", "out.go")).unwrap_err();

        assert!(matches!(err, Error::Parse { .. }), "{err}");
        assert!(err.to_string().contains("bad.go"), "{err}");
        assert!(!dir.path().join("out.go").exists());
    }

    #[test]
    fn in_place_rewrites_the_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, HELLO).unwrap();

        assert!(process_file_in_place(&path, "bla.prof").unwrap());

        let out = fs::read_to_string(&path).unwrap();
        assert!(out.starts_with("package main\n\nimport \"os\"\n"), "Got:\n{out}");
        assert!(out.ends_with("\tprint(\"abc\")\n}\n"), "Got:\n{out}");
    }

    #[test]
    fn in_place_leaves_files_without_entry_point() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("greeting.go");
        let src = "package main\n\nfunc greeting() string { return \"hi\" }\n";
        fs::write(&path, src).unwrap();

        assert!(!process_file_in_place(&path, "bla.prof").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), src);
    }

    #[test]
    fn in_place_ignores_non_go_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "package main\nfunc main() {}\n").unwrap();

        assert!(!process_file_in_place(&path, "bla.prof").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "package main\nfunc main() {}\n"
        );
    }

    #[test]
    fn copy_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), "a").unwrap();
        fs::write(dir.path().join("b"), "b").unwrap();

        let err = copy_file(&dir.path().join("a"), &dir.path().join("b")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn suffix_check() {
        assert!(is_go_source(Path::new("dir/main.go")));
        assert!(!is_go_source(Path::new("dir/main.go.txt")));
        assert!(!is_go_source(Path::new("dir/cgo.c")));
    }
}
