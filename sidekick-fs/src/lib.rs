//! Filesystem helpers for Sidekick inputs and artefacts, built on `cap-std`
//! and `camino`.
//!
//! Every helper resolves the target's parent directory with ambient authority
//! once and then works relative to that capability.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Write};
use std::path::Component;

/// Suffix appended to artefacts while they are being written.
const PARTIAL_SUFFIX: &str = ".partial";

/// Open an existing UTF-8 file path for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read a whole file into memory.
pub fn read_file(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read(name.as_str())
}

/// Create or truncate `path`, creating missing parent directories first.
pub fn create_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Replace `path` with `contents`.
///
/// Bytes land in a sibling `<name>.partial` file first and are renamed over
/// the target once flushed, so readers never observe a half-written
/// artefact.
pub fn write_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let partial = format!("{name}{PARTIAL_SUFFIX}");
    let mut file = dir.create(partial.as_str())?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    dir.rename(partial.as_str(), &dir, name.as_str())
}

/// Resolve the directory containing `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = split_at_root(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Return whether a path exists and is a regular file.
///
/// A missing parent directory reports `false` rather than an error.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Split a directory path into an ambient base directory and the relative
/// remainder beneath it.
fn split_at_root(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();
    let (base, relative) = match std_parent.components().next() {
        // Windows drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::Read;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temporary directory")
    }

    fn utf8(dir: &TempDir, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(relative)).expect("utf8 temp path")
    }

    #[rstest]
    fn write_file_creates_parents_and_replaces(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "artefacts/nested/tables.bin");
        write_file(&path, b"first").expect("write first");
        write_file(&path, b"second").expect("write second");
        assert_eq!(read_file(&path).expect("read back"), b"second");
        assert!(!file_is_file(&utf8(&temp_dir, "artefacts/nested/tables.bin.partial")).expect("stat"));
    }

    #[rstest]
    fn create_file_then_open(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "out/recommendations.csv");
        let mut file = create_file(&path).expect("create");
        file.write_all(b"ORDER_ID\n").expect("write");
        drop(file);
        let mut contents = String::new();
        open_utf8_file(&path)
            .expect("open")
            .read_to_string(&mut contents)
            .expect("read");
        assert_eq!(contents, "ORDER_ID\n");
    }

    #[rstest]
    fn file_is_file_distinguishes_missing_and_directories(temp_dir: TempDir) {
        assert!(!file_is_file(&utf8(&temp_dir, "missing.csv")).expect("stat missing"));
        assert!(!file_is_file(&utf8(&temp_dir, "no/such/dir/orders.csv")).expect("stat"));
        ensure_parent_dir(&utf8(&temp_dir, "sub/file.csv")).expect("create dir");
        assert!(!file_is_file(&utf8(&temp_dir, "sub")).expect("stat dir"));
    }
}
