//! Disk I/O helpers: load the snapshot and write it back.
//!
//! [`WriteMode::Atomic`] writes a sibling temp file and renames it over the
//! snapshot. The rename is close to atomic on local filesystems; on FAT32 or
//! network shares there are no hard guarantees.

use crate::error::{Error, Result};
use crate::serializer::Serializer;
use crate::user::User;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a snapshot is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Write `<path>.tmp`, then rename it over the snapshot.
    #[default]
    Atomic,
    /// Truncate and overwrite the snapshot in place. A crash mid-write can
    /// leave a torn file.
    InPlace,
}

impl FromStr for WriteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(WriteMode::Atomic),
            "in-place" | "in_place" | "inplace" => Ok(WriteMode::InPlace),
            other => Err(Error::Invalid(format!("unknown write mode {other:?}"))),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Atomic => f.write_str("atomic"),
            WriteMode::InPlace => f.write_str("in-place"),
        }
    }
}

/// Create the directory that will hold `path`, if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| io_error("create directory", dir, e))
        }
        _ => Ok(()),
    }
}

/// Reads and deserializes the snapshot at `path`. Returns no records if the
/// file is missing or empty (not an error).
pub fn load<S>(path: &Path, serializer: &S) -> Result<Vec<User>>
where
    S: Serializer,
{
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error("read", path, e)),
    };
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    serializer.deserialize::<Vec<User>>(&bytes).map_err(|e| match e {
        Error::Persistence(msg) => Error::Persistence(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Replace the snapshot at `path` with `bytes`.
pub fn write_snapshot(path: &Path, bytes: &[u8], mode: WriteMode) -> Result<()> {
    match mode {
        WriteMode::Atomic => atomic_write(path, bytes),
        WriteMode::InPlace => std::fs::write(path, bytes).map_err(|e| io_error("write", path, e)),
    }
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. This avoids
/// leaving a half-written snapshot if the process crashes mid-write.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| io_error("write", &tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_error("rename onto", path, e));
    }
    Ok(())
}

/// Sibling temp file used by [`atomic_write`].
pub fn temp_path(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    path.with_extension(format!("{ext}.tmp"))
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::Persistence(format!("failed to {action} {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::JsonSerializer;

    #[test]
    fn write_mode_parses() {
        assert_eq!("atomic".parse::<WriteMode>().unwrap(), WriteMode::Atomic);
        assert_eq!("In-Place".parse::<WriteMode>().unwrap(), WriteMode::InPlace);
        assert!("sometimes".parse::<WriteMode>().is_err());
        assert_eq!(WriteMode::InPlace.to_string(), "in-place");
    }

    #[test]
    fn temp_path_keeps_extension() {
        assert_eq!(
            temp_path(Path::new("/data/users.json")),
            PathBuf::from("/data/users.json.tmp")
        );
        assert_eq!(temp_path(Path::new("users")), PathBuf::from("users.json.tmp"));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        atomic_write(&path, b"[]").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"[]");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn load_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        assert!(load(&path, &JsonSerializer::new()).unwrap().is_empty());
        std::fs::write(&path, b"").unwrap();
        assert!(load(&path, &JsonSerializer::new()).unwrap().is_empty());
    }

    #[test]
    fn load_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, b"{not json").unwrap();
        match load(&path, &JsonSerializer::new()) {
            Err(Error::Persistence(msg)) => assert!(msg.contains("users.json")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("users.json");
        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new("users.json")).unwrap();
    }
}
