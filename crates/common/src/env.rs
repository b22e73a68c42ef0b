//! Environment/runtime helpers
//!
//! Sanity checks on directories the process expects to use at startup.

use std::{io, path::Path};

/// What the process can do with a directory path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Missing,
    NotADirectory,
    ReadOnly,
    Writable,
}

/// Inspect `path` the way a caller about to write scratch files would.
///
/// Symlinks are followed. Any metadata failure other than "not found"
/// (e.g. a parent without search permission) is reported as `Missing`,
/// since the process cannot reach the path either way.
pub fn probe_dir(path: &Path) -> DirStatus {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(_) => return DirStatus::Missing,
    };
    if !meta.is_dir() {
        return DirStatus::NotADirectory;
    }
    match writable(path, &meta) {
        Ok(true) => DirStatus::Writable,
        _ => DirStatus::ReadOnly,
    }
}

#[cfg(unix)]
fn writable(path: &Path, _meta: &std::fs::Metadata) -> io::Result<bool> {
    use nix::unistd::{access, AccessFlags};
    access_outcome(access(path, AccessFlags::W_OK))
}

/// `EACCES` and `EROFS` mean "not writable"; other errnos are real failures.
#[cfg(unix)]
fn access_outcome(res: nix::Result<()>) -> io::Result<bool> {
    use nix::errno::Errno;
    match res {
        Ok(()) => Ok(true),
        Err(Errno::EACCES) | Err(Errno::EROFS) => Ok(false),
        Err(e) => Err(io::Error::from(e)),
    }
}

#[cfg(not(unix))]
fn writable(_path: &Path, meta: &std::fs::Metadata) -> io::Result<bool> {
    Ok(!meta.permissions().readonly())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("common_env_{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_path_is_reported() {
        assert_eq!(probe_dir(&scratch()), DirStatus::Missing);
    }

    #[test]
    fn regular_file_is_not_a_directory() -> Result<(), anyhow::Error> {
        let file = scratch();
        std::fs::write(&file, b"x")?;
        assert_eq!(probe_dir(&file), DirStatus::NotADirectory);
        std::fs::remove_file(&file)?;
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn access_denials_map_to_read_only() {
        use nix::errno::Errno;
        assert!(matches!(access_outcome(Ok(())), Ok(true)));
        assert!(matches!(access_outcome(Err(Errno::EACCES)), Ok(false)));
        assert!(matches!(access_outcome(Err(Errno::EROFS)), Ok(false)));
        assert!(access_outcome(Err(Errno::ENAMETOOLONG)).is_err());
    }

    #[test]
    fn fresh_directory_is_writable() -> Result<(), anyhow::Error> {
        let dir = scratch();
        std::fs::create_dir_all(&dir)?;
        assert_eq!(probe_dir(&dir), DirStatus::Writable);
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
