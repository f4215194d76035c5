use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// One entry returned by [`FsGateway::list_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Filesystem operations the tree and the note view rely on.
///
/// Creation never overwrites: an existing entry yields `AlreadyExists`.
/// Implementations must be shareable with blocking worker tasks.
pub trait FsGateway: Send + Sync {
    fn create_file(&self, path: &Path, content: &[u8]) -> Result<()>;
    fn create_folder(&self, path: &Path) -> Result<()>;
    /// Remove a file, or a directory and everything below it.
    fn delete_recursive(&self, path: &Path) -> Result<()>;
    fn list_directory(&self, path: &Path) -> Result<Vec<DirEntryInfo>>;
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
    fn write_file(&self, path: &Path, content: &[u8]) -> Result<()>;
}

/// Gateway backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

fn require_path(path: &Path, what: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(AppError::InvalidArgument(format!("{} path cannot be empty", what)));
    }
    Ok(())
}

fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

impl FsGateway for LocalFs {
    fn create_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        require_path(path, "file")?;
        if entry_exists(path) {
            return Err(AppError::AlreadyExists(path.to_path_buf()));
        }
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(content)?;
        Ok(())
    }

    fn create_folder(&self, path: &Path) -> Result<()> {
        require_path(path, "folder")?;
        if entry_exists(path) {
            return Err(AppError::AlreadyExists(path.to_path_buf()));
        }
        fs::create_dir(path)?;
        Ok(())
    }

    fn delete_recursive(&self, path: &Path) -> Result<()> {
        require_path(path, "delete")?;
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        if metadata.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // Symlinked directories are listed as leaves so a walk cannot cycle.
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
                is_dir,
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        fs::write(path, content)?;
        Ok(())
    }
}
