use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, TilesError};

pub fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        match e.kind() {
            ErrorKind::NotFound => log::debug!("{} does not exist", path.display()),
            _ => log::warn!("Could not read {}: {}", path.display(), e),
        }
        TilesError::not_found(path.display())
    })
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Lists regular files below `dir`, sorted by path.
pub fn list(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TilesError::not_found(dir.display()));
    }

    let mut files: Vec<PathBuf> = if recursive {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    } else {
        std::fs::read_dir(dir)
            .map_err(|_| TilesError::not_found(dir.display()))?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect()
    };
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_flat_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.tif"), b"x").unwrap();

        let flat = list(dir.path(), false).unwrap();
        assert_eq!(flat, vec![dir.path().join("a.png"), dir.path().join("b.png")]);

        let deep = list(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&dir.path().join("sub").join("c.tif")));
    }

    #[test]
    fn test_missing_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(list(&missing, false), Err(TilesError::NotFound { .. })));
        assert!(matches!(read(&missing), Err(TilesError::NotFound { .. })));
        assert!(!exists(&missing));
    }
}
