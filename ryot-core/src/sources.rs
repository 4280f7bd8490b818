//! Discovery of `.ry` source files under a directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::CoreError;

pub const SOURCE_EXTENSION: &str = "ry";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the walked root.
    pub path: PathBuf,
    pub contents: String,
}

impl SourceFile {
    /// Relative path without the `.ry` extension.
    pub fn artifact_dir(&self) -> PathBuf {
        self.path.with_extension("")
    }
}

pub fn is_source_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Every `.ry` file below `root`, sorted by relative path.
pub fn load_sources(root: impl AsRef<Path>) -> Result<Vec<SourceFile>, CoreError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|err| CoreError::SourceIo(err.into()))?;
        let path = entry.path();
        if is_source_file(path) {
            let contents = fs::read_to_string(path)?;
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            files.push(SourceFile {
                path: relative,
                contents,
            });
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("found {} source files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn finds_nested_sources_in_order() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("tokens")).expect("mkdir");
        fs::write(dir.path().join("zeta.ry"), "z").expect("write");
        fs::write(dir.path().join("alpha.ry"), "a").expect("write");
        fs::write(dir.path().join("tokens/coin.ry"), "c").expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let files = load_sources(dir.path()).expect("load");
        let paths: Vec<_> = files.iter().map(|file| file.path.clone()).collect();
        assert_eq!(
            paths,
            [
                PathBuf::from("alpha.ry"),
                PathBuf::from("tokens/coin.ry"),
                PathBuf::from("zeta.ry"),
            ]
        );
        assert_eq!(files[1].contents, "c");
        assert_eq!(files[1].artifact_dir(), PathBuf::from("tokens/coin"));
        assert_eq!(files[0].artifact_dir(), PathBuf::from("alpha"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let err = load_sources(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, CoreError::SourceIo(_)));
    }
}
