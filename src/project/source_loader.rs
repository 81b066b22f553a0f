//! Loads YANG sources by logical module name.
//!
//! A loader holds an ordered list of search directories. `dir/...` adds
//! `dir` and every directory below it. For a module `name`, a directory
//! matches with `name.yang`, or with the revision files
//! `name@YYYY-MM-DD.yang`, of which the lexicographically greatest (and
//! thus newest) revision wins.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no YANG source found for \"{0}\"")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Search-path based source loader.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    paths: Vec<PathBuf>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a search directory. A trailing `/...` expands to the
    /// directory and all directories below it.
    pub fn add_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Some(base) = path.to_str().and_then(|s| s.strip_suffix("/...")) else {
            self.paths.push(path.to_path_buf());
            return;
        };
        for entry in WalkDir::new(base)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.file_type().is_dir() {
                self.paths.push(entry.path().to_path_buf());
            }
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Find a module by logical name (no extension) and read it.
    pub fn find(&self, name: &str) -> Result<(PathBuf, String), LoadError> {
        // a name that is already a path is used as-is
        if name.ends_with(".yang") {
            let path = PathBuf::from(name);
            if path.is_file() {
                return read(path);
            }
            return Err(LoadError::NotFound(name.to_string()));
        }

        for dir in &self.paths {
            let exact = dir.join(format!("{name}.yang"));
            if exact.is_file() {
                return read(exact);
            }
            if let Some(best) = best_revision(dir, name) {
                return read(best);
            }
        }
        Err(LoadError::NotFound(name.to_string()))
    }
}

/// The `name@<revision>.yang` file with the greatest revision date, by
/// lexicographic file-name comparison.
fn best_revision(dir: &Path, name: &str) -> Option<PathBuf> {
    let wanted_prefix = format!("{name}@");
    let mut best: Option<String> = None;
    for entry in std::fs::read_dir(dir).ok()?.filter_map(Result::ok) {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with(&wanted_prefix)
            && file_name.ends_with(".yang")
            && best.as_deref().is_none_or(|b| file_name.as_str() > b)
        {
            best = Some(file_name);
        }
    }
    best.map(|b| dir.join(b))
}

fn read(path: PathBuf) -> Result<(PathBuf, String), LoadError> {
    match std::fs::read_to_string(&path) {
        Ok(source) => Ok((path, source)),
        Err(source) => Err(LoadError::Io { path, source }),
    }
}
