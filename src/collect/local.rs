//! Local checkout source: the same descriptor tree, read from disk.

use super::{CollectError, Source, TreeEntry};
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Source for LocalSource {
    fn list(&self) -> Result<Vec<TreeEntry>, CollectError> {
        if !self.root.is_dir() {
            return Err(CollectError::Listing(format!(
                "not a directory: {}",
                self.root.display()
            )));
        }

        let pattern = self.root.join("**").join("*.json");
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern)
            .map_err(|e| CollectError::Listing(format!("invalid glob pattern {}: {}", pattern, e)))?;

        let mut entries = Vec::new();
        for path in paths {
            let path = path.map_err(|e| CollectError::Listing(e.to_string()))?;
            if !path.is_file() {
                continue;
            }
            if let Some(relative) = relative_path(&self.root, &path) {
                entries.push(TreeEntry::blob(relative));
            }
        }
        // glob already yields sorted paths; keep it explicit for determinism
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn fetch(&self, path: &str) -> Result<Option<String>, CollectError> {
        let full = self.root.join(path);
        fs::read_to_string(&full)
            .map(Some)
            .map_err(|e| CollectError::Fetch {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}

/// `root/Classes/Prop.json` → `Classes/Prop.json`, always with `/` separators.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}
