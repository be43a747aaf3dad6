//! Content file discovery.

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Repository-relative paths of every content file under `content_dir`.
///
/// Hidden files and directories (editor swap files, `.DS_Store`) are skipped.
/// A missing content directory yields an empty list.
pub fn content_files(repo_root: &Path, content_dir: &str) -> Result<Vec<String>> {
    let dir = repo_root.join(content_dir);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(repo_root)
            .with_context(|| format!("{} is outside the repository", entry.path().display()))?;
        files.push(to_slash(rel));
    }

    files.sort();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
