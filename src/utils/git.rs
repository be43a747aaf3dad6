//! Repository discovery.
//!
//! Locates the working tree the history query runs in, and the metadata
//! files whose changes move HEAD or a branch.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Where a repository keeps its working tree and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
    /// Working tree root; history paths are relative to this.
    pub workdir: PathBuf,
    /// Per-worktree git dir holding `HEAD`.
    pub git_dir: PathBuf,
    /// Shared git dir holding `refs/` (same as `git_dir` outside worktrees).
    pub common_dir: PathBuf,
}

impl RepoLayout {
    /// Discover the repository containing `root`, walking up as git does.
    pub fn discover(root: &Path) -> Result<Self> {
        let repo = gix::discover(root)
            .with_context(|| format!("No git repository found at {}", root.display()))?;

        let workdir = repo
            .workdir()
            .with_context(|| format!("Repository at {} is bare", repo.path().display()))?;

        Ok(Self {
            workdir: absolute(workdir),
            git_dir: absolute(repo.path()),
            common_dir: absolute(repo.common_dir()),
        })
    }

    /// `HEAD` of this worktree.
    pub fn head_file(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    /// Directory of local branch refs.
    pub fn heads_dir(&self) -> PathBuf {
        self.common_dir.join("refs").join("heads")
    }

    /// Whether `path` is metadata that changes the checked-out commit.
    pub fn is_ref_change(&self, path: &Path) -> bool {
        if path.extension().is_some_and(|ext| ext == "lock") {
            return false;
        }
        path == self.head_file() || path.starts_with(self.heads_dir())
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> RepoLayout {
        RepoLayout {
            workdir: PathBuf::from("/repo"),
            git_dir: PathBuf::from("/repo/.git"),
            common_dir: PathBuf::from("/repo/.git"),
        }
    }

    #[test]
    fn test_ref_paths() {
        let layout = layout();
        assert_eq!(layout.head_file(), PathBuf::from("/repo/.git/HEAD"));
        assert_eq!(layout.heads_dir(), PathBuf::from("/repo/.git/refs/heads"));
    }

    #[test]
    fn test_is_ref_change() {
        let layout = layout();
        assert!(layout.is_ref_change(Path::new("/repo/.git/HEAD")));
        assert!(layout.is_ref_change(Path::new("/repo/.git/refs/heads/main")));
        assert!(layout.is_ref_change(Path::new("/repo/.git/refs/heads/feature/x")));

        assert!(!layout.is_ref_change(Path::new("/repo/.git/HEAD.lock")));
        assert!(!layout.is_ref_change(Path::new("/repo/.git/refs/heads/main.lock")));
        assert!(!layout.is_ref_change(Path::new("/repo/.git/refs/tags/v1")));
        assert!(!layout.is_ref_change(Path::new("/repo/.git/index")));
        assert!(!layout.is_ref_change(Path::new("/repo/src/content/blog/a.md")));
    }

    #[test]
    fn test_discover() {
        if which::which("git").is_err() {
            return;
        }

        let dir = tempfile::TempDir::new().unwrap();
        let status = std::process::Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success());

        let nested = dir.path().join("src/content");
        std::fs::create_dir_all(&nested).unwrap();

        let layout = RepoLayout::discover(&nested).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(layout.workdir, root);
        assert_eq!(layout.git_dir, root.join(".git"));
        assert_eq!(layout.heads_dir(), root.join(".git/refs/heads"));
    }
}
