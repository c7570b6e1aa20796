//! All-or-nothing output through a hidden staging directory
//!
//! Output is built inside a temporary directory that lives on the same
//! filesystem as its final location, then renamed into place. Dropping a
//! [`Staging`] without committing removes everything it holds.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::Result;

const STAGING_PREFIX: &str = ".geoslim-staging-";
const BACKUP_PREFIX: &str = ".geoslim-backup-";

/// Temporary directory whose contents are moved into a target on commit
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    /// Create a staging directory inside `dir`, which must exist.
    pub fn new_in(dir: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(dir)?;
        debug!("staging in {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create a staging directory in the nearest existing ancestor of
    /// `target`, so that `target` itself is not created before commit.
    pub fn for_target(target: &Path) -> Result<Self> {
        Self::new_in(&nearest_existing_ancestor(target))
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Move every staged file into `target`, creating it (and any
    /// subdirectories) as needed. Returns the final paths in staging order.
    pub fn commit_into(self, target: &Path) -> Result<Vec<PathBuf>> {
        self.commit_replacing(target, &[])
    }

    /// Like [`Staging::commit_into`], and also remove the `stale` files.
    ///
    /// Files already at the destination are moved aside rather than
    /// overwritten. If any move fails, every move made so far is undone, so
    /// the destination holds exactly what it held before.
    pub fn commit_replacing(self, target: &Path, stale: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let staged = list_files(self.dir.path())?;
        let parent = self.dir.path().parent().map(Path::to_path_buf).unwrap_or_default();
        let backup = tempfile::Builder::new()
            .prefix(BACKUP_PREFIX)
            .tempdir_in(&parent)?;

        let mut journal = Journal {
            moves: Vec::new(),
            created_target: !target.exists(),
            target: target.to_path_buf(),
        };
        match journal.apply(self.dir.path(), backup.path(), target, &staged, stale) {
            Ok(committed) => {
                debug!("committed {} files into {}", committed.len(), target.display());
                Ok(committed)
            }
            Err(e) => {
                journal.rollback();
                Err(e)
            }
        }
    }
}

/// Renames made during a commit, in order.
struct Journal {
    moves: Vec<(PathBuf, PathBuf)>,
    created_target: bool,
    target: PathBuf,
}

impl Journal {
    fn apply(
        &mut self,
        staging: &Path,
        backup: &Path,
        target: &Path,
        staged: &[PathBuf],
        stale: &[PathBuf],
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(target)?;

        for (index, path) in stale.iter().enumerate() {
            if path.is_file() {
                self.rename(path, &backup.join(format!("stale-{}", index)))?;
            }
        }

        let mut committed = Vec::with_capacity(staged.len());
        for rel in staged {
            let from = staging.join(rel);
            let to = target.join(rel);
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)?;
            }
            if to.exists() {
                let aside = backup.join("replaced").join(rel);
                if let Some(parent) = aside.parent() {
                    fs::create_dir_all(parent)?;
                }
                self.rename(&to, &aside)?;
            }
            self.rename(&from, &to)?;
            committed.push(to);
        }
        Ok(committed)
    }

    fn rename(&mut self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to)?;
        self.moves.push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn rollback(self) {
        for (from, to) in self.moves.iter().rev() {
            if let Err(e) = fs::rename(to, from) {
                warn!("could not restore {}: {}", from.display(), e);
            }
        }
        if self.created_target {
            let _ = fs::remove_dir_all(&self.target);
        }
    }
}

fn nearest_existing_ancestor(target: &Path) -> PathBuf {
    let mut current = target;
    loop {
        match current.parent() {
            Some(parent) if parent.as_os_str().is_empty() => return PathBuf::from("."),
            Some(parent) if parent.is_dir() => return parent.to_path_buf(),
            Some(parent) => current = parent,
            None => return PathBuf::from("."),
        }
    }
}

/// Regular files under `root`, relative to it, sorted.
fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut pending = vec![PathBuf::new()];
    while let Some(rel) = pending.pop() {
        for entry in fs::read_dir(root.join(&rel))? {
            let entry = entry?;
            let child = rel.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                pending.push(child);
            } else {
                out.push(child);
            }
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_moves_nested_files() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("out").join("boundaries");

        let staging = Staging::for_target(&target).unwrap();
        assert_eq!(staging.path().parent().unwrap(), root.path());
        fs::create_dir_all(staging.path().join("sub")).unwrap();
        fs::write(staging.path().join("a.txt"), b"a").unwrap();
        fs::write(staging.path().join("sub/b.txt"), b"b").unwrap();

        let files = staging.commit_into(&target).unwrap();
        assert_eq!(files, vec![target.join("a.txt"), target.join("sub/b.txt")]);
        assert_eq!(fs::read(target.join("sub/b.txt")).unwrap(), b"b");
    }

    #[test]
    fn test_drop_leaves_nothing_behind() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("never");
        {
            let staging = Staging::for_target(&target).unwrap();
            fs::write(staging.path().join("partial.shp"), b"x").unwrap();
        }
        assert!(!target.exists());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_replacing_moves_stale_files_out() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("out");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("layer.shp"), b"old").unwrap();
        fs::write(target.join("layer.prj"), b"old prj").unwrap();

        let staging = Staging::for_target(&target.join("layer.shp")).unwrap();
        fs::write(staging.path().join("layer.shp"), b"new").unwrap();
        staging
            .commit_replacing(&target, &[target.join("layer.prj")])
            .unwrap();

        assert_eq!(fs::read(target.join("layer.shp")).unwrap(), b"new");
        assert!(!target.join("layer.prj").exists());
        // Staging and backup directories are gone
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_commit_restores_previous_files() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("out");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("a.txt"), b"old a").unwrap();
        fs::write(target.join("a.prj"), b"old prj").unwrap();
        // A file where the staged subdirectory must go: the second rename fails
        fs::write(target.join("sub"), b"blocker").unwrap();

        let staging = Staging::for_target(&target.join("a.txt")).unwrap();
        fs::write(staging.path().join("a.txt"), b"new a").unwrap();
        fs::create_dir_all(staging.path().join("sub")).unwrap();
        fs::write(staging.path().join("sub/b.txt"), b"new b").unwrap();

        assert!(staging
            .commit_replacing(&target, &[target.join("a.prj")])
            .is_err());
        assert_eq!(fs::read(target.join("a.txt")).unwrap(), b"old a");
        assert_eq!(fs::read(target.join("a.prj")).unwrap(), b"old prj");
        assert_eq!(fs::read(target.join("sub")).unwrap(), b"blocker");
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_nearest_ancestor_of_relative_path() {
        assert_eq!(nearest_existing_ancestor(Path::new("out.shp")), PathBuf::from("."));
    }
}
