use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

use tracing::trace;

use crate::entry::DirEntry;
use crate::error::WalkError;

/// Linux `MAXSYMLINKS`.
pub const DEFAULT_SYMLINK_LIMIT: usize = 40;

/// Turns arbitrary paths into canonical ones: absolute, clean, and free of
/// symlink components.
///
/// Resolution walks the path one component at a time, expanding symlinks as
/// it meets them, so `..` after a symlink climbs out of the link's *target*
/// rather than out of the directory holding the link. Nothing on disk is
/// created or modified.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    symlink_limit: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_SYMLINK_LIMIT)
    }
}

enum Part {
    Parent,
    Name(OsString),
}

impl Resolver {
    pub fn new(symlink_limit: usize) -> Self {
        Self { symlink_limit }
    }

    /// How many symlinks a single [`canonicalize()`](Resolver::canonicalize)
    /// call may expand before it fails with
    /// [`SymlinkLimit`](crate::WalkError::SymlinkLimit).
    pub fn symlink_limit(&self) -> usize {
        self.symlink_limit
    }

    /// Resolve `path` to its canonical form.
    ///
    /// An empty path means the current directory. Failures name the
    /// component that could not be resolved.
    pub fn canonicalize(&self, path: &Path) -> Result<PathBuf, WalkError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            let cwd = env::current_dir().map_err(|e| WalkError::from_io(PathBuf::from("."), e))?;
            if path.as_os_str().is_empty() {
                cwd
            } else {
                cwd.join(path)
            }
        };

        let (anchor, parts) = split(&absolute);
        let mut resolved = anchor.unwrap_or_else(|| PathBuf::from(MAIN_SEPARATOR_STR));
        let mut pending: Vec<Part> = parts.into_iter().rev().collect();
        let mut expansions = 0usize;

        while let Some(part) = pending.pop() {
            let name = match part {
                Part::Parent => {
                    resolved.pop();
                    continue;
                }
                Part::Name(name) => name,
            };

            let candidate = resolved.join(&name);
            let metadata = fs::symlink_metadata(&candidate)
                .map_err(|e| WalkError::from_io(candidate.clone(), e))?;
            let ft = metadata.file_type();

            if ft.is_symlink() {
                expansions += 1;
                if expansions > self.symlink_limit {
                    return Err(WalkError::SymlinkLimit {
                        path:  candidate,
                        limit: self.symlink_limit,
                    });
                }
                let target = fs::read_link(&candidate)
                    .map_err(|e| WalkError::from_io(candidate.clone(), e))?;
                trace!("expanding {} -> {}", candidate.display(), target.display());

                let (target_anchor, target_parts) = split(&target);
                if let Some(target_anchor) = target_anchor {
                    resolved = target_anchor;
                }
                pending.extend(target_parts.into_iter().rev());
            } else if !ft.is_dir() && !pending.is_empty() {
                return Err(WalkError::NotADirectory { path: candidate });
            } else {
                resolved = candidate;
            }
        }

        Ok(resolved)
    }

    /// Describe the entry at `canonical` without following a terminal symlink.
    pub fn describe(&self, canonical: &Path) -> Result<DirEntry, WalkError> {
        let metadata = fs::symlink_metadata(canonical)
            .map_err(|e| WalkError::from_io(canonical.to_path_buf(), e))?;
        Ok(DirEntry::eager(canonical.to_path_buf(), metadata))
    }

    /// Like [`describe`](Resolver::describe), but follows a terminal symlink.
    pub fn describe_target(&self, canonical: &Path) -> Result<DirEntry, WalkError> {
        let metadata = fs::metadata(canonical)
            .map_err(|e| WalkError::from_io(canonical.to_path_buf(), e))?;
        Ok(DirEntry::eager(canonical.to_path_buf(), metadata))
    }
}

/// Split a path into its anchor (prefix and root, if any) and the
/// components that follow. `.` components are dropped here.
fn split(path: &Path) -> (Option<PathBuf>, Vec<Part>) {
    let mut anchor: Option<PathBuf> = None;
    let mut parts = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                anchor = Some(PathBuf::from(prefix.as_os_str()));
            }
            Component::RootDir => {
                anchor
                    .get_or_insert_with(PathBuf::new)
                    .push(MAIN_SEPARATOR_STR);
            }
            Component::CurDir => {}
            Component::ParentDir => parts.push(Part::Parent),
            Component::Normal(name) => parts.push(Part::Name(name.to_os_string())),
        }
    }

    (anchor, parts)
}
