use std::path::PathBuf;

use crate::resolver::{Resolver, DEFAULT_SYMLINK_LIMIT};
use crate::walker::Walker;

// ---------------------------------------------------------------------------
// WalkBuilder
// ---------------------------------------------------------------------------

/// Configures a [`Walker`].
///
/// Created via [`linkwalk::builder()`](crate::builder). Configure with chained
/// builder methods, then call [`build()`](WalkBuilder::build).
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// let mut walker = linkwalk::builder(dir.path())
///     .symlink_limit(8)
///     .build();
///
/// assert!(walker.next_entry().is_skippable());
/// assert!(walker.next_entry().is_end());
/// ```
#[derive(Debug, Clone)]
pub struct WalkBuilder {
    path:          PathBuf,
    symlink_limit: usize,
}

impl WalkBuilder {
    /// Start configuring a walk of `path`.
    ///
    /// The path may be relative, unclean, a symlink, or missing altogether;
    /// nothing is checked until the first entry is requested.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:          path.into(),
            symlink_limit: DEFAULT_SYMLINK_LIMIT,
        }
    }

    /// Maximum number of symlinks expanded while resolving any one path.
    ///
    /// Resolution that needs more fails with
    /// [`ErrorKind::SymlinkLimit`](crate::ErrorKind::SymlinkLimit). Defaults
    /// to 40.
    pub fn symlink_limit(mut self, n: usize) -> Self {
        self.symlink_limit = n;
        self
    }

    /// Build the walker. Does not touch the filesystem.
    pub fn build(self) -> Walker {
        Walker::new(self.path, Resolver::new(self.symlink_limit))
    }
}
