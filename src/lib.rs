//! # linkwalk
//!
//! Pull-based filesystem traversal that follows symbolic links and yields
//! every reachable entry exactly once.
//!
//! Give it a path (relative or absolute, unclean, a symlink, or missing) and
//! ask for entries one at a time. Symlinks are followed wherever they lead:
//!
//! - a link into a region already being walked is absorbed silently,
//! - a link to somewhere new opens a new root, walked after the current ones,
//! - a link to a directory *above* a region being walked promotes that
//!   directory to a root without re-emitting what was already emitted.
//!
//! Directories and resolved symlinks are emitted as [`Reason::Skippable`]
//! before anything beneath them. Pass their [`SkipToken`] to
//! [`Walker::skip`] before the next call to keep the walker out.
//!
//! Failures never stop the walk. Each one is attached to the [`WalkEntry`]
//! it concerns, with a [`Reason`] saying what went wrong.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//! use linkwalk::Reason;
//!
//! let dir = tempfile::tempdir().unwrap();
//! fs::create_dir(dir.path().join("skip-me")).unwrap();
//! fs::write(dir.path().join("skip-me/hidden.txt"), "x").unwrap();
//! fs::write(dir.path().join("notes.txt"), "x").unwrap();
//!
//! let mut walker = linkwalk::walk(dir.path());
//! let mut seen = Vec::new();
//! loop {
//!     let entry = walker.next_entry();
//!     if entry.is_end() {
//!         break;
//!     }
//!     if entry.provided_path.ends_with("skip-me") {
//!         walker.skip_entry(entry.skip_token.unwrap());
//!     }
//!     seen.push((entry.reason, entry.provided_path));
//! }
//!
//! assert_eq!(seen.len(), 3);
//! assert_eq!(seen[0].0, Reason::Skippable);
//! assert!(seen.iter().all(|(_, p)| !p.ends_with("hidden.txt")));
//! ```
//!
//! # Iteration
//!
//! [`Walker`] is also an [`Iterator`] over everything before END, and
//! [`Walker::visit`] drives a [`Visitor`] callback to completion:
//!
//! ```rust
//! use linkwalk::Visit;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::create_dir(dir.path().join("sub")).unwrap();
//!
//! let stats = linkwalk::walk(dir.path()).visit(|_: &linkwalk::WalkEntry| Visit::Continue);
//! assert!(stats.completed);
//! assert_eq!(stats.skippable, 2);
//! ```

#![forbid(unsafe_code)]

pub mod registry;

mod builder;
mod dir;
mod entry;
mod error;
mod resolver;
mod results;
mod traits;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::WalkBuilder;
pub use entry::{DirEntry, EntryKind, Reason, SkipToken, WalkEntry};
pub use error::{ErrorKind, WalkError};
pub use resolver::{Resolver, DEFAULT_SYMLINK_LIMIT};
pub use results::WalkStats;
pub use traits::{Visit, Visitor};
pub use walker::Walker;

// ── Entry points ──────────────────────────────────────────────────────────────

/// Create a [`Walker`] over `path` with default settings.
///
/// Does not touch the filesystem; the path is first resolved when the first
/// entry is requested.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("a.txt"), "a").unwrap();
///
/// let paths: Vec<_> = linkwalk::walk(dir.path())
///     .map(|entry| entry.provided_path)
///     .collect();
///
/// assert_eq!(paths, vec![dir.path().to_path_buf(), dir.path().join("a.txt")]);
/// ```
pub fn walk(path: impl Into<std::path::PathBuf>) -> Walker {
    WalkBuilder::new(path).build()
}

/// Create a [`WalkBuilder`] to configure a walk of `path`.
pub fn builder(path: impl Into<std::path::PathBuf>) -> WalkBuilder {
    WalkBuilder::new(path)
}
