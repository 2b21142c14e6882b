use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WalkError;

/// A directory-entry handle carried by every non-END [`WalkEntry`].
///
/// The handle knows the entry's basename and kind up front. Metadata is either
/// captured eagerly (roots, which are lstat'd when they are emitted) or
/// deferred: a deferred handle re-runs `lstat` on every call to
/// [`metadata()`](DirEntry::metadata) and never caches the result, so a long
/// walk does not hold on to stale metadata.
#[derive(Debug, Clone)]
pub struct DirEntry {
    name:     OsString,
    kind:     EntryKind,
    location: PathBuf,
    stat:     Stat,
}

#[derive(Debug, Clone)]
enum Stat {
    Eager(fs::Metadata),
    Deferred,
}

impl DirEntry {
    pub(crate) fn eager(location: PathBuf, metadata: fs::Metadata) -> Self {
        Self {
            name: basename(&location),
            kind: EntryKind::from(metadata.file_type()),
            location,
            stat: Stat::Eager(metadata),
        }
    }

    pub(crate) fn deferred(name: OsString, kind: EntryKind, location: PathBuf) -> Self {
        Self {
            name,
            kind,
            location,
            stat: Stat::Deferred,
        }
    }

    /// The final component of the entry's path.
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// What kind of entry this is, as reported by the directory reader.
    ///
    /// A symlink keeps [`EntryKind::Symlink`] even after the traverser has
    /// resolved it; its metadata describes the target.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The location [`metadata()`](DirEntry::metadata) reads from.
    pub fn path(&self) -> &Path {
        &self.location
    }

    /// Whether metadata is fetched on demand instead of captured.
    pub fn is_deferred(&self) -> bool {
        matches!(self.stat, Stat::Deferred)
    }

    /// Metadata for the entry, without following a terminal symlink.
    pub fn metadata(&self) -> Result<fs::Metadata, WalkError> {
        match &self.stat {
            Stat::Eager(metadata) => Ok(metadata.clone()),
            Stat::Deferred => fs::symlink_metadata(&self.location)
                .map_err(|e| WalkError::from_io(self.location.clone(), e)),
        }
    }
}

/// The kind of a traversed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,

    /// The kind could not be determined because the entry could not be
    /// described. Only deferred handles carry this.
    Unknown,
}

impl From<fs::FileType> for EntryKind {
    fn from(ft: fs::FileType) -> Self {
        if ft.is_dir() {
            Self::Dir
        } else if ft.is_file() {
            Self::File
        } else if ft.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}

/// Why a [`WalkEntry`] was emitted.
///
/// The discriminants are stable: `Reason::SymlinkBad as u8 == 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Reason {
    /// The walk is over. Every later call yields this again.
    End = 0,

    /// An ordinary entry with nothing to descend into.
    Entry = 1,

    /// A directory or resolved symlink. Hand its token to
    /// [`Walker::skip`](crate::Walker::skip) to keep the walker out of it.
    Skippable = 2,

    /// A directory that was emitted as skippable but could not be listed.
    /// This is the second emission of that directory.
    DirBad = 3,

    /// A symlink whose target could not be resolved.
    SymlinkBad = 4,

    /// Any other failure attached to the entry.
    Error = 5,
}

/// Opaque handle identifying one skippable emission.
///
/// Tokens are handed out from a monotonically increasing counter and are
/// never reused within a walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkipToken(pub(crate) u64);

/// A single value produced by [`Walker::next_entry`](crate::Walker::next_entry).
///
/// Either `reason` is [`Reason::End`] and every other field is empty, or
/// `entry` is present.
#[derive(Debug)]
pub struct WalkEntry {
    /// Handle for the entry. `None` only for the END marker.
    pub entry: Option<DirEntry>,

    /// The path as the caller would have spelled it: the initial path (or a
    /// root's path) joined with the basenames of descent. May be relative and
    /// may pass through symlinks.
    pub provided_path: PathBuf,

    /// Absolute, symlink-free, clean equivalent of `provided_path`. For a
    /// resolved symlink this is the target. Empty when an error prevented
    /// canonicalization.
    pub canonical_path: PathBuf,

    /// Present for directories and resolved symlinks.
    pub skip_token: Option<SkipToken>,

    /// Any failure attached to this entry.
    pub error: Option<WalkError>,

    pub reason: Reason,
}

impl WalkEntry {
    pub(crate) fn end() -> Self {
        Self {
            entry:          None,
            provided_path:  PathBuf::new(),
            canonical_path: PathBuf::new(),
            skip_token:     None,
            error:          None,
            reason:         Reason::End,
        }
    }

    /// Whether this is the END marker.
    pub fn is_end(&self) -> bool {
        self.reason == Reason::End
    }

    /// Whether the caller may still decline descent into this entry.
    pub fn is_skippable(&self) -> bool {
        self.reason == Reason::Skippable
    }
}

/// Final component of `path`, or the whole path when it has none (`/`).
pub(crate) fn basename(path: &Path) -> OsString {
    path.file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| path.as_os_str().to_os_string())
}
