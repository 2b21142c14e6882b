use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    // Resolution
    #[error("path not found: {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("too many levels of symbolic links (limit {limit}): {}", .path.display())]
    SymlinkLimit { path: PathBuf, limit: usize },

    // Directory reader
    #[error("failed to read directory: {}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Everything else the host reports
    #[error("IO error: {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse error category carried by every [`WalkError`].
///
/// The traverser never formats errors itself; consumers that only need to
/// know *what sort* of failure happened match on this instead of the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NotADirectory,
    SymlinkLimit,
    ReadFailed,
    Other,
}

impl WalkError {
    /// Classify a host I/O failure observed at `path`.
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path, source },
            io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            _ => Self::Io { path, source },
        }
    }

    pub(crate) fn read_dir(path: PathBuf, source: io::Error) -> Self {
        Self::ReadDir { path, source }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::SymlinkLimit { .. } => ErrorKind::SymlinkLimit,
            Self::ReadDir { .. } => ErrorKind::ReadFailed,
            Self::Io { .. } => ErrorKind::Other,
        }
    }

    /// The path this error occurred at.
    /// For resolver failures this is the component that could not be resolved,
    /// not the path that was handed to the resolver.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. }
            | Self::NotADirectory { path }
            | Self::SymlinkLimit { path, .. }
            | Self::ReadDir { path, .. }
            | Self::Io { path, .. } => path,
        }
    }

    /// The underlying host error, if the failure came from the OS.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::NotFound { source, .. }
            | Self::ReadDir { source, .. }
            | Self::Io { source, .. } => Some(source),
            Self::NotADirectory { .. } | Self::SymlinkLimit { .. } => None,
        }
    }
}
