use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::entry::{DirEntry, EntryKind};
use crate::error::WalkError;

/// Read every entry of the directory at `canonical` in one batch.
///
/// Entries come back sorted by the raw bytes of their basenames with no
/// locale or normalization applied. `.` and `..` never appear. Each entry
/// carries its kind as reported by the directory stream and a deferred
/// metadata handle pointing at `canonical/<name>`. An entry whose type cannot
/// be read is kept as [`EntryKind::Unknown`] rather than failing the batch. The directory handle is
/// released before this returns, on success and on failure alike.
pub(crate) fn read_dir(canonical: &Path) -> Result<Vec<DirEntry>, WalkError> {
    let stream =
        fs::read_dir(canonical).map_err(|e| WalkError::read_dir(canonical.to_path_buf(), e))?;

    let mut entries = Vec::new();
    for item in stream {
        let item = item.map_err(|e| WalkError::read_dir(canonical.to_path_buf(), e))?;
        let path = item.path();
        let kind = kind_of(item.file_type(), &path);
        entries.push(DirEntry::deferred(item.file_name(), kind, path));
    }

    entries.sort_by(|a, b| a.name().as_encoded_bytes().cmp(b.name().as_encoded_bytes()));

    trace!("read {} entries from {}", entries.len(), canonical.display());
    Ok(entries)
}

fn kind_of(file_type: io::Result<fs::FileType>, path: &Path) -> EntryKind {
    match file_type {
        Ok(file_type) => EntryKind::from(file_type),
        Err(error) => {
            debug!("cannot read type of {}: {}", path.display(), error);
            EntryKind::Unknown
        }
    }
}
