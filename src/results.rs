use std::time::Duration;

use crate::entry::Reason;

/// Summary of a walk driven by [`Walker::visit`](crate::Walker::visit).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries emitted as [`Reason::Entry`].
    pub entries: usize,

    /// Entries emitted as [`Reason::Skippable`], skipped or not.
    pub skippable: usize,

    /// Skippable entries the visitor declined to descend into.
    pub skipped: usize,

    /// Directories that could not be listed.
    pub dir_bad: usize,

    /// Symlinks whose target could not be resolved.
    pub symlink_bad: usize,

    /// Entries emitted as [`Reason::Error`].
    pub errors: usize,

    /// `true` if the walk ran to its END marker, `false` if the visitor quit.
    pub completed: bool,

    /// Wall-clock time spent walking.
    pub duration: Duration,
}

impl WalkStats {
    pub(crate) fn record(&mut self, reason: Reason) {
        match reason {
            Reason::End => {}
            Reason::Entry => self.entries += 1,
            Reason::Skippable => self.skippable += 1,
            Reason::DirBad => self.dir_bad += 1,
            Reason::SymlinkBad => self.symlink_bad += 1,
            Reason::Error => self.errors += 1,
        }
    }

    /// Total number of emissions, END excluded.
    pub fn total(&self) -> usize {
        self.entries + self.skippable + self.dir_bad + self.symlink_bad + self.errors
    }

    /// Emissions that carried an error.
    pub fn failures(&self) -> usize {
        self.dir_bad + self.symlink_bad + self.errors
    }
}
