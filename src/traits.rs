use crate::entry::WalkEntry;

/// What a [`Visitor`] wants the walker to do after seeing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep walking, descending into the entry if it is skippable.
    Continue,

    /// Do not descend into this entry. Only meaningful for skippable entries;
    /// anywhere else it behaves like [`Visit::Continue`].
    Skip,

    /// Stop the walk.
    Quit,
}

/// Receives entries from [`Walker::visit`](crate::Walker::visit).
///
/// This is the callback form of the pull API: returning [`Visit::Skip`] is
/// the same as passing the entry's token to
/// [`Walker::skip`](crate::Walker::skip) before asking for the next entry.
///
/// Implemented for every `FnMut(&WalkEntry) -> Visit`, so a closure works:
///
/// ```rust
/// use linkwalk::{Visit, WalkEntry};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut seen = 0;
/// let stats = linkwalk::walk(dir.path()).visit(|_: &WalkEntry| {
///     seen += 1;
///     Visit::Continue
/// });
/// assert!(stats.completed);
/// assert_eq!(seen, 1);
/// ```
pub trait Visitor {
    fn visit(&mut self, entry: &WalkEntry) -> Visit;
}

impl<F> Visitor for F
where
    F: FnMut(&WalkEntry) -> Visit,
{
    fn visit(&mut self, entry: &WalkEntry) -> Visit {
        self(entry)
    }
}
