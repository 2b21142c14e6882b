use std::collections::{HashSet, VecDeque};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, Level};

use crate::dir;
use crate::entry::{basename, DirEntry, EntryKind, Reason, SkipToken, WalkEntry};
use crate::error::WalkError;
use crate::registry::{Root, RootRegistry};
use crate::resolver::Resolver;
use crate::results::WalkStats;
use crate::traits::{Visit, Visitor};

// ---------------------------------------------------------------------------
// Pending work
// ---------------------------------------------------------------------------

/// What happens to a skippable entry that survives its skip decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Descent {
    /// List the directory.
    Dir,
    /// Run the target through the root registry.
    Link,
}

/// A skippable entry already handed to the caller, awaiting its skip decision.
#[derive(Debug)]
struct Pending {
    token:     SkipToken,
    descent:   Descent,
    entry:     Option<DirEntry>,
    provided:  PathBuf,
    canonical: PathBuf,
}

/// One entry of a listed directory, awaiting emission.
#[derive(Debug)]
struct Child {
    dir_canonical: Arc<Path>,
    dir_provided:  Arc<Path>,
    entry:         DirEntry,
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// Pull-based traverser that follows symlinks and yields every reachable
/// entry exactly once.
///
/// Call [`next_entry()`](Walker::next_entry) until it returns the END marker.
/// Directories and resolved symlinks come back as [`Reason::Skippable`]; pass
/// their token to [`skip_entry()`](Walker::skip_entry) before the next call
/// to keep the walker out of them.
///
/// A symlink whose target lies outside every region being walked opens a new
/// root. A symlink whose target lies *above* a region already being walked
/// makes the target the new root and retires the region below it; entries of
/// the retired region that were already emitted are not emitted again.
///
/// Created via [`linkwalk::walk()`](crate::walk) or
/// [`WalkBuilder::build()`](crate::WalkBuilder::build).
#[derive(Debug)]
pub struct Walker {
    initial:    Option<PathBuf>,
    resolver:   Resolver,
    roots:      RootRegistry,
    obsolete:   RootRegistry,
    /// Number of root slots whose traversal has begun. The current root is
    /// slot `started - 1`.
    started:    usize,
    skippable:  VecDeque<Pending>,
    children:   VecDeque<Child>,
    skips:      HashSet<SkipToken>,
    next_token: u64,
    finished:   bool,
}

impl Walker {
    pub(crate) fn new(initial: PathBuf, resolver: Resolver) -> Self {
        Self {
            initial: Some(initial),
            resolver,
            roots: RootRegistry::new(),
            obsolete: RootRegistry::new(),
            started: 0,
            skippable: VecDeque::new(),
            children: VecDeque::new(),
            skips: HashSet::new(),
            next_token: 0,
            finished: false,
        }
    }

    /// Produce the next entry.
    ///
    /// Failures never abort the walk: they are attached to the entry they
    /// concern. The only exception is a failure to resolve the initial path,
    /// which yields a single [`Reason::Error`] entry followed by END. Once END
    /// has been returned, every later call returns END again.
    pub fn next_entry(&mut self) -> WalkEntry {
        if self.finished {
            return WalkEntry::end();
        }

        if let Some(initial) = self.initial.take() {
            match self.resolver.canonicalize(&initial) {
                Ok(canonical) => {
                    debug!("walking {} ({})", initial.display(), canonical.display());
                    self.roots.add(Root::new(initial, canonical));
                }
                Err(error) => {
                    debug!("cannot resolve {}: {}", initial.display(), error);
                    return unresolved(initial, error);
                }
            }
        }

        loop {
            if let Some(pending) = self.skippable.pop_front() {
                if self.skips.remove(&pending.token) {
                    trace!("skipped {}", pending.provided.display());
                    continue;
                }
                match pending.descent {
                    Descent::Link => self.adopt_link_target(pending.canonical),
                    Descent::Dir => match dir::read_dir(&pending.canonical) {
                        Ok(entries) => self.queue_children(&pending, entries),
                        Err(error) => {
                            debug!("cannot list {}: {}", pending.canonical.display(), error);
                            return WalkEntry {
                                entry:          pending.entry,
                                provided_path:  pending.provided,
                                canonical_path: pending.canonical,
                                skip_token:     Some(pending.token),
                                error:          Some(error),
                                reason:         Reason::DirBad,
                            };
                        }
                    },
                }
                continue;
            }

            let candidate = if let Some(child) = self.children.pop_front() {
                child_entry(child)
            } else if let Some(root) = self.advance_root() {
                self.root_entry(root)
            } else {
                trace!("walk finished");
                self.finished = true;
                return WalkEntry::end();
            };

            if let Some(walked) = self.settle(candidate) {
                trace!("emit {:?} {}", walked.reason, walked.provided_path.display());
                return walked;
            }
        }
    }

    /// Decline descent into the entry that carried `token`.
    ///
    /// Only takes effect while that entry is still awaiting its skip decision,
    /// i.e. before the walker has moved past it. Unknown, repeated, and stale
    /// tokens are ignored.
    pub fn skip_entry(&mut self, token: SkipToken) {
        // Queued tokens always form the contiguous range head..next_token.
        let pending = token.0 < self.next_token
            && self
                .skippable
                .front()
                .is_some_and(|head| head.token <= token);
        if pending {
            self.skips.insert(token);
        }
    }

    /// Drive the walk to completion, handing every entry to `visitor`.
    ///
    /// Stops early if the visitor returns [`Visit::Quit`].
    pub fn visit(mut self, mut visitor: impl Visitor) -> WalkStats {
        let start = Instant::now();
        let mut stats = WalkStats::default();

        loop {
            let walked = self.next_entry();
            if walked.is_end() {
                stats.completed = true;
                break;
            }
            stats.record(walked.reason);

            match visitor.visit(&walked) {
                Visit::Continue => {}
                Visit::Skip => {
                    if let (Reason::Skippable, Some(token)) = (walked.reason, walked.skip_token) {
                        self.skip_entry(token);
                        stats.skipped += 1;
                    }
                }
                Visit::Quit => break,
            }
        }

        stats.duration = start.elapsed();
        stats
    }

    // ── Roots ─────────────────────────────────────────────────────────────

    fn advance_root(&mut self) -> Option<Root> {
        while self.started < self.roots.len() {
            let index = self.started;
            self.started += 1;
            if let Some(root) = self.roots.get(index) {
                return Some(root.clone());
            }
        }
        None
    }

    fn root_entry(&self, root: Root) -> WalkEntry {
        let (entry, error) = match self.resolver.describe(&root.canonical) {
            Ok(entry) => (entry, None),
            Err(error) => {
                debug!("cannot describe root {}: {}", root.canonical.display(), error);
                let entry = DirEntry::deferred(
                    basename(&root.canonical),
                    EntryKind::Unknown,
                    root.canonical.clone(),
                );
                (entry, Some(error))
            }
        };

        WalkEntry {
            entry:          Some(entry),
            provided_path:  root.provided,
            canonical_path: root.canonical,
            skip_token:     None,
            error,
            reason:         Reason::Entry,
        }
    }

    /// Register the canonical target of a symlink that survived its skip
    /// decision.
    ///
    /// A target inside a live root is already covered. A target above one or
    /// more live roots replaces them; those whose traversal has begun are
    /// remembered so their re-encounter under the new root is dropped.
    /// Anything else becomes a new root.
    fn adopt_link_target(&mut self, target: PathBuf) {
        if self.roots.has_canonical(&target) {
            trace!("{} is already a root", target.display());
            return;
        }

        if let Some((_, root)) = self
            .roots
            .live()
            .find(|(_, root)| target.starts_with(&root.canonical))
        {
            trace!("{} is covered by root {}", target.display(), root.canonical.display());
            return;
        }

        let superseded: Vec<usize> = self
            .roots
            .live()
            .filter(|(_, root)| root.canonical.starts_with(&target))
            .map(|(index, _)| index)
            .collect();

        for index in superseded {
            if let Some(root) = self.roots.obsolete(index) {
                debug!("root {} superseded by {}", root.canonical.display(), target.display());
                if index < self.started {
                    self.obsolete.add(root);
                }
            }
        }

        if tracing::enabled!(Level::DEBUG) {
            match self.resolver.describe_target(&target) {
                Ok(described) => debug!("new root {} ({:?})", target.display(), described.kind()),
                Err(error) => debug!("new root {} ({})", target.display(), error),
            }
        }
        self.roots.add(Root::new(target.clone(), target));
    }

    // ── Entries ───────────────────────────────────────────────────────────

    fn queue_children(&mut self, pending: &Pending, entries: Vec<DirEntry>) {
        let dir_canonical: Arc<Path> = Arc::from(pending.canonical.as_path());
        let dir_provided: Arc<Path> = Arc::from(pending.provided.as_path());
        self.children.extend(entries.into_iter().map(|entry| Child {
            dir_canonical: Arc::clone(&dir_canonical),
            dir_provided:  Arc::clone(&dir_provided),
            entry,
        }));
    }

    /// Classify a candidate entry. Returns `None` when the entry belongs to a
    /// retired root and must not be emitted again.
    fn settle(&mut self, mut walked: WalkEntry) -> Option<WalkEntry> {
        let kind = walked.entry.as_ref().map(DirEntry::kind);

        if walked.error.is_none() && kind == Some(EntryKind::Symlink) {
            return Some(self.settle_symlink(walked));
        }

        if self.obsolete.has_canonical(&walked.canonical_path) {
            trace!("dropping {} (already walked)", walked.canonical_path.display());
            return None;
        }

        if walked.error.is_none() && kind == Some(EntryKind::Dir) {
            return Some(self.enqueue(walked, Descent::Dir));
        }

        walked.reason = if walked.error.is_some() {
            Reason::Error
        } else {
            Reason::Entry
        };
        Some(walked)
    }

    fn settle_symlink(&mut self, mut walked: WalkEntry) -> WalkEntry {
        match self.resolver.canonicalize(&walked.canonical_path) {
            Ok(target) => {
                let name = walked
                    .entry
                    .as_ref()
                    .map(|entry| entry.name().to_os_string())
                    .unwrap_or_else(|| basename(&walked.provided_path));
                walked.entry = Some(DirEntry::deferred(name, EntryKind::Symlink, target.clone()));
                walked.canonical_path = target;
                self.enqueue(walked, Descent::Link)
            }
            Err(error) => {
                debug!("broken symlink {}: {}", walked.provided_path.display(), error);
                walked.canonical_path = PathBuf::new();
                walked.error = Some(error);
                walked.reason = Reason::SymlinkBad;
                walked
            }
        }
    }

    fn enqueue(&mut self, mut walked: WalkEntry, descent: Descent) -> WalkEntry {
        let token = SkipToken(self.next_token);
        self.next_token += 1;

        self.skippable.push_back(Pending {
            token,
            descent,
            entry: walked.entry.clone(),
            provided: walked.provided_path.clone(),
            canonical: walked.canonical_path.clone(),
        });

        walked.skip_token = Some(token);
        walked.reason = Reason::Skippable;
        walked
    }
}

impl Iterator for Walker {
    type Item = WalkEntry;

    /// Yields every entry up to, but not including, the END marker.
    fn next(&mut self) -> Option<WalkEntry> {
        let walked = self.next_entry();
        if walked.is_end() {
            None
        } else {
            Some(walked)
        }
    }
}

impl FusedIterator for Walker {}

fn child_entry(child: Child) -> WalkEntry {
    let provided_path = child.dir_provided.join(child.entry.name());
    let canonical_path = child.dir_canonical.join(child.entry.name());
    WalkEntry {
        provided_path,
        canonical_path,
        entry:          Some(child.entry),
        skip_token:     None,
        error:          None,
        reason:         Reason::Entry,
    }
}

/// Best-effort entry for an initial path that could not be resolved.
fn unresolved(initial: PathBuf, error: WalkError) -> WalkEntry {
    let entry = DirEntry::deferred(basename(&initial), EntryKind::Unknown, initial.clone());
    WalkEntry {
        entry:          Some(entry),
        provided_path:  initial,
        canonical_path: PathBuf::new(),
        skip_token:     None,
        error:          Some(error),
        reason:         Reason::Error,
    }
}
