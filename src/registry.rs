use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A region of the filesystem the walker must enumerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    /// The path the region was first reached by.
    pub provided: PathBuf,

    /// Canonical form of `provided`.
    pub canonical: PathBuf,
}

impl Root {
    pub fn new(provided: PathBuf, canonical: PathBuf) -> Self {
        Self { provided, canonical }
    }
}

/// Index-addressable collection of roots keyed by canonical path.
///
/// Slots are never compacted. Obsoleting a root leaves a gap so that an
/// index already advancing through the registry stays valid.
#[derive(Debug, Default)]
pub struct RootRegistry {
    slots:  Vec<Option<Root>>,
    lookup: HashMap<PathBuf, usize>,
}

impl RootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `root`. Returns `false` and leaves the registry untouched when
    /// its canonical path is already registered.
    pub fn add(&mut self, root: Root) -> bool {
        if self.lookup.contains_key(&root.canonical) {
            return false;
        }
        self.lookup.insert(root.canonical.clone(), self.slots.len());
        self.slots.push(Some(root));
        true
    }

    pub fn has_canonical(&self, canonical: &Path) -> bool {
        self.lookup.contains_key(canonical)
    }

    /// The root in slot `index`, or `None` if the slot is out of range or
    /// has been obsoleted.
    pub fn get(&self, index: usize) -> Option<&Root> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Remove the root in slot `index`, leaving a gap. Returns the removed root.
    pub fn obsolete(&mut self, index: usize) -> Option<Root> {
        let root = self.slots.get_mut(index)?.take()?;
        self.lookup.remove(&root.canonical);
        Some(root)
    }

    /// Number of slots, gaps included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Live roots with their slot indices, in discovery order.
    pub fn live(&self) -> impl Iterator<Item = (usize, &Root)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|root| (i, root)))
    }
}
