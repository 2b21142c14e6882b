use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use linkwalk::{walk, EntryKind, ErrorKind, Reason, SkipToken, Visit, WalkEntry, Walker};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Create a temporary directory tree for testing and return it together with
/// its canonical path.
///
/// Structure:
/// ```text
/// tmp/
///   invoice_jan.txt
///   invoice_feb.txt
///   report.txt
///   subdir/
///     invoice_mar.txt
///     other.rs
///     deeper/
///       notes.md
/// ```
fn setup_test_dir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();

    fs::write(root.join("invoice_jan.txt"), "january invoice").unwrap();
    fs::write(root.join("invoice_feb.txt"), "february invoice").unwrap();
    fs::write(root.join("report.txt"), "quarterly report").unwrap();

    let sub = root.join("subdir");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("invoice_mar.txt"), "march invoice").unwrap();
    fs::write(sub.join("other.rs"), "fn main() {}").unwrap();
    fs::create_dir(sub.join("deeper")).unwrap();
    fs::write(sub.join("deeper/notes.md"), "some notes").unwrap();

    (dir, root)
}

/// Pull entries until END, END included.
fn drain(walker: &mut Walker) -> Vec<WalkEntry> {
    let mut out = Vec::new();
    loop {
        let entry = walker.next_entry();
        let end = entry.is_end();
        out.push(entry);
        if end {
            return out;
        }
    }
}

fn reasons(entries: &[WalkEntry]) -> Vec<Reason> {
    entries.iter().map(|e| e.reason).collect()
}

fn provided(entries: &[WalkEntry]) -> Vec<PathBuf> {
    entries.iter().map(|e| e.provided_path.clone()).collect()
}

fn is_clean_absolute(path: &Path) -> bool {
    path.is_absolute()
        && path
            .components()
            .all(|c| !matches!(c, std::path::Component::CurDir | std::path::Component::ParentDir))
        && !path.to_string_lossy().contains("//")
}

// ---------------------------------------------------------------------------
// Plain trees
// ---------------------------------------------------------------------------

#[test]
fn leaf_file_is_a_single_entry() {
    init_tracing();
    let (_dir, root) = setup_test_dir();
    let file = root.join("report.txt");

    let entries = drain(&mut walk(&file));

    assert_eq!(reasons(&entries), vec![Reason::Entry, Reason::End]);
    assert_eq!(entries[0].provided_path, file);
    assert_eq!(entries[0].canonical_path, file);
    assert!(entries[0].skip_token.is_none());
    assert_eq!(entries[0].entry.as_ref().unwrap().kind(), EntryKind::File);
}

#[test]
fn flat_directory_lists_its_child() {
    let dir = tempfile::tempdir().unwrap();
    let a = fs::canonicalize(dir.path()).unwrap().join("a");
    fs::create_dir(&a).unwrap();
    fs::write(a.join("f"), "f").unwrap();

    let entries = drain(&mut walk(&a));

    assert_eq!(reasons(&entries), vec![Reason::Skippable, Reason::Entry, Reason::End]);
    assert_eq!(provided(&entries[..2]), vec![a.clone(), a.join("f")]);
    assert!(entries[0].skip_token.is_some());
}

#[test]
fn whole_tree_in_breadth_first_byte_order() {
    init_tracing();
    let (_dir, root) = setup_test_dir();

    let entries = drain(&mut walk(&root));
    let rel: Vec<String> = entries[..entries.len() - 1]
        .iter()
        .map(|e| {
            e.provided_path
                .strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();

    // Children of a directory are queued behind its earlier siblings.
    assert_eq!(
        rel,
        vec![
            "",
            "invoice_feb.txt",
            "invoice_jan.txt",
            "report.txt",
            "subdir",
            "subdir/deeper",
            "subdir/invoice_mar.txt",
            "subdir/other.rs",
            "subdir/deeper/notes.md",
        ]
    );
    assert!(entries.last().unwrap().is_end());
}

#[test]
fn matches_walkdir_on_symlink_free_tree() {
    let (_dir, root) = setup_test_dir();

    let ours: Vec<PathBuf> = walk(&root).map(|e| e.canonical_path).collect();
    let unique: BTreeSet<PathBuf> = ours.iter().cloned().collect();
    assert_eq!(unique.len(), ours.len(), "every entry exactly once");

    let oracle: BTreeSet<PathBuf> = walkdir::WalkDir::new(&root)
        .into_iter()
        .map(|e| e.unwrap().into_path())
        .collect();
    assert_eq!(unique, oracle);
}

#[test]
fn children_sorted_by_raw_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    for name in ["a", "_", "Z", "B", "aa", "a0"] {
        fs::write(root.join(name), name).unwrap();
    }

    let names: Vec<String> = walk(&root)
        .skip(1)
        .map(|e| e.entry.unwrap().name().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["B", "Z", "_", "a", "a0", "aa"]);
}

#[test]
fn canonical_paths_are_clean_for_unclean_input() {
    let (_dir, root) = setup_test_dir();
    let messy = PathBuf::from(format!("{}/./subdir/../subdir//deeper", root.display()));

    let entries = drain(&mut walk(&messy));

    assert_eq!(reasons(&entries), vec![Reason::Skippable, Reason::Entry, Reason::End]);
    assert_eq!(entries[0].provided_path, messy);
    assert_eq!(entries[0].canonical_path, root.join("subdir/deeper"));
    assert_eq!(entries[1].provided_path, messy.join("notes.md"));
    assert_eq!(entries[1].canonical_path, root.join("subdir/deeper/notes.md"));
    for e in &entries[..2] {
        assert!(is_clean_absolute(&e.canonical_path), "{:?}", e.canonical_path);
    }
}

// ---------------------------------------------------------------------------
// End marker and failures
// ---------------------------------------------------------------------------

#[test]
fn end_repeats_forever() {
    let (_dir, root) = setup_test_dir();
    let mut walker = walk(root.join("report.txt"));

    drain(&mut walker);
    for _ in 0..3 {
        let end = walker.next_entry();
        assert!(end.is_end());
        assert!(end.entry.is_none());
        assert!(end.error.is_none());
        assert!(end.skip_token.is_none());
        assert!(end.provided_path.as_os_str().is_empty());
        assert!(end.canonical_path.as_os_str().is_empty());
    }
    assert!(walker.next().is_none());
}

#[test]
fn reason_discriminants_are_stable() {
    assert_eq!(Reason::End as u8, 0);
    assert_eq!(Reason::Entry as u8, 1);
    assert_eq!(Reason::Skippable as u8, 2);
    assert_eq!(Reason::DirBad as u8, 3);
    assert_eq!(Reason::SymlinkBad as u8, 4);
    assert_eq!(Reason::Error as u8, 5);
}

#[test]
fn missing_initial_path_is_one_error() {
    let (_dir, root) = setup_test_dir();
    let missing = root.join("nope/deeper");

    let entries = drain(&mut walk(&missing));

    assert_eq!(reasons(&entries), vec![Reason::Error, Reason::End]);
    let first = &entries[0];
    assert_eq!(first.provided_path, missing);
    assert!(first.canonical_path.as_os_str().is_empty());
    assert!(first.entry.is_some());
    let err = first.error.as_ref().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.path(), root.join("nope"));
}

#[test]
fn initial_path_through_a_file_is_not_a_directory() {
    let (_dir, root) = setup_test_dir();

    let entries = drain(&mut walk(root.join("report.txt/inner")));

    assert_eq!(reasons(&entries), vec![Reason::Error, Reason::End]);
    assert_eq!(entries[0].error.as_ref().unwrap().kind(), ErrorKind::NotADirectory);
}

#[test]
fn unlistable_directory_is_emitted_twice() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let gone = root.join("gone");
    fs::create_dir(&gone).unwrap();
    fs::write(root.join("keep"), "k").unwrap();

    let mut walker = walk(&root);
    assert_eq!(walker.next_entry().reason, Reason::Skippable);

    let first = walker.next_entry();
    assert_eq!(first.provided_path, gone);
    assert_eq!(first.reason, Reason::Skippable);

    // Vanishes between emission and descent.
    fs::remove_dir(&gone).unwrap();

    // Pending descents are settled before the remaining siblings.
    let second = walker.next_entry();
    assert_eq!(second.reason, Reason::DirBad);
    assert_eq!(second.provided_path, gone);
    assert_eq!(second.canonical_path, gone);
    assert_eq!(second.skip_token, first.skip_token);
    assert_eq!(second.error.as_ref().unwrap().kind(), ErrorKind::ReadFailed);

    assert_eq!(walker.next_entry().provided_path, root.join("keep"));
    assert!(walker.next_entry().is_end());
}

// ---------------------------------------------------------------------------
// Skipping
// ---------------------------------------------------------------------------

#[test]
fn skipped_directory_is_not_descended() {
    let (_dir, root) = setup_test_dir();
    let mut walker = walk(&root);
    let mut seen = Vec::new();

    loop {
        let entry = walker.next_entry();
        if entry.is_end() {
            break;
        }
        if entry.provided_path.ends_with("subdir") {
            walker.skip_entry(entry.skip_token.unwrap());
        }
        seen.push(entry.provided_path);
    }

    let subdir = root.join("subdir");
    assert!(seen.contains(&subdir));
    assert!(!seen.iter().any(|p| p.starts_with(&subdir) && p != &subdir));
    assert_eq!(seen.len(), 5);
}

#[test]
fn skipping_everything_leaves_only_the_root() {
    let (_dir, root) = setup_test_dir();
    let mut walker = walk(&root);
    let mut seen = Vec::new();

    while let Some(entry) = walker.next() {
        if let Some(token) = entry.skip_token {
            walker.skip_entry(token);
        }
        seen.push(entry.provided_path);
    }

    assert_eq!(seen, vec![root]);
}

#[test]
fn stale_and_foreign_tokens_are_ignored() {
    let (_dir, root) = setup_test_dir();

    let mut walker = walk(&root);
    let first = walker.next_entry();
    let token = first.skip_token.unwrap();

    // Consulting the root moves past its token.
    let child = walker.next_entry();
    assert_eq!(child.reason, Reason::Entry);
    walker.skip_entry(token);

    // A token from another walker that was never issued here.
    let mut other = walk(&root);
    let foreign: SkipToken = other.next_entry().skip_token.unwrap();
    let _ = other.next_entry();
    let foreign_later = other
        .find_map(|e| e.skip_token)
        .unwrap();
    walker.skip_entry(foreign_later);
    walker.skip_entry(foreign);

    let rest: Vec<PathBuf> = walker.map(|e| e.provided_path).collect();
    assert!(rest.contains(&root.join("subdir/other.rs")));
    assert!(rest.contains(&root.join("subdir/deeper/notes.md")));
}

#[test]
fn skip_tokens_are_never_reused() {
    let (_dir, root) = setup_test_dir();

    let tokens: Vec<SkipToken> = walk(&root).filter_map(|e| e.skip_token).collect();
    let unique: BTreeSet<SkipToken> = tokens.iter().copied().collect();

    assert_eq!(tokens.len(), 3);
    assert_eq!(unique.len(), tokens.len());
    assert!(tokens.windows(2).all(|w| w[0] < w[1]));
}

// ---------------------------------------------------------------------------
// Deferred metadata
// ---------------------------------------------------------------------------

#[test]
fn deferred_metadata_is_queried_on_every_call() {
    let (_dir, root) = setup_test_dir();
    let mut walker = walk(&root);

    let root_entry = walker.next_entry().entry.unwrap();
    assert!(!root_entry.is_deferred());
    assert!(root_entry.metadata().unwrap().is_dir());

    let child = walker.next_entry();
    assert_eq!(child.provided_path, root.join("invoice_feb.txt"));
    let handle = child.entry.unwrap();
    assert!(handle.is_deferred());
    assert_eq!(handle.metadata().unwrap().len(), 16);

    fs::write(root.join("invoice_feb.txt"), "x").unwrap();
    assert_eq!(handle.metadata().unwrap().len(), 1);

    fs::remove_file(root.join("invoice_feb.txt")).unwrap();
    assert_eq!(handle.metadata().unwrap_err().kind(), ErrorKind::NotFound);
}

// ---------------------------------------------------------------------------
// Visitor driver
// ---------------------------------------------------------------------------

#[test]
fn visit_counts_and_skips() {
    let (_dir, root) = setup_test_dir();

    let stats = walk(&root).visit(|e: &WalkEntry| {
        if e.provided_path.ends_with("deeper") {
            Visit::Skip
        } else {
            Visit::Continue
        }
    });

    assert!(stats.completed);
    assert_eq!(stats.skippable, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.entries, 5);
    assert_eq!(stats.failures(), 0);
    assert_eq!(stats.total(), 8);
}

#[test]
fn visit_quit_stops_early() {
    let (_dir, root) = setup_test_dir();
    let mut seen = 0;

    let stats = walk(&root).visit(|_: &WalkEntry| {
        seen += 1;
        if seen == 2 {
            Visit::Quit
        } else {
            Visit::Continue
        }
    });

    assert!(!stats.completed);
    assert_eq!(stats.total(), 2);
    assert_eq!(seen, 2);
}

#[test]
fn visit_reports_errors() {
    let (_dir, root) = setup_test_dir();

    let stats = walk(root.join("missing")).visit(|_: &WalkEntry| Visit::Skip);

    assert!(stats.completed);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.total(), 1);
}
