//! In-memory file tree as of the last commit.
//!
//! [`TreeState`] maps path keys to either document bytes that have not been
//! written yet or to the blob they were written as. Only entries touched since
//! the previous [`snapshot`](TreeState::snapshot) cost anything to persist;
//! everything else is carried forward by blob id.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use wikigit_git::{EntryMode, GitError, GitOid, GitRepo, TreeEntry};

#[derive(Clone, Debug)]
enum Entry {
    /// Document bytes put since the last snapshot.
    Pending(Vec<u8>),
    /// Already persisted.
    Stored { oid: GitOid, mode: EntryMode },
}

/// The engine-owned index from path key to content.
#[derive(Debug, Default)]
pub struct TreeState {
    entries: BTreeMap<String, Entry>,
    /// Tree written by the last snapshot, reused while nothing changes.
    last_tree: Option<GitOid>,
    changed: bool,
}

impl TreeState {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an existing tree object, e.g. the head commit's tree when
    /// resuming into a repository that already has history.
    ///
    /// # Errors
    /// Returns an error if the tree cannot be read.
    pub fn from_tree(repo: &dyn GitRepo, tree: GitOid) -> Result<Self, GitError> {
        let entries = repo
            .read_tree(tree)?
            .into_iter()
            .map(|e| (e.name, Entry::Stored { oid: e.oid, mode: e.mode }))
            .collect();
        Ok(Self {
            entries,
            last_tree: Some(tree),
            changed: false,
        })
    }

    /// Insert or replace the entry for `key`.
    pub fn put(&mut self, key: &str, content: Vec<u8>) {
        self.entries.insert(key.to_owned(), Entry::Pending(content));
        self.changed = true;
    }

    /// Remove the entry for `key`, returning whether it existed. Removing an
    /// absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> bool {
        let existed = self.entries.remove(key).is_some();
        self.changed |= existed;
        existed
    }

    /// Whether an entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path keys in tree order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries that the next snapshot has to write as blobs.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, Entry::Pending(_)))
            .count()
    }

    /// Persist the current mapping and return the tree id.
    ///
    /// Writes one blob per pending entry and one flat tree object. When
    /// nothing changed since the last snapshot the previous tree id is
    /// returned without touching the object store.
    ///
    /// # Errors
    /// Returns an error if a blob or the tree cannot be written. Entries
    /// whose blobs were written before the failure stay persisted.
    pub fn snapshot(&mut self, repo: &dyn GitRepo) -> Result<GitOid, GitError> {
        if !self.changed
            && let Some(tree) = self.last_tree
        {
            return Ok(tree);
        }

        for entry in self.entries.values_mut() {
            if let Entry::Pending(content) = entry {
                let oid = repo.write_blob(content)?;
                *entry = Entry::Stored {
                    oid,
                    mode: EntryMode::Blob,
                };
            }
        }

        let mut listing: Vec<TreeEntry> = self
            .entries
            .iter()
            .filter_map(|(name, entry)| match entry {
                Entry::Stored { oid, mode } => Some(TreeEntry {
                    name: name.clone(),
                    mode: *mode,
                    oid: *oid,
                }),
                Entry::Pending(_) => None,
            })
            .collect();
        listing.sort_by(git_tree_order);

        let tree = repo.write_tree(&listing)?;
        self.last_tree = Some(tree);
        self.changed = false;
        Ok(tree)
    }
}

/// Git orders tree entries by name, comparing subtrees as if their name had a
/// trailing `/`.
fn git_tree_order(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    let key = |e: &TreeEntry| {
        let mut k = e.name.as_bytes().to_vec();
        if e.mode == EntryMode::Tree {
            k.push(b'/');
        }
        k
    };
    key(a).cmp(&key(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use wikigit_git::GixRepo;

    fn repo() -> (TempDir, GixRepo) {
        let dir = TempDir::new().unwrap();
        let repo = GixRepo::init_bare(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn put_and_remove_report_presence() {
        let mut tree = TreeState::new();
        assert!(!tree.remove("a"));
        tree.put("a", b"one".to_vec());
        assert!(tree.contains("a"));
        tree.put("a", b"two".to_vec());
        assert_eq!(tree.len(), 1);
        assert!(tree.remove("a"));
        assert!(tree.is_empty());
    }

    #[test]
    fn snapshot_writes_entries_in_name_order() {
        let (_dir, repo) = repo();
        let mut tree = TreeState::new();
        tree.put("zeta", b"z".to_vec());
        tree.put("alpha", b"a".to_vec());
        tree.put("_template.html", b"t".to_vec());

        let oid = tree.snapshot(&repo).unwrap();
        let names: Vec<String> = repo.read_tree(oid).unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["_template.html", "alpha", "zeta"]);
        assert_eq!(tree.pending(), 0);
    }

    #[test]
    fn unchanged_tree_reuses_previous_snapshot() {
        let (_dir, repo) = repo();
        let mut tree = TreeState::new();
        tree.put("a", b"a".to_vec());
        let first = tree.snapshot(&repo).unwrap();

        assert!(!tree.remove("missing"));
        assert_eq!(tree.snapshot(&repo).unwrap(), first);
    }

    #[test]
    fn only_touched_entries_are_pending() {
        let (_dir, repo) = repo();
        let mut tree = TreeState::new();
        tree.put("a", b"a".to_vec());
        tree.put("b", b"b".to_vec());
        tree.snapshot(&repo).unwrap();

        tree.put("b", b"b2".to_vec());
        assert_eq!(tree.pending(), 1);
        let oid = tree.snapshot(&repo).unwrap();
        let entries = repo.read_tree(oid).unwrap();
        assert_eq!(repo.read_blob(entries[1].oid).unwrap(), b"b2");
    }

    #[test]
    fn from_tree_round_trips_a_snapshot() {
        let (_dir, repo) = repo();
        let mut tree = TreeState::new();
        tree.put("page", b"body".to_vec());
        let oid = tree.snapshot(&repo).unwrap();

        let mut seeded = TreeState::from_tree(&repo, oid).unwrap();
        assert!(seeded.contains("page"));
        assert_eq!(seeded.pending(), 0);
        assert_eq!(seeded.snapshot(&repo).unwrap(), oid);
    }

    #[test]
    fn subtrees_sort_with_trailing_slash() {
        let oid = GitOid::from_bytes([1; 20]);
        let mut entries = vec![
            TreeEntry { name: "a.b".into(), mode: EntryMode::Blob, oid },
            TreeEntry { name: "a".into(), mode: EntryMode::Tree, oid },
        ];
        entries.sort_by(git_tree_order);
        // "a.b" < "a/" because '.' (0x2e) < '/' (0x2f).
        assert_eq!(entries[0].name, "a.b");
    }
}
