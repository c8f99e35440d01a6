//! The [`GitRepo`] trait: the abstraction boundary between the replay engine
//! and git.
//!
//! The trait is object-safe so callers can hold `&dyn GitRepo`. Method groups
//! map onto the persistence primitives the engine needs:
//!
//! | Group        | Methods                                             |
//! |--------------|-----------------------------------------------------|
//! | Refs         | `read_ref`, `write_ref`, `point_head_at`            |
//! | Rev-parse    | `rev_parse_opt`                                     |
//! | Object read  | `read_blob`, `read_tree`, `read_commit`             |
//! | Object write | `write_blob`, `write_tree`, `create_commit`         |
//! | Checkout     | `checkout_tree`, `workdir`                          |

use std::path::Path;

use crate::error::GitError;
use crate::types::{CommitInfo, GitOid, RefName, Signature, TreeEntry};

/// The git abstraction trait used by the replay engine.
///
/// Implementations may be backed by gix (the shipped backend) or a test
/// double.
///
/// # Object safety
///
/// No generic methods and no `Self` in return position outside of `Result`.
pub trait GitRepo {
    // -----------------------------------------------------------------------
    // Refs
    // -----------------------------------------------------------------------

    /// Resolve a ref to its OID, returning `None` if the ref does not exist.
    fn read_ref(&self, name: &RefName) -> Result<Option<GitOid>, GitError>;

    /// Create or overwrite a ref unconditionally.
    ///
    /// `log_message` and `committer` make up the reflog entry when reflogs
    /// are enabled. No identity is read from git config.
    fn write_ref(
        &self,
        name: &RefName,
        oid: GitOid,
        log_message: &str,
        committer: &Signature,
    ) -> Result<(), GitError>;

    /// Make `HEAD` a symbolic ref to `branch` (which need not exist yet).
    fn point_head_at(&self, branch: &RefName) -> Result<(), GitError>;

    // -----------------------------------------------------------------------
    // Rev-parse
    // -----------------------------------------------------------------------

    /// Resolve a revision specification (`HEAD`, `main~2`, ...) to an OID,
    /// or `None` if it cannot be resolved (unborn `HEAD`, missing ref).
    fn rev_parse_opt(&self, spec: &str) -> Result<Option<GitOid>, GitError>;

    // -----------------------------------------------------------------------
    // Object read
    // -----------------------------------------------------------------------

    /// Read the contents of a blob object.
    fn read_blob(&self, oid: GitOid) -> Result<Vec<u8>, GitError>;

    /// Read the entries of a tree object (one level deep).
    fn read_tree(&self, oid: GitOid) -> Result<Vec<TreeEntry>, GitError>;

    /// Read a commit object's metadata.
    fn read_commit(&self, oid: GitOid) -> Result<CommitInfo, GitError>;

    // -----------------------------------------------------------------------
    // Object write
    // -----------------------------------------------------------------------

    /// Write a blob to the object store and return its content address.
    fn write_blob(&self, data: &[u8]) -> Result<GitOid, GitError>;

    /// Write a tree object from a list of entries and return its OID.
    ///
    /// Entries must already be in git tree order; for flat trees of plain
    /// files that is byte order of the names.
    fn write_tree(&self, entries: &[TreeEntry]) -> Result<GitOid, GitError>;

    /// Create a commit object with explicit identities and optionally move a
    /// ref to it.
    ///
    /// The ref is only updated after the commit object is fully written, so a
    /// crash in between leaves the ref at its previous, valid commit.
    fn create_commit(
        &self,
        tree: GitOid,
        parents: &[GitOid],
        message: &str,
        author: &Signature,
        committer: &Signature,
        update_ref: Option<&RefName>,
    ) -> Result<GitOid, GitError>;

    // -----------------------------------------------------------------------
    // Checkout
    // -----------------------------------------------------------------------

    /// The working directory, or `None` for a bare repository.
    fn workdir(&self) -> Option<&Path>;

    /// Materialize the tree of `oid` (a commit or a tree) into `workdir` and
    /// make the index match it. Files not in the tree are removed.
    fn checkout_tree(&self, oid: GitOid, workdir: &Path) -> Result<(), GitError>;
}
