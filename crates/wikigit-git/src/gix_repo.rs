//! The gix-backed implementation of [`GitRepo`].

use std::path::{Path, PathBuf};

use crate::error::GitError;
use crate::repo::GitRepo;
use crate::types::{CommitInfo, GitOid, RefName, Signature, TreeEntry};

/// A [`GitRepo`] implementation backed by [gix](https://github.com/GitoxideLabs/gitoxide).
///
/// Construct via [`GixRepo::open`], [`GixRepo::init`] or [`GixRepo::init_bare`].
pub struct GixRepo {
    pub(crate) repo: gix::Repository,
    pub(crate) workdir: Option<PathBuf>,
}

impl GixRepo {
    /// Open the git repository at exactly `path` (no parent discovery, no
    /// environment overrides).
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = gix::open_opts(path, gix::open::Options::isolated()).map_err(|e| {
            GitError::OpenFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        Ok(Self::from_repo(repo))
    }

    /// Create a new repository with a working directory at `path`.
    pub fn init(path: &Path) -> Result<Self, GitError> {
        let repo = gix::init(path).map_err(|e| GitError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "initialized repository");
        Ok(Self::from_repo(repo))
    }

    /// Create a new bare repository at `path`.
    pub fn init_bare(path: &Path) -> Result<Self, GitError> {
        let repo = gix::init_bare(path).map_err(|e| GitError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "initialized bare repository");
        Ok(Self::from_repo(repo))
    }

    /// Returns `true` if `path` holds a git repository (bare or not).
    #[must_use]
    pub fn is_repository(path: &Path) -> bool {
        gix::open_opts(path, gix::open::Options::isolated()).is_ok()
    }

    fn from_repo(repo: gix::Repository) -> Self {
        let workdir = repo.workdir().map(Path::to_path_buf);
        Self { repo, workdir }
    }
}

impl GitRepo for GixRepo {
    // === Refs ===
    fn read_ref(&self, name: &RefName) -> Result<Option<GitOid>, GitError> {
        crate::refs_impl::read_ref(self, name)
    }

    fn write_ref(
        &self,
        name: &RefName,
        oid: GitOid,
        log_message: &str,
        committer: &Signature,
    ) -> Result<(), GitError> {
        crate::refs_impl::write_ref(self, name, oid, log_message, committer)
    }

    fn point_head_at(&self, branch: &RefName) -> Result<(), GitError> {
        crate::refs_impl::point_head_at(self, branch)
    }

    // === Rev-parse ===
    fn rev_parse_opt(&self, spec: &str) -> Result<Option<GitOid>, GitError> {
        crate::refs_impl::rev_parse_opt(self, spec)
    }

    // === Object read ===
    fn read_blob(&self, oid: GitOid) -> Result<Vec<u8>, GitError> {
        crate::objects_impl::read_blob(self, oid)
    }

    fn read_tree(&self, oid: GitOid) -> Result<Vec<TreeEntry>, GitError> {
        crate::objects_impl::read_tree(self, oid)
    }

    fn read_commit(&self, oid: GitOid) -> Result<CommitInfo, GitError> {
        crate::objects_impl::read_commit(self, oid)
    }

    // === Object write ===
    fn write_blob(&self, data: &[u8]) -> Result<GitOid, GitError> {
        crate::objects_impl::write_blob(self, data)
    }

    fn write_tree(&self, entries: &[TreeEntry]) -> Result<GitOid, GitError> {
        crate::objects_impl::write_tree(self, entries)
    }

    fn create_commit(
        &self,
        tree: GitOid,
        parents: &[GitOid],
        message: &str,
        author: &Signature,
        committer: &Signature,
        update_ref: Option<&RefName>,
    ) -> Result<GitOid, GitError> {
        crate::objects_impl::create_commit(self, tree, parents, message, author, committer, update_ref)
    }

    // === Checkout ===
    fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn checkout_tree(&self, oid: GitOid, workdir: &Path) -> Result<(), GitError> {
        crate::checkout_impl::checkout_tree(self, oid, workdir)
    }
}
