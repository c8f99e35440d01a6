//! Preparing the destination repository.
//!
//! A destination is opened in one of three modes:
//!
//! - **fresh**: the path is missing or an empty directory. A new repository
//!   is initialized and HEAD points at the configured branch.
//! - **overwrite**: the path holds something and `force_overwrite` is set.
//!   Everything there is removed first, then it is treated as fresh.
//! - **resume**: `resume` is set and the path is a repository. The branch
//!   head becomes the parent of the first new commit and its tree seeds the
//!   engine's tree state.
//!
//! Resume takes precedence over overwrite when both are set.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wikigit_git::{GitError, GitOid, GitRepo, GixRepo, RefName};

use crate::error::ReplayError;
use crate::tree::TreeState;

/// How an existing destination may be treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenMode {
    pub force_overwrite: bool,
    pub resume: bool,
    pub bare: bool,
}

/// An opened destination repository, ready for replay.
pub struct Destination {
    repo: GixRepo,
    path: PathBuf,
    branch: RefName,
    head: Option<GitOid>,
    resumed: bool,
}

impl Destination {
    /// Open or create the repository at `path` for writing `branch`.
    ///
    /// # Errors
    /// - [`ReplayError::DestinationExists`] if the path holds something and
    ///   neither overwrite nor resume is allowed.
    /// - [`ReplayError::NotARepository`] if resume is requested for a path
    ///   that is not a repository.
    /// - [`ReplayError::DestinationNotWritable`] if the path cannot be
    ///   cleared, created, or initialized.
    pub fn prepare(path: &Path, branch: &RefName, mode: OpenMode) -> Result<Self, ReplayError> {
        if mode.resume {
            return Self::resume(path, branch);
        }

        if !is_vacant(path) {
            if !mode.force_overwrite {
                return Err(ReplayError::DestinationExists {
                    path: path.to_path_buf(),
                });
            }
            info!(path = %path.display(), "overwriting existing destination");
            clear(path).map_err(|source| not_writable(path, source))?;
        }

        fs::create_dir_all(path).map_err(|source| not_writable(path, source))?;
        if fs::metadata(path)
            .map_err(|source| not_writable(path, source))?
            .permissions()
            .readonly()
        {
            return Err(not_writable(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "read-only directory"),
            ));
        }

        let init = if mode.bare {
            GixRepo::init_bare(path)
        } else {
            GixRepo::init(path)
        };
        let repo = init.map_err(|e| match e {
            GitError::IoError(source) => not_writable(path, source),
            GitError::OpenFailed { message, .. } => not_writable(path, io::Error::other(message)),
            other => ReplayError::git(other, None),
        })?;
        repo.point_head_at(branch)
            .map_err(|e| ReplayError::git(e, None))?;

        debug!(path = %path.display(), bare = mode.bare, "created destination");
        Ok(Self {
            repo,
            path: path.to_path_buf(),
            branch: branch.clone(),
            head: None,
            resumed: false,
        })
    }

    fn resume(path: &Path, branch: &RefName) -> Result<Self, ReplayError> {
        if !GixRepo::is_repository(path) {
            return Err(ReplayError::NotARepository {
                path: path.to_path_buf(),
            });
        }
        let repo = GixRepo::open(path).map_err(|e| ReplayError::git(e, None))?;
        let head = repo
            .read_ref(branch)
            .map_err(|e| ReplayError::git(e, None))?;
        if head.is_none() {
            repo.point_head_at(branch)
                .map_err(|e| ReplayError::git(e, None))?;
        }

        info!(
            path = %path.display(),
            head = ?head.map(|h| h.short()),
            "resuming destination"
        );
        Ok(Self {
            repo,
            path: path.to_path_buf(),
            branch: branch.clone(),
            head,
            resumed: true,
        })
    }

    #[must_use]
    pub fn repo(&self) -> &dyn GitRepo {
        &self.repo
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn branch(&self) -> &RefName {
        &self.branch
    }

    /// Branch head at open time. `None` for fresh destinations.
    #[must_use]
    pub const fn head(&self) -> Option<GitOid> {
        self.head
    }

    #[must_use]
    pub const fn is_resumed(&self) -> bool {
        self.resumed
    }

    /// Tree state as of the branch head: empty for fresh destinations.
    ///
    /// # Errors
    /// Returns an error if the head commit or its tree cannot be read.
    pub fn initial_tree(&self) -> Result<TreeState, GitError> {
        match self.head {
            Some(head) => {
                let commit = self.repo.read_commit(head)?;
                TreeState::from_tree(&self.repo, commit.tree_oid)
            }
            None => Ok(TreeState::new()),
        }
    }

    /// Materialize `commit` in the working directory. Bare repositories are
    /// left alone.
    ///
    /// # Errors
    /// Returns an error if checkout fails.
    pub fn checkout(&self, commit: GitOid) -> Result<(), GitError> {
        let Some(workdir) = self.repo.workdir() else {
            return Ok(());
        };
        self.repo.checkout_tree(commit, workdir)?;
        debug!(commit = %commit.short(), "checked out head");
        Ok(())
    }
}

/// Missing, or an empty directory.
fn is_vacant(path: &Path) -> bool {
    match fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(e) => e.kind() == io::ErrorKind::NotFound,
    }
}

fn clear(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn not_writable(path: &Path, source: io::Error) -> ReplayError {
    ReplayError::DestinationNotWritable {
        path: path.to_path_buf(),
        source,
    }
}
