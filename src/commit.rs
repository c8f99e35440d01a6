//! Turning a tree snapshot plus revision metadata into a commit.
//!
//! [`CommitBuilder`] writes one commit object per call, parented on the
//! previous commit it produced (or the resume head), and then moves the
//! destination branch to it. The branch only ever points at fully written
//! commits, so the repository is openable between any two calls.

use wikigit_git::{GitError, GitOid, GitRepo, RefName, Signature};

/// Identity recorded as committer on every replayed commit. When unset, the
/// revision author doubles as committer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Everything about a commit that does not come from the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitMetadata {
    /// Final (already resolved) commit message.
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    /// Seconds since the Unix epoch; used for both author and committer time.
    pub timestamp: i64,
}

/// Writes the linear commit chain for one replay run.
pub struct CommitBuilder<'r> {
    repo: &'r dyn GitRepo,
    branch: RefName,
    committer: Option<Committer>,
    head: Option<GitOid>,
}

impl<'r> CommitBuilder<'r> {
    /// Start a chain on `branch`. `head` is the parent of the first commit:
    /// `None` for a fresh destination, the existing branch head when resuming.
    #[must_use]
    pub fn new(
        repo: &'r dyn GitRepo,
        branch: RefName,
        committer: Option<Committer>,
        head: Option<GitOid>,
    ) -> Self {
        Self {
            repo,
            branch,
            committer,
            head,
        }
    }

    /// The last commit written (or the resume head if none yet).
    #[must_use]
    pub const fn head(&self) -> Option<GitOid> {
        self.head
    }

    /// Commit `tree` with `metadata`, parented on the current head, and move
    /// the branch to the new commit.
    ///
    /// # Errors
    /// Returns an error if the commit object or the branch update cannot be
    /// written. The head is left unchanged in that case.
    pub fn commit(&mut self, tree: GitOid, metadata: &CommitMetadata) -> Result<GitOid, GitError> {
        let author = Signature::utc(
            &metadata.author_name,
            &metadata.author_email,
            metadata.timestamp,
        );
        let committer = self.committer.as_ref().map_or_else(
            || author.clone(),
            |c| Signature::utc(&c.name, &c.email, metadata.timestamp),
        );
        let parents: Vec<GitOid> = self.head.into_iter().collect();

        let oid = self.repo.create_commit(
            tree,
            &parents,
            &metadata.message,
            &author,
            &committer,
            Some(&self.branch),
        )?;

        tracing::debug!(
            commit = %oid.short(),
            parent = ?self.head.map(|p| p.short()),
            tree = %tree.short(),
            "wrote commit"
        );
        self.head = Some(oid);
        Ok(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use wikigit_git::GixRepo;

    fn meta(message: &str, timestamp: i64) -> CommitMetadata {
        CommitMetadata {
            message: message.to_owned(),
            author_name: "Ann".to_owned(),
            author_email: "ann@wiki.example".to_owned(),
            timestamp,
        }
    }

    #[test]
    fn chain_is_linear_and_moves_branch() {
        let dir = TempDir::new().unwrap();
        let repo = GixRepo::init_bare(dir.path()).unwrap();
        let tree = repo.write_tree(&[]).unwrap();
        let branch = RefName::branch("main").unwrap();

        let mut builder = CommitBuilder::new(&repo, branch.clone(), None, None);
        let first = builder.commit(tree, &meta("one", 1)).unwrap();
        let second = builder.commit(tree, &meta("two", 2)).unwrap();

        assert!(repo.read_commit(first).unwrap().parents.is_empty());
        assert_eq!(repo.read_commit(second).unwrap().parents, vec![first]);
        assert_eq!(repo.read_ref(&branch).unwrap(), Some(second));
        assert_eq!(builder.head(), Some(second));
    }

    #[test]
    fn author_is_committer_unless_configured() {
        let dir = TempDir::new().unwrap();
        let repo = GixRepo::init_bare(dir.path()).unwrap();
        let tree = repo.write_tree(&[]).unwrap();
        let branch = RefName::branch("main").unwrap();

        let mut plain = CommitBuilder::new(&repo, branch.clone(), None, None);
        let a = plain.commit(tree, &meta("a", 1)).unwrap();
        assert_eq!(repo.read_commit(a).unwrap().committer, "Ann <ann@wiki.example>");

        let importer = Committer {
            name: "Importer".to_owned(),
            email: "importer@localhost".to_owned(),
        };
        let mut custom = CommitBuilder::new(&repo, branch, Some(importer), Some(a));
        let b = custom.commit(tree, &meta("b", 2)).unwrap();
        let info = repo.read_commit(b).unwrap();
        assert_eq!(info.author, "Ann <ann@wiki.example>");
        assert_eq!(info.committer, "Importer <importer@localhost>");
        assert_eq!(info.parents, vec![a]);
    }
}
