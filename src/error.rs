//! Errors that end a replay run.
//!
//! Everything here is fatal. Per-revision problems the run can continue past
//! are [`Notice`](crate::replay::Notice)s, not errors. Variants raised after
//! the first commit carry `last_commit` so the caller can report how far the
//! run got; the branch still points at that commit.

use std::fmt;
use std::io;
use std::path::PathBuf;

use wikigit_git::{GitError, GitOid};

use crate::render::RenderError;
use crate::source::SourceError;

/// A replay run stopped.
#[derive(Debug)]
pub enum ReplayError {
    /// The source yielded no revisions (or the limit was zero).
    EmptySource,

    /// The destination holds something and neither overwrite nor resume was
    /// requested.
    DestinationExists { path: PathBuf },

    /// The destination could not be created or written.
    DestinationNotWritable { path: PathBuf, source: io::Error },

    /// Resume was requested for a path that holds no repository.
    NotARepository { path: PathBuf },

    /// A record could not be read from the source.
    Source {
        error: SourceError,
        last_commit: Option<GitOid>,
    },

    /// A render failure that the run cannot skip past.
    Render {
        /// 0-based position of the revision in the stream.
        index: usize,
        title: String,
        error: RenderError,
        last_commit: Option<GitOid>,
    },

    /// Writing a blob, tree, commit, or ref failed.
    Git {
        error: GitError,
        last_commit: Option<GitOid>,
    },
}

impl ReplayError {
    /// The last commit the run wrote before failing, if any.
    #[must_use]
    pub const fn last_commit(&self) -> Option<GitOid> {
        match self {
            Self::Source { last_commit, .. }
            | Self::Render { last_commit, .. }
            | Self::Git { last_commit, .. } => *last_commit,
            Self::EmptySource
            | Self::DestinationExists { .. }
            | Self::DestinationNotWritable { .. }
            | Self::NotARepository { .. } => None,
        }
    }

    /// Whether the run failed before touching history.
    #[must_use]
    pub const fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::EmptySource
                | Self::DestinationExists { .. }
                | Self::DestinationNotWritable { .. }
                | Self::NotARepository { .. }
        )
    }

    pub(crate) const fn git(error: GitError, last_commit: Option<GitOid>) -> Self {
        Self::Git { error, last_commit }
    }
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySource => {
                write!(f, "no revisions to replay\n  To fix: check the input file and --skip/--limit.")
            }
            Self::DestinationExists { path } => write!(
                f,
                "destination {} already exists and is not empty\n  \
                 To fix: pass --force to overwrite it, or --resume to continue its history.",
                path.display()
            ),
            Self::DestinationNotWritable { path, source } => write!(
                f,
                "destination {} is not writable: {source}\n  \
                 To fix: check permissions or choose another destination.",
                path.display()
            ),
            Self::NotARepository { path } => write!(
                f,
                "cannot resume: {} is not a git repository\n  \
                 To fix: drop --resume to create a fresh repository there.",
                path.display()
            ),
            Self::Source { error, .. } => write!(f, "revision source failed: {error}"),
            Self::Render {
                index,
                title,
                error,
                ..
            } => write!(f, "revision {index} ('{title}') could not be rendered: {error}"),
            Self::Git { error, .. } => write!(f, "git write failed: {error}"),
        }?;
        if let Some(commit) = self.last_commit() {
            write!(f, "\n  Last commit written: {commit}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DestinationNotWritable { source, .. } => Some(source),
            Self::Source { error, .. } => Some(error),
            Self::Render { error, .. } => Some(error),
            Self::Git { error, .. } => Some(error),
            Self::EmptySource | Self::DestinationExists { .. } | Self::NotARepository { .. } => {
                None
            }
        }
    }
}
