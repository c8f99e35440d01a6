//! The revision replay engine.
//!
//! Each revision goes through `resolve → (delete | render) → commit →
//! advance`:
//!
//! 1. The title is mapped to a path key.
//! 2. Empty content deletes the key from the tree. Anything else is rendered
//!    and stored under the key with a title header.
//! 3. The tree is snapshotted and committed with the previous commit as sole
//!    parent, and the branch moves to the new commit.
//! 4. The interrupt flag is checked before the next revision is pulled.
//!
//! [`replay`] does all of this on the calling thread. [`replay_pipelined`]
//! renders ahead on a second thread while the calling thread commits; both
//! produce the same chain for the same input.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use wikigit_git::{GitOid, RefName};

use crate::commit::{CommitBuilder, CommitMetadata, Committer};
use crate::destination::{Destination, OpenMode};
use crate::document;
use crate::error::ReplayError;
use crate::render::{RenderError, Renderer};
use crate::scaffold::Scaffold;
use crate::slug::{display_title, slugify};
use crate::source::{RevisionRecord, SourceError};
use crate::tree::TreeState;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What a recoverable render failure does to the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderErrorPolicy {
    /// Record a notice and move on without committing the revision.
    #[default]
    Skip,
    /// Stop the run.
    Abort,
}

/// Settings that shape the produced history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaySettings {
    /// Branch the chain is written to.
    pub branch: RefName,
    /// Committer identity. `None` uses each revision's author.
    pub committer: Option<Committer>,
    /// Append the original markup to each document.
    pub embed_source: bool,
    pub on_render_error: RenderErrorPolicy,
    pub scaffold: Scaffold,
    /// Create fresh destinations without a working directory.
    pub bare: bool,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            branch: RefName::default_branch(),
            committer: None,
            embed_source: false,
            on_render_error: RenderErrorPolicy::Skip,
            scaffold: Scaffold::default(),
            bare: false,
        }
    }
}

/// Per-run options.
#[derive(Clone, Debug, Default)]
pub struct ReplayOptions {
    /// Discard whatever the destination holds before starting.
    pub force_overwrite: bool,
    /// Process at most this many revisions.
    pub limit: Option<usize>,
    /// Continue the history of an existing destination repository.
    pub resume: bool,
    /// How many prepared revisions [`replay_pipelined`] may buffer.
    pub prefetch: usize,
    /// Set to stop the run after the revision in progress.
    pub interrupt: Arc<AtomicBool>,
    pub settings: ReplaySettings,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A non-fatal diagnostic recorded during the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Rendering failed; the revision was not committed.
    RenderSkipped {
        index: usize,
        title: String,
        reason: String,
    },
    /// Delete of a path never seen before in the run; no commit was made.
    DeleteOfUnknownPage { index: usize, path: String },
    /// Delete of a path seen earlier (written or deleted) that is not
    /// present now; the deletion was still committed.
    DeleteOfAbsentPage { index: usize, path: String },
}

impl Notice {
    /// 0-based stream position of the revision the notice is about.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::RenderSkipped { index, .. }
            | Self::DeleteOfUnknownPage { index, .. }
            | Self::DeleteOfAbsentPage { index, .. } => *index,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RenderSkipped {
                index,
                title,
                reason,
            } => write!(f, "revision {index}: skipped '{title}': {reason}"),
            Self::DeleteOfUnknownPage { index, path } => {
                write!(f, "revision {index}: delete of unknown page '{path}' ignored")
            }
            Self::DeleteOfAbsentPage { index, path } => {
                write!(f, "revision {index}: '{path}' was already deleted")
            }
        }
    }
}

/// Result of a run that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Branch head after the run. For a resumed run with no new commits this
    /// is the head it started from.
    pub head: Option<GitOid>,
    /// Commits written by this run, oldest first.
    pub chain: Vec<GitOid>,
    pub notices: Vec<Notice>,
    /// Revisions consumed from the source, committed or not.
    pub processed: usize,
    /// The interrupt flag stopped the run before the source was exhausted.
    pub interrupted: bool,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Replay `revisions` into the repository at `destination`.
///
/// # Errors
/// Startup errors ([`ReplayError::EmptySource`], destination problems) are
/// returned before any commit is written. Later errors carry the last commit
/// written; the branch points at it.
#[instrument(skip_all, fields(destination = %destination.display(), renderer = renderer.name()))]
pub fn replay<I>(
    revisions: I,
    renderer: &dyn Renderer,
    destination: &Path,
    options: &ReplayOptions,
) -> Result<ReplayOutcome, ReplayError>
where
    I: IntoIterator<Item = Result<RevisionRecord, SourceError>>,
{
    let records = records_with_first(revisions, options.limit)?;
    let destination = open_destination(destination, options)?;
    let mut session = Session::new(&destination, &options.settings)?;

    let settings = &options.settings;
    let prepared = records
        .enumerate()
        .map(|(index, record)| record.map(|r| prepare(index, r, renderer, settings)));
    let interrupted = session.drive(prepared, &options.interrupt)?;
    session.finish(interrupted)
}

/// [`replay`] with rendering overlapped with committing.
///
/// A scoped producer thread reads, renders and assembles revisions into a
/// bounded channel of `options.prefetch` slots (at least one); the calling
/// thread commits them in stream order.
///
/// # Errors
/// Same as [`replay`].
#[instrument(skip_all, fields(destination = %destination.display(), renderer = renderer.name(), prefetch = options.prefetch))]
pub fn replay_pipelined<I>(
    revisions: I,
    renderer: &dyn Renderer,
    destination: &Path,
    options: &ReplayOptions,
) -> Result<ReplayOutcome, ReplayError>
where
    I: IntoIterator<Item = Result<RevisionRecord, SourceError>>,
    I::IntoIter: Send,
{
    let records = records_with_first(revisions, options.limit)?;
    let destination = open_destination(destination, options)?;
    let mut session = Session::new(&destination, &options.settings)?;

    let settings = &options.settings;
    let interrupt = &options.interrupt;
    let (tx, rx) = mpsc::sync_channel(options.prefetch.max(1));

    let interrupted = std::thread::scope(|scope| {
        // Yields whether the producer stopped on the interrupt flag rather
        // than at the end of the source.
        let producer = scope.spawn(move || {
            for (index, record) in records.enumerate() {
                if interrupt.load(Ordering::SeqCst) {
                    return true;
                }
                let item = record.map(|r| prepare(index, r, renderer, settings));
                // Receiver gone: the committer stopped.
                if tx.send(item).is_err() {
                    break;
                }
            }
            false
        });
        // `rx` is consumed here so the producer unblocks when the
        // committer stops early.
        let drained = session.drive(rx, interrupt);
        let producer_interrupted = producer
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        drained.map(|interrupted| interrupted || producer_interrupted)
    })?;
    session.finish(interrupted)
}

/// Commit message for a revision: the given message if it has any
/// non-whitespace, otherwise `"Minor edit"` or `"Modified <path>"`.
#[must_use]
pub fn resolve_message(message: Option<&str>, is_minor_edit: bool, path: &str) -> String {
    match message {
        Some(m) if !m.trim().is_empty() => m.to_owned(),
        _ if is_minor_edit => "Minor edit".to_owned(),
        _ => format!("Modified {path}"),
    }
}

// ---------------------------------------------------------------------------
// Preparation (no repository access)
// ---------------------------------------------------------------------------

struct Prepared {
    index: usize,
    title: String,
    path: String,
    metadata: CommitMetadata,
    action: Action,
}

enum Action {
    Put(Vec<u8>),
    Delete,
    RenderFailed(RenderError),
}

fn prepare(
    index: usize,
    record: RevisionRecord,
    renderer: &dyn Renderer,
    settings: &ReplaySettings,
) -> Prepared {
    let path = slugify(&record.title);
    let message = resolve_message(record.message.as_deref(), record.is_minor_edit, &path);

    let action = if record.is_delete() {
        Action::Delete
    } else {
        let markup = record.content.unwrap_or_default();
        match renderer.render(&markup) {
            Ok(doc) => {
                let source = settings
                    .embed_source
                    .then(|| String::from_utf8_lossy(&markup));
                Action::Put(document::assemble(
                    &display_title(&record.title),
                    &doc.body,
                    source.as_deref(),
                ))
            }
            Err(e) => Action::RenderFailed(e),
        }
    };

    Prepared {
        index,
        title: record.title,
        path,
        metadata: CommitMetadata {
            message,
            author_name: record.author_name,
            author_email: record.author_email,
            timestamp: record.timestamp,
        },
        action,
    }
}

// ---------------------------------------------------------------------------
// Session (committer side)
// ---------------------------------------------------------------------------

struct Session<'d> {
    destination: &'d Destination,
    settings: &'d ReplaySettings,
    tree: TreeState,
    builder: CommitBuilder<'d>,
    /// Keys written or deleted earlier in this run, plus the resumed tree.
    seen: HashSet<String>,
    /// Title that last wrote each key.
    owners: HashMap<String, String>,
    chain: Vec<GitOid>,
    notices: Vec<Notice>,
    processed: usize,
}

impl<'d> Session<'d> {
    fn new(destination: &'d Destination, settings: &'d ReplaySettings) -> Result<Self, ReplayError> {
        let mut tree = destination
            .initial_tree()
            .map_err(|e| ReplayError::git(e, destination.head()))?;
        let seen = tree.keys().map(str::to_owned).collect();
        let seeded = settings.scaffold.seed(&mut tree);
        if seeded > 0 {
            debug!(entries = seeded, "seeded scaffold");
        }

        Ok(Self {
            destination,
            settings,
            tree,
            builder: CommitBuilder::new(
                destination.repo(),
                destination.branch().clone(),
                settings.committer.clone(),
                destination.head(),
            ),
            seen,
            owners: HashMap::new(),
            chain: Vec::new(),
            notices: Vec::new(),
            processed: 0,
        })
    }

    /// Apply prepared revisions until the source ends or the interrupt flag
    /// is set. Returns whether the run was interrupted.
    fn drive<T>(&mut self, items: T, interrupt: &AtomicBool) -> Result<bool, ReplayError>
    where
        T: IntoIterator<Item = Result<Prepared, SourceError>>,
    {
        let mut items = items.into_iter();
        loop {
            if interrupt.load(Ordering::SeqCst) {
                info!(processed = self.processed, "interrupted");
                return Ok(true);
            }
            let Some(item) = items.next() else {
                return Ok(false);
            };
            let item = item.map_err(|error| ReplayError::Source {
                error,
                last_commit: self.builder.head(),
            })?;
            self.apply(item)?;
        }
    }

    fn apply(&mut self, item: Prepared) -> Result<(), ReplayError> {
        self.processed += 1;
        let Prepared {
            index,
            title,
            path,
            metadata,
            action,
        } = item;

        match action {
            Action::RenderFailed(error) => {
                if error.is_fatal() || self.settings.on_render_error == RenderErrorPolicy::Abort {
                    return Err(ReplayError::Render {
                        index,
                        title,
                        error,
                        last_commit: self.builder.head(),
                    });
                }
                self.notice(Notice::RenderSkipped {
                    index,
                    title,
                    reason: error.to_string(),
                });
                return Ok(());
            }
            Action::Delete => {
                let first_sighting = self.seen.insert(path.clone());
                if !self.tree.remove(&path) {
                    if first_sighting {
                        self.notice(Notice::DeleteOfUnknownPage { index, path });
                        return Ok(());
                    }
                    self.notice(Notice::DeleteOfAbsentPage {
                        index,
                        path: path.clone(),
                    });
                }
                self.owners.remove(&path);
            }
            Action::Put(document) => {
                if let Some(previous) = self.owners.insert(path.clone(), title.clone())
                    && previous != title
                {
                    debug!(%path, %previous, current = %title, "path key changed owning title");
                }
                self.tree.put(&path, document);
                self.seen.insert(path);
            }
        }

        let head = self.builder.head();
        let tree = self
            .tree
            .snapshot(self.destination.repo())
            .map_err(|e| ReplayError::git(e, head))?;
        let commit = self
            .builder
            .commit(tree, &metadata)
            .map_err(|e| ReplayError::git(e, head))?;
        self.chain.push(commit);
        Ok(())
    }

    fn notice(&mut self, notice: Notice) {
        warn!(%notice, "revision notice");
        self.notices.push(notice);
    }

    fn finish(self, interrupted: bool) -> Result<ReplayOutcome, ReplayError> {
        let head = self.builder.head();
        if let Some(commit) = head
            && !self.chain.is_empty()
        {
            self.destination
                .checkout(commit)
                .map_err(|e| ReplayError::git(e, head))?;
        }

        info!(
            processed = self.processed,
            commits = self.chain.len(),
            notices = self.notices.len(),
            head = ?head.map(|h| h.short()),
            interrupted,
            "replay finished"
        );
        Ok(ReplayOutcome {
            head,
            chain: self.chain,
            notices: self.notices,
            processed: self.processed,
            interrupted,
        })
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Apply the limit and pull the first record, so an empty or unreadable
/// source is reported before the destination is touched.
fn records_with_first<I>(
    revisions: I,
    limit: Option<usize>,
) -> Result<impl Iterator<Item = Result<RevisionRecord, SourceError>>, ReplayError>
where
    I: IntoIterator<Item = Result<RevisionRecord, SourceError>>,
{
    let mut records = revisions.into_iter().take(limit.unwrap_or(usize::MAX));
    let first = match records.next() {
        None => return Err(ReplayError::EmptySource),
        Some(Err(error)) => {
            return Err(ReplayError::Source {
                error,
                last_commit: None,
            });
        }
        Some(Ok(record)) => record,
    };
    Ok(std::iter::once(Ok(first)).chain(records))
}

fn open_destination(path: &Path, options: &ReplayOptions) -> Result<Destination, ReplayError> {
    let destination = Destination::prepare(
        path,
        &options.settings.branch,
        OpenMode {
            force_overwrite: options.force_overwrite,
            resume: options.resume,
            bare: options.settings.bare,
        },
    )?;
    info!(
        branch = %options.settings.branch,
        resumed = destination.is_resumed(),
        limit = ?options.limit,
        "replay starting"
    );
    Ok(destination)
}
