//! wikigit: replay a wiki's revision history into a git repository.
//!
//! Every page revision becomes one commit. The tree of each commit holds one
//! rendered document per live page, named by the page's path key (see
//! [`slug`]), plus two scaffold entries. Feed [`replay::replay`] a stream of
//! [`source::RevisionRecord`]s and a [`render::Renderer`].

pub mod commit;
pub mod config;
pub mod destination;
pub mod document;
pub mod error;
pub mod render;
pub mod replay;
pub mod scaffold;
pub mod slug;
pub mod source;
pub mod tree;

pub use error::ReplayError;
pub use replay::{Notice, ReplayOptions, ReplayOutcome, ReplaySettings, replay, replay_pipelined};
pub use source::{JsonlSource, RevisionRecord, SourceError};
