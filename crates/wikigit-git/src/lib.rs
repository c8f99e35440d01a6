//! Git persistence layer for wikigit.
//!
//! This crate defines the [`GitRepo`] trait, the single interface through
//! which the replay engine writes history. Nothing outside this crate imports
//! gix directly; the engine depends on `wikigit-git` and programs against the
//! trait.
//!
//! # Crate layout
//!
//! - [`repo`]: the [`GitRepo`] trait definition.
//! - [`types`]: value types used in trait signatures ([`GitOid`], [`RefName`],
//!   [`TreeEntry`], [`Signature`], etc.).
//! - [`error`]: the [`GitError`] enum returned by all trait methods.

pub mod error;
pub mod repo;
pub mod types;

// gix-backed implementation modules
mod checkout_impl;
mod gix_repo;
mod objects_impl;
mod refs_impl;

pub use gix_repo::GixRepo;

pub use error::GitError;
pub use repo::GitRepo;
pub use types::{
    CommitInfo, EntryMode, GitOid, OidParseError, RefName, RefNameError, Signature, TreeEntry,
};
