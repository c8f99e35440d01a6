//! Shared helpers for wikigit integration tests.
//!
//! Every test replays into its own temp directory.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Output};

use wikigit::{RevisionRecord, SourceError};
use wikigit_git::{GitOid, GitRepo, GixRepo, RefName};

pub const BASE_TIME: i64 = 1_700_000_000;

/// A page revision by Ann, `step` seconds after [`BASE_TIME`].
pub fn rev(title: &str, content: Option<&str>, step: i64) -> RevisionRecord {
    RevisionRecord {
        title: title.to_owned(),
        content: content.map(|c| c.as_bytes().to_vec()),
        message: None,
        is_minor_edit: false,
        author_name: "Ann".to_owned(),
        author_email: "ann@wiki.example".to_owned(),
        timestamp: BASE_TIME + step,
    }
}

pub fn with_message(mut record: RevisionRecord, message: &str) -> RevisionRecord {
    record.message = Some(message.to_owned());
    record
}

pub fn minor(mut record: RevisionRecord) -> RevisionRecord {
    record.is_minor_edit = true;
    record
}

/// Wrap records as an infallible source.
pub fn ok(records: Vec<RevisionRecord>) -> Vec<Result<RevisionRecord, SourceError>> {
    records.into_iter().map(Ok).collect()
}

/// Five revisions over three pages, including a delete.
pub fn history() -> Vec<RevisionRecord> {
    vec![
        rev("Main Page", Some("Welcome to the wiki."), 0),
        rev("Rust", Some("A systems language."), 10),
        minor(rev("Rust", Some("A systems programming language."), 20)),
        with_message(rev("Scratch", Some("temp"), 30), "scratch notes"),
        rev("Scratch", None, 40),
    ]
}

pub fn open(path: &Path) -> GixRepo {
    GixRepo::open(path).expect("failed to open destination")
}

pub fn main_ref() -> RefName {
    RefName::branch("main").expect("valid branch")
}

/// Entry name → blob contents for the tree of `commit`.
pub fn tree_of(repo: &GixRepo, commit: GitOid) -> BTreeMap<String, Vec<u8>> {
    let info = repo.read_commit(commit).expect("commit readable");
    repo.read_tree(info.tree_oid)
        .expect("tree readable")
        .into_iter()
        .map(|e| {
            let blob = repo.read_blob(e.oid).expect("blob readable");
            (e.name, blob)
        })
        .collect()
}

pub fn names(tree: &BTreeMap<String, Vec<u8>>) -> Vec<&str> {
    tree.keys().map(String::as_str).collect()
}

/// Walk first parents from `head` back to the root, oldest first.
pub fn history_of(repo: &GixRepo, head: GitOid) -> Vec<GitOid> {
    let mut chain = vec![head];
    let mut current = head;
    while let Some(parent) = repo
        .read_commit(current)
        .expect("commit readable")
        .parents
        .first()
        .copied()
    {
        chain.push(parent);
        current = parent;
    }
    chain.reverse();
    chain
}

/// Write records as a JSON Lines dump.
pub fn write_dump(path: &Path, records: &[RevisionRecord]) {
    let mut text = String::new();
    for r in records {
        let line = serde_json::json!({
            "title": r.title,
            "content": r.content.as_ref().map(|c| String::from_utf8_lossy(c).into_owned()),
            "message": r.message,
            "minor": r.is_minor_edit,
            "author_name": r.author_name,
            "author_email": r.author_email,
            "timestamp": r.timestamp,
        });
        text.push_str(&line.to_string());
        text.push('\n');
    }
    std::fs::write(path, text).expect("failed to write dump");
}

/// The wikigit binary, run in `dir` with no git identity anywhere in its
/// environment or config.
pub fn wikigit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wikigit"));
    cmd.args(args)
        .current_dir(dir)
        .env("RUST_LOG", "warn")
        .env("HOME", dir)
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("GIT_AUTHOR_NAME")
        .env_remove("GIT_AUTHOR_EMAIL")
        .env_remove("GIT_COMMITTER_NAME")
        .env_remove("GIT_COMMITTER_EMAIL")
        .env_remove("EMAIL")
        .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT")
        .env_remove("WIKIGIT_CONFIG");
    cmd
}

/// Run the wikigit binary in `dir` to completion.
pub fn wikigit_in(dir: &Path, args: &[&str]) -> Output {
    wikigit_command(dir, args)
        .output()
        .expect("failed to run wikigit")
}
