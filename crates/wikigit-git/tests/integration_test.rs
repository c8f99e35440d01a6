use tempfile::TempDir;

use wikigit_git::{EntryMode, GitError, GitOid, GitRepo, GixRepo, RefName, Signature, TreeEntry};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup_repo() -> (TempDir, GixRepo) {
    let dir = TempDir::new().unwrap();
    let repo = GixRepo::init(dir.path()).unwrap();
    (dir, repo)
}

fn sig(seconds: i64) -> Signature {
    Signature::utc("Test User", "test@test.com", seconds)
}

fn single_file_tree(repo: &GixRepo, name: &str, content: &[u8]) -> GitOid {
    let blob = repo.write_blob(content).unwrap();
    repo.write_tree(&[TreeEntry {
        name: name.to_string(),
        mode: EntryMode::Blob,
        oid: blob,
    }])
    .unwrap()
}

fn main_ref() -> RefName {
    RefName::branch("main").unwrap()
}

// ===========================================================================
// 1. Objects
// ===========================================================================

#[test]
fn blob_roundtrip() {
    let (_dir, repo) = setup_repo();
    let oid = repo.write_blob(b"some blob content").unwrap();
    assert_eq!(repo.read_blob(oid).unwrap(), b"some blob content");
}

#[test]
fn blob_ids_are_content_addressed() {
    let (_dir, repo) = setup_repo();
    let a = repo.write_blob(b"same").unwrap();
    let b = repo.write_blob(b"same").unwrap();
    let c = repo.write_blob(b"different").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    let (_other_dir, other) = setup_repo();
    assert_eq!(other.write_blob(b"same").unwrap(), a);
}

#[test]
fn tree_roundtrip() {
    let (_dir, repo) = setup_repo();
    let blob_oid = repo.write_blob(b"content").unwrap();
    let tree_oid = repo
        .write_tree(&[TreeEntry {
            name: "file.txt".to_string(),
            mode: EntryMode::Blob,
            oid: blob_oid,
        }])
        .unwrap();
    let read_back = repo.read_tree(tree_oid).unwrap();
    assert_eq!(read_back.len(), 1);
    assert_eq!(read_back[0].name, "file.txt");
    assert_eq!(read_back[0].mode, EntryMode::Blob);
    assert_eq!(read_back[0].oid, blob_oid);
}

#[test]
fn read_missing_blob_is_not_found() {
    let (_dir, repo) = setup_repo();
    let missing: GitOid = "1".repeat(40).parse().unwrap();
    match repo.read_blob(missing) {
        Err(GitError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got: {other:?}"),
    }
}

// ===========================================================================
// 2. Commits
// ===========================================================================

#[test]
fn root_commit_roundtrip() {
    let (_dir, repo) = setup_repo();
    let tree = single_file_tree(&repo, "hello.txt", b"hello\n");
    let commit = repo
        .create_commit(tree, &[], "initial commit", &sig(1_000), &sig(1_000), None)
        .unwrap();

    let info = repo.read_commit(commit).unwrap();
    assert_eq!(info.tree_oid, tree);
    assert!(info.parents.is_empty());
    assert_eq!(info.message, "initial commit");
    assert_eq!(info.author, "Test User <test@test.com>");
}

#[test]
fn commit_records_distinct_author_and_committer() {
    let (_dir, repo) = setup_repo();
    let tree = single_file_tree(&repo, "a", b"a");
    let author = Signature::utc("Ann", "ann@wiki.example", 5);
    let committer = Signature::utc("Importer", "importer@localhost", 5);
    let commit = repo
        .create_commit(tree, &[], "edit", &author, &committer, None)
        .unwrap();

    let info = repo.read_commit(commit).unwrap();
    assert_eq!(info.author, "Ann <ann@wiki.example>");
    assert_eq!(info.committer, "Importer <importer@localhost>");
}

#[test]
fn commit_ids_are_deterministic_across_repositories() {
    let build = || {
        let (dir, repo) = setup_repo();
        let tree = single_file_tree(&repo, "page", b"body");
        let first = repo
            .create_commit(tree, &[], "one", &sig(10), &sig(10), None)
            .unwrap();
        let second = repo
            .create_commit(tree, &[first], "two", &sig(20), &sig(20), None)
            .unwrap();
        (dir, first, second)
    };
    let (_d1, a1, a2) = build();
    let (_d2, b1, b2) = build();
    assert_eq!(a1, b1);
    assert_eq!(a2, b2);
}

#[test]
fn commit_with_parent_and_ref_update() {
    let (_dir, repo) = setup_repo();
    let tree = single_file_tree(&repo, "a", b"a");
    let first = repo
        .create_commit(tree, &[], "first", &sig(1), &sig(1), Some(&main_ref()))
        .unwrap();
    assert_eq!(repo.read_ref(&main_ref()).unwrap(), Some(first));

    let tree2 = single_file_tree(&repo, "a", b"b");
    let second = repo
        .create_commit(tree2, &[first], "second", &sig(2), &sig(2), Some(&main_ref()))
        .unwrap();
    assert_eq!(repo.read_ref(&main_ref()).unwrap(), Some(second));
    assert_eq!(repo.read_commit(second).unwrap().parents, vec![first]);
}

// ===========================================================================
// 3. Refs
// ===========================================================================

#[test]
fn read_ref_nonexistent() {
    let (_dir, repo) = setup_repo();
    let refname = RefName::new("refs/heads/nope").unwrap();
    assert_eq!(repo.read_ref(&refname).unwrap(), None);
}

#[test]
fn unborn_head_does_not_resolve() {
    let (_dir, repo) = setup_repo();
    assert!(repo.rev_parse_opt("HEAD").unwrap().is_none());
}

#[test]
fn head_follows_pointed_branch() {
    let (_dir, repo) = setup_repo();
    let wiki = RefName::branch("wiki").unwrap();
    repo.point_head_at(&wiki).unwrap();

    let tree = single_file_tree(&repo, "a", b"a");
    let commit = repo
        .create_commit(tree, &[], "first", &sig(1), &sig(1), Some(&wiki))
        .unwrap();
    assert_eq!(repo.rev_parse_opt("HEAD").unwrap(), Some(commit));
}

// ===========================================================================
// 4. Open / checkout
// ===========================================================================

#[test]
fn reopen_sees_written_history() {
    let (dir, repo) = setup_repo();
    let tree = single_file_tree(&repo, "a", b"a");
    let commit = repo
        .create_commit(tree, &[], "first", &sig(1), &sig(1), Some(&main_ref()))
        .unwrap();
    drop(repo);

    assert!(GixRepo::is_repository(dir.path()));
    let reopened = GixRepo::open(dir.path()).unwrap();
    assert_eq!(reopened.read_ref(&main_ref()).unwrap(), Some(commit));
}

#[test]
fn reopened_repository_advances_ref_with_explicit_reflog_identity() {
    let (dir, repo) = setup_repo();
    let tree = single_file_tree(&repo, "a", b"a");
    let first = repo
        .create_commit(tree, &[], "first", &sig(1), &sig(1), Some(&main_ref()))
        .unwrap();
    drop(repo);

    // Opened isolated from user config, so no ambient identity is available.
    let reopened = GixRepo::open(dir.path()).unwrap();
    let importer = Signature::utc("Importer", "importer@localhost", 2);
    let tree2 = single_file_tree(&reopened, "a", b"b");
    let second = reopened
        .create_commit(tree2, &[first], "second", &sig(2), &importer, Some(&main_ref()))
        .unwrap();
    assert_eq!(reopened.read_ref(&main_ref()).unwrap(), Some(second));

    let log = std::fs::read_to_string(dir.path().join(".git/logs/refs/heads/main")).unwrap();
    let last = log.lines().last().unwrap();
    assert!(last.contains("Importer <importer@localhost> 2 +0000"), "{last}");
    assert!(last.ends_with("commit: second"), "{last}");
}

#[test]
fn plain_directory_is_not_a_repository() {
    let dir = TempDir::new().unwrap();
    assert!(!GixRepo::is_repository(dir.path()));
    assert!(GixRepo::open(dir.path()).is_err());
}

#[test]
fn bare_repository_has_no_workdir() {
    let dir = TempDir::new().unwrap();
    let repo = GixRepo::init_bare(dir.path()).unwrap();
    assert!(repo.workdir().is_none());
}

#[test]
fn checkout_materializes_tree_and_removes_stale_files() {
    let (dir, repo) = setup_repo();
    let workdir = repo.workdir().unwrap().to_path_buf();
    std::fs::write(workdir.join("stale-page"), "old").unwrap();

    let tree = single_file_tree(&repo, "welcome-page", b"hello");
    let commit = repo
        .create_commit(tree, &[], "first", &sig(1), &sig(1), Some(&main_ref()))
        .unwrap();
    repo.checkout_tree(commit, &workdir).unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("welcome-page")).unwrap(),
        "hello"
    );
    assert!(!dir.path().join("stale-page").exists());
    assert!(dir.path().join(".git").exists());
}
