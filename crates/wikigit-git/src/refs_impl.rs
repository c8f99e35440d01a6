//! gix-backed ref and rev-parse operations.

use gix::refs::transaction::{Change, LogChange, PreviousValue, RefEdit, RefLog};
use gix::refs::{FullName, Target};

use crate::error::GitError;
use crate::gix_repo::GixRepo;
use crate::objects_impl::{from_gix_oid, to_gix_oid, to_gix_signature};
use crate::types::{GitOid, RefName, Signature};

pub fn read_ref(repo: &GixRepo, name: &RefName) -> Result<Option<GitOid>, GitError> {
    match repo.repo.try_find_reference(name.as_str()) {
        Ok(Some(mut r)) => {
            let id = r
                .peel_to_id_in_place()
                .map_err(|e| GitError::BackendError {
                    message: format!("failed to peel {name}: {e}"),
                })?;
            Ok(Some(from_gix_oid(id.as_ref())?))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(GitError::BackendError {
            message: format!("failed to look up {name}: {e}"),
        }),
    }
}

fn full_name(value: &str) -> Result<FullName, GitError> {
    value.try_into().map_err(
        |e: gix::validate::reference::name::Error| GitError::InvalidRef {
            value: value.to_owned(),
            reason: e.to_string(),
        },
    )
}

/// Move `name` to `oid`, recording `committer` in the reflog. No identity is
/// read from git config.
pub fn write_ref(
    repo: &GixRepo,
    name: &RefName,
    oid: GitOid,
    log_message: &str,
    committer: &Signature,
) -> Result<(), GitError> {
    let edit = RefEdit {
        change: Change::Update {
            log: LogChange {
                mode: RefLog::AndReference,
                force_create_reflog: false,
                message: log_message.into(),
            },
            expected: PreviousValue::Any,
            new: Target::Object(to_gix_oid(oid)),
        },
        name: full_name(name.as_str())?,
        deref: false,
    };

    let signature = to_gix_signature(committer);
    let mut time = gix::date::parse::TimeBuf::default();
    repo.repo
        .edit_references_as([edit], Some(signature.to_ref(&mut time)))
        .map_err(|e| GitError::BackendError {
            message: format!("failed to update {name} to {oid}: {e}"),
        })?;
    Ok(())
}

pub fn point_head_at(repo: &GixRepo, branch: &RefName) -> Result<(), GitError> {
    let edit = RefEdit {
        change: Change::Update {
            log: LogChange {
                message: format!("wikigit: point HEAD at {branch}").into(),
                ..LogChange::default()
            },
            expected: PreviousValue::Any,
            new: Target::Symbolic(full_name(branch.as_str())?),
        },
        name: full_name("HEAD")?,
        deref: false,
    };

    repo.repo
        .edit_reference(edit)
        .map_err(|e| GitError::BackendError {
            message: format!("failed to point HEAD at {branch}: {e}"),
        })?;
    Ok(())
}

pub fn rev_parse_opt(repo: &GixRepo, spec: &str) -> Result<Option<GitOid>, GitError> {
    // Every gix rev-parse error is a resolution failure (malformed spec,
    // missing ref, unborn HEAD), so they map to None.
    match repo.repo.rev_parse_single(spec) {
        Ok(id) => Ok(Some(from_gix_oid(id.as_ref())?)),
        Err(_) => Ok(None),
    }
}
