// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session service: grouping jobs for batch creation, monitoring and
//! longer retention.

use crate::deps::Deps;
use crate::error::ServiceError;
use crate::jobs::AWAIT_POLL_INTERVAL;
use chrono::{DateTime, Duration, Utc};
use ds_core::{JobId, JobStatus, SessionId};
use ds_storage::{JobFilter, Repository};
use std::collections::HashSet;
use tracing::debug;

/// Member-job view inside session details, ordered newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionJob {
    pub id: JobId,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status: JobStatus,
    pub type_id: String,
}

/// Detail view of a session and its members.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetails {
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Number of member jobs
    pub total: usize,
    /// Number of member jobs in a terminal state
    pub finished: usize,
    pub jobs: Vec<SessionJob>,
}

/// Creates a new session and returns the session id.
pub async fn create_session(deps: &Deps) -> Result<SessionId, ServiceError> {
    Ok(deps.repo.add_session().await?)
}

/// Returns session details including per-member summaries.
pub async fn get_session(deps: &Deps, sid: &SessionId) -> Result<SessionDetails, ServiceError> {
    let session = deps
        .repo
        .find_session(sid)
        .await?
        .ok_or_else(|| ServiceError::SessionNotFound(sid.clone()))?;
    let members = deps.repo.find_jobs(JobFilter::for_session(sid)).await?;
    let finished = members.iter().filter(|j| j.status.is_terminal()).count();
    Ok(SessionDetails {
        created: session.created,
        updated: session.updated,
        total: members.len(),
        finished,
        jobs: members
            .into_iter()
            .map(|summary| SessionJob {
                id: summary.id,
                created: summary.created,
                updated: summary.updated,
                status: summary.status,
                type_id: summary.type_id,
            })
            .collect(),
    })
}

/// Blocks until all member jobs of the given session are terminal.
pub async fn await_session(deps: &Deps, sid: &SessionId) -> Result<(), ServiceError> {
    deps.repo
        .find_session(sid)
        .await?
        .ok_or_else(|| ServiceError::SessionNotFound(sid.clone()))?;
    loop {
        let members = deps.repo.find_jobs(JobFilter::for_session(sid)).await?;
        if members.iter().all(|j| j.status.is_terminal()) {
            return Ok(());
        }
        tokio::time::sleep(AWAIT_POLL_INTERVAL).await;
    }
}

/// Deletes the session and all member jobs. Refuses while any member is
/// still CREATED, QUEUED or RUNNING.
pub async fn delete_session(deps: &Deps, sid: &SessionId) -> Result<(), ServiceError> {
    deps.repo
        .find_session(sid)
        .await?
        .ok_or_else(|| ServiceError::SessionNotFound(sid.clone()))?;
    let members = deps.repo.find_jobs(JobFilter::for_session(sid)).await?;
    if members.iter().any(|j| !j.status.is_terminal()) {
        return Err(ServiceError::InvalidState(format!(
            "session {sid} has unfinished jobs"
        )));
    }
    debug!(sid = %sid, members = members.len(), "deleting session");
    deps.repo.delete_session(sid).await?;
    Ok(())
}

/// Deletes sessions whose `updated` is older than the cutoff and that have
/// no non-terminal members, cascading over their jobs. Returns the ids of
/// all deleted sessions.
pub async fn purge_sessions(
    deps: &Deps,
    purge_after: Duration,
) -> Result<HashSet<SessionId>, ServiceError> {
    let mut purged = HashSet::new();
    for session in deps.repo.find_sessions(Some(purge_after)).await? {
        let members = deps
            .repo
            .find_jobs(JobFilter::for_session(&session.id))
            .await?;
        if members.iter().all(|j| j.status.is_terminal()) {
            deps.repo.delete_session(&session.id).await?;
            purged.insert(session.id);
        }
    }
    if !purged.is_empty() {
        debug!(count = purged.len(), "purged sessions");
    }
    Ok(purged)
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
