// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository contract shared by all backends.

use async_trait::async_trait;
use chrono::Duration;
use ds_core::{
    DocumentMetadata, Job, JobId, JobParams, JobStatus, JobSummary, JobType, Session, SessionId,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by repository operations.
///
/// `JobNotFound`/`SessionNotFound`/`InvalidTransition` are validation
/// failures; `Io` and `Corrupt` are operational and propagate to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no job with id {0}")]
    JobNotFound(JobId),
    #[error("no session with id {0}")]
    SessionNotFound(SessionId),
    #[error("job {jid}: illegal status transition {from} -> {to}")]
    InvalidTransition {
        jid: JobId,
        from: JobStatus,
        to: JobStatus,
    },
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

/// Partial update applied to a stored job. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub result: Option<Vec<u8>>,
    pub metadata_src: Option<DocumentMetadata>,
    pub metadata_result: Option<DocumentMetadata>,
}

impl JobUpdate {
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Filters for job summary listings. All filters are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Restrict to members of this session; the session must exist.
    pub session_id: Option<SessionId>,
    /// Restrict to jobs in any of these statuses.
    pub status: Option<Vec<JobStatus>>,
    /// Restrict to jobs whose `updated` lies at least this far in the past.
    pub not_updated_for: Option<Duration>,
}

impl JobFilter {
    pub fn for_session(sid: &SessionId) -> Self {
        Self {
            session_id: Some(sid.clone()),
            ..Self::default()
        }
    }

    pub fn with_status(status: impl Into<Vec<JobStatus>>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    fn matches(&self, summary: &JobSummary, cutoff: Option<chrono::DateTime<chrono::Utc>>) -> bool {
        if let Some(sid) = &self.session_id {
            if summary.session_id.as_ref() != Some(sid) {
                return false;
            }
        }
        if let Some(statuses) = &self.status {
            if !statuses.contains(&summary.status) {
                return false;
            }
        }
        if let Some(cutoff) = cutoff {
            if summary.updated > cutoff {
                return false;
            }
        }
        true
    }
}

/// Applies a filter to a summary list: conjunctive match, then descending
/// `created` order (ties broken by id for determinism). Shared by backends.
pub(crate) fn select_summaries(
    mut summaries: Vec<JobSummary>,
    filter: &JobFilter,
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<JobSummary> {
    let cutoff = filter.not_updated_for.map(|d| now - d);
    summaries.retain(|s| filter.matches(s, cutoff));
    summaries.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
    summaries
}

/// Store for jobs and sessions. No multi-entity transactions; every
/// operation is atomic at single-document grain.
///
/// `src` and `result` payloads may exceed what a document row can hold;
/// backends offload them transparently, and summary listings never pay for
/// fetching them.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Persists a new job in CREATED state and returns its assigned id.
    /// Increments the total-job counter and, if `sid` is given, requires the
    /// session to exist and bumps its `updated` timestamp.
    async fn add_job(
        &self,
        src: Vec<u8>,
        name: &str,
        job_type: Arc<JobType>,
        params: JobParams,
        sid: Option<&SessionId>,
    ) -> Result<JobId, StorageError>;

    /// Returns the full job including payloads, or None.
    async fn find_job(&self, jid: &JobId) -> Result<Option<Job>, StorageError>;

    /// Returns summaries of all matching jobs, ordered by `created`
    /// descending. Fails if the filter names an unknown session.
    async fn find_jobs(&self, filter: JobFilter) -> Result<Vec<JobSummary>, StorageError>;

    /// Applies a partial update, refreshes `updated` and bumps the owning
    /// session. Status changes must advance the state machine.
    async fn update_job(&self, jid: &JobId, update: JobUpdate) -> Result<(), StorageError>;

    /// Appends one line to the job's log.
    async fn add_to_job_log(&self, jid: &JobId, entry: &str) -> Result<(), StorageError>;

    /// Removes the job and its offloaded payload blobs.
    async fn delete_job(&self, jid: &JobId) -> Result<(), StorageError>;

    /// Cumulative count of jobs ever created; survives deletions.
    async fn get_total_job_count(&self) -> Result<u64, StorageError>;

    /// Creates a new session and returns its id.
    async fn add_session(&self) -> Result<SessionId, StorageError>;

    async fn find_session(&self, sid: &SessionId) -> Result<Option<Session>, StorageError>;

    /// All sessions, optionally restricted to those not updated for at
    /// least the given duration.
    async fn find_sessions(
        &self,
        not_updated_for: Option<Duration>,
    ) -> Result<Vec<Session>, StorageError>;

    /// Removes the session and cascades over all member jobs.
    async fn delete_session(&self, sid: &SessionId) -> Result<(), StorageError>;
}
