// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job service: create, await, inspect, delete and purge jobs.

use crate::deps::Deps;
use crate::error::ServiceError;
use chrono::Duration;
use ds_core::{DocumentMetadata, Job, JobId, JobParams, JobStatus, JobType, SessionId};
use ds_storage::{JobFilter, Repository};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Polling granularity for `await_job` and `await_session`.
pub(crate) const AWAIT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Detail view of a job as returned by the job service.
#[derive(Debug, Clone)]
pub struct JobDetails {
    pub status: JobStatus,
    pub job_type: Arc<JobType>,
    pub log: Vec<String>,
    pub metadata_src: Option<DocumentMetadata>,
    pub metadata_result: Option<DocumentMetadata>,
    pub session_id: Option<SessionId>,
}

impl From<Job> for JobDetails {
    fn from(job: Job) -> Self {
        Self {
            status: job.status,
            job_type: job.job_type,
            log: job.log,
            metadata_src: job.metadata_src,
            metadata_result: job.metadata_result,
            session_id: job.session_id,
        }
    }
}

/// Job counts reported by `get_job_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Jobs ever created, across the repository's lifetime
    pub total: u64,
    pub created: usize,
    pub queued: usize,
    pub running: usize,
    pub success: usize,
    pub error: usize,
}

impl JobStats {
    /// Jobs currently present in the repository.
    pub fn current(&self) -> usize {
        self.created + self.queued + self.running + self.success + self.error
    }
}

/// Creates and schedules a job to transform the given source document.
/// Can optionally be added to a session by providing a session id.
/// Returns the job id and identified type.
pub async fn create_job(
    deps: &Deps,
    source: Vec<u8>,
    source_name: &str,
    params: JobParams,
    sid: Option<&SessionId>,
) -> Result<(JobId, Arc<JobType>), ServiceError> {
    let mimetype = deps.file_identifier.identify(&source);
    let job_type = deps
        .job_types
        .iter()
        .find(|jt| jt.accepts(&mimetype))
        .cloned()
        .ok_or(ServiceError::UnsupportedType)?;
    debug!(
        name = source_name,
        type_id = %job_type.id,
        session = ?sid.map(|s| s.as_str()),
        "creating job"
    );
    let jid = deps
        .repo
        .add_job(source, source_name, Arc::clone(&job_type), params, sid)
        .await?;
    let job = deps
        .repo
        .find_job(&jid)
        .await?
        .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    deps.queue.enqueue(&job).await?;
    Ok((jid, job_type))
}

/// Blocks until the job has been processed and returns its final details.
/// Idempotent on jobs that are already terminal.
pub async fn await_job(deps: &Deps, jid: &JobId) -> Result<JobDetails, ServiceError> {
    let mut job = deps
        .repo
        .find_job(jid)
        .await?
        .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    while !job.status.is_terminal() {
        tokio::time::sleep(AWAIT_POLL_INTERVAL).await;
        job = deps
            .repo
            .find_job(jid)
            .await?
            .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    }
    Ok(job.into())
}

/// Returns details for the job identified by jid.
pub async fn get_job(deps: &Deps, jid: &JobId) -> Result<JobDetails, ServiceError> {
    let job = deps
        .repo
        .find_job(jid)
        .await?
        .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    Ok(job.into())
}

/// Retrieves the source document and its name.
pub async fn get_job_src(deps: &Deps, jid: &JobId) -> Result<(Vec<u8>, String), ServiceError> {
    let job = deps
        .repo
        .find_job(jid)
        .await?
        .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    Ok((job.src, job.name))
}

/// Retrieves the result and document name for a successfully completed job.
pub async fn get_job_result(deps: &Deps, jid: &JobId) -> Result<(Vec<u8>, String), ServiceError> {
    let job = deps
        .repo
        .find_job(jid)
        .await?
        .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    if job.status != JobStatus::Success {
        return Err(ServiceError::InvalidState(format!(
            "job {jid} didn't complete (yet), current status is {}",
            job.status
        )));
    }
    Ok((job.result, job.name))
}

/// Returns all jobs with a specific status as tuples (jid, type id, log).
pub async fn get_jobs(
    deps: &Deps,
    status: JobStatus,
) -> Result<Vec<(JobId, String, Vec<String>)>, ServiceError> {
    let summaries = deps
        .repo
        .find_jobs(JobFilter::with_status([status]))
        .await?;
    let mut jobs = Vec::with_capacity(summaries.len());
    for summary in summaries {
        // Jobs may vanish between listing and fetch; skip those.
        if let Some(job) = deps.repo.find_job(&summary.id).await? {
            jobs.push((job.id, job.job_type.id.clone(), job.log));
        }
    }
    Ok(jobs)
}

/// Counts currently registered jobs by status, plus the all-time total.
pub async fn get_job_stats(deps: &Deps) -> Result<JobStats, ServiceError> {
    let mut stats = JobStats {
        total: deps.repo.get_total_job_count().await?,
        ..JobStats::default()
    };
    for summary in deps.repo.find_jobs(JobFilter::default()).await? {
        match summary.status {
            JobStatus::Created => stats.created += 1,
            JobStatus::Queued => stats.queued += 1,
            JobStatus::Running => stats.running += 1,
            JobStatus::Success => stats.success += 1,
            JobStatus::Error => stats.error += 1,
        }
    }
    Ok(stats)
}

/// Deletes a single job if it is in a finished state (SUCCESS or ERROR).
pub async fn delete_job(deps: &Deps, jid: &JobId) -> Result<(), ServiceError> {
    let job = deps
        .repo
        .find_job(jid)
        .await?
        .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    if !job.status.is_terminal() {
        return Err(ServiceError::InvalidState(format!(
            "job {jid} is not in a finished state (SUCCESS or ERROR)"
        )));
    }
    debug!(jid = %jid, status = %job.status, "deleting job");
    deps.repo.delete_job(jid).await?;
    Ok(())
}

/// Deletes all finished standalone jobs that haven't been updated within
/// the given timeframe. Returns the identifiers of all deleted jobs.
pub async fn purge_jobs(
    deps: &Deps,
    purge_after: Duration,
) -> Result<HashSet<JobId>, ServiceError> {
    let filter = JobFilter {
        status: Some(vec![JobStatus::Success, JobStatus::Error]),
        not_updated_for: Some(purge_after),
        ..JobFilter::default()
    };
    let mut purged = HashSet::new();
    for summary in deps.repo.find_jobs(filter).await? {
        if summary.session_id.is_none() {
            deps.repo.delete_job(&summary.id).await?;
            purged.insert(summary.id);
        }
    }
    if !purged.is_empty() {
        debug!(count = purged.len(), "purged standalone jobs");
    }
    Ok(purged)
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
