// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job processing task.

use crate::error::ServiceError;
use ds_core::{JobId, JobStatus};
use ds_storage::{JobUpdate, Repository};
use tracing::warn;

/// Executes one job in its type's sandbox, post-processes the reported
/// metadata and persists the outcome.
///
/// Strict about its starting point: the job must exist and be QUEUED —
/// the QUEUED → RUNNING transition is the uniqueness gate ensuring a
/// single owner per job. Sandbox failures and metadata-processor failures
/// are contained as a terminal ERROR status; repository failures propagate.
pub async fn process_job_in_sandbox(
    jid: &JobId,
    repo: &dyn Repository,
) -> Result<(), ServiceError> {
    let job = repo
        .find_job(jid)
        .await?
        .ok_or_else(|| ServiceError::JobNotFound(jid.clone()))?;
    if job.status != JobStatus::Queued {
        return Err(ServiceError::InvalidState(format!(
            "can't execute job {jid} because it's not QUEUED (status is {})",
            job.status
        )));
    }
    repo.update_job(jid, JobUpdate::with_status(JobStatus::Running))
        .await?;

    let outcome = job.job_type.sandbox.process(&job.src, &job.params).await;
    for line in &outcome.log {
        repo.add_to_job_log(jid, line).await?;
    }

    let processor = &job.job_type.metadata_processor;
    let processed = processor(&outcome.metadata_result)
        .and_then(|metadata_result| Ok((processor(&outcome.metadata_src)?, metadata_result)));
    match processed {
        Ok((metadata_src, metadata_result)) => {
            let status = if outcome.success {
                JobStatus::Success
            } else {
                JobStatus::Error
            };
            repo.update_job(
                jid,
                JobUpdate {
                    status: Some(status),
                    result: Some(outcome.result),
                    metadata_src: Some(metadata_src),
                    metadata_result: Some(metadata_result),
                },
            )
            .await?;
        }
        Err(err) => {
            warn!(jid = %jid, %err, "metadata post-processing failed");
            repo.add_to_job_log(jid, "Error during metadata post-processing")
                .await?;
            repo.update_job(jid, JobUpdate::with_status(JobStatus::Error))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
