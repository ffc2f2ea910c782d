// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded-concurrency job dispatcher.
//!
//! A single coordinator task pulls job ids off a FIFO channel and spawns one
//! processing task per job, never keeping more than `max_concurrent_jobs` in
//! flight. Excess work stays QUEUED in the repository, which makes
//! backpressure observable through status listings. Dispatch order is FIFO;
//! completion order is not guaranteed.

use crate::error::ServiceError;
use crate::process::process_job_in_sandbox;
use async_trait::async_trait;
use ds_core::{Job, JobId, JobStatus};
use ds_storage::{JobUpdate, Repository};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info};

/// Interface for an asynchronous job processor. Enqueued jobs are expected
/// to be performed and their status updated eventually.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Accepts a CREATED job, marks it QUEUED and schedules it for
    /// dispatch. Fails loudly on any other status.
    async fn enqueue(&self, job: &Job) -> Result<(), ServiceError>;

    /// Stops dispatching and waits for all in-flight jobs to run to
    /// completion. Ids still queued are left QUEUED in the repository.
    async fn shutdown(&self);
}

/// In-process queue executing each job in its own task on the ambient
/// tokio runtime.
pub struct AsyncJobQueue {
    repo: Arc<dyn Repository>,
    queue_tx: mpsc::UnboundedSender<JobId>,
    shutdown_tx: watch::Sender<bool>,
    coordinator: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncJobQueue {
    /// Spawns the coordinator task; requires a running tokio runtime.
    pub fn new(repo: Arc<dyn Repository>, max_concurrent_jobs: usize) -> Self {
        let max_concurrent_jobs = max_concurrent_jobs.max(1);
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let coordinator = tokio::spawn(coordinate(
            Arc::clone(&repo),
            queue_rx,
            shutdown_rx,
            max_concurrent_jobs,
        ));
        info!(max_concurrent_jobs, "job queue: in-process, async");
        Self {
            repo,
            queue_tx,
            shutdown_tx,
            coordinator: Mutex::new(Some(coordinator)),
        }
    }
}

#[async_trait]
impl JobQueue for AsyncJobQueue {
    async fn enqueue(&self, job: &Job) -> Result<(), ServiceError> {
        if job.status != JobStatus::Created {
            return Err(ServiceError::InvalidState(format!(
                "can't enqueue job {} due to its status {}",
                job.id, job.status
            )));
        }
        if *self.shutdown_tx.borrow() {
            return Err(ServiceError::InvalidState(
                "job queue is shut down".to_string(),
            ));
        }
        debug!(jid = %job.id, "enqueuing job");
        self.repo
            .update_job(&job.id, JobUpdate::with_status(JobStatus::Queued))
            .await?;
        self.queue_tx.send(job.id.clone()).map_err(|_| {
            ServiceError::InvalidState("job queue is shut down".to_string())
        })?;
        Ok(())
    }

    async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let coordinator = self.coordinator.lock().take();
        if let Some(coordinator) = coordinator {
            if let Err(err) = coordinator.await {
                error!(%err, "queue coordinator failed");
            }
        }
    }
}

async fn coordinate(
    repo: Arc<dyn Repository>,
    mut queue_rx: mpsc::UnboundedReceiver<JobId>,
    mut shutdown_rx: watch::Receiver<bool>,
    max_concurrent_jobs: usize,
) {
    let mut in_flight: JoinSet<()> = JoinSet::new();
    loop {
        // Purge finished tasks before admitting new work.
        while let Some(finished) = in_flight.try_join_next() {
            reap(finished);
        }
        if in_flight.len() >= max_concurrent_jobs {
            // Concurrency cap reached: wait for a job to finish.
            if let Some(finished) = in_flight.join_next().await {
                reap(finished);
            }
            continue;
        }
        tokio::select! {
            // Shutdown wins over pending work: no new dequeues afterwards.
            biased;
            _ = shutdown_rx.changed() => break,
            next = queue_rx.recv() => match next {
                Some(jid) => {
                    debug!(jid = %jid, "dispatching job");
                    let repo = Arc::clone(&repo);
                    in_flight.spawn(async move {
                        if let Err(err) = process_job_in_sandbox(&jid, repo.as_ref()).await {
                            // A broken job never takes the coordinator down.
                            error!(jid = %jid, %err, "job processing failed");
                        }
                    });
                }
                None => break,
            },
        }
    }
    // Graceful shutdown: in-flight jobs run to completion, queued ids stay
    // QUEUED in the repository.
    while let Some(finished) = in_flight.join_next().await {
        reap(finished);
    }
}

fn reap(finished: Result<(), JoinError>) {
    if let Err(err) = finished {
        error!(%err, "job task aborted");
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
