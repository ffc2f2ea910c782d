// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory repository without further persistence.

use crate::repository::{select_summaries, JobFilter, JobUpdate, Repository, StorageError};
use async_trait::async_trait;
use chrono::Duration;
use ds_core::{
    Clock, IdGen, Job, JobId, JobParams, JobStatus, JobSummary, JobType, Session, SessionId,
    TokenIdGen,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    sessions: HashMap<SessionId, Session>,
}

/// Repository keeping all jobs and sessions in process memory.
/// The backend of choice for tests and single-shot tooling.
pub struct MemoryRepository<G: IdGen = TokenIdGen> {
    clock: Arc<dyn Clock>,
    ids: G,
    inner: Mutex<Inner>,
    total_jobs: AtomicU64,
}

impl MemoryRepository<TokenIdGen> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ids(clock, TokenIdGen)
    }
}

impl<G: IdGen> MemoryRepository<G> {
    /// Repository with a custom id generator (deterministic ids in tests).
    pub fn with_ids(clock: Arc<dyn Clock>, ids: G) -> Self {
        Self {
            clock,
            ids,
            inner: Mutex::new(Inner::default()),
            total_jobs: AtomicU64::new(0),
        }
    }

    fn summarize(job: &Job) -> JobSummary {
        JobSummary {
            id: job.id.clone(),
            name: job.name.clone(),
            type_id: job.job_type.id.clone(),
            status: job.status,
            session_id: job.session_id.clone(),
            created: job.created,
            updated: job.updated,
        }
    }

    /// Session `updated` tracks member-job activity; called on every job
    /// mutation that names a session.
    fn bump_session(inner: &mut Inner, sid: &SessionId, now: chrono::DateTime<chrono::Utc>) {
        if let Some(session) = inner.sessions.get_mut(sid) {
            session.updated = now;
        }
    }
}

#[async_trait]
impl<G: IdGen> Repository for MemoryRepository<G> {
    async fn add_job(
        &self,
        src: Vec<u8>,
        name: &str,
        job_type: Arc<JobType>,
        params: JobParams,
        sid: Option<&SessionId>,
    ) -> Result<JobId, StorageError> {
        let now = self.clock.now();
        let jid = JobId::new(self.ids.next());
        let mut inner = self.inner.lock();
        if let Some(sid) = sid {
            if !inner.sessions.contains_key(sid) {
                return Err(StorageError::SessionNotFound(sid.clone()));
            }
        }
        inner.jobs.insert(
            jid.clone(),
            Job {
                id: jid.clone(),
                src,
                name: name.to_string(),
                job_type,
                params,
                session_id: sid.cloned(),
                status: JobStatus::Created,
                created: now,
                updated: now,
                log: Vec::new(),
                result: Vec::new(),
                metadata_src: None,
                metadata_result: None,
            },
        );
        if let Some(sid) = sid {
            Self::bump_session(&mut inner, sid, now);
        }
        self.total_jobs.fetch_add(1, Ordering::SeqCst);
        Ok(jid)
    }

    async fn find_job(&self, jid: &JobId) -> Result<Option<Job>, StorageError> {
        Ok(self.inner.lock().jobs.get(jid).cloned())
    }

    async fn find_jobs(&self, filter: JobFilter) -> Result<Vec<JobSummary>, StorageError> {
        let inner = self.inner.lock();
        if let Some(sid) = &filter.session_id {
            if !inner.sessions.contains_key(sid) {
                return Err(StorageError::SessionNotFound(sid.clone()));
            }
        }
        let summaries = inner.jobs.values().map(Self::summarize).collect();
        Ok(select_summaries(summaries, &filter, self.clock.now()))
    }

    async fn update_job(&self, jid: &JobId, update: JobUpdate) -> Result<(), StorageError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let job = inner
            .jobs
            .get_mut(jid)
            .ok_or_else(|| StorageError::JobNotFound(jid.clone()))?;
        if let Some(status) = update.status {
            if !job.status.can_advance_to(status) {
                return Err(StorageError::InvalidTransition {
                    jid: jid.clone(),
                    from: job.status,
                    to: status,
                });
            }
            job.status = status;
        }
        if let Some(result) = update.result {
            job.result = result;
        }
        if let Some(metadata_src) = update.metadata_src {
            job.metadata_src = Some(metadata_src);
        }
        if let Some(metadata_result) = update.metadata_result {
            job.metadata_result = Some(metadata_result);
        }
        job.updated = now;
        let sid = job.session_id.clone();
        if let Some(sid) = sid {
            Self::bump_session(&mut inner, &sid, now);
        }
        Ok(())
    }

    async fn add_to_job_log(&self, jid: &JobId, entry: &str) -> Result<(), StorageError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let job = inner
            .jobs
            .get_mut(jid)
            .ok_or_else(|| StorageError::JobNotFound(jid.clone()))?;
        job.log.push(entry.to_string());
        job.updated = now;
        let sid = job.session_id.clone();
        if let Some(sid) = sid {
            Self::bump_session(&mut inner, &sid, now);
        }
        Ok(())
    }

    async fn delete_job(&self, jid: &JobId) -> Result<(), StorageError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let job = inner
            .jobs
            .remove(jid)
            .ok_or_else(|| StorageError::JobNotFound(jid.clone()))?;
        if let Some(sid) = &job.session_id {
            Self::bump_session(&mut inner, sid, now);
        }
        Ok(())
    }

    async fn get_total_job_count(&self) -> Result<u64, StorageError> {
        Ok(self.total_jobs.load(Ordering::SeqCst))
    }

    async fn add_session(&self) -> Result<SessionId, StorageError> {
        let now = self.clock.now();
        let sid = SessionId::new(self.ids.next());
        self.inner.lock().sessions.insert(
            sid.clone(),
            Session {
                id: sid.clone(),
                created: now,
                updated: now,
            },
        );
        Ok(sid)
    }

    async fn find_session(&self, sid: &SessionId) -> Result<Option<Session>, StorageError> {
        Ok(self.inner.lock().sessions.get(sid).cloned())
    }

    async fn find_sessions(
        &self,
        not_updated_for: Option<Duration>,
    ) -> Result<Vec<Session>, StorageError> {
        let cutoff = not_updated_for.map(|d| self.clock.now() - d);
        let inner = self.inner.lock();
        let mut sessions: Vec<Session> = inner
            .sessions
            .values()
            .filter(|s| cutoff.map_or(true, |c| s.updated <= c))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }

    async fn delete_session(&self, sid: &SessionId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        if inner.sessions.remove(sid).is_none() {
            return Err(StorageError::SessionNotFound(sid.clone()));
        }
        inner.jobs.retain(|_, job| job.session_id.as_ref() != Some(sid));
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
