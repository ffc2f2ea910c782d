// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed document store.
//!
//! Layout under the root directory:
//!
//! ```text
//! jobs/<jid>.json        one document per job, no payload bytes
//! sessions/<sid>.json    one document per session
//! blobs/<token>          src/result payloads, referenced from job documents
//! stats.json             total-job counter singleton
//! ```
//!
//! Job documents never embed `src` or `result`; payloads live in the blob
//! side-channel keyed by opaque tokens, so document size stays flat and
//! summary listings never read payloads. All document writes go through a
//! temp file + rename.

use crate::repository::{select_summaries, JobFilter, JobUpdate, Repository, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ds_core::{
    Clock, DocumentMetadata, IdGen, Job, JobId, JobParams, JobStatus, JobSummary, JobType, Session,
    SessionId, TokenIdGen,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct JobDoc {
    id: JobId,
    name: String,
    #[serde(rename = "type")]
    type_id: String,
    #[serde(default)]
    params: JobParams,
    session_id: Option<SessionId>,
    status: JobStatus,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    #[serde(default)]
    log: Vec<String>,
    src_blob: String,
    result_blob: Option<String>,
    metadata_src: Option<DocumentMetadata>,
    metadata_result: Option<DocumentMetadata>,
}

impl JobDoc {
    fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            type_id: self.type_id.clone(),
            status: self.status,
            session_id: self.session_id.clone(),
            created: self.created,
            updated: self.updated,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StatsDoc {
    total_count: u64,
}

/// Document-store repository on the local filesystem.
///
/// Holds the registered job types to rehydrate `type` references on read.
pub struct FsRepository<G: IdGen = TokenIdGen> {
    root: PathBuf,
    clock: Arc<dyn Clock>,
    ids: G,
    job_types: Vec<Arc<JobType>>,
    total_jobs: AtomicU64,
    /// Serializes mutations; reads go lock-free.
    write_lock: tokio::sync::Mutex<()>,
}

impl FsRepository<TokenIdGen> {
    pub async fn open(
        root: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
        job_types: Vec<Arc<JobType>>,
    ) -> Result<Self, StorageError> {
        Self::open_with_ids(root, clock, job_types, TokenIdGen).await
    }
}

impl<G: IdGen> FsRepository<G> {
    /// Opens (or initializes) a repository root with a custom id generator.
    pub async fn open_with_ids(
        root: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
        job_types: Vec<Arc<JobType>>,
        ids: G,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        for dir in ["jobs", "sessions", "blobs"] {
            fs::create_dir_all(root.join(dir)).await?;
        }
        let stats_path = root.join("stats.json");
        let stats = match fs::read(&stats_path).await {
            Ok(raw) => serde_json::from_slice::<StatsDoc>(&raw)
                .map_err(|e| StorageError::Corrupt(format!("stats.json: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatsDoc::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(root = %root.display(), total_jobs = stats.total_count, "opened repository");
        Ok(Self {
            root,
            clock,
            ids,
            job_types,
            total_jobs: AtomicU64::new(stats.total_count),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    fn job_path(&self, jid: &JobId) -> PathBuf {
        self.root.join("jobs").join(format!("{jid}.json"))
    }

    fn session_path(&self, sid: &SessionId) -> PathBuf {
        self.root.join("sessions").join(format!("{sid}.json"))
    }

    fn blob_path(&self, token: &str) -> PathBuf {
        self.root.join("blobs").join(token)
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let tmp = path.with_extension(format!("tmp-{}", self.ids.next()));
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn write_doc<T: Serialize>(&self, path: &Path, doc: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_vec(doc)
            .map_err(|e| StorageError::Corrupt(format!("serialize {}: {e}", path.display())))?;
        self.write_atomic(path, &raw).await
    }

    async fn read_job_doc(&self, jid: &JobId) -> Result<Option<JobDoc>, StorageError> {
        match fs::read(self.job_path(jid)).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw).map_err(|e| {
                StorageError::Corrupt(format!("job {jid}: {e}"))
            })?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_session_doc(&self, sid: &SessionId) -> Result<Option<Session>, StorageError> {
        match fs::read(self.session_path(sid)).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw).map_err(|e| {
                StorageError::Corrupt(format!("session {sid}: {e}"))
            })?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_blob(&self, token: &str) -> Result<Vec<u8>, StorageError> {
        Ok(fs::read(self.blob_path(token)).await?)
    }

    async fn write_blob(&self, data: &[u8]) -> Result<String, StorageError> {
        let token = self.ids.next();
        self.write_atomic(&self.blob_path(&token), data).await?;
        Ok(token)
    }

    async fn remove_blob(&self, token: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.blob_path(token)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn all_job_docs(&self) -> Result<Vec<JobDoc>, StorageError> {
        let mut docs = Vec::new();
        let mut entries = fs::read_dir(self.root.join("jobs")).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let raw = fs::read(&path).await?;
            let doc: JobDoc = serde_json::from_slice(&raw)
                .map_err(|e| StorageError::Corrupt(format!("{}: {e}", path.display())))?;
            docs.push(doc);
        }
        Ok(docs)
    }

    fn resolve_type(&self, type_id: &str) -> Result<Arc<JobType>, StorageError> {
        self.job_types
            .iter()
            .find(|jt| jt.id == type_id)
            .cloned()
            .ok_or_else(|| StorageError::Corrupt(format!("unregistered job type {type_id}")))
    }

    async fn hydrate(&self, doc: JobDoc) -> Result<Job, StorageError> {
        let job_type = self.resolve_type(&doc.type_id)?;
        let src = self.read_blob(&doc.src_blob).await?;
        let result = match &doc.result_blob {
            Some(token) => self.read_blob(token).await?,
            None => Vec::new(),
        };
        Ok(Job {
            id: doc.id,
            src,
            name: doc.name,
            job_type,
            params: doc.params,
            session_id: doc.session_id,
            status: doc.status,
            created: doc.created,
            updated: doc.updated,
            log: doc.log,
            result,
            metadata_src: doc.metadata_src,
            metadata_result: doc.metadata_result,
        })
    }

    /// Session `updated` tracks member-job activity; called under the write
    /// lock on every job mutation that names a session.
    async fn bump_session(&self, sid: &SessionId, now: DateTime<Utc>) -> Result<(), StorageError> {
        if let Some(mut session) = self.read_session_doc(sid).await? {
            session.updated = now;
            self.write_doc(&self.session_path(sid), &session).await?;
        }
        Ok(())
    }

    async fn flush_stats(&self) -> Result<(), StorageError> {
        let stats = StatsDoc {
            total_count: self.total_jobs.load(Ordering::SeqCst),
        };
        self.write_doc(&self.root.join("stats.json"), &stats).await
    }

    async fn delete_job_files(&self, doc: &JobDoc) -> Result<(), StorageError> {
        self.remove_blob(&doc.src_blob).await?;
        if let Some(token) = &doc.result_blob {
            self.remove_blob(token).await?;
        }
        fs::remove_file(self.job_path(&doc.id)).await?;
        Ok(())
    }
}

#[async_trait]
impl<G: IdGen> Repository for FsRepository<G> {
    async fn add_job(
        &self,
        src: Vec<u8>,
        name: &str,
        job_type: Arc<JobType>,
        params: JobParams,
        sid: Option<&SessionId>,
    ) -> Result<JobId, StorageError> {
        let _guard = self.write_lock.lock().await;
        if let Some(sid) = sid {
            if self.read_session_doc(sid).await?.is_none() {
                return Err(StorageError::SessionNotFound(sid.clone()));
            }
        }
        let now = self.clock.now();
        let jid = JobId::new(self.ids.next());
        let src_blob = self.write_blob(&src).await?;
        let doc = JobDoc {
            id: jid.clone(),
            name: name.to_string(),
            type_id: job_type.id.clone(),
            params,
            session_id: sid.cloned(),
            status: JobStatus::Created,
            created: now,
            updated: now,
            log: Vec::new(),
            src_blob,
            result_blob: None,
            metadata_src: None,
            metadata_result: None,
        };
        self.write_doc(&self.job_path(&jid), &doc).await?;
        if let Some(sid) = sid {
            self.bump_session(sid, now).await?;
        }
        self.total_jobs.fetch_add(1, Ordering::SeqCst);
        self.flush_stats().await?;
        Ok(jid)
    }

    async fn find_job(&self, jid: &JobId) -> Result<Option<Job>, StorageError> {
        match self.read_job_doc(jid).await? {
            Some(doc) => Ok(Some(self.hydrate(doc).await?)),
            None => Ok(None),
        }
    }

    async fn find_jobs(&self, filter: JobFilter) -> Result<Vec<JobSummary>, StorageError> {
        if let Some(sid) = &filter.session_id {
            if self.read_session_doc(sid).await?.is_none() {
                return Err(StorageError::SessionNotFound(sid.clone()));
            }
        }
        let summaries = self
            .all_job_docs()
            .await?
            .iter()
            .map(JobDoc::summary)
            .collect();
        Ok(select_summaries(summaries, &filter, self.clock.now()))
    }

    async fn update_job(&self, jid: &JobId, update: JobUpdate) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self
            .read_job_doc(jid)
            .await?
            .ok_or_else(|| StorageError::JobNotFound(jid.clone()))?;
        if let Some(status) = update.status {
            if !doc.status.can_advance_to(status) {
                return Err(StorageError::InvalidTransition {
                    jid: jid.clone(),
                    from: doc.status,
                    to: status,
                });
            }
            doc.status = status;
        }
        if let Some(result) = update.result {
            let old = doc.result_blob.take();
            doc.result_blob = Some(self.write_blob(&result).await?);
            if let Some(old) = old {
                self.remove_blob(&old).await?;
            }
        }
        if let Some(metadata_src) = update.metadata_src {
            doc.metadata_src = Some(metadata_src);
        }
        if let Some(metadata_result) = update.metadata_result {
            doc.metadata_result = Some(metadata_result);
        }
        let now = self.clock.now();
        doc.updated = now;
        self.write_doc(&self.job_path(jid), &doc).await?;
        if let Some(sid) = &doc.session_id {
            self.bump_session(sid, now).await?;
        }
        Ok(())
    }

    async fn add_to_job_log(&self, jid: &JobId, entry: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self
            .read_job_doc(jid)
            .await?
            .ok_or_else(|| StorageError::JobNotFound(jid.clone()))?;
        doc.log.push(entry.to_string());
        let now = self.clock.now();
        doc.updated = now;
        self.write_doc(&self.job_path(jid), &doc).await?;
        if let Some(sid) = &doc.session_id {
            self.bump_session(sid, now).await?;
        }
        Ok(())
    }

    async fn delete_job(&self, jid: &JobId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let doc = self
            .read_job_doc(jid)
            .await?
            .ok_or_else(|| StorageError::JobNotFound(jid.clone()))?;
        self.delete_job_files(&doc).await?;
        if let Some(sid) = &doc.session_id {
            self.bump_session(sid, self.clock.now()).await?;
        }
        Ok(())
    }

    async fn get_total_job_count(&self) -> Result<u64, StorageError> {
        Ok(self.total_jobs.load(Ordering::SeqCst))
    }

    async fn add_session(&self) -> Result<SessionId, StorageError> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();
        let sid = SessionId::new(self.ids.next());
        let session = Session {
            id: sid.clone(),
            created: now,
            updated: now,
        };
        self.write_doc(&self.session_path(&sid), &session).await?;
        Ok(sid)
    }

    async fn find_session(&self, sid: &SessionId) -> Result<Option<Session>, StorageError> {
        self.read_session_doc(sid).await
    }

    async fn find_sessions(
        &self,
        not_updated_for: Option<Duration>,
    ) -> Result<Vec<Session>, StorageError> {
        let cutoff = not_updated_for.map(|d| self.clock.now() - d);
        let mut sessions = Vec::new();
        let mut entries = fs::read_dir(self.root.join("sessions")).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let raw = fs::read(&path).await?;
            let session: Session = serde_json::from_slice(&raw)
                .map_err(|e| StorageError::Corrupt(format!("{}: {e}", path.display())))?;
            if cutoff.map_or(true, |c| session.updated <= c) {
                sessions.push(session);
            }
        }
        sessions.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }

    async fn delete_session(&self, sid: &SessionId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        if self.read_session_doc(sid).await?.is_none() {
            return Err(StorageError::SessionNotFound(sid.clone()));
        }
        for doc in self.all_job_docs().await? {
            if doc.session_id.as_ref() == Some(sid) {
                self.delete_job_files(&doc).await?;
            }
        }
        fs::remove_file(self.session_path(sid)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
