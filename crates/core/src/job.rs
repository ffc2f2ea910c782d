// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job data and status state machine.

use crate::jobtype::JobType;
use crate::metadata::{DocumentMetadata, MetadataField};
use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

crate::define_id! {
    /// Unique identifier for a job.
    ///
    /// An opaque 160-bit token, assigned by the repository at creation and
    /// immutable afterwards.
    pub struct JobId;
}

/// Lifecycle status of a job.
///
/// Transitions only ever advance (CREATED → QUEUED → RUNNING → SUCCESS|ERROR)
/// and never leave a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Persisted, not yet accepted by the queue
    Created,
    /// Waiting to be picked up by a worker
    Queued,
    /// Currently executing in a sandbox
    Running,
    /// Execution was successful, the result is available
    Success,
    /// Execution threw an error, a log is available
    Error,
}

impl JobStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Created,
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Success,
        JobStatus::Error,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Error)
    }

    /// Whether moving to `next` is a legal (forward, terminal-preserving)
    /// transition. Setting the current status again is allowed.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        self.rank() < next.rank()
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Created => 0,
            JobStatus::Queued => 1,
            JobStatus::Running => 2,
            // The two terminal states are reachable from any live state.
            JobStatus::Success | JobStatus::Error => 3,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Created => write!(f, "created"),
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Success => write!(f, "success"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

/// Per-job processing parameters, passed through to the sandbox verbatim.
/// Immutable after job creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobParams {
    /// Metadata field overrides to apply during processing. The exact
    /// semantics of each override are defined by the handling plugin.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataField>,
}

/// A document scrubbing job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Source, the document to clean
    pub src: Vec<u8>,
    /// Display filename, never used for routing
    pub name: String,
    /// Selects the sandbox and metadata processor handling this job
    pub job_type: Arc<JobType>,
    pub params: JobParams,
    pub session_id: Option<SessionId>,
    pub status: JobStatus,
    pub created: DateTime<Utc>,
    /// Refreshed on every mutation; drives retention sweeps
    pub updated: DateTime<Utc>,
    /// Log data for progress monitoring and debugging, append-only
    pub log: Vec<String>,
    /// Resulting cleaned document, empty until SUCCESS
    pub result: Vec<u8>,
    pub metadata_src: Option<DocumentMetadata>,
    pub metadata_result: Option<DocumentMetadata>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Listing view of a job: identity, routing and lifecycle fields only.
/// Payloads, log and metadata are deliberately absent so listings never
/// touch offloaded blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    pub name: String,
    pub type_id: String,
    pub status: JobStatus,
    pub session_id: Option<SessionId>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
