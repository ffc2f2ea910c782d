// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session grouping for batches of jobs.
//!
//! A session encompasses a batch of jobs created and monitored together.
//! Jobs associated with a session are retained longer by the purge sweep and
//! are deleted together with their session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a session.
    pub struct SessionId;
}

/// A batch of jobs. Membership is recorded on the job side
/// (`job.session_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub created: DateTime<Utc>,
    /// Tracks any member-job activity, not just session-level mutations
    pub updated: DateTime<Utc>,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
