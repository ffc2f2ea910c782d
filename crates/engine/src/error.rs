// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the service layer.

use ds_core::{JobId, SessionId};
use ds_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by job and session services.
///
/// `JobNotFound`, `SessionNotFound`, `UnsupportedType` and `InvalidState`
/// are validation failures callers map to 404/422-style responses;
/// `Storage` is operational and maps to 5xx-style responses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("a job with id {0} does not exist")]
    JobNotFound(JobId),
    #[error("invalid session id {0}")]
    SessionNotFound(SessionId),
    #[error("unsupported document type")]
    UnsupportedType,
    #[error("{0}")]
    InvalidState(String),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        // Repository-level "absent id" failures are validation errors from
        // the caller's point of view; everything else is operational.
        match err {
            StorageError::JobNotFound(jid) => ServiceError::JobNotFound(jid),
            StorageError::SessionNotFound(sid) => ServiceError::SessionNotFound(sid),
            other => ServiceError::Storage(other),
        }
    }
}
