// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supported document types and their handlers.

use crate::metadata::{DocumentMetadata, MetadataError, RawMetadata};
use crate::sandbox::Sandbox;
use std::fmt;
use std::sync::Arc;

/// Pure function turning raw sandbox metadata into typed document metadata.
/// Must not fail for valid input; the dispatcher treats any error as a job
/// failure.
pub type MetadataProcessor =
    Arc<dyn Fn(&RawMetadata) -> Result<DocumentMetadata, MetadataError> + Send + Sync>;

/// A supported document type: a set of accepted MIME strings bound to a
/// sandbox and a metadata post-processor. Registered at boot, in
/// configuration order; MIME lookup is first-match-wins.
#[derive(Clone)]
pub struct JobType {
    /// Registry key, e.g. "pdf"
    pub id: String,
    /// MIME strings this type accepts
    pub mimetypes: Vec<String>,
    /// Human-readable type names for presentation
    pub readable_types: Vec<String>,
    pub sandbox: Arc<dyn Sandbox>,
    pub metadata_processor: MetadataProcessor,
}

impl JobType {
    pub fn accepts(&self, mimetype: &str) -> bool {
        self.mimetypes.iter().any(|m| m == mimetype)
    }
}

impl fmt::Debug for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobType")
            .field("id", &self.id)
            .field("mimetypes", &self.mimetypes)
            .finish_non_exhaustive()
    }
}

impl PartialEq for JobType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
