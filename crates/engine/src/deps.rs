// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared service dependencies.

use crate::queue::JobQueue;
use ds_adapters::FileIdentifier;
use ds_core::{Clock, JobType};
use ds_storage::Repository;
use std::sync::Arc;

/// Everything the service layer needs, wired once at bootstrap and passed
/// explicitly into every service call. Tests assemble their own bundle
/// around fakes.
#[derive(Clone)]
pub struct Deps {
    pub clock: Arc<dyn Clock>,
    pub file_identifier: Arc<dyn FileIdentifier>,
    /// Registered job types, in registration order (first MIME match wins)
    pub job_types: Vec<Arc<JobType>>,
    pub queue: Arc<dyn JobQueue>,
    pub repo: Arc<dyn Repository>,
}
