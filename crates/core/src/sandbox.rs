// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox execution contract.

use crate::job::JobParams;
use crate::metadata::RawMetadata;
use async_trait::async_trait;

/// Outcome of one sandboxed transformation.
///
/// Returned for failures as well: `success` is false, `result` is empty and
/// `log` carries diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SandboxResult {
    pub success: bool,
    /// Collected log lines, in order
    pub log: Vec<String>,
    /// Raw result document, empty on failure
    pub result: Vec<u8>,
    /// Document metadata prior to conversion
    pub metadata_src: RawMetadata,
    /// Document metadata after conversion
    pub metadata_result: RawMetadata,
}

/// An isolated, single-use execution environment that receives a document,
/// attempts to purge its metadata and returns the result.
///
/// `process` never fails at the call level: any protocol or runtime error is
/// reported inside the returned [`SandboxResult`].
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn process(&self, source: &[u8], params: &JobParams) -> SandboxResult;
}
