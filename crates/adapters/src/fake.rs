// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapters for tests: a gatable sandbox and a canned identifier.

use crate::file_identifier::FileIdentifier;
use async_trait::async_trait;
use ds_core::{JobParams, RawMetadata, Sandbox, SandboxResult};
use serde_json::json;
use tokio::sync::watch;

fn canned_result() -> SandboxResult {
    let metadata_src: RawMetadata = serde_json::from_value(json!({
        "primary": {
            "PDF:Author": "John Doe",
            "PDF:Producer": "pdflatex",
            "XMP:XMP-dc:Title": "sample"
        },
        "embeds": {
            "Doc1": {"XMP:Author": "Alice"}
        },
        "signed": false
    }))
    .unwrap_or_default();
    let metadata_result: RawMetadata = serde_json::from_value(json!({
        "primary": {"PDF:Producer": "docscrub"},
        "embeds": {},
        "signed": false
    }))
    .unwrap_or_default();
    SandboxResult {
        success: true,
        log: vec!["Executing job in fake sandbox".to_string()],
        result: b"%PDF-1.7".to_vec(),
        metadata_src,
        metadata_result,
    }
}

/// Sandbox double that serves a canned result, optionally simulating
/// failures, and can be halted to keep jobs parked in RUNNING.
pub struct FakeSandbox {
    running: watch::Sender<bool>,
    simulate_errors: bool,
    template: SandboxResult,
}

impl FakeSandbox {
    /// Sandbox that completes every job successfully.
    pub fn new() -> Self {
        Self::with_result(canned_result())
    }

    /// Sandbox serving the given result on every call.
    pub fn with_result(template: SandboxResult) -> Self {
        let (running, _) = watch::channel(true);
        Self {
            running,
            simulate_errors: false,
            template,
        }
    }

    /// Sandbox that fails every job.
    pub fn failing() -> Self {
        let mut fake = Self::new();
        fake.simulate_errors = true;
        fake
    }

    /// Stops job processing; calls to `process` park until `resume`.
    pub fn halt(&self) {
        self.running.send_replace(false);
    }

    /// Resumes job processing.
    pub fn resume(&self) {
        self.running.send_replace(true);
    }
}

impl Default for FakeSandbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sandbox for FakeSandbox {
    async fn process(&self, _source: &[u8], _params: &JobParams) -> SandboxResult {
        let mut gate = self.running.subscribe();
        // Sender lives in self, so this cannot fail while we are running.
        let _ = gate.wait_for(|running| *running).await;
        if self.simulate_errors {
            return SandboxResult {
                success: false,
                log: vec!["Simulated sandbox failure".to_string()],
                ..SandboxResult::default()
            };
        }
        self.template.clone()
    }
}

/// Identifier answering with a fixed MIME string.
pub struct FakeFileIdentifier {
    mimetype: String,
}

impl FakeFileIdentifier {
    pub fn new(mimetype: impl Into<String>) -> Self {
        Self {
            mimetype: mimetype.into(),
        }
    }
}

impl FileIdentifier for FakeFileIdentifier {
    fn identify(&self, _source: &[u8]) -> String {
        self.mimetype.clone()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
