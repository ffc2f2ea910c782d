// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine tests.

use crate::deps::Deps;
use crate::jobs::JobStats;
use crate::plugins::pdf::process_pdf_metadata;
use crate::queue::AsyncJobQueue;
use ds_adapters::{FakeSandbox, SniffFileIdentifier};
use ds_core::{FakeClock, JobType};
use ds_storage::MemoryRepository;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const SAMPLE_PDF: &[u8] = b"%PDF-1.7 sample document";

pub(crate) struct TestEnv {
    pub deps: Deps,
    pub clock: Arc<FakeClock>,
    pub sandbox: Arc<FakeSandbox>,
}

pub(crate) fn pdf_job_type(sandbox: Arc<FakeSandbox>) -> Arc<JobType> {
    Arc::new(JobType {
        id: "pdf".to_string(),
        mimetypes: vec!["application/pdf".to_string()],
        readable_types: vec!["PDF".to_string()],
        sandbox,
        metadata_processor: Arc::new(process_pdf_metadata),
    })
}

/// Wires a full engine around a fake sandbox and an in-memory repository.
pub(crate) fn env_with(sandbox: FakeSandbox, max_concurrent_jobs: usize) -> TestEnv {
    let clock = Arc::new(FakeClock::new());
    let repo = Arc::new(MemoryRepository::new(clock.clone()));
    let sandbox = Arc::new(sandbox);
    let queue = Arc::new(AsyncJobQueue::new(repo.clone(), max_concurrent_jobs));
    let deps = Deps {
        clock: clock.clone(),
        file_identifier: Arc::new(SniffFileIdentifier),
        job_types: vec![pdf_job_type(sandbox.clone())],
        queue,
        repo,
    };
    TestEnv {
        deps,
        clock,
        sandbox,
    }
}

pub(crate) fn env() -> TestEnv {
    env_with(FakeSandbox::new(), 4)
}

/// Polls job stats until the predicate holds; panics after ~4 seconds.
pub(crate) async fn wait_for_stats(
    deps: &Deps,
    pred: impl Fn(&JobStats) -> bool,
) -> JobStats {
    for _ in 0..400 {
        let stats = crate::jobs::get_job_stats(deps).await.unwrap();
        if pred(&stats) {
            return stats;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for job stats");
}
