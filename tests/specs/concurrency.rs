// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher never runs more sandboxes than its cap.

use crate::prelude::{env_with, wait_for_stats, SAMPLE_PDF};
use ds_adapters::FakeSandbox;
use ds_core::{JobParams, JobStatus};
use ds_engine::jobs::{await_job, create_job};
use ds_storage::Repository;

#[tokio::test]
async fn concurrency_cap_holds_under_backlog() {
    let env = env_with(FakeSandbox::new(), 3);
    env.sandbox.halt();

    let mut jids = Vec::new();
    for i in 0..5 {
        let (jid, _) = create_job(
            &env.deps,
            SAMPLE_PDF.to_vec(),
            &format!("doc-{i}.pdf"),
            JobParams::default(),
            None,
        )
        .await
        .unwrap();
        jids.push(jid);
    }

    // Exactly three jobs make it into a sandbox, two wait their turn.
    let stats = wait_for_stats(&env.deps, |s| s.running == 3 && s.queued == 2).await;
    assert_eq!(stats.running, 3);
    assert_eq!(stats.queued, 2);

    env.sandbox.resume();
    for jid in &jids {
        let details = await_job(&env.deps, jid).await.unwrap();
        assert_eq!(details.status, JobStatus::Success);
    }
    let stats = wait_for_stats(&env.deps, |s| s.success == 5).await;
    assert_eq!(stats.running, 0);
    assert_eq!(stats.queued, 0);
}

#[tokio::test]
async fn shutdown_finishes_in_flight_work() {
    let env = env_with(FakeSandbox::new(), 2);
    let mut jids = Vec::new();
    for i in 0..2 {
        let (jid, _) = create_job(
            &env.deps,
            SAMPLE_PDF.to_vec(),
            &format!("doc-{i}.pdf"),
            JobParams::default(),
            None,
        )
        .await
        .unwrap();
        jids.push(jid);
    }

    env.deps.queue.shutdown().await;
    for jid in &jids {
        let job = env.deps.repo.find_job(jid).await.unwrap().unwrap();
        // Never left mid-flight: either processed or still visibly queued.
        assert!(matches!(
            job.status,
            JobStatus::Success | JobStatus::Queued
        ));
        assert!(job.status != JobStatus::Running);
    }
}
