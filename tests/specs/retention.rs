// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention sweeps respect session membership and staleness boundaries.

use crate::prelude::{env, SAMPLE_PDF};
use chrono::Duration;
use ds_core::JobParams;
use ds_engine::jobs::{await_job, create_job, get_job, purge_jobs};
use ds_engine::sessions::{create_session, get_session, purge_sessions};

#[tokio::test]
async fn purge_boundaries() {
    let env = env();

    // Finished standalone job A at t0
    let (job_a, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "a.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();
    await_job(&env.deps, &job_a).await.unwrap();

    // Session with finished member B at t0
    let sid = create_session(&env.deps).await.unwrap();
    let (job_b, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "b.pdf",
        JobParams::default(),
        Some(&sid),
    )
    .await
    .unwrap();
    await_job(&env.deps, &job_b).await.unwrap();

    env.clock.advance(60);

    // The job sweep removes A only; B is session-scoped.
    let purged = purge_jobs(&env.deps, Duration::seconds(30)).await.unwrap();
    assert_eq!(purged, [job_a].into_iter().collect());
    assert!(get_job(&env.deps, &job_b).await.is_ok());
    assert!(get_session(&env.deps, &sid).await.is_ok());

    // The session sweep then removes the session together with B.
    let purged = purge_sessions(&env.deps, Duration::seconds(30)).await.unwrap();
    assert_eq!(purged, [sid.clone()].into_iter().collect());
    assert!(get_session(&env.deps, &sid).await.is_err());
    assert!(get_job(&env.deps, &job_b).await.is_err());
}

#[tokio::test]
async fn purge_spares_fresh_jobs() {
    let env = env();
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "fresh.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();
    await_job(&env.deps, &jid).await.unwrap();

    env.clock.advance(10);
    let purged = purge_jobs(&env.deps, Duration::seconds(30)).await.unwrap();
    assert!(purged.is_empty());
    assert!(get_job(&env.deps, &jid).await.is_ok());
}
