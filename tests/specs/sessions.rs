// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sessions group jobs and die together with them.

use crate::prelude::{env, SAMPLE_PDF};
use ds_core::{JobParams, JobStatus};
use ds_engine::jobs::{create_job, get_job};
use ds_engine::sessions::{await_session, create_session, delete_session, get_session};
use ds_engine::ServiceError;

#[tokio::test]
async fn deleting_a_session_cascades_to_its_jobs_only() {
    let env = env();
    let sid = create_session(&env.deps).await.unwrap();

    let mut members = Vec::new();
    for i in 0..3 {
        let (jid, _) = create_job(
            &env.deps,
            SAMPLE_PDF.to_vec(),
            &format!("member-{i}.pdf"),
            JobParams::default(),
            Some(&sid),
        )
        .await
        .unwrap();
        members.push(jid);
    }
    let (standalone, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "standalone.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();

    await_session(&env.deps, &sid).await.unwrap();
    let details = get_session(&env.deps, &sid).await.unwrap();
    assert_eq!(details.total, 3);
    assert_eq!(details.finished, 3);

    delete_session(&env.deps, &sid).await.unwrap();
    for jid in &members {
        assert!(matches!(
            get_job(&env.deps, jid).await.unwrap_err(),
            ServiceError::JobNotFound(_)
        ));
    }
    let survivor = get_job(&env.deps, &standalone).await.unwrap();
    assert_eq!(survivor.status, JobStatus::Success);
}

#[tokio::test]
async fn unfinished_sessions_refuse_deletion() {
    let env = env();
    env.sandbox.halt();
    let sid = create_session(&env.deps).await.unwrap();
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "member.pdf",
        JobParams::default(),
        Some(&sid),
    )
    .await
    .unwrap();

    let err = delete_session(&env.deps, &sid).await.unwrap_err();
    assert!(err.to_string().contains("has unfinished jobs"));

    env.sandbox.resume();
    await_session(&env.deps, &sid).await.unwrap();
    delete_session(&env.deps, &sid).await.unwrap();
    assert!(get_job(&env.deps, &jid).await.is_err());
}

#[tokio::test]
async fn session_details_track_member_progress() {
    let env = env();
    env.sandbox.halt();
    let sid = create_session(&env.deps).await.unwrap();
    create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "member.pdf",
        JobParams::default(),
        Some(&sid),
    )
    .await
    .unwrap();

    let details = get_session(&env.deps, &sid).await.unwrap();
    assert_eq!(details.total, 1);
    assert_eq!(details.finished, 0);

    env.sandbox.resume();
    await_session(&env.deps, &sid).await.unwrap();
    let details = get_session(&env.deps, &sid).await.unwrap();
    assert_eq!(details.finished, 1);
    assert_eq!(details.jobs[0].type_id, "pdf");
}
