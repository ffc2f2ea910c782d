// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sessions::create_session;
use crate::test_helpers::{env, env_with, wait_for_stats, SAMPLE_PDF};
use ds_adapters::{FakeSandbox, FileIdentifier, SniffFileIdentifier};

#[tokio::test]
async fn create_rejects_unsupported_documents() {
    let env = env();
    let err = create_job(
        &env.deps,
        b"INVALID".to_vec(),
        "invalid.dat",
        JobParams::default(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::UnsupportedType));
    assert!(err.to_string().contains("unsupported document type"));
}

#[tokio::test]
async fn create_and_await_happy_path() {
    let env = env();
    let (jid, job_type) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();
    assert_eq!(job_type.id, "pdf");

    let details = await_job(&env.deps, &jid).await.unwrap();
    assert_eq!(details.status, JobStatus::Success);
    assert!(!details.log.is_empty());
    let metadata_src = details.metadata_src.unwrap();
    assert_eq!(
        metadata_src.primary["PDF:Author"].value.as_str(),
        Some("John Doe")
    );
    assert!(!details
        .metadata_result
        .unwrap()
        .primary
        .contains_key("PDF:Author"));

    // The cleaned document still classifies as a PDF
    let (result, name) = get_job_result(&env.deps, &jid).await.unwrap();
    assert_eq!(name, "sample.pdf");
    assert_eq!(SniffFileIdentifier.identify(&result), "application/pdf");
}

#[tokio::test]
async fn await_is_idempotent_on_terminal_jobs() {
    let env = env();
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();

    let first = await_job(&env.deps, &jid).await.unwrap();
    let second = await_job(&env.deps, &jid).await.unwrap();
    assert_eq!(first.status, second.status);
    assert_eq!(first.log, second.log);
}

#[tokio::test]
async fn await_missing_job_fails() {
    let env = env();
    let err = await_job(&env.deps, &JobId::new("missing")).await.unwrap_err();
    assert!(matches!(err, ServiceError::JobNotFound(_)));
}

#[tokio::test]
async fn get_job_includes_session_reference() {
    let env = env();
    let sid = create_session(&env.deps).await.unwrap();
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        Some(&sid),
    )
    .await
    .unwrap();

    let details = get_job(&env.deps, &jid).await.unwrap();
    assert_eq!(details.session_id, Some(sid));
}

#[tokio::test]
async fn get_job_src_returns_the_upload() {
    let env = env();
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();

    let (src, name) = get_job_src(&env.deps, &jid).await.unwrap();
    assert_eq!(src, SAMPLE_PDF);
    assert_eq!(name, "sample.pdf");
}

#[tokio::test]
async fn get_job_result_requires_success() {
    let env = env();
    env.sandbox.halt();
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();

    let err = get_job_result(&env.deps, &jid).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    assert!(err.to_string().contains("didn't complete"));

    env.sandbox.resume();
    await_job(&env.deps, &jid).await.unwrap();
    assert!(get_job_result(&env.deps, &jid).await.is_ok());
}

#[tokio::test]
async fn failed_jobs_have_no_result() {
    let env = env_with(FakeSandbox::failing(), 4);
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();

    let details = await_job(&env.deps, &jid).await.unwrap();
    assert_eq!(details.status, JobStatus::Error);
    let err = get_job_result(&env.deps, &jid).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn get_jobs_lists_by_status_with_logs() {
    let env = env();
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
        await_job(&env.deps, &jid).await.unwrap();
    }

    let succeeded = get_jobs(&env.deps, JobStatus::Success).await.unwrap();
    assert_eq!(succeeded.len(), 2);
    for (_, type_id, log) in &succeeded {
        assert_eq!(type_id, "pdf");
        assert!(!log.is_empty());
    }
    assert!(get_jobs(&env.deps, JobStatus::Error).await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_track_totals_and_current_statuses() {
    let env = env();
    let stats = get_job_stats(&env.deps).await.unwrap();
    assert_eq!(stats, JobStats::default());

    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();
    await_job(&env.deps, &jid).await.unwrap();
    delete_job(&env.deps, &jid).await.unwrap();

    let stats = get_job_stats(&env.deps).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.current(), 0);
}

#[tokio::test]
async fn delete_refuses_unfinished_jobs() {
    let env = env();
    env.sandbox.halt();
    let (jid, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "sample.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();
    wait_for_stats(&env.deps, |s| s.running == 1).await;

    let err = delete_job(&env.deps, &jid).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    env.sandbox.resume();
    await_job(&env.deps, &jid).await.unwrap();
    delete_job(&env.deps, &jid).await.unwrap();
    assert!(matches!(
        get_job(&env.deps, &jid).await.unwrap_err(),
        ServiceError::JobNotFound(_)
    ));
}

#[tokio::test]
async fn purge_skips_sessions_fresh_and_unfinished_jobs() {
    let env = env();

    // Finished standalone job: eligible once stale.
    let (standalone, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "standalone.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();
    await_job(&env.deps, &standalone).await.unwrap();

    // Finished session job: never purged by the job sweep.
    let sid = create_session(&env.deps).await.unwrap();
    let (member, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "member.pdf",
        JobParams::default(),
        Some(&sid),
    )
    .await
    .unwrap();
    await_job(&env.deps, &member).await.unwrap();

    // Unfinished standalone job: stays CREATED and stale, must survive.
    let parked = env
        .deps
        .repo
        .add_job(
            SAMPLE_PDF.to_vec(),
            "parked.pdf",
            env.deps.job_types[0].clone(),
            JobParams::default(),
            None,
        )
        .await
        .unwrap();

    env.clock.advance(60);

    // Fresh finished job: not stale yet.
    let (fresh, _) = create_job(
        &env.deps,
        SAMPLE_PDF.to_vec(),
        "fresh.pdf",
        JobParams::default(),
        None,
    )
    .await
    .unwrap();
    await_job(&env.deps, &fresh).await.unwrap();

    let purged = purge_jobs(&env.deps, chrono::Duration::seconds(30))
        .await
        .unwrap();
    assert_eq!(purged, [standalone.clone()].into_iter().collect());
    assert!(get_job(&env.deps, &member).await.is_ok());
    assert!(get_job(&env.deps, &fresh).await.is_ok());
    assert!(get_job(&env.deps, &parked).await.is_ok());
}
