// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One document in, one cleaned document out.

use crate::prelude::{env, env_with, SAMPLE_PDF};
use ds_adapters::{FakeSandbox, FileIdentifier, SniffFileIdentifier};
use ds_core::{JobParams, JobStatus};
use ds_engine::jobs::{await_job, create_job, get_job, get_job_result};
use ds_engine::ServiceError;

#[tokio::test]
async fn happy_pdf_path() {
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

    // Freshly created jobs are visible before completion
    let details = get_job(&env.deps, &jid).await.unwrap();
    assert!(matches!(
        details.status,
        JobStatus::Created | JobStatus::Queued | JobStatus::Running | JobStatus::Success
    ));

    let details = await_job(&env.deps, &jid).await.unwrap();
    assert_eq!(details.status, JobStatus::Success);

    // The author is reported for the source and gone from the result
    let metadata_src = details.metadata_src.unwrap();
    assert_eq!(
        metadata_src.primary["PDF:Author"].value.as_str(),
        Some("John Doe")
    );
    let metadata_result = details.metadata_result.unwrap();
    assert!(!metadata_result.primary.contains_key("PDF:Author"));

    // The cleaned bytes still classify as a PDF
    let (result, name) = get_job_result(&env.deps, &jid).await.unwrap();
    assert_eq!(name, "sample.pdf");
    assert_eq!(SniffFileIdentifier.identify(&result), "application/pdf");
}

#[tokio::test]
async fn unsupported_upload_is_rejected() {
    let env = env();
    let err = create_job(
        &env.deps,
        b"INVALID".to_vec(),
        "invalid.bin",
        JobParams::default(),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::UnsupportedType));
    assert!(err.to_string().contains("unsupported document type"));
}

#[tokio::test]
async fn failing_sandbox_yields_error_with_log() {
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
    assert!(!details.log.is_empty());
    assert!(get_job_result(&env.deps, &jid).await.is_err());
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
    assert_eq!(first.status, JobStatus::Success);
    assert_eq!(second.status, JobStatus::Success);
    assert_eq!(first.log, second.log);
}
