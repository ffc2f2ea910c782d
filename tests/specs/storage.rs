// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Large payloads round-trip through the document store's blob offload.

use crate::prelude::pdf_job_type;
use ds_adapters::FakeSandbox;
use ds_core::{FakeClock, JobParams};
use ds_storage::{FsRepository, JobFilter, Repository};
use std::sync::Arc;

#[tokio::test]
async fn twenty_mebibyte_source_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FakeClock::new());
    let job_type = pdf_job_type(Arc::new(FakeSandbox::new()));
    let repo = FsRepository::open(dir.path(), clock, vec![job_type.clone()])
        .await
        .unwrap();

    let mut payload = b"%PDF-1.7 ".to_vec();
    payload.resize(20 * 1024 * 1024, 0x42);

    let jid = repo
        .add_job(
            payload.clone(),
            "huge.pdf",
            job_type,
            JobParams::default(),
            None,
        )
        .await
        .unwrap();

    let job = repo.find_job(&jid).await.unwrap().unwrap();
    assert_eq!(job.src.len(), payload.len());
    assert_eq!(job.src, payload);

    // Listings stay cheap: summaries carry no payloads at all.
    let summaries = repo.find_jobs(JobFilter::default()).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, jid);
}
