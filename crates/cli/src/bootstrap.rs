// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires production adapters into a service dependency bundle.

use anyhow::Context;
use ds_adapters::SniffFileIdentifier;
use ds_core::{Clock, SystemClock};
use ds_engine::{plugins, AsyncJobQueue, Config, Deps, JobQueue};
use ds_storage::{FsRepository, Repository};
use std::sync::Arc;
use tracing::info;

pub async fn bootstrap() -> anyhow::Result<Deps> {
    let config = Config::from_env().context("loading configuration")?;
    if let Some(syslog) = &config.syslog {
        info!(host = %syslog.host, port = syslog.port, "syslog forwarding configured");
    }
    if let Some(contact) = &config.contact {
        info!(contact = %contact, "operator contact");
    }

    let job_types = plugins::build_job_types(&config).context("building job type registry")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repo: Arc<dyn Repository> = Arc::new(
        FsRepository::open(config.data_dir.clone(), clock.clone(), job_types.clone())
            .await
            .with_context(|| format!("opening repository at {}", config.data_dir.display()))?,
    );
    let max_concurrent_jobs = config.max_concurrent_jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    });
    let queue: Arc<dyn JobQueue> = Arc::new(AsyncJobQueue::new(
        Arc::clone(&repo),
        max_concurrent_jobs,
    ));

    Ok(Deps {
        clock,
        file_identifier: Arc::new(SniffFileIdentifier),
        job_types,
        queue,
        repo,
    })
}
