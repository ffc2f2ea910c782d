// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dsctl: docscrub management utility.
//!
//! Receives status updates and runs maintenance against the shared
//! repository. The `tasks` command is intended to be run via a periodic
//! scheduling tool such as cron.

mod bootstrap;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ds_core::{JobId, JobStatus};
use ds_engine::{jobs, sessions, Deps};
use ds_storage::Repository;

#[derive(Parser)]
#[command(name = "dsctl", about = "docscrub management utility", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run maintenance tasks (job/session purging)
    Tasks {
        /// Suppress output about deleted jobs and sessions
        #[arg(short, long)]
        quiet: bool,
        /// Delete standalone jobs after X minutes
        #[arg(short = 'j', long, default_value_t = 10)]
        job_keepalive: u32,
        /// Delete sessions after X minutes
        #[arg(short = 's', long, default_value_t = 60 * 24)]
        session_keepalive: u32,
        /// Do not purge standalone jobs
        #[arg(long)]
        no_standalone_job_purging: bool,
        /// Do not purge sessions
        #[arg(long)]
        no_session_purging: bool,
    },
    /// Show current job statistics
    Status,
    /// List failed jobs with their logs
    DiagErr,
    /// List currently running jobs with their logs
    DiagRun,
    /// Low-level repository maintenance
    Debug {
        /// Force-remove a job row regardless of its status
        #[arg(long, value_name = "JID")]
        delete_jid: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let deps = bootstrap::bootstrap().await?;
    match cli.command {
        Command::Tasks {
            quiet,
            job_keepalive,
            session_keepalive,
            no_standalone_job_purging,
            no_session_purging,
        } => {
            if !no_standalone_job_purging {
                let purged =
                    jobs::purge_jobs(&deps, chrono::Duration::minutes(job_keepalive.into()))
                        .await
                        .context("purging jobs")?;
                if !purged.is_empty() && !quiet {
                    println!("Purged standalone jobs: {}", purged.len());
                }
            }
            if !no_session_purging {
                let purged = sessions::purge_sessions(
                    &deps,
                    chrono::Duration::minutes(session_keepalive.into()),
                )
                .await
                .context("purging sessions")?;
                if !purged.is_empty() && !quiet {
                    println!("Purged sessions: {}", purged.len());
                }
            }
        }
        Command::Status => {
            let stats = jobs::get_job_stats(&deps).await?;
            println!(
                "{} jobs in db (C: {} | Q: {} | R: {} | S: {} | E: {}), {} total",
                stats.current(),
                stats.created,
                stats.queued,
                stats.running,
                stats.success,
                stats.error,
                stats.total
            );
        }
        Command::DiagErr => diagnose(&deps, JobStatus::Error).await?,
        Command::DiagRun => diagnose(&deps, JobStatus::Running).await?,
        Command::Debug { delete_jid } => {
            let jid = JobId::from(delete_jid);
            deps.repo.delete_job(&jid).await?;
            println!("Deleted job {jid}");
        }
    }
    Ok(())
}

async fn diagnose(deps: &Deps, status: JobStatus) -> anyhow::Result<()> {
    let listed = jobs::get_jobs(deps, status).await?;
    if listed.is_empty() {
        println!("No jobs in status {status}");
        return Ok(());
    }
    for (jid, type_id, log) in listed {
        println!("{jid} ({type_id})");
        for line in log {
            println!("  {line}");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
