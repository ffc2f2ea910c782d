// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox running one transformation in a disposable podman container.
//!
//! The container image is expected to idle after startup (e.g. via
//! `sleep infinity`) and to expose two executables:
//!
//! ```text
//! /opt/analyze <input> <output-meta> <params>   emits metadata JSON
//! /opt/process <input> <output> <params>        emits the transformed document
//! ```
//!
//! One `process` call drives: create (`--network none --rm`) → start → copy
//! source and params into `/tmp` → analyze source → process → analyze result
//! → copy outputs back → stop. The stop (10 s graceful window) runs on every
//! exit path once the container exists; any step failure short-circuits into
//! a `success=false` result carrying the log collected so far.

use crate::subprocess::{run_with_timeout, CONTAINER_EXEC_TIMEOUT, CONTAINER_SETUP_TIMEOUT};
use async_trait::async_trait;
use ds_core::{JobParams, RawMetadata, Sandbox, SandboxResult};
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

/// Graceful shutdown window granted to the container before it is killed.
const STOP_GRACE_SECS: u32 = 10;

#[derive(Debug, Error)]
enum ProtocolError {
    #[error("sandbox io: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize job params: {0}")]
    Params(#[from] serde_json::Error),
    #[error("{0}")]
    Subprocess(String),
    #[error("{description} exited with {code:?}")]
    CommandFailed {
        description: String,
        code: Option<i32>,
    },
    #[error("container id missing from create output")]
    NoContainerId,
    #[error("malformed metadata report {name}: {reason}")]
    BadMetadata { name: String, reason: String },
}

/// Launches a podman-controlled container with a predefined image and runs
/// the analyze/process/analyze protocol against it.
pub struct ContainerizedSandbox {
    image: String,
    podman_uri: String,
}

impl ContainerizedSandbox {
    pub fn new(image: impl Into<String>, podman_uri: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            podman_uri: podman_uri.into(),
        }
    }

    fn podman(&self) -> Command {
        let mut cmd = Command::new("podman");
        cmd.arg("--url").arg(&self.podman_uri);
        cmd
    }

    async fn podman_step(
        &self,
        args: &[&str],
        timeout: Duration,
        description: &str,
    ) -> Result<Output, ProtocolError> {
        let mut cmd = self.podman();
        cmd.args(args);
        let output = run_with_timeout(cmd, timeout, description)
            .await
            .map_err(ProtocolError::Subprocess)?;
        if !output.status.success() {
            return Err(ProtocolError::CommandFailed {
                description: description.to_string(),
                code: output.status.code(),
            });
        }
        Ok(output)
    }

    async fn create(&self) -> Result<String, ProtocolError> {
        let output = self
            .podman_step(
                &["create", "--network", "none", "--rm", &self.image],
                CONTAINER_SETUP_TIMEOUT,
                "container create",
            )
            .await?;
        let cid = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if cid.is_empty() {
            return Err(ProtocolError::NoContainerId);
        }
        Ok(cid)
    }

    /// Runs one in-container executable, collecting its stdout/stderr into
    /// the job log before checking the exit status.
    async fn exec(
        &self,
        cid: &str,
        argv: &[&str],
        log: &mut Vec<String>,
        description: &str,
    ) -> Result<(), ProtocolError> {
        let mut cmd = self.podman();
        cmd.arg("exec").arg(cid).args(argv);
        let output = run_with_timeout(cmd, CONTAINER_EXEC_TIMEOUT, description)
            .await
            .map_err(ProtocolError::Subprocess)?;
        for stream in [&output.stdout, &output.stderr] {
            for line in String::from_utf8_lossy(stream).lines() {
                if !line.trim().is_empty() {
                    log.push(line.to_string());
                }
            }
        }
        if !output.status.success() {
            return Err(ProtocolError::CommandFailed {
                description: description.to_string(),
                code: output.status.code(),
            });
        }
        Ok(())
    }

    async fn copy_in(&self, cid: &str, host: &Path, guest: &str) -> Result<(), ProtocolError> {
        let host = host.to_string_lossy();
        self.podman_step(
            &["cp", host.as_ref(), &format!("{cid}:{guest}")],
            CONTAINER_SETUP_TIMEOUT,
            "copy into container",
        )
        .await
        .map(|_| ())
    }

    async fn copy_out(&self, cid: &str, guest: &str, host: &Path) -> Result<(), ProtocolError> {
        let host = host.to_string_lossy();
        self.podman_step(
            &["cp", &format!("{cid}:{guest}"), host.as_ref()],
            CONTAINER_SETUP_TIMEOUT,
            "copy out of container",
        )
        .await
        .map(|_| ())
    }

    async fn read_metadata(&self, path: &Path, name: &str) -> Result<RawMetadata, ProtocolError> {
        let raw = fs::read(path).await?;
        serde_json::from_slice(&raw).map_err(|e| ProtocolError::BadMetadata {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Everything between create and stop.
    async fn drive(
        &self,
        cid: &str,
        workdir: &Path,
        params: &JobParams,
        source: &[u8],
        log: &mut Vec<String>,
    ) -> Result<(Vec<u8>, RawMetadata, RawMetadata), ProtocolError> {
        fs::write(workdir.join("source"), source).await?;
        fs::write(workdir.join("params"), serde_json::to_vec(params)?).await?;

        self.podman_step(&["start", cid], CONTAINER_SETUP_TIMEOUT, "container start")
            .await?;
        self.copy_in(cid, &workdir.join("source"), "/tmp/source")
            .await?;
        self.copy_in(cid, &workdir.join("params"), "/tmp/params")
            .await?;

        self.exec(
            cid,
            &["/opt/analyze", "/tmp/source", "/tmp/meta_src", "/tmp/params"],
            log,
            "source analysis",
        )
        .await?;
        self.exec(
            cid,
            &["/opt/process", "/tmp/source", "/tmp/result", "/tmp/params"],
            log,
            "document processing",
        )
        .await?;
        self.exec(
            cid,
            &["/opt/analyze", "/tmp/result", "/tmp/meta_result", "/tmp/params"],
            log,
            "result analysis",
        )
        .await?;

        self.copy_out(cid, "/tmp/result", &workdir.join("result"))
            .await?;
        self.copy_out(cid, "/tmp/meta_src", &workdir.join("meta_src"))
            .await?;
        self.copy_out(cid, "/tmp/meta_result", &workdir.join("meta_result"))
            .await?;

        let result = fs::read(workdir.join("result")).await?;
        let metadata_src = self.read_metadata(&workdir.join("meta_src"), "meta_src").await?;
        let metadata_result = self
            .read_metadata(&workdir.join("meta_result"), "meta_result")
            .await?;
        Ok((result, metadata_src, metadata_result))
    }

    /// Best-effort stop; with `--rm` this also removes the container.
    async fn stop(&self, cid: &str) {
        let grace = STOP_GRACE_SECS.to_string();
        let result = self
            .podman_step(
                &["stop", "--time", &grace, cid],
                CONTAINER_SETUP_TIMEOUT,
                "container stop",
            )
            .await;
        if let Err(err) = result {
            warn!(cid = %cid, %err, "failed to stop sandbox container");
        }
    }
}

#[async_trait]
impl Sandbox for ContainerizedSandbox {
    async fn process(&self, source: &[u8], params: &JobParams) -> SandboxResult {
        let mut log = Vec::new();
        let workdir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                log.push(format!("sandbox io: {err}"));
                return SandboxResult {
                    log,
                    ..SandboxResult::default()
                };
            }
        };
        let cid = match self.create().await {
            Ok(cid) => cid,
            Err(err) => {
                log.push(err.to_string());
                return SandboxResult {
                    log,
                    ..SandboxResult::default()
                };
            }
        };
        debug!(cid = %cid, image = %self.image, "sandbox container created");

        let outcome = self
            .drive(&cid, workdir.path(), params, source, &mut log)
            .await;
        // Release the container on every path, including failures above.
        self.stop(&cid).await;

        match outcome {
            Ok((result, metadata_src, metadata_result)) => SandboxResult {
                success: true,
                log,
                result,
                metadata_src,
                metadata_result,
            },
            Err(err) => {
                log.push(err.to_string());
                SandboxResult {
                    log,
                    ..SandboxResult::default()
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "containerized_tests.rs"]
mod tests;
