// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin registry.
//!
//! Constructors are statically registered here and keyed by the
//! `[plugins.<name>]` section name; configuration decides which ones are
//! instantiated and in which order. MIME lookup over the resulting list is
//! first-match-wins, so registration order matters.

pub mod pdf;
pub mod watermark;

use crate::config::{Config, ConfigError, PluginConfig};
use ds_adapters::ContainerizedSandbox;
use ds_core::{JobType, Sandbox};
use std::sync::Arc;
use tracing::info;

/// Builds the process-wide job type registry from configuration.
pub fn build_job_types(config: &Config) -> Result<Vec<Arc<JobType>>, ConfigError> {
    let mut job_types = Vec::new();
    for (name, plugin) in &config.plugins {
        let job_type = match name.as_str() {
            "pdf" => pdf::job_type(config, plugin)?,
            "watermark" => watermark::job_type(config, plugin)?,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown plugin section plugins.{other}"
                )))
            }
        };
        info!(plugin = %name, image = %plugin.containerized.image, "initialized plugin");
        job_types.push(job_type);
    }
    info!(
        types = %job_types
            .iter()
            .map(|jt| jt.id.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        "registered job types"
    );
    Ok(job_types)
}

fn containerized_sandbox(
    config: &Config,
    plugin: &PluginConfig,
) -> Result<Arc<dyn Sandbox>, ConfigError> {
    let podman_uri = config.podman_uri.as_deref().ok_or_else(|| {
        ConfigError::Invalid("podman_uri is required for containerized plugins".to_string())
    })?;
    Ok(Arc::new(ContainerizedSandbox::new(
        plugin.containerized.image.clone(),
        podman_uri,
    )))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
