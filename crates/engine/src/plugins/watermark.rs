// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watermark plugin: stamps PDFs inside the sandbox; metadata reporting is
//! not its concern, so the processor yields an empty mapping.

use crate::config::{Config, ConfigError, PluginConfig};
use ds_core::{DocumentMetadata, JobType, MetadataError, RawMetadata};
use std::sync::Arc;

pub fn process_watermark_metadata(
    _raw: &RawMetadata,
) -> Result<DocumentMetadata, MetadataError> {
    Ok(DocumentMetadata::default())
}

pub(crate) fn job_type(config: &Config, plugin: &PluginConfig) -> Result<Arc<JobType>, ConfigError> {
    Ok(Arc::new(JobType {
        id: "watermark".to_string(),
        mimetypes: vec!["application/pdf".to_string()],
        readable_types: vec!["PDF".to_string()],
        sandbox: super::containerized_sandbox(config, plugin)?,
        metadata_processor: Arc::new(process_watermark_metadata),
    }))
}
