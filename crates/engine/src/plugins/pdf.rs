// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PDF plugin: exiftool-shaped metadata post-processing.

use crate::config::{Config, ConfigError, PluginConfig};
use ds_core::{
    DocumentMetadata, FieldValue, JobType, MetadataError, MetadataField, MetadataTag, RawMetadata,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Field-id prefixes carrying tags worth preserving. Prefix matching
/// covers language suffixes such as the "-en" in "XMP:XMP-dc:Rights-en".
const PDF_TAGS: &[(&str, &[MetadataTag])] = &[
    ("XMP:XMP-pdfuaid:Part", &[MetadataTag::Accessibility]),
    ("XMP:XMP-pdfe:ISO_PDFEVersion", &[MetadataTag::Compliance]),
    ("XMP:XMP-pdfaid:Part", &[MetadataTag::Compliance]),
    ("XMP:XMP-pdfaid:Conformance", &[MetadataTag::Compliance]),
    ("PDF:GTS_PDFXVersion", &[MetadataTag::Compliance]),
    ("PDF:GTS_PDFXConformance", &[MetadataTag::Compliance]),
    ("XMP:XMP-pdfx:GTS_PDFXVersion", &[MetadataTag::Compliance]),
    ("XMP:XMP-pdfx:GTS_PDFXConformance", &[MetadataTag::Compliance]),
    ("XMP:XMP-pdfxid:GTS_PDFXVersion", &[MetadataTag::Compliance]),
    ("XMP:XMP-pdfaExtension", &[MetadataTag::Compliance]),
    ("PDF:GTS_PDFVTVersion", &[MetadataTag::Compliance]),
    ("XMP:XMP-pdfvtid:GTS_PDFVTVersion", &[MetadataTag::Compliance]),
    ("XMP:XMP-dc:Rights", &[MetadataTag::Legal]),
    ("XMP:XMP-xmpRights", &[MetadataTag::Legal]),
];

fn identify_tags(field: &str) -> Vec<MetadataTag> {
    for (prefix, tags) in PDF_TAGS {
        if field.starts_with(prefix) {
            return tags.to_vec();
        }
    }
    Vec::new()
}

/// Exiftool reports binary payloads as an extraction hint; those values
/// carry no metadata worth showing.
fn scrub_binary_warning(value: &serde_json::Value) -> serde_json::Value {
    const REPLACEMENT: &str = "<binary data>";
    match value {
        serde_json::Value::String(s) if s.contains("option to extract") => {
            serde_json::Value::String(REPLACEMENT.to_string())
        }
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = match v {
                        serde_json::Value::String(s) if s.contains("option to extract") => {
                            serde_json::Value::String(REPLACEMENT.to_string())
                        }
                        other => other.clone(),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// PDF exiftool-generated metadata post-processing. Strips out various tags
/// of embedded documents that aren't likely to contain privacy-invasive
/// metadata.
pub fn process_pdf_metadata(raw: &RawMetadata) -> Result<DocumentMetadata, MetadataError> {
    let mut primary = BTreeMap::new();
    for (field, value) in &raw.primary {
        let (mut id, group, mut name) = match field.split_once(':') {
            Some((group, name)) => (field.clone(), group.to_string(), name.to_string()),
            None => (format!("File:{field}"), "File".to_string(), field.clone()),
        };
        if group == "ICC_Profile" || group == "Composite" {
            continue;
        }
        // Aggregate all XMP-pdfaExtension:Schemas* entries into a single
        // field listing the embedded schemas.
        if id == "XMP:XMP-pdfaExtension:SchemasSchema" {
            id = "XMP:XMP-pdfaExtension:Schemas".to_string();
            name = "XMP-pdfaExtension:Schemas".to_string();
        } else if id.starts_with("XMP:XMP-pdfaExtension:Schemas") {
            continue;
        }
        primary.insert(
            id.clone(),
            MetadataField {
                id: id.clone(),
                value: FieldValue::from_raw(value),
                name: Some(name),
                group: Some(group),
                description: None,
                tags: identify_tags(&id),
            },
        );
    }

    let mut embeds: BTreeMap<String, BTreeMap<String, MetadataField>> = BTreeMap::new();
    for embed_meta in raw.embeds.values() {
        let scrubbed: BTreeMap<String, serde_json::Value> = embed_meta
            .iter()
            .map(|(field, value)| (field.clone(), scrub_binary_warning(value)))
            .collect();

        let mut embed_data: BTreeMap<String, MetadataField> = BTreeMap::new();
        // Type identification for presentation
        let embed_type = match (scrubbed.get("File:MIMEType"), scrubbed.get("File:FileType")) {
            (Some(mime), _) => Some(mime),
            (None, Some(file_type)) => {
                let unsupported = file_type
                    .as_str()
                    .map_or(false, |s| s.contains("unsupported"));
                (!unsupported).then_some(file_type)
            }
            (None, None) => None,
        };
        if let Some(embed_type) = embed_type {
            embed_data.insert(
                "_type".to_string(),
                MetadataField {
                    id: "_type".to_string(),
                    value: FieldValue::from_raw(embed_type),
                    name: Some("type".to_string()),
                    group: None,
                    description: None,
                    tags: Vec::new(),
                },
            );
        }

        for (field, value) in &scrubbed {
            let (group, name) = field.split_once(':').ok_or_else(|| {
                MetadataError::Malformed(format!("embedded field {field} has no group prefix"))
            })?;
            if matches!(group, "File" | "PDF" | "APP14" | "ICC_Profile") {
                continue;
            }
            embed_data.insert(
                field.clone(),
                MetadataField {
                    id: field.clone(),
                    value: FieldValue::from_raw(value),
                    name: Some(name.to_string()),
                    group: Some(group.to_string()),
                    description: None,
                    tags: identify_tags(field),
                },
            );
        }

        // Only attach embeds that contain actual metadata
        if embed_data.keys().any(|field| !field.starts_with('_')) {
            let key = embeds.len().to_string();
            embeds.insert(key, embed_data);
        }
    }

    Ok(DocumentMetadata {
        primary,
        embeds,
        signed: raw.signed,
    })
}

pub(crate) fn job_type(config: &Config, plugin: &PluginConfig) -> Result<Arc<JobType>, ConfigError> {
    Ok(Arc::new(JobType {
        id: "pdf".to_string(),
        mimetypes: vec!["application/pdf".to_string()],
        readable_types: vec!["PDF".to_string()],
        sandbox: super::containerized_sandbox(config, plugin)?,
        metadata_processor: Arc::new(process_pdf_metadata),
    }))
}

#[cfg(test)]
#[path = "pdf_tests.rs"]
mod tests;
