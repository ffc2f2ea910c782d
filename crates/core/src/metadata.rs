// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed document metadata and the raw sandbox wire shape.
//!
//! Sandboxes report metadata as loosely shaped JSON ([`RawMetadata`]); a job
//! type's metadata processor turns that into [`DocumentMetadata`], which is
//! what gets persisted and presented.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A single scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Converts a raw JSON value into a scalar. Non-scalar values (objects,
    /// arrays, null) are rendered as their compact JSON text.
    pub fn from_raw(value: &serde_json::Value) -> Scalar {
        match value {
            serde_json::Value::Bool(b) => Scalar::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Int(i)
                } else {
                    Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Scalar::Str(s.clone()),
            other => Scalar::Str(other.to_string()),
        }
    }
}

/// Value of a metadata field: a scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl FieldValue {
    /// Converts a raw JSON value. Arrays become scalar lists, everything
    /// else a single scalar (see [`Scalar::from_raw`]).
    pub fn from_raw(value: &serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Array(items) => {
                FieldValue::List(items.iter().map(Scalar::from_raw).collect())
            }
            other => FieldValue::Scalar(Scalar::from_raw(other)),
        }
    }

    /// The string content, if this is a single string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Scalar(Scalar::Str(s.to_string()))
    }
}

/// Category tags attached to metadata fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetadataTag {
    /// Aids assistive technology; removing it reduces accessibility
    Accessibility,
    /// Required to conform to a document standard
    Compliance,
    /// Carries licensing or rights statements
    Legal,
    /// Safe to delete
    Deletable,
}

/// A document's unique key-value metadata field with associated data
/// such as an optional description and a set of tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataField {
    /// Unique within its containing map
    pub id: String,
    pub value: FieldValue,
    /// Display name (to assist UI/presentation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// String-based grouping (to assist UI/presentation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<MetadataTag>,
}

impl MetadataField {
    pub fn new(id: impl Into<String>, value: FieldValue) -> Self {
        Self {
            id: id.into(),
            value,
            name: None,
            group: None,
            description: None,
            tags: Vec::new(),
        }
    }
}

/// Aggregation of metadata fields for a single document, covering both
/// primary (of the document itself) and secondary metadata (of embedded
/// documents).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub primary: BTreeMap<String, MetadataField>,
    #[serde(default)]
    pub embeds: BTreeMap<String, BTreeMap<String, MetadataField>>,
    /// Whether the source document carries a digital signature
    #[serde(default)]
    pub signed: bool,
}

/// Untyped metadata as reported by a sandbox's analyze step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub primary: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub embeds: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub signed: bool,
}

/// Raised by metadata processors on input they cannot make sense of.
/// The dispatcher turns this into a job-level ERROR.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("malformed metadata: {0}")]
    Malformed(String),
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
