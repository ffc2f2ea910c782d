// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-based file format identification.

/// Guesses a MIME type for a document from its raw bytes.
pub trait FileIdentifier: Send + Sync {
    fn identify(&self, source: &[u8]) -> String;
}

/// Magic-byte signatures checked in order; first match wins.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], "image/png"),
    (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"II*\x00", "image/tiff"),
    (b"MM\x00*", "image/tiff"),
    (b"PK\x03\x04", "application/zip"),
    (&[0x1F, 0x8B], "application/gzip"),
];

/// Identifies file types by sniffing content signatures.
///
/// Returns `application/x-empty` for zero bytes and
/// `application/octet-stream` for anything unclassifiable.
#[derive(Clone, Copy, Default)]
pub struct SniffFileIdentifier;

impl SniffFileIdentifier {
    fn looks_like_text(source: &[u8]) -> bool {
        source
            .iter()
            .take(512)
            .all(|&b| b == b'\t' || b == b'\n' || b == b'\r' || (0x20..0x7F).contains(&b))
    }
}

impl FileIdentifier for SniffFileIdentifier {
    fn identify(&self, source: &[u8]) -> String {
        if source.is_empty() {
            return "application/x-empty".to_string();
        }
        for (magic, mimetype) in SIGNATURES {
            if source.starts_with(magic) {
                return (*mimetype).to_string();
            }
        }
        if Self::looks_like_text(source) {
            return "text/plain".to_string();
        }
        "application/octet-stream".to_string()
    }
}

#[cfg(test)]
#[path = "file_identifier_tests.rs"]
mod tests;
