// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    pdf = { b"%PDF-1.7 rest".as_slice(), "application/pdf" },
    png = { &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00], "image/png" },
    jpeg = { &[0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg" },
    gif = { b"GIF89a...".as_slice(), "image/gif" },
    zip = { b"PK\x03\x04rest".as_slice(), "application/zip" },
    gzip = { &[0x1F, 0x8B, 0x08], "application/gzip" },
    text = { b"INVALID".as_slice(), "text/plain" },
    binary = { &[0x00, 0x01, 0x02, 0x03], "application/octet-stream" },
)]
fn sniffs_known_signatures(source: &[u8], expected: &str) {
    assert_eq!(SniffFileIdentifier.identify(source), expected);
}

#[test]
fn empty_input_is_x_empty() {
    assert_eq!(SniffFileIdentifier.identify(b""), "application/x-empty");
}

#[test]
fn truncated_magic_does_not_match() {
    // Shorter than the PDF signature
    assert_eq!(SniffFileIdentifier.identify(b"%PD"), "text/plain");
}
