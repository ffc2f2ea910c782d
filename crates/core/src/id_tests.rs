// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::JobId;
use std::collections::HashSet;

#[test]
fn token_is_url_safe_and_unpadded() {
    let token = TokenIdGen.next();
    assert_eq!(token.len(), 27);
    assert!(token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}

#[test]
fn token_decodes_to_160_bits() {
    let token = TokenIdGen.next();
    let raw = URL_SAFE_NO_PAD.decode(token).unwrap();
    assert_eq!(raw.len(), 20);
}

#[test]
fn tokens_do_not_repeat() {
    let ids = TokenIdGen;
    let tokens: HashSet<String> = (0..1000).map(|_| ids.next()).collect();
    assert_eq!(tokens.len(), 1000);
}

#[test]
fn sequential_gen_counts_up() {
    let ids = SequentialIdGen::new("job");
    assert_eq!(ids.next(), "job-1");
    assert_eq!(ids.next(), "job-2");
    let clone = ids.clone();
    assert_eq!(clone.next(), "job-3");
}

#[test]
fn job_id_display_and_eq() {
    let id = JobId::new("abc");
    assert_eq!(id.to_string(), "abc");
    assert_eq!(id, "abc");
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn job_id_serde() {
    let id = JobId::new("my-job");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"my-job\"");

    let parsed: JobId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}
