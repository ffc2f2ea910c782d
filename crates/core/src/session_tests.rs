// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn session_round_trips_through_json() {
    let session = Session {
        id: SessionId::new("s-1"),
        created: DateTime::<Utc>::UNIX_EPOCH,
        updated: DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(5),
    };
    let json = serde_json::to_string(&session).unwrap();
    let parsed: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, session);
    assert!(parsed.updated >= parsed.created);
}
