// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Monotonic request-id source shared across a client's components.

use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out request ids for outgoing messages.
///
/// Request ids must be non-zero (RFC 8011 §4.1.2) and should be unique per
/// connection so responses can be matched to requests.  This counter is the
/// only shared mutable state in the client; callers printing from multiple
/// threads draw from one sequence behind an `Arc`.
#[derive(Debug)]
pub struct RequestIdSequence {
    next: AtomicU32,
}

impl RequestIdSequence {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// The next id.  Wraps around the u32 range, skipping zero.
    pub fn next(&self) -> u32 {
        loop {
            let id = self.next.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
        }
    }
}

impl Default for RequestIdSequence {
    fn default() -> Self {
        Self::new()
    }
}
