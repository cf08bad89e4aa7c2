// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job identifier allocation.
//
// RFC 1179 file names carry a 3-digit job number.  A process-wide counter
// cycles through 1..=999 and is combined with the sanitized host name.

use std::sync::atomic::{AtomicU16, Ordering};

use spoolwerk_core::JobIdentifier;

use crate::identity::sanitize;

const MAX_JOB_NUMBER: u16 = 999;

/// Process-wide allocator shared by every submission.
static GLOBAL: JobIdAllocator = JobIdAllocator::new();

/// Cycling job-number counter.
///
/// Each call performs one atomic read-modify-write, so concurrent callers
/// never observe the same intermediate value.
#[derive(Debug)]
pub struct JobIdAllocator {
    counter: AtomicU16,
}

impl Default for JobIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl JobIdAllocator {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU16::new(0),
        }
    }

    /// Advance the counter and return the new value, always in `1..=999`.
    pub fn next_number(&self) -> u16 {
        let previous = self
            .counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some(n % MAX_JOB_NUMBER + 1))
            .unwrap_or_else(|n| n);
        previous % MAX_JOB_NUMBER + 1
    }

    /// Allocate an identifier for `host_name` (sanitized here).
    pub fn allocate(&self, host_name: &str) -> JobIdentifier {
        JobIdentifier::new(self.next_number(), sanitize(host_name))
    }
}

/// Allocate from the process-wide counter.
pub fn allocate(host_name: &str) -> JobIdentifier {
    GLOBAL.allocate(host_name)
}
