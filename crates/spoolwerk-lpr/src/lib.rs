// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk LPR — RFC 1179 protocol engine.  Submits print jobs to a remote
// line printer daemon and streams back its queue listings.  The async API
// lives in `client`; `blocking` wraps it for synchronous callers.

pub mod blocking;
pub mod client;
pub mod control_file;
pub mod identity;
pub mod job_id;
pub mod print_job;
pub mod queue_query;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use blocking::BlockingLprClient;
pub use client::{LprClient, NetworkLprClient};
pub use identity::HostIdentity;
pub use queue_query::QueueListing;
pub use transport::Connection;
