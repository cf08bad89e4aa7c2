// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Control file construction (RFC 1179 §7).
//
// One directive per line, in a fixed order: host and user first, then the
// data file declaration, then the optional banner fields.

use spoolwerk_core::{JobIdentifier, PrintJob};

use crate::identity::HostIdentity;
use crate::transport::encode_ascii;

/// Name of the control file on the spooler (`cfA{id}`).
pub fn control_file_name(id: &JobIdentifier) -> String {
    format!("cfA{id}")
}

/// Name of the data file on the spooler (`dfA{id}`).
pub fn data_file_name(id: &JobIdentifier) -> String {
    format!("dfA{id}")
}

/// Build the control file text for `job`.
///
/// Deterministic: the same inputs always give the same text.
pub fn build_control_file(job: &PrintJob, identity: &HostIdentity, id: &JobIdentifier) -> String {
    let data_file = data_file_name(id);
    let mut lines = vec![
        format!("H{}", identity.machine_name()),
        format!("P{}", identity.user_name()),
        format!("{}{data_file}", job.file_type.code()),
        format!("U{data_file}"),
        format!("N{}", job.path.display()),
    ];
    if let Some(class) = &job.class {
        lines.push(format!("C{class}"));
    }
    if let Some(job_name) = &job.job_name {
        lines.push(format!("J{job_name}"));
    }
    lines.into_iter().map(|line| line + "\n").collect()
}

/// The control file as sent on the wire.
pub fn encode_control_file(job: &PrintJob, identity: &HostIdentity, id: &JobIdentifier) -> Vec<u8> {
    encode_ascii(&build_control_file(job, identity, id))
}
