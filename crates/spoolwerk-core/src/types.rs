// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Spoolwerk LPR client.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolwerkError};

/// Print format of the data file, as declared in the control file.
///
/// RFC 1179 defines more formats (troff, DVI, raster, ...). Only the two in
/// everyday use are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// `f` — plain text, the spooler may filter and paginate it.
    Formatted,
    /// `l` — print the file literally, control characters included.
    #[default]
    Binary,
}

impl FileType {
    /// Single-character code used in the control file.
    pub fn code(&self) -> char {
        match self {
            Self::Formatted => 'f',
            Self::Binary => 'l',
        }
    }
}

impl TryFrom<char> for FileType {
    type Error = SpoolwerkError;

    fn try_from(code: char) -> Result<Self> {
        match code {
            'f' => Ok(Self::Formatted),
            'l' => Ok(Self::Binary),
            other => Err(SpoolwerkError::InvalidJob(format!(
                "unsupported file type code '{other}' (expected 'f' or 'l')"
            ))),
        }
    }
}

impl FromStr for FileType {
    type Err = SpoolwerkError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Self::try_from(code),
            _ => Err(SpoolwerkError::InvalidJob(format!(
                "file type must be a single character, got '{s}'"
            ))),
        }
    }
}

/// A print job to submit to a remote LPD spooler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    /// Host name or address of the spooler.
    pub server: String,
    /// Remote queue name.
    pub printer: String,
    /// Local file to print.
    pub path: PathBuf,
    pub file_type: FileType,
    /// Banner page class (`C` line).
    pub class: Option<String>,
    /// Banner page job name (`J` line).
    pub job_name: Option<String>,
    /// Send the data file before the control file.
    pub send_data_file_first: bool,
}

impl PrintJob {
    pub fn new(
        server: impl Into<String>,
        printer: impl Into<String>,
        path: impl Into<PathBuf>,
        file_type: FileType,
    ) -> Self {
        Self {
            server: server.into(),
            printer: printer.into(),
            path: path.into(),
            file_type,
            class: None,
            job_name: None,
            send_data_file_first: false,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_job_name(mut self, job_name: impl Into<String>) -> Self {
        self.job_name = Some(job_name.into());
        self
    }

    pub fn send_data_file_first(mut self, first: bool) -> Self {
        self.send_data_file_first = first;
        self
    }

    /// Reject descriptions that would produce a malformed exchange.
    ///
    /// Runs before any connection is opened.
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.server, &self.printer)?;
        for (label, value) in [("class", &self.class), ("job name", &self.job_name)] {
            if value.as_deref().is_some_and(|v| v.contains(['\n', '\r'])) {
                return Err(SpoolwerkError::InvalidJob(format!(
                    "{label} must not contain line breaks"
                )));
            }
        }
        if self.path.to_string_lossy().contains(['\n', '\r']) {
            return Err(SpoolwerkError::InvalidJob(
                "file path must not contain line breaks".into(),
            ));
        }
        Ok(())
    }
}

/// A request for the state of a remote print queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueQuery {
    pub server: String,
    pub printer: String,
    /// Long listing format instead of the short one.
    pub verbose: bool,
}

impl QueueQuery {
    pub fn new(server: impl Into<String>, printer: impl Into<String>, verbose: bool) -> Self {
        Self {
            server: server.into(),
            printer: printer.into(),
            verbose,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.server, &self.printer)
    }
}

fn validate_endpoint(server: &str, printer: &str) -> Result<()> {
    if server.trim().is_empty() {
        return Err(SpoolwerkError::InvalidJob("server must not be empty".into()));
    }
    if printer.is_empty() {
        return Err(SpoolwerkError::InvalidJob("printer must not be empty".into()));
    }
    if printer.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SpoolwerkError::InvalidJob(format!(
            "printer name '{}' contains whitespace or control characters",
            printer.escape_debug()
        )));
    }
    Ok(())
}

/// Per-submission job tag: a 3-digit sequence number plus the sanitized host.
///
/// Names the control file (`cfA{id}`) and the data file (`dfA{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobIdentifier {
    number: u16,
    host: String,
}

impl JobIdentifier {
    /// `number` must already be in `1..=999`; `host` must already be sanitized.
    pub fn new(number: u16, host: impl Into<String>) -> Self {
        debug_assert!((1..=999).contains(&number));
        Self {
            number,
            host: host.into(),
        }
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Display for JobIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}{}", self.number, self.host)
    }
}

/// Outcome of a fully acknowledged submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub job_identifier: JobIdentifier,
    /// Size of the control file as announced to the peer.
    pub control_file_bytes: usize,
    /// Size of the data file as announced to the peer.
    pub data_file_bytes: u64,
}
