// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line.
//
// Every technical error is mapped to plain English with a clear suggestion.

use std::io::ErrorKind;

use crate::error::{FrameStep, SpoolwerkError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip, unreachable host — running the command again may work.
    Transient,
    /// User must change something (file, queue name, config).
    ActionRequired,
    /// The spooler refused the job; repeating it unchanged will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    /// Whether running the same command again could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `SpoolwerkError` into a `HumanError`.
pub fn humanize_error(err: &SpoolwerkError) -> HumanError {
    match err {
        SpoolwerkError::Connection { addr, source } => humanize_connection_error(addr, source),

        SpoolwerkError::Protocol { step, observed } => humanize_protocol_error(*step, *observed),

        SpoolwerkError::Io(io_err) => match io_err.kind() {
            ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            ErrorKind::PermissionDenied => HumanError {
                message: "You don't have permission to read that file.".into(),
                suggestion: "Check the file permissions, or copy the file somewhere readable first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            ErrorKind::TimedOut => HumanError {
                message: "The print server stopped responding.".into(),
                suggestion: "The server may be overloaded. Try again in a moment.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
            ErrorKind::ConnectionReset | ErrorKind::BrokenPipe | ErrorKind::ConnectionAborted => {
                HumanError {
                    message: "The connection to the print server was interrupted.".into(),
                    suggestion: "Check the network and send the job again.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
            _ => HumanError {
                message: "There was a problem reading the file or talking to the server.".into(),
                suggestion: format!("Try again. If this keeps happening, check the file and the network. ({io_err})"),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        SpoolwerkError::InvalidJob(detail) => HumanError {
            message: "The print request isn't valid.".into(),
            suggestion: format!("Fix the request and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpoolwerkError::Config(detail) => HumanError {
            message: "The configuration file has a problem.".into(),
            suggestion: format!("Fix or remove the config file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpoolwerkError::Serialization(e) => HumanError {
            message: "The configuration file couldn't be read.".into(),
            suggestion: format!("Make sure it is valid JSON. ({e})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_connection_error(addr: &str, source: &std::io::Error) -> HumanError {
    match source.kind() {
        ErrorKind::ConnectionRefused => HumanError {
            message: format!("{addr} refused the connection."),
            suggestion: "Make sure the print server is running and accepts LPD connections on this port.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        ErrorKind::TimedOut => HumanError {
            message: format!("{addr} didn't answer in time."),
            suggestion: "The server might be turned off or unreachable. Check it's on and connected, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        _ => HumanError {
            message: format!("Couldn't reach {addr}."),
            suggestion: format!("Check the server name and your network connection. ({source})"),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

fn humanize_protocol_error(step: FrameStep, observed: Option<u8>) -> HumanError {
    match (step, observed) {
        (_, None) => HumanError {
            message: format!("The print server hung up during {step}."),
            suggestion: "The server may have restarted. Send the job again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        (FrameStep::ReceiveJob, Some(_)) => HumanError {
            message: "The print server won't accept jobs for that queue.".into(),
            suggestion: "Check the printer (queue) name, and that the queue is enabled and you're allowed to print to it.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        (_, Some(byte)) => HumanError {
            message: format!("The print server rejected the job during {step}."),
            suggestion: format!("The server may be out of spool space or refuse this file. (Response code {byte})"),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
