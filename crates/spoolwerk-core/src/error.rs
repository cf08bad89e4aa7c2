// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Spoolwerk.

use std::fmt;

use thiserror::Error;

/// The framing step of an LPR exchange that an acknowledgment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// `\x02{queue}\n` — receive a printer job.
    ReceiveJob,
    /// `\x02{len} cfA{id}\n` — control file sub-command.
    ControlFileHeader,
    /// Control file contents plus the trailing `0x00`.
    ControlFileContents,
    /// `\x03{len} dfA{id}\n` — data file sub-command.
    DataFileHeader,
    /// Data file contents plus the trailing `0x00`.
    DataFileContents,
}

impl fmt::Display for FrameStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReceiveJob => "receive job",
            Self::ControlFileHeader => "control file header",
            Self::ControlFileContents => "control file contents",
            Self::DataFileHeader => "data file header",
            Self::DataFileContents => "data file contents",
        })
    }
}

/// Top-level error type for all Spoolwerk operations.
#[derive(Debug, Error)]
pub enum SpoolwerkError {
    // -- Transport --
    #[error("could not connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // -- Protocol --
    #[error("{}", describe_protocol_failure(.step, .observed))]
    Protocol {
        step: FrameStep,
        /// The acknowledgment byte seen, or `None` if the peer closed the stream.
        observed: Option<u8>,
    },

    // -- Local / socket I/O --
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Input validation --
    #[error("invalid print job: {0}")]
    InvalidJob(String),

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SpoolwerkError {
    /// Whether the failed operation can be re-attempted as-is.
    ///
    /// Only connection failures qualify: nothing was exchanged with the peer.
    /// A protocol failure needs a fresh connection and a fresh job identifier.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// The failing framing step, for protocol errors.
    pub fn frame_step(&self) -> Option<FrameStep> {
        match self {
            Self::Protocol { step, .. } => Some(*step),
            _ => None,
        }
    }
}

fn describe_protocol_failure(step: &FrameStep, observed: &Option<u8>) -> String {
    match observed {
        Some(byte) => format!("unexpected response from server on {step}: {byte}"),
        None => format!("server closed the connection during {step}"),
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpoolwerkError>;
