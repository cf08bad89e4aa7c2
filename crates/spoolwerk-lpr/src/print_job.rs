// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job submission (RFC 1179 §5.2, §6).
//
// The exchange is strictly sequential:
// 1. "Receive a printer job" command (0x02)
// 2. Control file and data file sub-commands, in the order the job asks for
// 3. A single 0x00 acknowledgment byte after every command and every file
//
// Anything other than 0x00, or the peer hanging up, aborts the job.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, instrument, warn};

use spoolwerk_core::error::{FrameStep, Result, SpoolwerkError};
use spoolwerk_core::{ClientConfig, JobIdentifier, PrintJob, SubmissionReport};

use crate::control_file::{control_file_name, data_file_name, encode_control_file};
use crate::identity::HostIdentity;
use crate::job_id;
use crate::transport::{self, Connection};

/// Lifecycle of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Connected,
    ReceiveJobSent,
    ControlSent,
    DataSent,
    /// Every frame acknowledged.
    Acked,
    Errored,
    Closed,
}

/// Connect to `job.server` and submit the job.
///
/// Returns once the peer has acknowledged the last frame, or on the first
/// failure.  The connection is closed on every path.
#[instrument(skip_all, fields(server = %job.server, printer = %job.printer))]
pub async fn print_file(job: &PrintJob, config: &ClientConfig) -> Result<SubmissionReport> {
    job.validate()?;
    let mut conn = transport::connect(
        &job.server,
        config.port,
        config.connect_timeout(),
        config.io_timeout(),
    )
    .await?;

    let identity = HostIdentity::lookup();
    let id = job_id::allocate(identity.machine_name());
    submit(&mut conn, job, &identity, id).await
}

/// Run the whole submission over an established connection, then close it.
pub async fn submit<S>(
    conn: &mut Connection<S>,
    job: &PrintJob,
    identity: &HostIdentity,
    id: JobIdentifier,
) -> Result<SubmissionReport>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut submission = Submission::new(conn, job, identity, id);
    let outcome = submission.run().await;
    submission.finish(outcome).await
}

/// One in-flight submission.
#[derive(Debug)]
pub struct Submission<'a, S> {
    conn: &'a mut Connection<S>,
    job: &'a PrintJob,
    identity: &'a HostIdentity,
    id: JobIdentifier,
    state: SubmissionState,
}

impl<'a, S> Submission<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        conn: &'a mut Connection<S>,
        job: &'a PrintJob,
        identity: &'a HostIdentity,
        id: JobIdentifier,
    ) -> Self {
        Self {
            conn,
            job,
            identity,
            id,
            state: SubmissionState::Connected,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn job_identifier(&self) -> &JobIdentifier {
        &self.id
    }

    /// Drive every frame.  Stops at the first failure without closing.
    pub async fn run(&mut self) -> Result<SubmissionReport> {
        self.receive_job().await?;

        let (control_file_bytes, data_file_bytes) = if self.job.send_data_file_first {
            let data = self.send_data_file().await?;
            let control = self.send_control_file().await?;
            (control, data)
        } else {
            let control = self.send_control_file().await?;
            let data = self.send_data_file().await?;
            (control, data)
        };

        self.transition(SubmissionState::Acked);
        Ok(SubmissionReport {
            job_identifier: self.id.clone(),
            control_file_bytes,
            data_file_bytes,
        })
    }

    /// Close the connection and hand back the outcome of `run`.
    ///
    /// A failed close is ignored only when every frame was already
    /// acknowledged; the job is on the spooler by then.
    pub async fn finish(mut self, outcome: Result<SubmissionReport>) -> Result<SubmissionReport> {
        match outcome {
            Ok(report) => {
                if let Err(e) = self.conn.close().await {
                    debug!(error = %e, "ignoring close failure after acknowledged job");
                }
                self.transition(SubmissionState::Closed);
                info!(job = %self.id, peer = %self.conn.peer(), "LPR job sent successfully");
                Ok(report)
            }
            Err(e) => {
                self.transition(SubmissionState::Errored);
                warn!(job = %self.id, error = %e, "LPR job aborted");
                if let Err(close_err) = self.conn.close().await {
                    debug!(error = %close_err, "close after failed job also failed");
                }
                self.transition(SubmissionState::Closed);
                Err(e)
            }
        }
    }

    async fn receive_job(&mut self) -> Result<()> {
        self.conn
            .write_text(&format!("\x02{}\n", self.job.printer))
            .await?;
        self.expect_ack(FrameStep::ReceiveJob).await?;
        self.transition(SubmissionState::ReceiveJobSent);
        Ok(())
    }

    async fn send_control_file(&mut self) -> Result<usize> {
        let control_file = encode_control_file(self.job, self.identity, &self.id);
        let header = format!("\x02{} {}\n", control_file.len(), control_file_name(&self.id));
        self.conn.write_text(&header).await?;
        self.expect_ack(FrameStep::ControlFileHeader).await?;

        self.conn.write_bytes(&control_file).await?;
        self.conn.write_byte(0).await?;
        self.expect_ack(FrameStep::ControlFileContents).await?;

        self.transition(SubmissionState::ControlSent);
        Ok(control_file.len())
    }

    async fn send_data_file(&mut self) -> Result<u64> {
        // Open before announcing anything, so a missing file aborts cleanly.
        let file = tokio::fs::File::open(&self.job.path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", self.job.path.display()),
            )
            .into());
        }
        let len = metadata.len();

        let header = format!("\x03{len} {}\n", data_file_name(&self.id));
        self.conn.write_text(&header).await?;
        self.expect_ack(FrameStep::DataFileHeader).await?;

        self.conn.copy_from(file, len).await?;
        self.conn.write_byte(0).await?;
        self.expect_ack(FrameStep::DataFileContents).await?;

        self.transition(SubmissionState::DataSent);
        Ok(len)
    }

    async fn expect_ack(&mut self, step: FrameStep) -> Result<()> {
        self.conn.flush().await?;
        debug!(%step, "frame sent, awaiting acknowledgment");
        match self.conn.read_byte().await? {
            Some(0) => {
                debug!(%step, "acknowledged");
                Ok(())
            }
            observed => {
                warn!(%step, ?observed, "unexpected acknowledgment");
                Err(SpoolwerkError::Protocol { step, observed })
            }
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        debug!(job = %self.id, from = ?self.state, to = ?next, "submission state");
        self.state = next;
    }
}
