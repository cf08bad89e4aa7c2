// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue state queries (RFC 1179 §5.3, §5.4).
//
// One command line out, then the peer's listing comes back as plain text
// until it closes the connection.  There is no acknowledgment byte.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use spoolwerk_core::error::Result;
use spoolwerk_core::{ClientConfig, QueueQuery};

use crate::transport::{self, Connection};

/// Short listing command code.
const SEND_QUEUE_SHORT: char = '\x03';
/// Long listing command code.
const SEND_QUEUE_LONG: char = '\x04';

/// Connect to `query.server` and request the queue listing.
#[instrument(skip_all, fields(server = %query.server, printer = %query.printer, verbose = query.verbose))]
pub async fn query_printer(query: &QueueQuery, config: &ClientConfig) -> Result<QueueListing<TcpStream>> {
    query.validate()?;
    let conn = transport::connect(
        &query.server,
        config.port,
        config.connect_timeout(),
        config.io_timeout(),
    )
    .await?;
    start_query(conn, query).await
}

/// Send the query command on an established connection.
pub async fn start_query<S>(mut conn: Connection<S>, query: &QueueQuery) -> Result<QueueListing<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let code = if query.verbose { SEND_QUEUE_LONG } else { SEND_QUEUE_SHORT };
    // Trailing space: an empty operand list, i.e. all jobs.
    let command = format!("{code}{} \n", query.printer);
    let sent = match conn.write_text(&command).await {
        Ok(()) => conn.flush().await,
        Err(e) => Err(e),
    };
    if let Err(e) = sent {
        if let Err(close_err) = conn.close().await {
            debug!(error = %close_err, "close after failed query command also failed");
        }
        return Err(e);
    }
    debug!(peer = %conn.peer(), "queue query sent");
    Ok(QueueListing {
        conn,
        lines_read: 0,
        finished: false,
    })
}

/// Lazily read queue listing, one line at a time.
///
/// Forward-only and bound to its connection: the connection is closed when
/// the listing ends or fails, and released when the listing is dropped.
#[derive(Debug)]
pub struct QueueListing<S> {
    conn: Connection<S>,
    lines_read: usize,
    finished: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> QueueListing<S> {
    /// Next line of the listing, or `None` once the peer has closed.
    ///
    /// After an error the listing is finished and yields `None`.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }
        match self.conn.read_line().await {
            Ok(Some(line)) => {
                self.lines_read += 1;
                Ok(Some(line))
            }
            Ok(None) => {
                self.end().await;
                info!(lines = self.lines_read, "queue listing complete");
                Ok(None)
            }
            Err(e) => {
                self.end().await;
                Err(e)
            }
        }
    }

    /// Read the remaining lines into memory.
    pub async fn collect_lines(mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await? {
            lines.push(line);
        }
        Ok(lines)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    async fn end(&mut self) {
        self.finished = true;
        if let Err(e) = self.conn.close().await {
            debug!(error = %e, "ignoring close failure at end of listing");
        }
    }
}
