// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Byte-stream transport for LPD exchanges.
//
// One `Connection` serves exactly one exchange (a job submission or a queue
// query) and is never reused.  It is generic over the underlying stream so
// the protocol code runs unchanged over TCP and over in-memory pipes.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use spoolwerk_core::error::{Result, SpoolwerkError};

/// Chunk size used when streaming a data file to the peer.
const COPY_CHUNK: usize = 8192;

/// Open a TCP connection to `server:port`.
///
/// Resolution failures, refusals and the connect timeout all surface as
/// `SpoolwerkError::Connection`.  No bytes have been exchanged in that case.
pub async fn connect(
    server: &str,
    port: u16,
    connect_timeout: Duration,
    io_timeout: Option<Duration>,
) -> Result<Connection<TcpStream>> {
    let addr = format!("{server}:{port}");
    info!(addr = %addr, "connecting to LPD");

    let stream = tokio::time::timeout(connect_timeout, TcpStream::connect((server, port)))
        .await
        .map_err(|_| SpoolwerkError::Connection {
            addr: addr.clone(),
            source: io::Error::new(
                io::ErrorKind::TimedOut,
                format!("timed out after {}s", connect_timeout.as_secs()),
            ),
        })?
        .map_err(|source| SpoolwerkError::Connection {
            addr: addr.clone(),
            source,
        })?;

    Ok(Connection::new(stream, addr, io_timeout))
}

/// An open duplex byte stream to one LPD peer.
#[derive(Debug)]
pub struct Connection<S> {
    stream: BufReader<S>,
    peer: String,
    io_timeout: Option<Duration>,
    closed: bool,
    // Last line ended in `\r`; a `\n` right after it belongs to that line.
    skip_lf: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wrap an already-established stream.
    pub fn new(stream: S, peer: impl Into<String>, io_timeout: Option<Duration>) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer: peer.into(),
            io_timeout,
            closed: false,
            skip_lf: false,
        }
    }

    /// Address (or label) of the peer, for logging.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write `text` as single-byte characters.  Non-ASCII characters are sent as `?`.
    pub async fn write_text(&mut self, text: &str) -> Result<()> {
        self.write_bytes(&encode_ascii(text)).await
    }

    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        bounded(self.io_timeout, self.stream.write_all(bytes)).await?;
        Ok(())
    }

    pub async fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_bytes(&[byte]).await
    }

    /// Make sure everything written so far has left the process.
    pub async fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        bounded(self.io_timeout, self.stream.flush()).await?;
        Ok(())
    }

    /// Read a single byte, or `None` at end of stream.
    pub async fn read_byte(&mut self) -> Result<Option<u8>> {
        self.ensure_open()?;
        match bounded(self.io_timeout, self.stream.read_u8()).await {
            Ok(byte) => Ok(Some(byte)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read one line of single-byte text, or `None` at end of stream.
    ///
    /// Lines end at `\n`, `\r` or `\r\n`.  A final line without a terminator
    /// is still returned.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        self.ensure_open()?;
        let line = bounded(
            self.io_timeout,
            read_terminated(&mut self.stream, &mut self.skip_lf),
        )
        .await?;
        Ok(line.map(|bytes| decode_ascii(&bytes)))
    }

    /// Copy exactly `len` bytes from `reader` to the peer, verbatim.
    ///
    /// Fails with `UnexpectedEof` if the reader runs dry first, which means
    /// the file shrank after its size was announced.
    pub async fn copy_from<R: AsyncRead + Unpin>(&mut self, reader: R, len: u64) -> Result<u64> {
        self.ensure_open()?;
        let mut reader = reader.take(len);
        let mut chunk = vec![0u8; COPY_CHUNK];
        let mut sent = 0u64;
        loop {
            let n = bounded(self.io_timeout, reader.read(&mut chunk)).await?;
            if n == 0 {
                break;
            }
            bounded(self.io_timeout, self.stream.write_all(&chunk[..n])).await?;
            sent += n as u64;
            debug!(sent, total = len, "data file progress");
        }
        if sent != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file ended after {sent} of {len} announced bytes"),
            )
            .into());
        }
        Ok(sent)
    }

    /// Shut down the write side and mark the connection closed.
    ///
    /// Calling it again is a no-op.  The socket itself is released when the
    /// `Connection` is dropped.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(peer = %self.peer, "closing connection");
        bounded(self.io_timeout, self.stream.shutdown()).await?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "connection already closed").into());
        }
        Ok(())
    }
}

/// Apply the optional per-operation timeout.
async fn bounded<T>(limit: Option<Duration>, op: impl Future<Output = io::Result<T>>) -> io::Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, op)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "socket operation timed out"))?,
        None => op.await,
    }
}

/// Read bytes up to the next `\n` or `\r`, consuming the terminator.
///
/// `skip_lf` carries a pending `\r` across calls so that `\r\n` split
/// between two reads still counts as one terminator.
async fn read_terminated<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    skip_lf: &mut bool,
) -> io::Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    let mut partial = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(partial.then_some(line));
        }
        if std::mem::take(skip_lf) && available[0] == b'\n' {
            reader.consume(1);
            continue;
        }
        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                *skip_lf = available[end] == b'\r';
                line.extend_from_slice(&available[..end]);
                reader.consume(end + 1);
                return Ok(Some(line));
            }
            None => {
                let n = available.len();
                line.extend_from_slice(available);
                reader.consume(n);
                partial = true;
            }
        }
    }
}

/// Encode text as single bytes, replacing anything outside ASCII with `?`.
pub fn encode_ascii(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

/// Decode single-byte text, replacing bytes above 127 with `?`.
pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}
