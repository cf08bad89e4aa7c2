// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted LPD peer for exercising the client side of an exchange.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Buffer size of the in-memory pipe between client and fake peer.
pub(crate) const PIPE_SIZE: usize = 256 * 1024;

/// Everything the fake peer saw.
#[derive(Debug, Default)]
pub(crate) struct Transcript {
    /// Every byte received, in order.
    pub raw: Vec<u8>,
    /// Command lines (including the leading code byte and trailing `\n`).
    pub commands: Vec<Vec<u8>>,
    /// File payloads, without their `0x00` terminator.
    pub files: Vec<Vec<u8>>,
    /// Terminator byte seen after each file payload.
    pub terminators: Vec<u8>,
}

/// Play the server side of a job submission.
///
/// `acks` holds the byte to answer each frame with, in order: receive job,
/// then header and contents of each file.  After a non-zero answer the peer
/// only records what else arrives.  When `acks` runs out it hangs up.
pub(crate) async fn fake_lpd<S>(stream: S, acks: &[u8]) -> Transcript
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut acks = acks.iter().copied();
    let mut t = Transcript::default();

    if !read_command(&mut reader, &mut t).await {
        return t;
    }
    match answer(&mut reader, acks.next()).await {
        Answer::Accepted => {}
        Answer::Rejected => return drain(reader, t).await,
        Answer::HungUp => return t,
    }

    loop {
        if !read_command(&mut reader, &mut t).await {
            return t;
        }
        let len = announced_len(t.commands.last().map(Vec::as_slice).unwrap_or_default());
        match answer(&mut reader, acks.next()).await {
            Answer::Accepted => {}
            Answer::Rejected => return drain(reader, t).await,
            Answer::HungUp => return t,
        }

        let mut payload = vec![0u8; len + 1];
        if reader.read_exact(&mut payload).await.is_err() {
            return t;
        }
        t.raw.extend_from_slice(&payload);
        t.terminators.push(payload[len]);
        payload.truncate(len);
        t.files.push(payload);
        match answer(&mut reader, acks.next()).await {
            Answer::Accepted => {}
            Answer::Rejected => return drain(reader, t).await,
            Answer::HungUp => return t,
        }
    }
}

/// Play the server side of a queue query: read the command, send `reply`, hang up.
pub(crate) async fn fake_lpq<S>(stream: S, reply: &[u8]) -> Vec<u8>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut command = Vec::new();
    let _ = reader.read_until(b'\n', &mut command).await;
    let _ = reader.write_all(reply).await;
    let _ = reader.shutdown().await;
    command
}

enum Answer {
    Accepted,
    Rejected,
    HungUp,
}

async fn read_command<S>(reader: &mut BufReader<S>, t: &mut Transcript) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    match reader.read_until(b'\n', &mut line).await {
        Ok(0) | Err(_) => false,
        Ok(_) => {
            t.raw.extend_from_slice(&line);
            t.commands.push(line);
            true
        }
    }
}

async fn answer<S>(reader: &mut BufReader<S>, ack: Option<u8>) -> Answer
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some(ack) = ack else {
        return Answer::HungUp;
    };
    if reader.write_all(&[ack]).await.is_err() || reader.flush().await.is_err() {
        return Answer::HungUp;
    }
    if ack == 0 { Answer::Accepted } else { Answer::Rejected }
}

async fn drain<S>(mut reader: BufReader<S>, mut t: Transcript) -> Transcript
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let _ = reader.read_to_end(&mut t.raw).await;
    t
}

/// Parse the byte count out of `\x02{len} cfA...\n` / `\x03{len} dfA...\n`.
fn announced_len(command: &[u8]) -> usize {
    let text = String::from_utf8_lossy(command.get(1..).unwrap_or_default());
    text.split(' ')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}
