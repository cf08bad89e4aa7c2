// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synchronous wrapper around the async client.
//
// Each call drives the async exchange to completion on a private
// current-thread runtime and hands back its single outcome.  Must not be
// used from inside another Tokio runtime.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};

use spoolwerk_core::error::Result;
use spoolwerk_core::{ClientConfig, PrintJob, QueueQuery, SubmissionReport};

use crate::client::{LprClient, NetworkLprClient};
use crate::queue_query::QueueListing;

/// Blocking LPR client.
#[derive(Debug, Clone)]
pub struct BlockingLprClient {
    inner: NetworkLprClient,
    runtime: Arc<Runtime>,
}

impl BlockingLprClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner: NetworkLprClient::new(config),
            runtime: Arc::new(runtime),
        })
    }

    /// Submit `job`; blocks until every frame is acknowledged or the job fails.
    pub fn print_file(&self, job: &PrintJob) -> Result<SubmissionReport> {
        self.runtime.block_on(self.inner.print_file(job))
    }

    /// Open a queue query.  The returned iterator reads one line per `next()`.
    pub fn query_printer(&self, query: &QueueQuery) -> Result<BlockingQueueListing> {
        let listing = self.runtime.block_on(self.inner.query_printer(query))?;
        Ok(BlockingQueueListing {
            listing,
            runtime: Arc::clone(&self.runtime),
        })
    }
}

/// Iterator over a queue listing.
///
/// Yields `Err` at most once, after which it is exhausted.  Dropping it early
/// closes the connection.
#[derive(Debug)]
pub struct BlockingQueueListing {
    // Dropped before the runtime it was registered with.
    listing: QueueListing<TcpStream>,
    runtime: Arc<Runtime>,
}

impl Iterator for BlockingQueueListing {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.listing.next_line()).transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    use spoolwerk_core::FileType;

    use super::*;

    fn local_config(listener: &TcpListener) -> ClientConfig {
        ClientConfig {
            port: listener.local_addr().expect("addr").port(),
            connect_timeout_secs: 5,
            io_timeout_secs: Some(5),
            ..Default::default()
        }
    }

    #[test]
    fn blocking_query_yields_lines_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let client = BlockingLprClient::new(local_config(&listener)).expect("client");

        let peer = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut command = Vec::new();
            BufReader::new(&stream).read_until(b'\n', &mut command).expect("read");
            stream.write_all(b"one\ntwo\nthree\n").expect("write");
            command
        });

        let lines: Vec<String> = client
            .query_printer(&QueueQuery::new("127.0.0.1", "lp0", false))
            .expect("query")
            .collect::<Result<_>>()
            .expect("lines");
        assert_eq!(lines, ["one", "two", "three"]);
        assert_eq!(peer.join().expect("peer"), b"\x03lp0 \n");
    }

    #[test]
    fn dropping_the_iterator_early_closes_the_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let client = BlockingLprClient::new(local_config(&listener)).expect("client");

        let peer = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            stream
                .set_read_timeout(Some(std::time::Duration::from_secs(5)))
                .expect("timeout");
            let mut command = Vec::new();
            BufReader::new(&stream).read_until(b'\n', &mut command).expect("read");
            stream.write_all(b"one\ntwo\nthree\n").expect("write");
            // Returns once the client side has gone away.
            let mut rest = Vec::new();
            stream.read_to_end(&mut rest).map(|_| rest)
        });

        let mut lines = client
            .query_printer(&QueueQuery::new("127.0.0.1", "lp0", false))
            .expect("query");
        assert_eq!(lines.next().expect("line").expect("read"), "one");
        drop(lines);

        // Unread listing bytes may turn the close into a reset.
        match peer.join().expect("peer") {
            Ok(rest) => assert!(rest.is_empty()),
            Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
        }
    }

    #[test]
    fn blocking_print_surfaces_protocol_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let client = BlockingLprClient::new(local_config(&listener)).expect("client");

        let peer = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut command = Vec::new();
            BufReader::new(&stream).read_until(b'\n', &mut command).expect("read");
            stream.write_all(&[1]).expect("write");
            let mut rest = Vec::new();
            let _ = stream.read_to_end(&mut rest);
            (command, rest)
        });

        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let job = PrintJob::new("127.0.0.1", "lp0", file.path(), FileType::Binary);
        let err = client.print_file(&job).unwrap_err();
        assert!(err.to_string().contains("receive job: 1"));

        let (command, rest) = peer.join().expect("peer");
        assert_eq!(command, b"\x02lp0\n");
        assert!(rest.is_empty());
    }
}
