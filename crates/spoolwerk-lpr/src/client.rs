// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LPR client entry points.

use std::future::Future;

use tokio::net::TcpStream;

use spoolwerk_core::error::Result;
use spoolwerk_core::{ClientConfig, PrintJob, QueueQuery, SubmissionReport};

use crate::print_job;
use crate::queue_query::{self, QueueListing};

/// The two LPD exchanges a client performs.
pub trait LprClient {
    /// Submit `job` and wait until the peer has acknowledged every frame.
    fn print_file(&self, job: &PrintJob) -> impl Future<Output = Result<SubmissionReport>> + Send;

    /// Request the queue listing of `query.printer`.  Lines are read lazily.
    fn query_printer(
        &self,
        query: &QueueQuery,
    ) -> impl Future<Output = Result<QueueListing<TcpStream>>> + Send;
}

/// `LprClient` over TCP.  Each call opens its own connection.
#[derive(Debug, Clone, Default)]
pub struct NetworkLprClient {
    config: ClientConfig,
}

impl NetworkLprClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl LprClient for NetworkLprClient {
    async fn print_file(&self, job: &PrintJob) -> Result<SubmissionReport> {
        print_job::print_file(job, &self.config).await
    }

    async fn query_printer(&self, query: &QueueQuery) -> Result<QueueListing<TcpStream>> {
        queue_query::query_printer(query, &self.config).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use spoolwerk_core::{FileType, SpoolwerkError};
    use tokio::net::TcpListener;

    use super::*;
    use crate::test_support::{fake_lpd, fake_lpq};

    async fn local_client() -> (NetworkLprClient, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let config = ClientConfig {
            port: listener.local_addr().expect("addr").port(),
            connect_timeout_secs: 5,
            io_timeout_secs: Some(5),
            ..Default::default()
        };
        (NetworkLprClient::new(config), listener)
    }

    #[tokio::test]
    async fn prints_over_tcp() {
        let (client, listener) = local_client().await;
        let peer = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            fake_lpd(stream, &[0; 5]).await
        });

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"hello printer\n").expect("write");
        let job = PrintJob::new("127.0.0.1", "lp0", file.path(), FileType::Formatted)
            .with_class("test");

        let report = client.print_file(&job).await.expect("print");
        let n = report.job_identifier.number();
        assert!((1..=999).contains(&n));

        let t = peer.await.expect("peer task");
        assert_eq!(t.commands[0], b"\x02lp0\n");
        assert_eq!(t.files[1], b"hello printer\n");
        let control = String::from_utf8(t.files[0].clone()).expect("ascii");
        let id = report.job_identifier.to_string();
        assert!(control.contains(&format!("fdfA{id}\nUdfA{id}\n")));
        assert!(control.ends_with("Ctest\n"));
        assert!(
            control
                .lines()
                .take(2)
                .all(|l| l.chars().skip(1).all(|c| ('\u{21}'..='\u{7f}').contains(&c)))
        );
    }

    #[tokio::test]
    async fn consecutive_jobs_get_fresh_identifiers() {
        let (client, listener) = local_client().await;
        let peer = tokio::spawn(async move {
            for _ in 0..2 {
                let (stream, _) = listener.accept().await.expect("accept");
                fake_lpd(stream, &[0; 5]).await;
            }
        });

        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let job = PrintJob::new("127.0.0.1", "lp0", file.path(), FileType::Binary);
        let first = client.print_file(&job).await.expect("first");
        let second = client.print_file(&job).await.expect("second");
        assert_ne!(first.job_identifier, second.job_identifier);
        peer.await.expect("peer task");
    }

    #[tokio::test]
    async fn queries_over_tcp() {
        let (client, listener) = local_client().await;
        let peer = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            fake_lpq(stream, b"lp0 is ready\nno entries\n").await
        });

        let listing = client
            .query_printer(&QueueQuery::new("127.0.0.1", "lp0", true))
            .await
            .expect("query");
        let lines = listing.collect_lines().await.expect("lines");
        assert_eq!(lines, ["lp0 is ready", "no entries"]);
        assert_eq!(peer.await.expect("peer task"), b"\x04lp0 \n");
    }

    #[tokio::test]
    async fn unreachable_server_fails_before_any_file_io() {
        let (client, listener) = local_client().await;
        drop(listener);

        let job = PrintJob::new("127.0.0.1", "lp0", "/does/not/exist", FileType::Binary);
        let err = client.print_file(&job).await.unwrap_err();
        assert!(matches!(err, SpoolwerkError::Connection { .. }));
    }
}
