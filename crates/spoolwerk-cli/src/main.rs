// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk — command-line LPR client.
//
// Entry point. Initialises logging, loads the config, and runs one print
// submission or one queue query.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use spoolwerk_core::config::config_dir;
use spoolwerk_core::error::{Result, SpoolwerkError};
use spoolwerk_core::human_errors::humanize_error;
use spoolwerk_core::{ClientConfig, FileType, PrintJob, QueueQuery};
use spoolwerk_lpr::BlockingLprClient;

#[derive(Debug, Parser)]
#[command(name = "spoolwerk", version, about = "Send files to LPD print servers and list their queues")]
struct Cli {
    /// Config file (default: config.json in the user config directory)
    #[arg(long, global = true, env = "SPOOLWERK_CONFIG")]
    config: Option<PathBuf>,

    /// Log protocol details
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a file to a remote print queue
    Print {
        /// File to print
        file: PathBuf,

        /// Print server host name or address
        #[arg(short = 'H', long)]
        server: String,

        /// Remote queue name
        #[arg(short = 'P', long, env = "PRINTER")]
        printer: Option<String>,

        /// Data format: f (plain text) or l (literal/binary)
        #[arg(long)]
        format: Option<FileType>,

        /// Banner page class
        #[arg(short = 'C', long)]
        class: Option<String>,

        /// Banner page job name
        #[arg(short = 'J', long)]
        job_name: Option<String>,

        /// Send the data file before the control file
        #[arg(long)]
        data_first: bool,
    },

    /// Show the jobs waiting in a remote print queue
    Query {
        /// Print server host name or address
        #[arg(short = 'H', long)]
        server: String,

        /// Remote queue name
        #[arg(short = 'P', long, env = "PRINTER")]
        printer: Option<String>,

        /// Long listing format
        #[arg(short = 'l', long)]
        long: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            let human = humanize_error(&e);
            eprintln!("spoolwerk: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::load_or_default(&config_dir())?,
    };
    let client = BlockingLprClient::new(config.clone())?;

    match cli.command {
        Command::Print {
            file,
            server,
            printer,
            format,
            class,
            job_name,
            data_first,
        } => {
            let printer = resolve_printer(printer, &config)?;
            let mut job = PrintJob::new(
                server,
                printer,
                file,
                format.unwrap_or(config.default_file_type),
            )
            .send_data_file_first(data_first);
            job.class = class;
            job.job_name = job_name;

            let report = client.print_file(&job)?;
            println!(
                "request id is {}-{} ({} bytes)",
                job.printer,
                report.job_identifier.number(),
                report.data_file_bytes
            );
        }
        Command::Query {
            server,
            printer,
            long,
        } => {
            let printer = resolve_printer(printer, &config)?;
            let query = QueueQuery::new(server, printer, long);
            let mut stdout = std::io::stdout().lock();
            for line in client.query_printer(&query)? {
                writeln!(stdout, "{}", line?)?;
            }
        }
    }
    Ok(())
}

fn resolve_printer(given: Option<String>, config: &ClientConfig) -> Result<String> {
    given
        .or_else(|| config.default_printer.clone())
        .ok_or_else(|| {
            SpoolwerkError::InvalidJob(
                "no printer given; use -P, $PRINTER or default_printer in the config".into(),
            )
        })
}
