//! oracle-trc CLI entry point.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oracle_trc::packet::hex_dump;
use oracle_trc::{Config, Packet, PacketStream, Query, QueryStream, TimestampFormat};

/// Extract packets and SQL statements from Oracle Net client traces.
#[derive(Parser, Debug)]
#[command(name = "oracle-trc")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print SQL statements with their bind values
    Queries {
        #[command(flatten)]
        scan: ScanArgs,

        /// Attach the server packet answering each statement
        #[arg(long = "await-response")]
        await_response: bool,
    },
    /// Print reconstructed packets with header and hex dump
    Packets {
        #[command(flatten)]
        scan: ScanArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct ScanArgs {
    /// Trace files to read; wildcard patterns are expanded
    #[arg(value_name = "FILES", required = true)]
    files: Vec<String>,

    /// Timestamp mask of the traces
    #[arg(long = "ts-format", value_name = "MASK", default_value = "DD-MON-YYYY HH:MI:SS:FF3")]
    ts_format: String,

    /// Only print records after this time, written with the mask
    #[arg(long = "after", value_name = "TIMESTAMP")]
    after: Option<String>,

    /// Sort output by timestamp across all files
    #[arg(long = "date-order")]
    date_order: bool,
}

impl ScanArgs {
    fn config(&self) -> Result<Config> {
        let format: TimestampFormat = self
            .ts_format
            .parse()
            .with_context(|| format!("Invalid --ts-format '{}'", self.ts_format))?;
        let mut config = Config::new()
            .timestamp_format(format)
            .date_order(self.date_order);
        if let Some(after) = &self.after {
            config = config
                .after_text(after)
                .with_context(|| format!("Invalid --after '{}'", after))?;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Packets,
    Queries,
}

/// One printable result
enum Record {
    Packet(Packet),
    Query(Box<Query>),
}

impl Record {
    fn packet(&self) -> &Packet {
        match self {
            Record::Packet(packet) => packet,
            Record::Query(query) => &query.packet,
        }
    }

    fn time(&self, config: &Config) -> Option<NaiveDateTime> {
        config.packet_time(self.packet())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Packet(packet) => {
                writeln!(f, "{}", packet.context())?;
                if let Ok(header) = packet.header() {
                    writeln!(f, "{}", header)?;
                }
                if let Ok(Some(data)) = packet.data_header() {
                    writeln!(f, "{}", data)?;
                }
                f.write_str(&hex_dump(&packet.payload))
            }
            Record::Query(query) => {
                write!(f, "{}", query)?;
                if let Some(response) = &query.response {
                    write!(f, "{}", response)?;
                }
                Ok(())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let (mode, scan, await_response) = match args.command {
        Command::Queries {
            scan,
            await_response,
        } => (Mode::Queries, scan, await_response),
        Command::Packets { scan } => (Mode::Packets, scan, false),
    };
    let config = Arc::new(scan.config()?.await_response(await_response));
    let files = expand_patterns(&scan.files)?;

    // One pipeline per file
    let tasks: Vec<_> = files
        .iter()
        .cloned()
        .map(|path| {
            let config = config.clone();
            tokio::spawn(async move { scan_file(path, mode, config).await })
        })
        .collect();

    let mut records = Vec::new();
    let mut failures = 0;
    for task in tasks {
        match task.await {
            Ok(Ok(found)) => records.extend(found),
            Ok(Err(e)) => {
                eprintln!("Error: {:#}", e);
                failures += 1;
            }
            Err(e) => {
                eprintln!("Error: file task failed: {}", e);
                failures += 1;
            }
        }
    }

    if config.date_order {
        records.sort_by_key(|record| record.time(&config));
        for record in &records {
            print!("{}", record);
        }
    }

    if failures > 0 {
        bail!("{} of {} file(s) could not be read", failures, files.len());
    }
    Ok(())
}

/// Expand wildcard patterns in file arguments
///
/// Matches come in alphabetical order. An argument that matches nothing, or
/// is not a valid pattern, is kept as a literal path so that opening it
/// reports the problem.
fn expand_patterns(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for arg in args {
        let paths = match glob::glob(arg) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::debug!(pattern = arg.as_str(), reason = %e, "Not a file pattern");
                files.push(PathBuf::from(arg));
                continue;
            }
        };

        let before = files.len();
        for path in paths {
            files.push(path.with_context(|| format!("Failed to expand '{}'", arg))?);
        }
        if files.len() == before {
            files.push(PathBuf::from(arg));
        }
    }
    Ok(files)
}

/// Read one trace, printing records as they come or keeping them for sorting
async fn scan_file(path: PathBuf, mode: Mode, config: Arc<Config>) -> Result<Vec<Record>> {
    let mut kept = Vec::new();
    let mut emit = |record: Record| {
        if config.date_order {
            kept.push(record);
        } else {
            print!("{}", record);
        }
    };

    match mode {
        Mode::Packets => {
            let mut packets = PacketStream::open(&path)
                .await
                .with_context(|| format!("Failed to open trace: {}", path.display()))?;
            while let Some(packet) = packets
                .next_packet()
                .await
                .with_context(|| format!("Failed to read trace: {}", path.display()))?
            {
                if config.accepts(&packet) {
                    emit(Record::Packet(packet));
                }
            }
        }
        Mode::Queries => {
            let mut queries = QueryStream::open(&path, config.await_response)
                .await
                .with_context(|| format!("Failed to open trace: {}", path.display()))?;
            while let Some(query) = queries
                .next()
                .await
                .with_context(|| format!("Failed to read trace: {}", path.display()))?
            {
                if config.accepts(&query.packet) {
                    emit(Record::Query(Box::new(query)));
                }
            }
        }
    }

    tracing::debug!(source = %path.display(), "Trace done");
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("oracle-trc-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_expand_wildcard() {
        let dir = scratch_dir("wildcard");
        for name in ["cli_2.trc", "cli_1.trc", "notes.log"] {
            fs::write(dir.join(name), "").unwrap();
        }

        let pattern = dir.join("*.trc").to_string_lossy().into_owned();
        let files = expand_patterns(&[pattern]).unwrap();
        assert_eq!(files, vec![dir.join("cli_1.trc"), dir.join("cli_2.trc")]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_expand_keeps_unmatched_arguments() {
        let dir = scratch_dir("unmatched");
        let missing = dir.join("cli_*.trc").to_string_lossy().into_owned();
        let plain = dir.join("absent.trc").to_string_lossy().into_owned();

        let files = expand_patterns(&[missing.clone(), plain.clone()]).unwrap();
        assert_eq!(files, vec![PathBuf::from(missing), PathBuf::from(plain)]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_expand_invalid_pattern_is_literal() {
        let files = expand_patterns(&["cli_[.trc".to_string()]).unwrap();
        assert_eq!(files, vec![PathBuf::from("cli_[.trc")]);
    }

    #[test]
    fn test_parse_queries_command() {
        let args = Args::try_parse_from([
            "oracle-trc",
            "queries",
            "--await-response",
            "--after",
            "26-FEB-2019 11:52:00:000",
            "traces/*.trc",
        ])
        .unwrap();
        match args.command {
            Command::Queries {
                scan,
                await_response,
            } => {
                assert!(await_response);
                assert_eq!(scan.files, vec!["traces/*.trc".to_string()]);
                let config = scan.config().unwrap();
                assert!(config.after.is_some());
                assert!(!config.date_order);
            }
            Command::Packets { .. } => panic!("expected the queries command"),
        }
    }

    #[test]
    fn test_bad_mask_rejected() {
        let args = Args::try_parse_from(["oracle-trc", "packets", "--ts-format", "YYYY", "a.trc"])
            .unwrap();
        let Command::Packets { scan } = args.command else {
            panic!("expected the packets command");
        };
        assert!(scan.config().is_err());
    }
}
