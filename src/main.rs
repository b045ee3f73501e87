//! CLI entry point for the archiver tool.

use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use archiver_core::assemble::Reporter;
use archiver_core::{Assembler, FetchClient, WireArchive, ZipSink, encode_name};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    // Read input: from the positional path or stdin
    let input_text = if let Some(path) = &args.input {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        bail!("no input provided; pass a JSON path or pipe the document via stdin");
    };

    let archive = WireArchive::from_json(&input_text).context("invalid wire document")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.zip", encode_name(&archive.id))));
    info!(output = %output.display(), id = %archive.id, "assembling archive");

    let destination = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut sink = ZipSink::new(destination);

    let assembler = Assembler::new(FetchClient::new())
        .with_retry_budget(u32::from(args.retries))
        .with_throttle(Duration::from_millis(args.throttle));

    let mut reporter = BarReporter::new(args.quiet);
    let stats = match assembler.run(&archive, &mut sink, &mut reporter).await {
        Ok(stats) => stats,
        Err(err) => {
            // Leave no half-written archive behind on a fatal error.
            reporter.bar.finish_and_clear();
            let _ = std::fs::remove_file(&output);
            return Err(err).context("archive assembly failed");
        }
    };
    reporter.bar.finish_and_clear();

    if !args.quiet {
        println!(
            "{}: {} of {} files archived, {} skipped",
            output.display(),
            stats.emitted,
            stats.total_files,
            stats.skipped.len()
        );
    }

    Ok(())
}

/// Terminal reporter: a percentage bar plus scrolling status lines.
struct BarReporter {
    bar: ProgressBar,
    quiet: bool,
}

impl BarReporter {
    fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(100)
        };
        bar.set_style(
            ProgressStyle::with_template("[{bar:40}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        // No estimate exists before the first completed file.
        bar.set_message("Time remaining -:--");
        Self { bar, quiet }
    }
}

impl Reporter for BarReporter {
    fn log(&mut self, line: &str) {
        if !self.quiet {
            self.bar.println(line);
        }
    }

    fn progress(&mut self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    fn eta(&mut self, eta: &str) {
        self.bar.set_message(format!("Time remaining {eta}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_reporter_starts_with_the_eta_placeholder() {
        let reporter = BarReporter::new(true);
        assert_eq!(reporter.bar.message(), "Time remaining -:--");
    }

    #[test]
    fn bar_reporter_eta_replaces_the_placeholder() {
        let mut reporter = BarReporter::new(true);
        reporter.eta("0:05");
        assert_eq!(reporter.bar.message(), "Time remaining 0:05");
    }
}
