//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Assemble a creator archive ZIP from a wire-format JSON document.
///
/// Archiver reads a flat JSON description of a creator's posts, fetches
/// every referenced file, and emits a single self-contained ZIP with
/// browsable HTML pages.
#[derive(Parser, Debug)]
#[command(name = "archiver")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the wire-format JSON document (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Output ZIP path (defaults to <creator id>.zip in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extra download attempts per file after the first (0-10)
    #[arg(short = 'r', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub retries: u8,

    /// Pause between file downloads in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub throttle: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["archiver"]).unwrap();
        assert!(args.input.is_none());
        assert!(args.output.is_none());
        assert_eq!(args.retries, 1);
        assert_eq!(args.throttle, 100);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_positional_input_path() {
        let args = Args::try_parse_from(["archiver", "creator.json"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("creator.json")));
    }

    #[test]
    fn test_cli_output_flag() {
        let args = Args::try_parse_from(["archiver", "-o", "out.zip"]).unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.zip")));

        let args = Args::try_parse_from(["archiver", "--output", "out.zip"]).unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.zip")));
    }

    #[test]
    fn test_cli_retries_zero_allowed() {
        // 0 means a single attempt per file, no retry
        let args = Args::try_parse_from(["archiver", "-r", "0"]).unwrap();
        assert_eq!(args.retries, 0);
    }

    #[test]
    fn test_cli_retries_over_max_rejected() {
        let result = Args::try_parse_from(["archiver", "-r", "11"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_throttle_zero_disables() {
        let args = Args::try_parse_from(["archiver", "-l", "0"]).unwrap();
        assert_eq!(args.throttle, 0);
    }

    #[test]
    fn test_cli_throttle_over_max_rejected() {
        let result = Args::try_parse_from(["archiver", "--throttle", "60001"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["archiver", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["archiver", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["archiver", "-q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_combined_all_flags() {
        let args = Args::try_parse_from([
            "archiver", "in.json", "-o", "out.zip", "-r", "3", "-l", "250", "-v",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("in.json")));
        assert_eq!(args.output, Some(PathBuf::from("out.zip")));
        assert_eq!(args.retries, 3);
        assert_eq!(args.throttle, 250);
        assert_eq!(args.verbose, 1);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["archiver", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
