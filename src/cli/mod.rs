//! CLI argument parsing
//!
//! Defines the transcript-verifier command line using clap.

use clap::Parser;

/// Reorder-tolerant test transcript verifier
#[derive(Parser, Debug)]
#[command(name = "verify-transcript")]
#[command(version)]
#[command(about = "Compare an actual test transcript against an expected one")]
#[command(long_about = None)]
pub struct Args {
    /// Expected transcript text (may contain %COLOR% tokens)
    pub expected: String,

    /// Actual transcript text
    pub actual: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["verify-transcript", "expected text", "actual text"]);
        assert_eq!(args.expected, "expected text");
        assert_eq!(args.actual, "actual text");
        assert!(!args.verbose);
    }

    #[test]
    fn test_missing_argument_is_an_error() {
        assert!(Args::try_parse_from(["verify-transcript", "only one"]).is_err());
    }

    #[test]
    fn test_verbose_flag() {
        let args = Args::parse_from(["verify-transcript", "-v", "e", "a"]);
        assert!(args.verbose);
    }
}
