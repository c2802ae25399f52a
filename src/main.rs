//! verify-transcript - reorder-tolerant test transcript verifier
//!
//! Takes two positional arguments, the expected and the actual transcript
//! text, and exits 0 when the actual transcript is a valid instantiation of
//! the expected one. Relative order between top-level blocks is free (tests
//! finish in nondeterministic order under the parallel runner); order inside
//! a block's body is exact.
//!
//! ## Usage
//!
//! ```bash
//! verify-transcript "$(cat expected.txt)" "$(./run-tests)"
//! ```

use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use parharness::cli::Args;
use parharness::output;
use parharness::verify::verify;

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match verify(&args.expected, &args.actual) {
        Ok(()) => {
            debug!("transcripts match");
        }
        Err(err) => {
            print_mismatch(&err.to_string(), &args.expected, &args.actual);
            std::process::exit(1);
        }
    }
}

/// Dump the diagnostic plus both full transcripts, each line indented.
fn print_mismatch(message: &str, expected: &str, actual: &str) {
    println!("{}", output::bold_red(message));
    println!();
    println!("Expected output:");
    for line in expected.lines() {
        println!("    {line}");
    }
    println!();
    println!("Actual output:");
    for line in actual.lines() {
        println!("    {line}");
    }
    println!();
}
