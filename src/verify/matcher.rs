//! Reorder-tolerant transcript matching
//!
//! Checks that an actual transcript is a valid instantiation of an expected
//! one: relative order between distinct top-level blocks is unconstrained
//! (parallel workers finish in nondeterministic order), but the order inside
//! one block's body is exact.

use thiserror::Error;
use tracing::debug;

use super::parser::{ExpectedTranscript, TranscriptBlock};

/// Verification mismatches, one variant per cause
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("unexpected line {line:?} at line {line_no}")]
    UnexpectedLine { line_no: usize, line: String },

    #[error(
        "mismatch at line {line_no} (in block {key:?}): expected {expected:?}, got {actual:?}"
    )]
    BodyMismatch {
        line_no: usize,
        key: String,
        expected: String,
        actual: String,
    },

    #[error("output ended early: block {key:?} is missing {missing} body line(s)")]
    EndedEarly { key: String, missing: usize },

    #[error("expected block(s) never seen:\n{}", render_blocks(.blocks))]
    MissingBlocks { blocks: Vec<TranscriptBlock> },

    #[error("malformed expected transcript at line {line_no}: {reason}")]
    MalformedExpected { line_no: usize, reason: String },
}

fn render_blocks(blocks: &[TranscriptBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str("    ");
        out.push_str(&block.key);
        out.push('\n');
        for line in &block.body {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Check `actual` against `expected` in a single linear scan.
pub fn verify(expected: &str, actual: &str) -> Result<(), VerifyError> {
    let transcript = ExpectedTranscript::parse(expected)?;
    let actual_lines: Vec<&str> = actual.lines().collect();

    debug!(
        blocks = transcript.blocks().len(),
        actual_lines = actual_lines.len(),
        "matching transcript"
    );

    let mut seen = vec![false; transcript.blocks().len()];
    let mut pos = 0;

    while pos < actual_lines.len() {
        let line = actual_lines[pos];
        let Some(idx) = transcript.lookup(line) else {
            return Err(VerifyError::UnexpectedLine {
                line_no: pos + 1,
                line: line.to_string(),
            });
        };
        seen[idx] = true;
        pos += 1;

        let block = &transcript.blocks()[idx];
        for (offset, expected_line) in block.body.iter().enumerate() {
            match actual_lines.get(pos) {
                None => {
                    return Err(VerifyError::EndedEarly {
                        key: block.key.clone(),
                        missing: block.body.len() - offset,
                    });
                }
                Some(actual_line) if *actual_line != expected_line => {
                    return Err(VerifyError::BodyMismatch {
                        line_no: pos + 1,
                        key: block.key.clone(),
                        expected: expected_line.clone(),
                        actual: actual_line.to_string(),
                    });
                }
                Some(_) => pos += 1,
            }
        }
    }

    let missing: Vec<TranscriptBlock> = transcript
        .blocks()
        .iter()
        .zip(&seen)
        .filter(|(_, seen)| !**seen)
        .map(|(block, _)| block.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VerifyError::MissingBlocks { blocks: missing })
    }
}
