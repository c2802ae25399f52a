//! Transcript verification
//!
//! Parses an expected transcript into blocks and checks an actual transcript
//! against it, tolerating the block reordering that parallel execution
//! introduces.

mod matcher;
mod parser;

pub use matcher::{verify, VerifyError};
pub use parser::{ExpectedTranscript, TranscriptBlock};
