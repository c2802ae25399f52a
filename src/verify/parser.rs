//! Expected-transcript parsing
//!
//! An expected transcript is a sequence of blocks: a top-level line (no
//! leading whitespace) followed by its body lines (leading whitespace).
//! A dash banner opens an opaque section consumed verbatim until the matching
//! closing banner, which protects embedded per-test output from being
//! misparsed as new top-level lines.

use std::collections::HashMap;

use crate::output::{color_for_token, decorate, Background};

use super::matcher::VerifyError;

/// One top-level line plus its ordered body lines
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptBlock {
    pub key: String,
    pub body: Vec<String>,
}

/// A parsed expected transcript: blocks in source order, keyed for lookup
#[derive(Clone, Debug, Default)]
pub struct ExpectedTranscript {
    blocks: Vec<TranscriptBlock>,
    index: HashMap<String, usize>,
}

impl ExpectedTranscript {
    /// Parse expected transcript text into blocks.
    ///
    /// Color tokens (`text%GREEN%` and friends) are expanded to their literal
    /// decorated form before storage, except inside opaque banner sections,
    /// which are kept verbatim.
    pub fn parse(text: &str) -> Result<Self, VerifyError> {
        let mut parsed = Self::default();
        let mut open_banner: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;

            if let Some(banner) = &open_banner {
                let closing = raw == banner;
                parsed.push_body(raw.to_string(), line_no)?;
                if closing {
                    open_banner = None;
                }
                continue;
            }

            if is_banner(raw) {
                open_banner = Some(raw.to_string());
                parsed.push_body(raw.to_string(), line_no)?;
            } else if raw.starts_with(char::is_whitespace) {
                parsed.push_body(expand_color_token(raw), line_no)?;
            } else {
                parsed.push_block(expand_color_token(raw), line_no)?;
            }
        }

        if open_banner.is_some() {
            return Err(VerifyError::MalformedExpected {
                line_no: text.lines().count(),
                reason: "banner section never closed".into(),
            });
        }

        Ok(parsed)
    }

    fn push_block(&mut self, key: String, line_no: usize) -> Result<(), VerifyError> {
        if self.index.contains_key(&key) {
            return Err(VerifyError::MalformedExpected {
                line_no,
                reason: format!("duplicate top-level line {key:?}"),
            });
        }

        self.index.insert(key.clone(), self.blocks.len());
        self.blocks.push(TranscriptBlock {
            key,
            body: Vec::new(),
        });
        Ok(())
    }

    fn push_body(&mut self, line: String, line_no: usize) -> Result<(), VerifyError> {
        match self.blocks.last_mut() {
            Some(block) => {
                block.body.push(line);
                Ok(())
            }
            None => Err(VerifyError::MalformedExpected {
                line_no,
                reason: "body line before any top-level line".into(),
            }),
        }
    }

    /// Index of the block whose top-level line is `key`
    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn blocks(&self) -> &[TranscriptBlock] {
        &self.blocks
    }
}

/// A dash banner is four or more dashes and nothing else
pub fn is_banner(line: &str) -> bool {
    line.len() >= 4 && line.bytes().all(|b| b == b'-')
}

/// Expand a trailing `%COLORNAME%` token into the decorated literal form.
/// Lines without a token, or with an unknown name, are returned unchanged.
pub fn expand_color_token(line: &str) -> String {
    let Some(inner) = line.strip_suffix('%') else {
        return line.to_string();
    };
    let Some(pos) = inner.rfind('%') else {
        return line.to_string();
    };

    match color_for_token(&inner[pos + 1..]) {
        Some((color, style)) => decorate(&inner[..pos], color, style, Background::None),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::green;

    #[test]
    fn test_blocks_and_bodies() {
        let text = "alpha...OK\nbeta...\n    detail one\n    detail two\n";
        let parsed = ExpectedTranscript::parse(text).unwrap();

        assert_eq!(parsed.blocks().len(), 2);
        assert_eq!(parsed.blocks()[0].key, "alpha...OK");
        assert!(parsed.blocks()[0].body.is_empty());
        assert_eq!(
            parsed.blocks()[1].body,
            vec!["    detail one", "    detail two"]
        );
        assert_eq!(parsed.lookup("beta..."), Some(1));
    }

    #[test]
    fn test_blank_line_is_its_own_block() {
        let parsed = ExpectedTranscript::parse("header\n\nfooter\n").unwrap();
        assert_eq!(parsed.blocks()[1].key, "");
        assert!(parsed.lookup("").is_some());
    }

    #[test]
    fn test_banner_section_is_opaque() {
        // The embedded "looks-top-level" line must not start a new block.
        let text = "case...OK\n----------\nlooks-top-level\n----------\nnext...OK\n";
        let parsed = ExpectedTranscript::parse(text).unwrap();

        assert_eq!(parsed.blocks().len(), 2);
        assert_eq!(
            parsed.blocks()[0].body,
            vec!["----------", "looks-top-level", "----------"]
        );
        assert_eq!(parsed.blocks()[1].key, "next...OK");
    }

    #[test]
    fn test_nested_banner_lines_are_consumed() {
        let text = "case...OK\n------\n----\ninner\n------\n";
        let parsed = ExpectedTranscript::parse(text).unwrap();
        assert_eq!(
            parsed.blocks()[0].body,
            vec!["------", "----", "inner", "------"]
        );
    }

    #[test]
    fn test_unclosed_banner_is_rejected() {
        let err = ExpectedTranscript::parse("case...OK\n----------\ntrailing\n").unwrap_err();
        assert!(matches!(err, VerifyError::MalformedExpected { .. }));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let err = ExpectedTranscript::parse("same\nsame\n").unwrap_err();
        assert!(matches!(err, VerifyError::MalformedExpected { .. }));
    }

    #[test]
    fn test_is_banner() {
        assert!(is_banner("----"));
        assert!(is_banner("----------"));
        assert!(!is_banner("---"));
        assert!(!is_banner("----x"));
        assert!(!is_banner(""));
    }

    #[test]
    fn test_color_token_expansion() {
        assert_eq!(expand_color_token("done%GREEN%"), green("done"));
        assert_eq!(expand_color_token("no token"), "no token");
        assert_eq!(expand_color_token("odd%MAUVE%"), "odd%MAUVE%");
        assert_eq!(expand_color_token("%"), "%");
    }

    #[test]
    fn test_token_inside_banner_stays_verbatim() {
        let text = "case...OK\n----\nliteral%GREEN%\n----\n";
        let parsed = ExpectedTranscript::parse(text).unwrap();
        assert_eq!(parsed.blocks()[0].body[1], "literal%GREEN%");
    }
}
