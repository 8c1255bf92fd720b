//! Frame batch types and sources.
//!
//! A frame batch is the set of candidate strings an upstream recognizer
//! produced for one processed video frame. How those strings were
//! recognized is not this crate's concern; sources only deliver them.

use crate::error::{Result, TextsiftError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::BufRead;

/// One processed frame's worth of recognized candidate strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBatch {
    /// Candidate strings, in recognizer order. May be empty.
    pub texts: Vec<String>,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl FrameBatch {
    pub fn new(texts: Vec<String>, sequence: u64) -> Self {
        Self { texts, sequence }
    }
}

/// Pluggable frame input for the pipeline.
/// Pairs with StableSink for output - this handles recognition input.
pub trait FrameSource: Send + 'static {
    /// Called once before the first read.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Reads the next frame batch.
    ///
    /// Returns `Ok(None)` when the source is exhausted. Errors are
    /// per-frame and recoverable; the caller decides when to give up.
    fn next_batch(&mut self) -> Result<Option<FrameBatch>>;

    /// True for sources with a natural end (files, pipes).
    fn is_finite(&self) -> bool {
        true
    }
}

/// On-disk/stdin line format for frame batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    /// Each line is a JSON array of strings: `["A?","B"]`.
    #[default]
    Jsonl,
    /// Each line is one frame of tab-separated strings.
    Plain,
}

/// Reads frame batches line-by-line from any buffered reader.
pub struct ReaderFrameSource<R: BufRead> {
    reader: R,
    format: FrameFormat,
    sequence: u64,
    line_number: u64,
}

impl<R: BufRead + Send + 'static> ReaderFrameSource<R> {
    pub fn new(reader: R, format: FrameFormat) -> Self {
        Self {
            reader,
            format,
            sequence: 0,
            line_number: 0,
        }
    }
}

impl<R: BufRead + Send + 'static> FrameSource for ReaderFrameSource<R> {
    fn next_batch(&mut self) -> Result<Option<FrameBatch>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let line = line.trim_end_matches(['\r', '\n']);
        let texts = match self.format {
            FrameFormat::Jsonl => {
                serde_json::from_str::<Vec<String>>(line).map_err(|e| {
                    TextsiftError::FrameParse {
                        line: self.line_number,
                        message: format!("expected a JSON array of strings: {e}"),
                    }
                })?
            }
            FrameFormat::Plain => {
                if line.is_empty() {
                    Vec::new()
                } else {
                    line.split('\t').map(str::to_string).collect()
                }
            }
        };

        let batch = FrameBatch::new(texts, self.sequence);
        self.sequence += 1;
        Ok(Some(batch))
    }
}

/// Scripted frame source for tests and library use.
///
/// Yields the queued batches in order, then reports exhaustion. Sequence
/// numbers are assigned at read time.
pub struct MockFrameSource {
    batches: VecDeque<Vec<String>>,
    sequence: u64,
    fail_reads: bool,
    started: bool,
}

impl MockFrameSource {
    pub fn new() -> Self {
        Self {
            batches: VecDeque::new(),
            sequence: 0,
            fail_reads: false,
            started: false,
        }
    }

    /// Queues one frame batch.
    pub fn with_batch<S: Into<String>>(mut self, texts: Vec<S>) -> Self {
        self.batches
            .push_back(texts.into_iter().map(Into::into).collect());
        self
    }

    /// Queues `count` identical frame batches.
    pub fn with_repeated<S: Into<String> + Clone>(mut self, texts: Vec<S>, count: usize) -> Self {
        for _ in 0..count {
            self.batches
                .push_back(texts.iter().cloned().map(Into::into).collect());
        }
        self
    }

    /// Every read fails, for error-path tests.
    pub fn with_read_failure(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn was_started(&self) -> bool {
        self.started
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MockFrameSource {
    fn start(&mut self) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn next_batch(&mut self) -> Result<Option<FrameBatch>> {
        if self.fail_reads {
            return Err(TextsiftError::FrameSource {
                message: "mock read failure".to_string(),
            });
        }
        match self.batches.pop_front() {
            Some(texts) => {
                let batch = FrameBatch::new(texts, self.sequence);
                self.sequence += 1;
                Ok(Some(batch))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn jsonl_source(input: &str) -> ReaderFrameSource<Cursor<Vec<u8>>> {
        ReaderFrameSource::new(Cursor::new(input.as_bytes().to_vec()), FrameFormat::Jsonl)
    }

    #[test]
    fn jsonl_lines_parse_into_batches() {
        let mut source = jsonl_source("[\"A?\",\"B\"]\n[\"C\"]\n");

        let first = source.next_batch().unwrap().unwrap();
        assert_eq!(first.texts, vec!["A?", "B"]);
        assert_eq!(first.sequence, 0);

        let second = source.next_batch().unwrap().unwrap();
        assert_eq!(second.texts, vec!["C"]);
        assert_eq!(second.sequence, 1);

        assert!(source.next_batch().unwrap().is_none());
    }

    #[test]
    fn jsonl_empty_array_is_an_empty_frame() {
        let mut source = jsonl_source("[]\n");
        let batch = source.next_batch().unwrap().unwrap();
        assert!(batch.texts.is_empty());
    }

    #[test]
    fn jsonl_malformed_line_is_an_error_with_line_number() {
        let mut source = jsonl_source("[\"ok\"]\nnot json\n[\"still ok\"]\n");

        assert!(source.next_batch().unwrap().is_some());

        let err = source.next_batch().unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");

        // The source recovers on the next line.
        let batch = source.next_batch().unwrap().unwrap();
        assert_eq!(batch.texts, vec!["still ok"]);
    }

    #[test]
    fn plain_lines_split_on_tabs() {
        let mut source = ReaderFrameSource::new(
            Cursor::new(b"A?\tB\nC\n\n".to_vec()),
            FrameFormat::Plain,
        );

        assert_eq!(
            source.next_batch().unwrap().unwrap().texts,
            vec!["A?", "B"]
        );
        assert_eq!(source.next_batch().unwrap().unwrap().texts, vec!["C"]);
        // Blank line is an empty frame, not EOF.
        assert!(source.next_batch().unwrap().unwrap().texts.is_empty());
        assert!(source.next_batch().unwrap().is_none());
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        let mut source = jsonl_source("[\"A\"]\r\n");
        assert_eq!(source.next_batch().unwrap().unwrap().texts, vec!["A"]);
    }

    #[test]
    fn mock_source_yields_scripted_batches_then_none() {
        let mut source = MockFrameSource::new()
            .with_batch(vec!["X", "Y"])
            .with_repeated(vec!["X"], 2);

        source.start().unwrap();
        assert!(source.was_started());

        assert_eq!(source.next_batch().unwrap().unwrap().texts, vec!["X", "Y"]);
        assert_eq!(source.next_batch().unwrap().unwrap().texts, vec!["X"]);
        let last = source.next_batch().unwrap().unwrap();
        assert_eq!(last.texts, vec!["X"]);
        assert_eq!(last.sequence, 2);
        assert!(source.next_batch().unwrap().is_none());
    }

    #[test]
    fn mock_source_read_failure() {
        let mut source = MockFrameSource::new().with_read_failure();
        assert!(source.next_batch().is_err());
    }

    #[test]
    fn stdin_backed_reader_source_is_a_frame_source() {
        // The source moves onto the pipeline's polling thread, so the
        // reader must be Send. BufReader<Stdin> is; StdinLock is not.
        fn assert_frame_source<T: FrameSource>() {}
        assert_frame_source::<ReaderFrameSource<std::io::BufReader<std::io::Stdin>>>();
    }

    #[test]
    fn frame_format_deserializes_from_config_strings() {
        #[derive(Deserialize)]
        struct Wrap {
            format: FrameFormat,
        }
        let w: Wrap = toml::from_str("format = \"plain\"").unwrap();
        assert_eq!(w.format, FrameFormat::Plain);
        let w: Wrap = toml::from_str("format = \"jsonl\"").unwrap();
        assert_eq!(w.format, FrameFormat::Jsonl);
    }
}
