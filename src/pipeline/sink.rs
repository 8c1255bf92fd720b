//! Stable-text output handlers for the pipeline.

use crate::output::render_stable;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;

/// Pluggable output handler for stable strings.
/// Pairs with FrameSource for input - this handles the tracker's verdicts.
pub trait StableSink: Send + 'static {
    /// Handle one stable string. Called each time the tracker reports one.
    fn handle(&mut self, text: &str) -> crate::error::Result<()>;

    /// Called on pipeline shutdown. Return accumulated text if applicable.
    fn finish(&mut self) -> Option<String> {
        None
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Station wrapper for any StableSink implementation.
pub(crate) struct SinkStation {
    sink: Box<dyn StableSink>,
    quiet: bool,
    result_tx: Option<crossbeam_channel::Sender<Option<String>>>,
    delivered: usize,
}

impl SinkStation {
    pub(crate) fn new(
        sink: Box<dyn StableSink>,
        quiet: bool,
        result_tx: crossbeam_channel::Sender<Option<String>>,
    ) -> Self {
        Self {
            sink,
            quiet,
            result_tx: Some(result_tx),
            delivered: 0,
        }
    }
}

impl Station for SinkStation {
    type Input = String;
    type Output = ();

    fn name(&self) -> &'static str {
        self.sink.name()
    }

    fn process(&mut self, text: String) -> Result<Option<()>, StationError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        match self.sink.handle(&text) {
            Ok(()) => {
                self.delivered += 1;
                if !self.quiet {
                    render_stable(&text);
                }
                Ok(Some(()))
            }
            Err(e) => {
                // A sink hiccup must not kill the frame path.
                Err(StationError::Recoverable(format!(
                    "failed to deliver \"{}\": {}",
                    text, e
                )))
            }
        }
    }

    fn shutdown(&mut self) {
        let result = self.sink.finish();
        if let Some(tx) = self.result_tx.take()
            && tx.send(result).is_err()
        {
            eprintln!("textsift: sink shutdown — result receiver already dropped");
        }
    }
}

/// Collects stable strings for tests and library use.
/// Returns them newline-joined on finish().
pub struct CollectorSink {
    collected: Vec<String>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self {
            collected: Vec::new(),
        }
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StableSink for CollectorSink {
    fn handle(&mut self, text: &str) -> crate::error::Result<()> {
        self.collected.push(text.to_string());
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        if self.collected.is_empty() {
            None
        } else {
            Some(self.collected.join("\n"))
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// CLI sink — writes stable strings to stdout, one per line.
pub struct StdoutSink;

impl StableSink for StdoutSink {
    fn handle(&mut self, text: &str) -> crate::error::Result<()> {
        println!("{}", text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
