//! Application entry point for the watch command.
//!
//! Wires the complete flow: frame stream → stability filter → shared
//! candidate queue → periodic flush → notification sink.

use crate::config::Config;
use crate::error::Result;
use crate::flush::FlushController;
use crate::frames::{FrameFormat, ReaderFrameSource};
use crate::notify::{HttpNotificationSink, LogNotificationSink, NotificationSink};
use crate::pipeline::orchestrator::{Pipeline, PipelineConfig};
use crate::pipeline::sink::StdoutSink;
use crate::rank::RankedCandidateQueue;
use crate::tracker::TrackerConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Run the watch command: read frames from stdin until the stream ends or
/// Ctrl-C, printing stable strings and flushing ranked candidates on a timer.
///
/// # Arguments
/// * `config` - Base configuration (can be overridden by CLI args)
/// * `endpoint` - Optional notification endpoint override from CLI
/// * `interval` - Optional flush interval override from CLI, in seconds
/// * `window` - Optional stability window override from CLI
/// * `threshold` - Optional stability threshold override from CLI
/// * `marker` - Optional interesting-marker override from CLI
/// * `plain` - Read tab-separated lines instead of JSON arrays
/// * `quiet` - Suppress status messages
/// * `verbosity` - Verbosity level (0=results only, 1=summary, 2=per-frame)
#[allow(clippy::too_many_arguments)]
pub async fn run_watch_command(
    mut config: Config,
    endpoint: Option<String>,
    interval: Option<u64>,
    window: Option<usize>,
    threshold: Option<usize>,
    marker: Option<String>,
    plain: bool,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    // Apply CLI overrides
    if let Some(e) = endpoint {
        config.sink.endpoint = Some(e);
    }
    if let Some(i) = interval {
        config.rank.flush_interval_secs = i;
    }
    if let Some(w) = window {
        config.tracker.window_size = w;
    }
    if let Some(t) = threshold {
        config.tracker.min_sightings = t;
    }
    if let Some(m) = marker {
        config.rank.marker = m;
    }
    if plain {
        config.input.format = FrameFormat::Plain;
    }
    config.validate()?;

    let queue = Arc::new(Mutex::new(RankedCandidateQueue::new()));

    let notify_sink: Arc<dyn NotificationSink> = match &config.sink.endpoint {
        Some(endpoint) => {
            if !quiet {
                eprintln!("textsift: posting flushed candidates to {endpoint}");
            }
            Arc::new(HttpNotificationSink::new(
                endpoint.clone(),
                Duration::from_secs(config.sink.timeout_secs),
            )?)
        }
        None => Arc::new(LogNotificationSink),
    };

    let flush_handle = FlushController::new(queue.clone(), notify_sink)
        .with_interval(Duration::from_secs(config.rank.flush_interval_secs))
        .with_quiet(quiet)
        .spawn();

    // BufReader over Stdin rather than StdinLock: the lock guard is !Send
    // and the source moves onto the pipeline's polling thread.
    let source = ReaderFrameSource::new(
        std::io::BufReader::new(std::io::stdin()),
        config.input.format,
    );
    let pipeline = Pipeline::new(PipelineConfig {
        tracker: TrackerConfig {
            window_size: config.tracker.window_size,
            min_sightings: config.tracker.min_sightings,
        },
        marker: config.rank.marker.clone(),
        quiet,
        verbosity,
        ..Default::default()
    });
    let handle = pipeline.start(Box::new(source), Box::new(StdoutSink), queue)?;

    // Wait for stream end or Ctrl-C, whichever comes first. done_receiver is
    // a blocking crossbeam channel, so park it on the blocking pool.
    let done_rx = handle.done_receiver();
    let exhausted = tokio::task::spawn_blocking(move || done_rx.recv().is_ok());
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            if !quiet {
                eprintln!("textsift: interrupted, shutting down");
            }
        }
        _ = exhausted => {
            if verbosity >= 1 {
                eprintln!("textsift: frame stream ended");
            }
        }
    }

    let _ = handle.stop();
    // Final flush: candidates gathered since the last tick still go out.
    flush_handle.stop().await;

    Ok(())
}
