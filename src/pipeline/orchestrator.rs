//! Frame pipeline that runs from startup until source exhaustion or shutdown.

use crate::error::Result;
use crate::frames::{FrameBatch, FrameSource};
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::observer::{InterestPredicate, ObserverStation, marker_predicate};
use crate::pipeline::sink::{SinkStation, StableSink};
use crate::pipeline::station::StationRunner;
use crate::rank::RankedCandidateQueue;
use crate::tracker::{StabilityTracker, TrackerConfig};
use crate::{defaults, output};
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the frame pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Stability tracker tuning (window size W, threshold K)
    pub tracker: TrackerConfig,
    /// Marker substring for the interesting-text predicate
    pub marker: String,
    /// Suppress output messages
    pub quiet: bool,
    /// Verbosity level (0=results only, 1=summary, 2=per-frame diagnostics)
    pub verbosity: u8,
    /// Channel buffer sizes
    pub frame_buffer: usize,
    pub stable_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            marker: defaults::INTERESTING_MARKER.to_string(),
            quiet: false,
            verbosity: 0,
            frame_buffer: defaults::FRAME_BUFFER,
            stable_buffer: defaults::STABLE_BUFFER,
        }
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    /// Flag to signal shutdown
    running: Arc<AtomicBool>,
    /// Join handles for spawned threads
    threads: Vec<JoinHandle<()>>,
    /// Receiver for the sink's finish() result
    result_rx: Option<crossbeam_channel::Receiver<Option<String>>>,
    /// Signaled once when the frame source is exhausted
    done_rx: crossbeam_channel::Receiver<()>,
}

impl PipelineHandle {
    /// A receiver that fires once when the frame source runs out.
    ///
    /// Lets callers wait for finite sources (files, pipes) without polling.
    pub fn done_receiver(&self) -> crossbeam_channel::Receiver<()> {
        self.done_rx.clone()
    }

    /// Returns true if the pipeline is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the pipeline gracefully and returns the sink's accumulated result.
    ///
    /// Waits up to 5s for the result, then 1s for threads to finish.
    /// After the deadline, remaining threads are detached — they die with
    /// the process.
    pub fn stop(mut self) -> Option<String> {
        self.running.store(false, Ordering::SeqCst);

        // The result may arrive before all threads finish (the sink sends it
        // during shutdown while its wrapper thread is still joining). Allow
        // time for in-flight frames to drain.
        let result = self
            .result_rx
            .as_ref()
            .and_then(|rx| rx.recv_timeout(Duration::from_secs(5)).ok().flatten());

        let deadline = Instant::now() + Duration::from_secs(1);
        let poll_interval = Duration::from_millis(50);

        loop {
            // Drain finished threads, joining each to catch panics
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("textsift: pipeline thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= deadline {
                eprintln!(
                    "textsift: shutdown timeout — {} thread(s) still running, detaching",
                    self.threads.len()
                );
                // Dropping JoinHandles detaches threads; they die with the process.
                break;
            }

            thread::sleep(poll_interval);
        }

        result
    }
}

/// Frame pipeline: FrameSource → Observer → StableSink.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl Pipeline {
    /// Creates a new pipeline with the default stderr error reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Starts the pipeline.
    ///
    /// # Arguments
    /// * `source` - Frame batch input
    /// * `sink` - Stable-string output handler
    /// * `queue` - Candidate queue shared with the flush controller
    pub fn start(
        self,
        source: Box<dyn FrameSource>,
        sink: Box<dyn StableSink>,
        queue: Arc<Mutex<RankedCandidateQueue>>,
    ) -> Result<PipelineHandle> {
        let predicate: InterestPredicate = marker_predicate(&self.config.marker);
        self.start_with_predicate(source, sink, queue, predicate)
    }

    /// Starts the pipeline with a custom interesting-text predicate.
    pub fn start_with_predicate(
        self,
        mut source: Box<dyn FrameSource>,
        sink: Box<dyn StableSink>,
        queue: Arc<Mutex<RankedCandidateQueue>>,
        predicate: InterestPredicate,
    ) -> Result<PipelineHandle> {
        let running = Arc::new(AtomicBool::new(true));

        let (frame_tx, frame_rx) = bounded(self.config.frame_buffer);
        let (stable_tx, stable_rx) = bounded(self.config.stable_buffer);
        let (result_tx, result_rx) = bounded(1);
        let (done_tx, done_rx) = bounded(1);

        let observer = ObserverStation::new(
            StabilityTracker::new(self.config.tracker),
            queue,
            predicate,
        )
        .with_verbosity(self.config.verbosity);

        let sink_station = SinkStation::new(sink, self.config.quiet, result_tx);

        let observer_runner = StationRunner::spawn(
            observer,
            frame_rx,
            stable_tx,
            self.error_reporter.clone(),
        );

        // Terminal station gets a dummy output channel, drained below.
        let (sink_out_tx, sink_out_rx) = bounded::<()>(self.config.stable_buffer);
        let sink_runner = StationRunner::spawn(
            sink_station,
            stable_rx,
            sink_out_tx,
            self.error_reporter.clone(),
        );

        // Drain the sink output in a separate thread
        let drain_running = running.clone();
        let drain_handle = thread::spawn(move || {
            while drain_running.load(Ordering::SeqCst) {
                if sink_out_rx
                    .recv_timeout(Duration::from_millis(100))
                    .is_err()
                    && !drain_running.load(Ordering::SeqCst)
                {
                    break;
                }
            }
        });

        source.start()?;
        let quiet = self.config.quiet;
        let verbosity = self.config.verbosity;

        // Spawn the source polling thread
        let source_running = running.clone();
        let source_handle = thread::spawn(move || {
            let mut consecutive_errors: u32 = 0;
            const MAX_CONSECUTIVE_ERRORS: u32 = 10;
            let mut frames_sent: u64 = 0;
            let mut frames_dropped: u64 = 0;

            while source_running.load(Ordering::SeqCst) {
                let batch = match source.next_batch() {
                    Ok(Some(batch)) => {
                        consecutive_errors = 0;
                        batch
                    }
                    Ok(None) => {
                        // Source exhausted
                        break;
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if !quiet {
                            output::clear_line();
                            eprintln!("textsift: {e}");
                        }
                        if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                            eprintln!(
                                "textsift: frame source failed {consecutive_errors} times in a row, giving up"
                            );
                            break;
                        }
                        continue;
                    }
                };

                // Frames arrive at camera cadence: when the observer falls
                // behind, dropping beats queueing up a stale backlog.
                if frame_tx.try_send(batch).is_err() {
                    if !source_running.load(Ordering::SeqCst) {
                        break;
                    }
                    frames_dropped += 1;
                } else {
                    frames_sent += 1;
                }
            }

            if verbosity >= 1 && frames_dropped > 0 {
                eprintln!(
                    "textsift: dropped {frames_dropped} of {} frames under backpressure",
                    frames_sent + frames_dropped
                );
            }

            // Closing frame_tx lets the stations drain and shut down.
            drop(frame_tx);
            let _ = done_tx.try_send(());
        });

        let mut threads = vec![source_handle, drain_handle];
        threads.push(thread::spawn(move || {
            if let Err(msg) = observer_runner.join() {
                eprintln!("textsift: {msg}");
            }
        }));
        threads.push(thread::spawn(move || {
            if let Err(msg) = sink_runner.join() {
                eprintln!("textsift: {msg}");
            }
        }));

        Ok(PipelineHandle {
            running,
            threads,
            result_rx: Some(result_rx),
            done_rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::MockFrameSource;
    use crate::pipeline::sink::CollectorSink;

    fn quiet_config(window: usize, threshold: usize) -> PipelineConfig {
        PipelineConfig {
            tracker: TrackerConfig {
                window_size: window,
                min_sightings: threshold,
            },
            quiet: true,
            ..Default::default()
        }
    }

    fn shared_queue() -> Arc<Mutex<RankedCandidateQueue>> {
        Arc::new(Mutex::new(RankedCandidateQueue::new()))
    }

    /// Wait for source exhaustion, then stop and return the collector result.
    fn run_to_completion(handle: PipelineHandle) -> Option<String> {
        handle
            .done_receiver()
            .recv_timeout(Duration::from_secs(5))
            .expect("source did not finish in time");
        handle.stop()
    }

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.frame_buffer, defaults::FRAME_BUFFER);
        assert_eq!(config.stable_buffer, defaults::STABLE_BUFFER);
        assert_eq!(config.marker, "?");
        assert_eq!(config.verbosity, 0);
        assert!(!config.quiet);
    }

    #[test]
    fn test_handle_is_running_and_stop() {
        let running = Arc::new(AtomicBool::new(true));
        let (_done_tx, done_rx) = bounded(1);
        let handle = PipelineHandle {
            running: running.clone(),
            threads: vec![],
            result_rx: None,
            done_rx,
        };

        assert!(handle.is_running());
        let result = handle.stop();
        assert!(result.is_none());
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_handle_stop_returns_result_from_channel() {
        let running = Arc::new(AtomicBool::new(true));
        let (result_tx, result_rx) = bounded(1);
        result_tx.send(Some("stable text".to_string())).unwrap();
        drop(result_tx);
        let (_done_tx, done_rx) = bounded(1);

        let handle = PipelineHandle {
            running,
            threads: vec![],
            result_rx: Some(result_rx),
            done_rx,
        };

        assert_eq!(handle.stop(), Some("stable text".to_string()));
    }

    #[test]
    fn test_handle_stop_returns_none_when_channel_disconnected() {
        let running = Arc::new(AtomicBool::new(true));
        let (result_tx, result_rx) = bounded::<Option<String>>(1);
        drop(result_tx);
        let (_done_tx, done_rx) = bounded(1);

        let handle = PipelineHandle {
            running,
            threads: vec![],
            result_rx: Some(result_rx),
            done_rx,
        };

        assert!(handle.stop().is_none());
    }

    #[test]
    fn test_pipeline_stable_string_reaches_sink() {
        let source = MockFrameSource::new()
            .with_batch(vec!["X", "Y"])
            .with_batch(vec!["X", "Z"])
            .with_batch(vec!["X", "W"]);

        let pipeline = Pipeline::new(quiet_config(3, 2));
        let handle = pipeline
            .start(Box::new(source), Box::new(CollectorSink::new()), shared_queue())
            .unwrap();

        let result = run_to_completion(handle);
        assert_eq!(result, Some("X".to_string()));
    }

    #[test]
    fn test_pipeline_feeds_shared_queue() {
        let source = MockFrameSource::new()
            .with_repeated(vec!["A?"], 3)
            .with_batch(vec!["B?", "plain"]);

        let queue = shared_queue();
        let pipeline = Pipeline::new(quiet_config(10, 8));
        let handle = pipeline
            .start(
                Box::new(source),
                Box::new(CollectorSink::new()),
                queue.clone(),
            )
            .unwrap();

        let _ = run_to_completion(handle);

        let q = queue.lock().unwrap();
        assert_eq!(q.priority_of("A?"), Some(3));
        assert_eq!(q.priority_of("B?"), Some(1));
        assert!(!q.contains("plain"));
    }

    #[test]
    fn test_pipeline_noise_never_surfaces() {
        // Every string appears exactly once: nothing stabilizes.
        let source = MockFrameSource::new()
            .with_batch(vec!["a"])
            .with_batch(vec!["b"])
            .with_batch(vec!["c"])
            .with_batch(vec!["d"]);

        let pipeline = Pipeline::new(quiet_config(3, 2));
        let handle = pipeline
            .start(Box::new(source), Box::new(CollectorSink::new()), shared_queue())
            .unwrap();

        assert_eq!(run_to_completion(handle), None);
    }

    #[test]
    fn test_pipeline_empty_source() {
        let pipeline = Pipeline::new(quiet_config(3, 2));
        let handle = pipeline
            .start(
                Box::new(MockFrameSource::new()),
                Box::new(CollectorSink::new()),
                shared_queue(),
            )
            .unwrap();

        assert_eq!(run_to_completion(handle), None);
    }

    #[test]
    fn test_pipeline_source_read_errors_exit_after_threshold() {
        let source = MockFrameSource::new().with_read_failure();
        let pipeline = Pipeline::new(quiet_config(3, 2));
        let handle = pipeline
            .start(Box::new(source), Box::new(CollectorSink::new()), shared_queue())
            .unwrap();

        // 10 consecutive errors → source thread gives up and signals done.
        assert_eq!(run_to_completion(handle), None);
    }

    #[test]
    fn test_pipeline_custom_predicate() {
        let source = MockFrameSource::new().with_batch(vec!["serial#42", "A?"]);
        let queue = shared_queue();
        let pipeline = Pipeline::new(quiet_config(3, 2));
        let handle = pipeline
            .start_with_predicate(
                Box::new(source),
                Box::new(CollectorSink::new()),
                queue.clone(),
                Arc::new(|text: &str| text.contains('#')),
            )
            .unwrap();

        let _ = run_to_completion(handle);

        let q = queue.lock().unwrap();
        assert!(q.contains("serial#42"));
        assert!(!q.contains("A?"));
    }

    #[test]
    fn test_pipeline_thread_panic_is_reported() {
        // stop() joins all threads; a panicking one is logged, not hung on.
        let running = Arc::new(AtomicBool::new(true));
        let (_done_tx, done_rx) = bounded(1);
        let panicking_handle = thread::spawn(|| {
            panic!("intentional test panic");
        });

        let handle = PipelineHandle {
            running: running.clone(),
            threads: vec![panicking_handle],
            result_rx: None,
            done_rx,
        };

        assert!(handle.stop().is_none());
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_pipeline_stop_timeout_on_stuck_thread() {
        let running = Arc::new(AtomicBool::new(true));
        let (_done_tx, done_rx) = bounded(1);

        let stuck_running = running.clone();
        let stuck_handle = thread::spawn(move || {
            while stuck_running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(10));
            }
            // Simulate being stuck even after running=false
            thread::park();
        });

        let handle = PipelineHandle {
            running: running.clone(),
            threads: vec![stuck_handle],
            result_rx: None,
            done_rx,
        };

        let start = Instant::now();
        let result = handle.stop();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_secs(5),
            "stop() took {:?} — should complete within 5s even with stuck threads",
            elapsed
        );
        assert!(result.is_none());
    }
}
