//! Periodic flush controller for the candidate queue.
//!
//! A fixed-interval tokio task, decoupled from the frame cadence. Each tick
//! takes the queue lock exactly once: extract the top candidate, then reset
//! the queue unconditionally — the epoch ends whether or not anything was
//! queued. The extracted text is handed to the notification sink on a
//! detached task so delivery latency never stalls the tick loop or the
//! frame path. Ticks are single-flight by construction: the loop body runs
//! inline in one task, so a slow epoch delays the next tick instead of
//! overlapping it.

use crate::defaults;
use crate::notify::NotificationSink;
use crate::output;
use crate::rank::{Candidate, RankedCandidateQueue};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Drives flush epochs on a fixed wall-clock cadence.
pub struct FlushController {
    queue: Arc<Mutex<RankedCandidateQueue>>,
    sink: Arc<dyn NotificationSink>,
    interval: Duration,
    quiet: bool,
}

impl FlushController {
    pub fn new(queue: Arc<Mutex<RankedCandidateQueue>>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            queue,
            sink,
            interval: Duration::from_secs(defaults::FLUSH_INTERVAL_SECS),
            quiet: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Ends the current epoch: extract the best candidate and clear the queue.
    ///
    /// One lock acquisition covers both steps, so the frame path never sees
    /// a half-flushed queue. Returns the extracted candidate, if any.
    pub fn flush_epoch(queue: &Mutex<RankedCandidateQueue>) -> Option<Candidate> {
        match queue.lock() {
            Ok(mut queue) => {
                let top = queue.extract_max();
                queue.reset();
                top
            }
            Err(_) => {
                eprintln!("textsift: candidate queue lock poisoned, skipping flush");
                None
            }
        }
    }

    /// Spawns the tick loop on the current tokio runtime.
    pub fn spawn(self) -> FlushHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let queue = self.queue.clone();
        let sink = self.sink.clone();
        let quiet = self.quiet;
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick fires immediately; swallow it so the
            // first real flush happens one full period after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Some(candidate) = Self::flush_epoch(&queue) {
                            dispatch(sink.clone(), candidate, quiet);
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        FlushHandle {
            task,
            shutdown_tx: Some(shutdown_tx),
            queue: self.queue,
            sink: self.sink,
            quiet,
        }
    }
}

/// Hands a candidate to the sink without awaiting the delivery.
fn dispatch(sink: Arc<dyn NotificationSink>, candidate: Candidate, quiet: bool) {
    tokio::spawn(async move {
        if !quiet {
            output::render_flush(&candidate.text, candidate.priority);
        }
        if let Err(e) = sink.deliver(&candidate.text).await {
            eprintln!("textsift: [{}] {}", sink.name(), e);
        }
    });
}

/// Handle to a running flush controller.
pub struct FlushHandle {
    task: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    queue: Arc<Mutex<RankedCandidateQueue>>,
    sink: Arc<dyn NotificationSink>,
    quiet: bool,
}

impl FlushHandle {
    /// Stops the tick loop, then runs one final awaited flush so candidates
    /// gathered since the last tick are not dropped on shutdown.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await
            && !e.is_cancelled()
        {
            eprintln!("textsift: flush task failed: {e}");
        }

        if let Some(candidate) = FlushController::flush_epoch(&self.queue) {
            if !self.quiet {
                output::render_flush(&candidate.text, candidate.priority);
            }
            if let Err(e) = self.sink.deliver(&candidate.text).await {
                eprintln!("textsift: [{}] {}", self.sink.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::CollectorNotificationSink;
    use tokio::time::{advance, sleep};

    fn queue_with(sightings: &[(&str, usize)]) -> Arc<Mutex<RankedCandidateQueue>> {
        let mut queue = RankedCandidateQueue::new();
        for (text, count) in sightings {
            for _ in 0..*count {
                queue.insert_or_escalate(text);
            }
        }
        Arc::new(Mutex::new(queue))
    }

    #[test]
    fn flush_epoch_extracts_top_and_resets() {
        let queue = queue_with(&[("A?", 3), ("B?", 1)]);

        let top = FlushController::flush_epoch(&queue).unwrap();
        assert_eq!(top.text, "A?");
        assert_eq!(top.priority, 3);

        // Reset is unconditional: "B?" is gone too.
        let q = queue.lock().unwrap();
        assert!(q.is_empty());
        assert!(!q.contains("B?"));
    }

    #[test]
    fn flush_epoch_on_empty_queue_is_a_no_op_that_still_resets() {
        let queue = queue_with(&[]);
        assert!(FlushController::flush_epoch(&queue).is_none());
        assert!(queue.lock().unwrap().is_empty());
    }

    #[test]
    fn flush_epoch_twice_second_is_empty() {
        // Two ticks, no inserts in between: first flushes, second finds nothing.
        let queue = queue_with(&[("X?", 2)]);
        assert_eq!(FlushController::flush_epoch(&queue).unwrap().text, "X?");
        assert!(FlushController::flush_epoch(&queue).is_none());
        assert!(queue.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn controller_flushes_on_the_tick_cadence() {
        let queue = queue_with(&[("A?", 3), ("B?", 1)]);
        let sink = Arc::new(CollectorNotificationSink::new());

        let handle = FlushController::new(queue.clone(), sink.clone())
            .with_interval(Duration::from_secs(20))
            .with_quiet(true)
            .spawn();
        // Let the controller task create its ticker before advancing time.
        sleep(Duration::from_millis(1)).await;

        // Nothing before the first period elapses.
        advance(Duration::from_secs(19)).await;
        assert!(sink.delivered().is_empty());

        advance(Duration::from_secs(2)).await;
        // Let the detached dispatch task run.
        sleep(Duration::from_millis(1)).await;
        assert_eq!(sink.delivered(), vec!["A?"]);
        assert!(queue.lock().unwrap().is_empty());

        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_tick_sends_nothing_and_queue_stays_empty() {
        let queue = queue_with(&[]);
        let sink = Arc::new(CollectorNotificationSink::new());

        let handle = FlushController::new(queue.clone(), sink.clone())
            .with_interval(Duration::from_secs(20))
            .with_quiet(true)
            .spawn();
        sleep(Duration::from_millis(1)).await;

        advance(Duration::from_secs(21)).await;
        sleep(Duration::from_millis(1)).await;
        assert!(sink.delivered().is_empty());
        assert!(queue.lock().unwrap().is_empty());

        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn two_ticks_flush_then_idle() {
        // Tick 1 flushes the pre-queued candidate; tick 2 has nothing.
        let queue = queue_with(&[("X?", 1)]);
        let sink = Arc::new(CollectorNotificationSink::new());

        let handle = FlushController::new(queue.clone(), sink.clone())
            .with_interval(Duration::from_secs(20))
            .with_quiet(true)
            .spawn();
        sleep(Duration::from_millis(1)).await;

        advance(Duration::from_secs(21)).await;
        sleep(Duration::from_millis(1)).await;
        assert_eq!(sink.delivered(), vec!["X?"]);

        advance(Duration::from_secs(20)).await;
        sleep(Duration::from_millis(1)).await;
        assert_eq!(sink.delivered(), vec!["X?"]);
        assert!(queue.lock().unwrap().is_empty());

        drop(handle);
    }

    #[tokio::test(start_paused = true)]
    async fn inserts_between_ticks_land_in_the_next_epoch() {
        let queue = queue_with(&[("first?", 1)]);
        let sink = Arc::new(CollectorNotificationSink::new());

        let handle = FlushController::new(queue.clone(), sink.clone())
            .with_interval(Duration::from_secs(10))
            .with_quiet(true)
            .spawn();
        sleep(Duration::from_millis(1)).await;

        advance(Duration::from_secs(11)).await;
        sleep(Duration::from_millis(1)).await;
        assert_eq!(sink.delivered(), vec!["first?"]);

        queue.lock().unwrap().insert_or_escalate("second?");

        advance(Duration::from_secs(10)).await;
        sleep(Duration::from_millis(1)).await;
        assert_eq!(sink.delivered(), vec!["first?", "second?"]);

        drop(handle);
    }

    #[tokio::test]
    async fn stop_performs_a_final_flush() {
        let queue = queue_with(&[("pending?", 2)]);
        let sink = Arc::new(CollectorNotificationSink::new());

        let handle = FlushController::new(queue.clone(), sink.clone())
            .with_interval(Duration::from_secs(3600))
            .with_quiet(true)
            .spawn();

        handle.stop().await;
        assert_eq!(sink.delivered(), vec!["pending?"]);
        assert!(queue.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stop_with_empty_queue_sends_nothing() {
        let queue = queue_with(&[]);
        let sink = Arc::new(CollectorNotificationSink::new());

        let handle = FlushController::new(queue.clone(), sink.clone())
            .with_interval(Duration::from_secs(3600))
            .with_quiet(true)
            .spawn();

        handle.stop().await;
        assert!(sink.delivered().is_empty());
    }
}
