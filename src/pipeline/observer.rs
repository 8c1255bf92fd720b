//! Observer station: the per-frame half of the core.
//!
//! For every frame batch it (a) feeds candidates matching the interesting
//! predicate into the shared ranking queue and (b) records the batch in its
//! stability tracker, reporting a string downstream once it stabilizes. The
//! tracker is owned here; only the queue is shared with the flush task.

use crate::frames::FrameBatch;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::rank::RankedCandidateQueue;
use crate::tracker::StabilityTracker;
use std::sync::{Arc, Mutex};

/// Predicate gating which candidates enter the ranking queue.
pub type InterestPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Builds the default predicate: text containing `marker` is interesting.
pub fn marker_predicate(marker: &str) -> InterestPredicate {
    let marker = marker.to_string();
    Arc::new(move |text: &str| text.contains(&marker))
}

pub struct ObserverStation {
    tracker: StabilityTracker,
    queue: Arc<Mutex<RankedCandidateQueue>>,
    is_interesting: InterestPredicate,
    frames_seen: u64,
    stable_reported: u64,
    verbosity: u8,
}

impl ObserverStation {
    pub fn new(
        tracker: StabilityTracker,
        queue: Arc<Mutex<RankedCandidateQueue>>,
        is_interesting: InterestPredicate,
    ) -> Self {
        Self {
            tracker,
            queue,
            is_interesting,
            frames_seen: 0,
            stable_reported: 0,
            verbosity: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}

impl Station for ObserverStation {
    type Input = FrameBatch;
    type Output = String;

    fn name(&self) -> &'static str {
        "observer"
    }

    fn process(&mut self, batch: FrameBatch) -> Result<Option<String>, StationError> {
        self.frames_seen += 1;

        // Queue feed happens before the stability check so a candidate's
        // priority reflects every sighting, stable or not. One lock
        // acquisition per frame keeps the flush task's epoch atomic.
        let interesting: Vec<&String> = batch
            .texts
            .iter()
            .filter(|text| (self.is_interesting)(text))
            .collect();
        if !interesting.is_empty() {
            let mut queue = self
                .queue
                .lock()
                .map_err(|_| StationError::Fatal("candidate queue lock poisoned".to_string()))?;
            for text in interesting {
                queue.insert_or_escalate(text);
            }
        }

        self.tracker.observe(&batch.texts);

        match self.tracker.stable() {
            Some(stable) => {
                let stable = stable.to_string();
                // Forget immediately so the same value cannot re-report on
                // the very next frame.
                self.tracker.forget(&stable);
                self.stable_reported += 1;
                if self.verbosity >= 2 {
                    eprintln!(
                        "textsift: frame {} stable \"{}\" ({} reported so far)",
                        batch.sequence, stable, self.stable_reported
                    );
                }
                Ok(Some(stable))
            }
            None => Ok(None),
        }
    }

    fn shutdown(&mut self) {
        if self.verbosity >= 1 {
            eprintln!(
                "textsift: observer done — {} frames, {} stable strings",
                self.frames_seen, self.stable_reported
            );
        }
    }
}
