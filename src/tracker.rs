//! Temporal stability tracking over per-frame recognition batches.
//!
//! OCR on live video misreads constantly: a string that flickers into a
//! single frame is noise, a string that survives most of a short window is
//! a genuine reading. The tracker keeps a bounded FIFO window of recent
//! frame batches and an incrementally maintained per-string sighting count
//! so `stable()` is an O(strings-in-window) scan, not a window replay.

use crate::defaults;
use std::collections::{HashMap, HashSet, VecDeque};

/// Configuration for the stability tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Number of recent frames remembered (W).
    pub window_size: usize,
    /// Minimum sightings within the window for a string to be stable (K).
    pub min_sightings: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_size: defaults::WINDOW_SIZE,
            min_sightings: defaults::MIN_SIGHTINGS,
        }
    }
}

/// Tracks which recognized strings persist across recent frames.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    config: TrackerConfig,
    /// The last `window_size` frames, oldest first. One set per frame so a
    /// string repeated within a single batch counts once.
    window: VecDeque<HashSet<String>>,
    /// Sighting count per string across the current window. Kept in sync
    /// with `window` on every observe/forget.
    counts: HashMap<String, usize>,
}

impl StabilityTracker {
    pub fn new(config: TrackerConfig) -> Self {
        // A zero-size window or threshold would make every query trivially
        // empty; clamp to 1 so a misconfigured tracker still behaves.
        let config = TrackerConfig {
            window_size: config.window_size.max(1),
            min_sightings: config.min_sightings.max(1),
        };
        Self {
            config,
            window: VecDeque::with_capacity(config.window_size),
            counts: HashMap::new(),
        }
    }

    /// Records one frame's worth of recognized strings.
    ///
    /// Evicts the oldest frame once the window is full. An empty batch is a
    /// valid frame: it carries no sightings but still ages the window.
    pub fn observe<S: AsRef<str>>(&mut self, batch: &[S]) {
        if self.window.len() == self.config.window_size
            && let Some(oldest) = self.window.pop_front()
        {
            for text in oldest {
                if let Some(count) = self.counts.get_mut(&text) {
                    *count -= 1;
                    if *count == 0 {
                        self.counts.remove(&text);
                    }
                }
            }
        }

        let frame: HashSet<String> = batch.iter().map(|s| s.as_ref().to_string()).collect();
        for text in &frame {
            *self.counts.entry(text.clone()).or_insert(0) += 1;
        }
        self.window.push_back(frame);
    }

    /// Returns the string currently judged stable, if any.
    ///
    /// A string qualifies when it was sighted in at least `min_sightings`
    /// of the frames in the window. Among qualifiers the highest count
    /// wins; equal counts tie-break to the lexicographically smallest
    /// string so the answer is deterministic for a given window.
    pub fn stable(&self) -> Option<&str> {
        self.counts
            .iter()
            .filter(|&(_, &count)| count >= self.config.min_sightings)
            .max_by(|(text_a, count_a), (text_b, count_b)| {
                count_a.cmp(count_b).then_with(|| text_b.cmp(text_a))
            })
            .map(|(text, _)| text.as_str())
    }

    /// Erases all window history of `text`.
    ///
    /// Called after a stable string has been consumed downstream so the
    /// same value cannot immediately re-qualify; it must accumulate
    /// `min_sightings` fresh sightings again.
    pub fn forget(&mut self, text: &str) {
        self.counts.remove(text);
        for frame in &mut self.window {
            frame.remove(text);
        }
    }

    /// Number of frames currently held in the window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Sightings of `text` within the current window.
    pub fn sightings(&self, text: &str) -> usize {
        self.counts.get(text).copied().unwrap_or(0)
    }
}

impl Default for StabilityTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
