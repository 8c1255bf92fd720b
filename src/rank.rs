//! Priority ranking of deduplicated text candidates.
//!
//! Every sighting of an interesting string either inserts it at priority 1
//! or escalates its existing entry by 1, so a candidate's priority always
//! equals its sighting count since the last reset. The structure is an
//! indexed binary max-heap: the heap gives O(log n) escalate/extract under
//! frame-rate call pressure, the side index maps text to its heap slot so
//! "escalate if present" never scans.

use std::cmp::Reverse;
use std::collections::HashMap;

/// A deduplicated text candidate with its escalating priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub priority: u32,
}

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    priority: u32,
    /// Insertion order within the current epoch; earlier entries win ties
    /// so equal-priority extraction is deterministic (FIFO).
    seq: u64,
}

impl Entry {
    fn beats(&self, other: &Entry) -> bool {
        (self.priority, Reverse(self.seq)) > (other.priority, Reverse(other.seq))
    }
}

/// Max-priority queue over deduplicated candidates.
///
/// Invariants: at most one entry per distinct text; priorities never
/// decrease within one epoch; `extract_max` always yields the entry with
/// the numerically greatest priority, ties broken by insertion order.
#[derive(Debug, Default)]
pub struct RankedCandidateQueue {
    heap: Vec<Entry>,
    /// text → current heap slot. Updated on every heap swap.
    index: HashMap<String, usize>,
    next_seq: u64,
}

impl RankedCandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `text` at priority 1, or escalates an existing entry by 1.
    pub fn insert_or_escalate(&mut self, text: &str) {
        if let Some(&pos) = self.index.get(text) {
            self.heap[pos].priority += 1;
            self.sift_up(pos);
        } else {
            let entry = Entry {
                text: text.to_string(),
                priority: 1,
                seq: self.next_seq,
            };
            self.next_seq += 1;
            self.heap.push(entry);
            let pos = self.heap.len() - 1;
            self.index.insert(text.to_string(), pos);
            self.sift_up(pos);
        }
    }

    /// The current top candidate without removing it.
    pub fn peek_max(&self) -> Option<Candidate> {
        self.heap.first().map(|entry| Candidate {
            text: entry.text.clone(),
            priority: entry.priority,
        })
    }

    /// Removes and returns the top candidate.
    pub fn extract_max(&mut self) -> Option<Candidate> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap_entries(0, last);
        let entry = self.heap.pop()?;
        self.index.remove(&entry.text);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(Candidate {
            text: entry.text,
            priority: entry.priority,
        })
    }

    /// Discards every candidate, starting a new epoch.
    pub fn reset(&mut self) {
        self.heap.clear();
        self.index.clear();
        self.next_seq = 0;
    }

    pub fn contains(&self, text: &str) -> bool {
        self.index.contains_key(text)
    }

    pub fn priority_of(&self, text: &str) -> Option<u32> {
        self.index.get(text).map(|&pos| self.heap[pos].priority)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.index.insert(self.heap[a].text.clone(), a);
        self.index.insert(self.heap[b].text.clone(), b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].beats(&self.heap[parent]) {
                self.swap_entries(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut best = pos;
            if left < self.heap.len() && self.heap[left].beats(&self.heap[best]) {
                best = left;
            }
            if right < self.heap.len() && self.heap[right].beats(&self.heap[best]) {
                best = right;
            }
            if best == pos {
                break;
            }
            self.swap_entries(pos, best);
            pos = best;
        }
    }
}
