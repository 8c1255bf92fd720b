//! Default configuration constants for textsift.
//!
//! Shared between the config types, the CLI defaults, and the tests so the
//! tunables live in exactly one place.

/// Default stability window size in frames.
///
/// The tracker only remembers this many recent frame batches. At typical
/// video frame rates (~30fps processed at a fraction of that) ten frames
/// keeps the reaction time in the low hundreds of milliseconds while still
/// giving one-frame recognition noise nothing to hold on to.
pub const WINDOW_SIZE: usize = 10;

/// Default minimum sightings for a string to count as stable.
///
/// A string must appear in at least this many of the last `WINDOW_SIZE`
/// frames before it is reported. Six of ten demands a clear majority
/// without requiring perfect recognition on every frame.
pub const MIN_SIGHTINGS: usize = 6;

/// Default flush interval in seconds.
///
/// The candidate queue is flushed (top candidate posted, everything else
/// discarded) on this fixed cadence, independent of frame arrival.
pub const FLUSH_INTERVAL_SECS: u64 = 20;

/// Default marker substring for the interesting-text predicate.
///
/// Candidates containing this substring are fed into the ranking queue.
/// A `?` in recognized text flags an ambiguous reading that needs
/// downstream confirmation.
pub const INTERESTING_MARKER: &str = "?";

/// Default per-request timeout for the notification sink, in seconds.
pub const SINK_TIMEOUT_SECS: u64 = 5;

/// Default channel capacity between the frame source and the observer.
pub const FRAME_BUFFER: usize = 1024;

/// Default channel capacity between the observer and the stable-text sink.
pub const STABLE_BUFFER: usize = 64;
