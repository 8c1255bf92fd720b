//! textsift - Stability filtering and ranked flushing for noisy text streams
//!
//! Feeds frame batches of recognized text through a bounded-window stability
//! filter, ranks the interesting candidates by sighting count, and flushes
//! the top candidate to a notification sink on a fixed cadence.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod flush;
pub mod frames;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod rank;
pub mod tracker;

// Core traits (source → process → sink)
pub use frames::{FrameBatch, FrameFormat, FrameSource, MockFrameSource, ReaderFrameSource};
pub use notify::{
    CollectorNotificationSink, HttpNotificationSink, LogNotificationSink, NotificationSink,
};
pub use pipeline::sink::{CollectorSink, StableSink, StdoutSink};

// Pipeline
pub use flush::{FlushController, FlushHandle};
pub use pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};

// Core data structures
pub use rank::{Candidate, RankedCandidateQueue};
pub use tracker::{StabilityTracker, TrackerConfig};

// Error handling
pub use error::{Result, TextsiftError};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StationError};
pub use pipeline::station::Station;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
