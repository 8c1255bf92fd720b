//! Frame-processing pipeline.
//!
//! Implements a multi-station pipeline where each station runs in its own
//! thread, connected by bounded crossbeam channels for backpressure. The
//! frame cadence lives entirely on these threads; the flush cadence (see
//! `crate::flush`) runs independently on the tokio runtime and shares only
//! the candidate queue with the observer station.

pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod sink;
pub mod station;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use observer::ObserverStation;
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use sink::{CollectorSink, StableSink, StdoutSink};
pub use station::{Station, StationRunner};
