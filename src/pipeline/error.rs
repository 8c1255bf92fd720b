//! Error types and reporting for pipeline stations.

use thiserror::Error;

/// Errors a station can raise while processing one item.
///
/// The split decides the runner's reaction: a recoverable error skips the
/// item, a fatal one (e.g. the shared queue lock is poisoned) shuts the
/// station down.
#[derive(Error, Debug, Clone)]
pub enum StationError {
    #[error("recoverable: {0}")]
    Recoverable(String),
    #[error("fatal: {0}")]
    Fatal(String),
}

impl StationError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StationError::Fatal(_))
    }
}

/// Receives station errors; the runner never inspects messages itself.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, station: &str, error: &StationError);
}

/// Default reporter: one crate-prefixed stderr line per error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, station: &str, error: &StationError) {
        eprintln!("textsift: [{}] {}", station, error);
    }
}
