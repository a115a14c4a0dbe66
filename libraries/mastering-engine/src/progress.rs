//! Progress reporting
//!
//! The pipeline never prints. It reports to a [`ProgressObserver`]: a
//! closure, an `mpsc::Sender`, or any custom type.

use crate::pipeline::PipelineState;
use std::sync::mpsc::Sender;

/// Emitted after each chunk completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Zero-based index of the finished chunk
    pub chunk_index: usize,
    /// Total chunks in the job
    pub chunk_count: usize,
    pub message: String,
}

impl ProgressEvent {
    /// Event for a finished chunk
    pub fn chunk_done(chunk_index: usize, chunk_count: usize) -> Self {
        Self {
            chunk_index,
            chunk_count,
            message: format!("Processed chunk {}/{}", chunk_index + 1, chunk_count),
        }
    }

    /// Completed fraction of the chunk phase, in (0, 1]
    pub fn fraction(&self) -> f64 {
        if self.chunk_count == 0 {
            1.0
        } else {
            (self.chunk_index + 1) as f64 / self.chunk_count as f64
        }
    }
}

/// Receives progress and state changes from a running job
///
/// With the `parallel` feature enabled, chunk events arrive in completion
/// order rather than index order.
pub trait ProgressObserver: Send {
    /// Called after each chunk
    fn on_progress(&mut self, event: ProgressEvent);

    /// Called on every pipeline state transition
    fn on_state(&mut self, _state: &PipelineState) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(ProgressEvent) + Send,
{
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event);
    }
}

impl ProgressObserver for Sender<ProgressEvent> {
    fn on_progress(&mut self, event: ProgressEvent) {
        // A dropped receiver only means nobody is listening anymore
        let _ = self.send(event);
    }
}

/// Observer that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}
