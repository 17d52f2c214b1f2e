//! Training progress sinks.
//!
//! The training loop never prints. It reports plain data to a [`Progress`]
//! implementation supplied by the caller. Epochs are 1-based.

use tracing::{info, trace};

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// Fraction of the current epoch's samples processed so far.
    Sample { epoch: usize, fraction: f64 },
    /// Mean per-sample error over a finished epoch.
    Epoch { epoch: usize, mse: f64 },
    /// The last epoch finished.
    Finished,
}

/// Receiver for training progress.
pub trait Progress {
    fn sample_progress(&mut self, _epoch: usize, _fraction: f64) {}

    fn epoch_end(&mut self, _epoch: usize, _mse: f64) {}

    fn finished(&mut self) {}
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Emits reports as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn sample_progress(&mut self, epoch: usize, fraction: f64) {
        trace!(epoch, percent = fraction * 100.0, "epoch progress");
    }

    fn epoch_end(&mut self, epoch: usize, mse: f64) {
        info!(epoch, mse, "epoch finished");
    }

    fn finished(&mut self) {
        info!("training done");
    }
}

impl<F> Progress for F
where
    F: FnMut(ProgressEvent),
{
    fn sample_progress(&mut self, epoch: usize, fraction: f64) {
        self(ProgressEvent::Sample { epoch, fraction });
    }

    fn epoch_end(&mut self, epoch: usize, mse: f64) {
        self(ProgressEvent::Epoch { epoch, mse });
    }

    fn finished(&mut self) {
        self(ProgressEvent::Finished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_receive_events() {
        let mut events = Vec::new();
        {
            let mut sink = |e: ProgressEvent| events.push(e);
            sink.sample_progress(1, 0.5);
            sink.epoch_end(1, 0.25);
            sink.finished();
        }
        assert_eq!(
            events,
            vec![
                ProgressEvent::Sample {
                    epoch: 1,
                    fraction: 0.5
                },
                ProgressEvent::Epoch { epoch: 1, mse: 0.25 },
                ProgressEvent::Finished,
            ]
        );
    }
}
