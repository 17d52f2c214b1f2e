use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};
use tracing::debug;

use crate::{Dataset, Error, Network, Progress, Result, SparseDataset, TracingProgress};

/// Samples between two intra-epoch progress reports.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Epoch-end reports are throttled to about ten per run.
#[inline]
pub fn report_every(epochs: usize) -> usize {
    (epochs / 10).max(1)
}

impl Network {
    /// Train on dense samples for `epochs` full passes.
    ///
    /// Shuffles with the thread-local RNG and reports through [`TracingProgress`].
    pub fn train(&mut self, data: &Dataset, epochs: usize) -> Result<()> {
        self.train_with(data, epochs, &mut thread_rng(), &mut TracingProgress)
    }

    /// Train on dense samples, shuffling with `rng` and reporting to `progress`.
    ///
    /// Every sample order is a fresh uniform permutation. For each sample the
    /// network runs forward, then feedback, then accumulates the sample error.
    /// There is no early stop: all `epochs` run.
    ///
    /// Shapes are checked for the whole dataset before any weight changes.
    pub fn train_with<R, P>(
        &mut self,
        data: &Dataset,
        epochs: usize,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        P: Progress + ?Sized,
    {
        self.check_input_len(data.input_dim())?;
        self.check_target_len(data.target_dim())?;
        check_epochs(epochs)?;

        debug!(samples = data.len(), epochs, "training on dense samples");
        self.run_epochs(data.len(), epochs, rng, progress, |net, idx| {
            let target = data.target(idx);
            net.forward_unchecked(data.input(idx));
            net.feedback(target);
            net.compute_error(target)
        });
        Ok(())
    }

    /// Train on sparse samples for `epochs` full passes.
    ///
    /// Shuffles with the thread-local RNG and reports through [`TracingProgress`].
    pub fn train_sparse(&mut self, data: &SparseDataset, epochs: usize) -> Result<()> {
        self.train_sparse_with(data, epochs, &mut thread_rng(), &mut TracingProgress)
    }

    /// Sparse counterpart of [`train_with`](Self::train_with).
    ///
    /// Every feature index in the dataset must be `< input_count()`.
    pub fn train_sparse_with<R, P>(
        &mut self,
        data: &SparseDataset,
        epochs: usize,
        rng: &mut R,
        progress: &mut P,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        P: Progress + ?Sized,
    {
        if let Some(max) = data.max_index() {
            self.check_sparse_index(max)?;
        }
        self.check_target_len(data.target_dim())?;
        check_epochs(epochs)?;

        debug!(samples = data.len(), epochs, "training on sparse samples");
        self.run_epochs(data.len(), epochs, rng, progress, |net, idx| {
            let input = data.input(idx);
            let target = data.target(idx);
            net.forward_sparse_unchecked(input);
            net.feedback_sparse(target, input);
            net.compute_error(target)
        });
        Ok(())
    }

    fn run_epochs<R, P, F>(
        &mut self,
        len: usize,
        epochs: usize,
        rng: &mut R,
        progress: &mut P,
        mut step: F,
    ) where
        R: Rng + ?Sized,
        P: Progress + ?Sized,
        F: FnMut(&mut Self, usize) -> f64,
    {
        let every = report_every(epochs);
        let mut order: Vec<usize> = (0..len).collect();

        for epoch in 1..=epochs {
            for (slot, idx) in order.iter_mut().enumerate() {
                *idx = slot;
            }
            order.shuffle(rng);

            let mut epoch_error = 0.0;
            for (done, &idx) in order.iter().enumerate() {
                epoch_error += step(self, idx);
                if (done + 1) % PROGRESS_INTERVAL == 0 {
                    progress.sample_progress(epoch, (done + 1) as f64 / len as f64);
                }
            }

            if epoch % every == 0 {
                progress.epoch_end(epoch, epoch_error / len as f64);
            }
        }

        progress.finished();
    }
}

fn check_epochs(epochs: usize) -> Result<()> {
    if epochs == 0 {
        return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
    }
    Ok(())
}
