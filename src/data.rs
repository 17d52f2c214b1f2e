//! Training sets.
//!
//! `Dataset` holds dense rows; `SparseDataset` holds feature-index maps. Both
//! validate every row up front so the training loop never has to.

use std::collections::BTreeMap;

use crate::{Error, Result};

/// A sparse input vector: feature index to value.
///
/// Ordered, so summing over the touched indices visits them in the same order
/// as a dense pass would.
pub type SparseInput = BTreeMap<usize, f64>;

/// A supervised dataset of dense inputs (X) and targets (Y).
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from per-sample rows.
    ///
    /// Every input row must have the same width, as must every target row.
    pub fn from_rows(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Self> {
        check_counts(inputs.len(), targets.len())?;

        let input_dim = inputs[0].len();
        if input_dim == 0 {
            return Err(Error::InvalidData("input_dim must be > 0".to_owned()));
        }
        for (i, row) in inputs.iter().enumerate() {
            if row.len() != input_dim {
                return Err(Error::InvalidData(format!(
                    "input row {i} has len {}, expected {input_dim}",
                    row.len()
                )));
            }
        }
        let target_dim = uniform_target_dim(&targets)?;

        Ok(Self {
            inputs,
            targets,
            input_dim,
            target_dim,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    /// Returns the `idx`-th input row.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    pub fn input(&self, idx: usize) -> &[f64] {
        &self.inputs[idx]
    }

    /// Returns the `idx`-th target row.
    ///
    /// Panics if `idx >= len`.
    #[inline]
    pub fn target(&self, idx: usize) -> &[f64] {
        &self.targets[idx]
    }
}

/// A supervised dataset of sparse inputs and dense targets.
#[derive(Debug, Clone)]
pub struct SparseDataset {
    inputs: Vec<SparseInput>,
    targets: Vec<Vec<f64>>,
    max_index: Option<usize>,
    target_dim: usize,
}

impl SparseDataset {
    /// Build a sparse dataset.
    ///
    /// Input maps may be empty or touch different indices; the network checks
    /// that every index is in range when training starts.
    pub fn new(inputs: Vec<SparseInput>, targets: Vec<Vec<f64>>) -> Result<Self> {
        check_counts(inputs.len(), targets.len())?;
        let target_dim = uniform_target_dim(&targets)?;
        let max_index = inputs
            .iter()
            .filter_map(|m| m.keys().next_back().copied())
            .max();

        Ok(Self {
            inputs,
            targets,
            max_index,
            target_dim,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Largest feature index touched by any sample, if any sample is non-empty.
    #[inline]
    pub fn max_index(&self) -> Option<usize> {
        self.max_index
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    pub fn input(&self, idx: usize) -> &SparseInput {
        &self.inputs[idx]
    }

    #[inline]
    pub fn target(&self, idx: usize) -> &[f64] {
        &self.targets[idx]
    }
}

fn check_counts(inputs: usize, targets: usize) -> Result<()> {
    if inputs != targets {
        return Err(Error::InvalidData(format!(
            "inputs/targets length mismatch: {inputs} vs {targets}"
        )));
    }
    if inputs == 0 {
        return Err(Error::InvalidData("dataset must not be empty".to_owned()));
    }
    Ok(())
}

fn uniform_target_dim(targets: &[Vec<f64>]) -> Result<usize> {
    let target_dim = targets.first().map(|t| t.len()).unwrap_or(0);
    if target_dim == 0 {
        return Err(Error::InvalidData("target_dim must be > 0".to_owned()));
    }
    for (i, row) in targets.iter().enumerate() {
        if row.len() != target_dim {
            return Err(Error::InvalidData(format!(
                "target row {i} has len {}, expected {target_dim}",
                row.len()
            )));
        }
    }
    Ok(target_dim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_from_rows_validates_shapes() {
        let ok = Dataset::from_rows(vec![vec![0.0, 1.0], vec![2.0, 3.0]], vec![vec![0.0], vec![1.0]]);
        let ok = ok.unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.input_dim(), 2);
        assert_eq!(ok.target_dim(), 1);
        assert_eq!(ok.input(1), &[2.0, 3.0]);

        let ragged = Dataset::from_rows(vec![vec![0.0, 1.0], vec![2.0]], vec![vec![0.0], vec![1.0]]);
        assert!(matches!(ragged, Err(Error::InvalidData(_))));

        let uneven = Dataset::from_rows(vec![vec![0.0]], vec![vec![0.0], vec![1.0]]);
        assert!(matches!(uneven, Err(Error::InvalidData(_))));

        let empty = Dataset::from_rows(vec![], vec![]);
        assert!(matches!(empty, Err(Error::InvalidData(_))));
    }

    #[test]
    fn sparse_dataset_tracks_max_index() {
        let a: SparseInput = [(0, 1.0), (4, 2.0)].into_iter().collect();
        let b: SparseInput = [(2, 1.0)].into_iter().collect();
        let data = SparseDataset::new(vec![a, b, SparseInput::new()], vec![vec![1.0]; 3]).unwrap();
        assert_eq!(data.max_index(), Some(4));
        assert_eq!(data.target_dim(), 1);

        let bad = SparseDataset::new(vec![SparseInput::new()], vec![vec![1.0, 2.0], vec![0.0]]);
        assert!(bad.is_err());
    }
}
