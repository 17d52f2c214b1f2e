//! A single-hidden-layer perceptron trained by SGD with momentum.
//!
//! `hidden-mlp` is a small, from-scratch network with exactly one sigmoid hidden
//! layer and either sigmoid (classification) or linear (regression) outputs.
//! All derivatives are written out by hand for this fixed topology.
//!
//! # Design goals
//!
//! - Predictable performance: layer, error and momentum buffers live inside the
//!   [`Network`] and are reused by every sample; the training loop does not
//!   allocate per step.
//! - Clear contracts: shapes are validated at the API boundary and a shape
//!   error never leaves the network half-updated.
//! - Explicit randomness: every operation that draws random numbers has a
//!   variant taking an `Rng`, so runs can be reproduced from a seed.
//!
//! # Panics vs `Result`
//!
//! - Shape-checked entry points return [`Result`]:
//!   [`Network::forward`], [`Network::forward_sparse`], [`Network::train`],
//!   [`Network::train_sparse`] and their `_with` variants.
//! - The per-sample training steps [`Network::feedback`],
//!   [`Network::feedback_sparse`] and [`Network::compute_error`] assume the
//!   preceding forward call was valid and panic via `assert!` on a wrong
//!   target length.
//!
//! # Bias units
//!
//! The bias is an extra slot at the end of the input and hidden layers that
//! always holds `1.0`. Weight matrices include the bias column, so an `(I, H, O)`
//! network has a `(H + 1, I + 1)` hidden matrix and an `(O, H + 1)` output matrix.
//!
//! # Quick start
//!
//! ```rust
//! use hidden_mlp::{Dataset, NetworkBuilder, NoProgress};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # fn main() -> hidden_mlp::Result<()> {
//! let xs = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![1.0, 1.0],
//! ];
//! let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
//! let train = Dataset::from_rows(xs, ys)?;
//!
//! let mut net = NetworkBuilder::new(2, 3, 1)?.build_with_seed(0);
//! let mut rng = StdRng::seed_from_u64(0);
//! net.train_with(&train, 100, &mut rng, &mut NoProgress)?;
//!
//! let y = net.forward(&[1.0, 0.0])?;
//! assert_eq!(y.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Sparse inputs
//!
//! [`Network::forward_sparse`] takes a [`SparseInput`] map. Only the given
//! indices are written into the input layer, and the hidden sums visit only
//! those indices (plus the bias). Positions not in the map keep their previous
//! value but contribute nothing to that pass.

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod matrix;
pub mod network;
pub mod progress;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::{Activation, sigmoid, sigmoid_derivative};
pub use builder::{NetworkBuilder, Rates};
pub use data::{Dataset, SparseDataset, SparseInput};
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use network::Network;
pub use progress::{NoProgress, Progress, ProgressEvent, TracingProgress};
