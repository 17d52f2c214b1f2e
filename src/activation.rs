//! Activation functions.
//!
//! Hidden units always use the logistic sigmoid. Output units use either the
//! sigmoid (classification) or the identity (regression).
//!
//! Derivatives are expressed in terms of the cached *post-activation* output
//! `y`, which is what the network keeps in its layer buffers. Never feed a
//! pre-activation sum into [`sigmoid_derivative`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Element-wise activation applied to a layer.
pub enum Activation {
    Sigmoid,
    Identity,
}

impl Activation {
    /// Output activation for a network in regression or classification mode.
    #[inline]
    pub fn for_output(regression: bool) -> Self {
        if regression {
            Activation::Identity
        } else {
            Activation::Sigmoid
        }
    }

    #[inline]
    pub fn forward(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Identity => x,
        }
    }

    /// Derivative with respect to the input, given the output `y`.
    #[inline]
    pub fn grad_from_output(self, y: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid_derivative(y),
            Activation::Identity => 1.0,
        }
    }
}

/// Logistic sigmoid `1 / (1 + e^-x)`.
///
/// Branches on the sign of `x` so `exp` is only ever taken of a non-positive
/// number and cannot overflow.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Sigmoid derivative `y * (1 - y)` where `y = sigmoid(x)`.
#[inline]
pub fn sigmoid_derivative(y: f64) -> f64 {
    y * (1.0 - y)
}
