use std::iter;

use rand::{Rng, thread_rng};
use tracing::debug;

use crate::activation::{Activation, sigmoid, sigmoid_derivative};
use crate::{Dataset, Error, Matrix, NetworkBuilder, Rates, Result, SparseInput};

/// A perceptron with one sigmoid hidden layer, trained by SGD with momentum.
///
/// Bias units are modelled as an extra slot at the end of the input and hidden
/// layers that always holds `1.0`. With `I` inputs, `H` hidden units and `O`
/// outputs:
///
/// - `input_layer` has `I + 1` slots, `hidden_layer` has `H + 1`, `output_layer` has `O`
/// - `weight_hidden` is `(H + 1, I + 1)`; its last row feeds the hidden bias slot and is
///   never read or updated
/// - `weight_output` is `(O, H + 1)`
/// - `last_change_*` mirror the weight shapes and hold the previous step for momentum
///
/// Layer and error buffers are scratch space reused by every call, so one
/// `Network` must not be shared between concurrent trainers.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub(crate) input_layer: Vec<f64>,
    pub(crate) hidden_layer: Vec<f64>,
    pub(crate) output_layer: Vec<f64>,
    pub(crate) weight_hidden: Matrix,
    pub(crate) weight_output: Matrix,
    pub(crate) last_change_hidden: Matrix,
    pub(crate) last_change_output: Matrix,
    pub(crate) err_output: Vec<f64>,
    pub(crate) err_hidden: Vec<f64>,
    pub(crate) regression: bool,
    pub(crate) rates: Rates,
}

impl Network {
    /// Network with random weights in `[-1, 1)` drawn from the thread-local RNG.
    pub fn new(
        inputs: usize,
        hidden: usize,
        outputs: usize,
        regression: bool,
        learning_rate: f64,
        momentum: f64,
    ) -> Result<Self> {
        Self::new_with_rng(
            inputs,
            hidden,
            outputs,
            regression,
            Rates::new(learning_rate, momentum)?,
            &mut thread_rng(),
        )
    }

    /// Same as [`Network::new`] with the default rates (`0.25`, `0.1`).
    pub fn with_default_rates(
        inputs: usize,
        hidden: usize,
        outputs: usize,
        regression: bool,
    ) -> Result<Self> {
        Self::new_with_rng(
            inputs,
            hidden,
            outputs,
            regression,
            Rates::default(),
            &mut thread_rng(),
        )
    }

    /// Network with weights drawn from `rng`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        inputs: usize,
        hidden: usize,
        outputs: usize,
        regression: bool,
        rates: Rates,
        rng: &mut R,
    ) -> Result<Self> {
        Ok(NetworkBuilder::new(inputs, hidden, outputs)?
            .regression(regression)
            .rates(rates)?
            .build_with_rng(rng))
    }

    /// Allocates every buffer. Sizes and rates are already validated.
    pub(crate) fn allocate<R: Rng + ?Sized>(
        inputs: usize,
        hidden: usize,
        outputs: usize,
        regression: bool,
        rates: Rates,
        rng: &mut R,
    ) -> Self {
        let input_slots = inputs + 1;
        let hidden_slots = hidden + 1;

        debug!(inputs, hidden, outputs, regression, "allocating network");

        Self {
            input_layer: vec![0.0; input_slots],
            hidden_layer: vec![0.0; hidden_slots],
            output_layer: vec![0.0; outputs],
            weight_hidden: Matrix::random(hidden_slots, input_slots, -1.0, 1.0, rng),
            weight_output: Matrix::random(outputs, hidden_slots, -1.0, 1.0, rng),
            last_change_hidden: Matrix::filled(hidden_slots, input_slots, 0.0),
            last_change_output: Matrix::filled(outputs, hidden_slots, 0.0),
            err_output: vec![0.0; outputs],
            err_hidden: vec![0.0; hidden],
            regression,
            rates,
        }
    }

    /// Number of inputs, bias excluded.
    #[inline]
    pub fn input_count(&self) -> usize {
        self.input_layer.len() - 1
    }

    /// Number of hidden units, bias excluded.
    #[inline]
    pub fn hidden_count(&self) -> usize {
        self.hidden_layer.len() - 1
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_layer.len()
    }

    #[inline]
    pub fn is_regression(&self) -> bool {
        self.regression
    }

    #[inline]
    pub fn rates(&self) -> Rates {
        self.rates
    }

    #[inline]
    pub fn input_layer(&self) -> &[f64] {
        &self.input_layer
    }

    #[inline]
    pub fn hidden_layer(&self) -> &[f64] {
        &self.hidden_layer
    }

    /// Output of the most recent forward pass.
    #[inline]
    pub fn output_layer(&self) -> &[f64] {
        &self.output_layer
    }

    #[inline]
    pub fn weight_hidden(&self) -> &Matrix {
        &self.weight_hidden
    }

    #[inline]
    pub fn weight_output(&self) -> &Matrix {
        &self.weight_output
    }

    #[inline]
    pub fn last_change_hidden(&self) -> &Matrix {
        &self.last_change_hidden
    }

    #[inline]
    pub fn last_change_output(&self) -> &Matrix {
        &self.last_change_output
    }

    #[inline]
    pub fn err_output(&self) -> &[f64] {
        &self.err_output
    }

    #[inline]
    pub fn err_hidden(&self) -> &[f64] {
        &self.err_hidden
    }

    #[inline]
    fn output_activation(&self) -> Activation {
        Activation::for_output(self.regression)
    }

    /// Forward pass for a dense sample of exactly `input_count()` values.
    ///
    /// Returns the output layer. Fails without touching any state if the
    /// input length is wrong.
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        self.check_input_len(input.len())?;
        Ok(self.forward_unchecked(input))
    }

    /// Forward pass for a sparse sample.
    ///
    /// Only the given indices are written into the input layer; every other
    /// input slot keeps whatever the previous sample left there. The hidden
    /// sums visit only the given indices plus the bias slot, so untouched
    /// inputs contribute nothing to this pass.
    ///
    /// Including the bias column keeps sparse and dense passes identical when
    /// every index is present. Weights trained by code that sums only the map
    /// keys, leaving the bias out, will give different outputs here.
    ///
    /// Fails without touching any state if an index is `>= input_count()`.
    pub fn forward_sparse(&mut self, input: &SparseInput) -> Result<&[f64]> {
        if let Some(&max) = input.keys().next_back() {
            self.check_sparse_index(max)?;
        }
        Ok(self.forward_sparse_unchecked(input))
    }

    /// Owned copy of the dense forward output.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.forward(input).map(<[f64]>::to_vec)
    }

    pub(crate) fn forward_unchecked(&mut self, input: &[f64]) -> &[f64] {
        let bias = self.input_count();
        self.input_layer[..bias].copy_from_slice(input);
        self.propagate(0..bias + 1)
    }

    pub(crate) fn forward_sparse_unchecked(&mut self, input: &SparseInput) -> &[f64] {
        for (&idx, &value) in input {
            self.input_layer[idx] = value;
        }
        let bias = self.input_count();
        self.propagate(touched(input, bias))
    }

    /// Hidden and output activations, summing the hidden units over `touched` input slots.
    fn propagate<I>(&mut self, touched: I) -> &[f64]
    where
        I: Iterator<Item = usize> + Clone,
    {
        let bias = self.input_count();
        self.input_layer[bias] = 1.0;

        let hidden = self.hidden_count();
        for i in 0..hidden {
            let weights = self.weight_hidden.row(i);
            let mut sum = 0.0;
            for j in touched.clone() {
                sum += self.input_layer[j] * weights[j];
            }
            self.hidden_layer[i] = sigmoid(sum);
        }
        self.hidden_layer[hidden] = 1.0;

        let act = self.output_activation();
        for i in 0..self.output_layer.len() {
            let weights = self.weight_output.row(i);
            let mut sum = 0.0;
            for (&h, &w) in self.hidden_layer.iter().zip(weights) {
                sum += h * w;
            }
            self.output_layer[i] = act.forward(sum);
        }

        &self.output_layer
    }

    /// Backpropagate `target` through the state left by the last [`forward`](Self::forward)
    /// and apply one momentum SGD step to every weight.
    ///
    /// Panics if `target.len() != output_count()`.
    pub fn feedback(&mut self, target: &[f64]) {
        self.check_target_len_or_panic(target.len());
        let slots = self.input_layer.len();
        self.backpropagate(target, 0..slots);
    }

    /// Backpropagate after [`forward_sparse`](Self::forward_sparse), updating only the
    /// hidden weights of the touched input slots.
    ///
    /// `input` must be the map passed to the preceding forward call.
    ///
    /// Panics if `target.len() != output_count()` or an index is out of range.
    pub fn feedback_sparse(&mut self, target: &[f64], input: &SparseInput) {
        self.check_target_len_or_panic(target.len());
        let bias = self.input_count();
        if let Some(&max) = input.keys().next_back() {
            assert!(max < bias, "sparse index {max} out of range for {bias} inputs");
        }
        self.backpropagate(target, touched(input, bias));
    }

    fn backpropagate<I>(&mut self, target: &[f64], touched: I)
    where
        I: Iterator<Item = usize> + Clone,
    {
        let act = self.output_activation();
        let Rates {
            learning_rate,
            momentum,
        } = self.rates;

        for ((err, &y), &t) in self
            .err_output
            .iter_mut()
            .zip(&self.output_layer)
            .zip(target)
        {
            *err = y - t;
        }

        // The hidden error is weighted by the output derivative here; the hidden
        // derivative is applied in the weight update below.
        for i in 0..self.err_hidden.len() {
            let mut err = 0.0;
            for j in 0..self.output_layer.len() {
                err += self.err_output[j]
                    * self.weight_output[(j, i)]
                    * act.grad_from_output(self.output_layer[j]);
            }
            self.err_hidden[i] = err;
        }

        for i in 0..self.output_layer.len() {
            let delta = self.err_output[i] * act.grad_from_output(self.output_layer[i]);
            let weights = self.weight_output.row_mut(i);
            let changes = self.last_change_output.row_mut(i);
            for ((w, last), &h) in weights
                .iter_mut()
                .zip(changes.iter_mut())
                .zip(&self.hidden_layer)
            {
                let change = learning_rate * delta * h + momentum * *last;
                *w -= change;
                *last = change;
            }
        }

        for i in 0..self.err_hidden.len() {
            let delta = self.err_hidden[i] * sigmoid_derivative(self.hidden_layer[i]);
            let weights = self.weight_hidden.row_mut(i);
            let changes = self.last_change_hidden.row_mut(i);
            for j in touched.clone() {
                let change = learning_rate * delta * self.input_layer[j] + momentum * changes[j];
                weights[j] -= change;
                changes[j] = change;
            }
        }
    }

    /// Half the sum of squared residuals between the last output and `target`.
    ///
    /// Panics if `target.len() != output_count()`.
    pub fn compute_error(&self, target: &[f64]) -> f64 {
        self.check_target_len_or_panic(target.len());
        let mut sum = 0.0;
        for (&y, &t) in self.output_layer.iter().zip(target) {
            let diff = y - t;
            sum += 0.5 * diff * diff;
        }
        sum
    }

    /// Mean of [`compute_error`](Self::compute_error) over `data`, without updating weights.
    pub fn mean_error(&mut self, data: &Dataset) -> Result<f64> {
        self.check_input_len(data.input_dim())?;
        self.check_target_len(data.target_dim())?;

        let mut total = 0.0;
        for idx in 0..data.len() {
            self.forward_unchecked(data.input(idx));
            total += self.compute_error(data.target(idx));
        }
        Ok(total / data.len() as f64)
    }

    pub(crate) fn check_input_len(&self, len: usize) -> Result<()> {
        if len != self.input_count() {
            return Err(Error::InvalidShape(format!(
                "input len {len} does not match network input count {}",
                self.input_count()
            )));
        }
        Ok(())
    }

    pub(crate) fn check_target_len(&self, len: usize) -> Result<()> {
        if len != self.output_count() {
            return Err(Error::InvalidShape(format!(
                "target len {len} does not match network output count {}",
                self.output_count()
            )));
        }
        Ok(())
    }

    pub(crate) fn check_sparse_index(&self, idx: usize) -> Result<()> {
        if idx >= self.input_count() {
            return Err(Error::InvalidShape(format!(
                "sparse index {idx} out of range for {} inputs",
                self.input_count()
            )));
        }
        Ok(())
    }

    #[inline]
    fn check_target_len_or_panic(&self, len: usize) {
        assert_eq!(
            len,
            self.output_count(),
            "target len {len} does not match network output count {}",
            self.output_count()
        );
    }
}

/// Input slots visited for a sparse sample: its indices in order, then the bias.
#[inline]
fn touched(input: &SparseInput, bias: usize) -> impl Iterator<Item = usize> + Clone + '_ {
    input.keys().copied().chain(iter::once(bias))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse(pairs: &[(usize, f64)]) -> SparseInput {
        pairs.iter().copied().collect()
    }

    fn net(inputs: usize, hidden: usize, outputs: usize, regression: bool) -> Network {
        NetworkBuilder::new(inputs, hidden, outputs)
            .unwrap()
            .regression(regression)
            .build_with_seed(42)
    }

    #[test]
    fn construction_allocates_documented_shapes() {
        let n = net(3, 4, 2, false);
        assert_eq!(n.input_layer().len(), 4);
        assert_eq!(n.hidden_layer().len(), 5);
        assert_eq!(n.output_layer().len(), 2);
        assert_eq!((n.weight_hidden().rows(), n.weight_hidden().cols()), (5, 4));
        assert_eq!((n.weight_output().rows(), n.weight_output().cols()), (2, 5));
        assert_eq!(n.last_change_hidden(), &Matrix::filled(5, 4, 0.0));
        assert_eq!(n.last_change_output(), &Matrix::filled(2, 5, 0.0));
        assert_eq!(n.err_output().len(), 2);
        assert_eq!(n.err_hidden().len(), 4);

        let in_range = |m: &Matrix| m.as_slice().iter().all(|&w| (-1.0..1.0).contains(&w));
        assert!(in_range(n.weight_hidden()));
        assert!(in_range(n.weight_output()));
    }

    #[test]
    fn constructors_reject_zero_counts() {
        assert!(matches!(
            Network::new(0, 2, 1, false, 0.25, 0.1),
            Err(Error::InvalidConfig(_))
        ));
        assert!(Network::with_default_rates(2, 0, 1, true).is_err());
        assert!(Network::with_default_rates(2, 2, 0, true).is_err());

        let n = Network::with_default_rates(2, 2, 1, true).unwrap();
        assert_eq!(n.rates(), Rates::default());
    }

    #[test]
    fn forward_rejects_wrong_width_without_mutation() {
        let mut n = net(2, 3, 1, false);
        let before = n.clone();
        assert!(matches!(n.forward(&[1.0]), Err(Error::InvalidShape(_))));
        assert!(matches!(n.forward(&[1.0, 2.0, 3.0]), Err(Error::InvalidShape(_))));
        assert_eq!(n, before);

        let out = n.forward(&[0.5, -0.5]).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn forward_sets_bias_slots() {
        let mut n = net(2, 3, 2, true);
        n.forward(&[0.3, 0.7]).unwrap();
        assert_eq!(n.input_layer()[2], 1.0);
        assert_eq!(n.hidden_layer()[3], 1.0);

        let mut s = net(4, 2, 1, false);
        s.forward_sparse(&sparse(&[(1, 2.0)])).unwrap();
        assert_eq!(s.input_layer()[4], 1.0);
        assert_eq!(s.hidden_layer()[2], 1.0);
    }

    #[test]
    fn forward_matches_hand_computation() {
        let mut n = net(2, 2, 1, false);
        let x = [0.4, -1.2];
        let y = n.forward(&x).unwrap()[0];

        let wh = n.weight_hidden().clone();
        let wo = n.weight_output().clone();
        let h: Vec<f64> = (0..2)
            .map(|i| sigmoid(x[0] * wh[(i, 0)] + x[1] * wh[(i, 1)] + wh[(i, 2)]))
            .collect();
        let expected = sigmoid(h[0] * wo[(0, 0)] + h[1] * wo[(0, 1)] + wo[(0, 2)]);
        assert!((y - expected).abs() < 1e-12);
    }

    #[test]
    fn regression_output_is_linear() {
        let mut n = net(1, 3, 1, true);
        let y = n.forward(&[0.2]).unwrap()[0];
        let wo = n.weight_output();
        let expected: f64 = n.hidden_layer().iter().zip(wo.row(0)).map(|(h, w)| h * w).sum();
        assert!((y - expected).abs() < 1e-12);
    }

    #[test]
    fn sparse_forward_keeps_untouched_inputs() {
        let mut n = net(3, 2, 1, false);
        n.forward(&[1.0, 2.0, 3.0]).unwrap();
        n.forward_sparse(&sparse(&[(1, -5.0)])).unwrap();
        assert_eq!(n.input_layer(), &[1.0, -5.0, 3.0, 1.0]);

        // Hidden sums only see index 1 and the bias.
        let wh = n.weight_hidden().clone();
        for i in 0..2 {
            let expected = sigmoid(-5.0 * wh[(i, 1)] + wh[(i, 3)]);
            assert!((n.hidden_layer()[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn sparse_forward_rejects_out_of_range_index() {
        let mut n = net(3, 2, 1, false);
        let before = n.clone();
        assert!(matches!(
            n.forward_sparse(&sparse(&[(0, 1.0), (3, 1.0)])),
            Err(Error::InvalidShape(_))
        ));
        assert_eq!(n, before);
    }

    #[test]
    fn compute_error_is_half_sum_of_squares() {
        let mut n = net(2, 2, 2, true);
        let out = n.forward(&[0.1, 0.2]).unwrap().to_vec();
        assert_eq!(n.compute_error(&out), 0.0);

        let target = [out[0] + 1.0, out[1] - 2.0];
        let err = n.compute_error(&target);
        assert!((err - 2.5).abs() < 1e-12);
    }

    #[test]
    fn feedback_moves_output_toward_target() {
        for regression in [false, true] {
            let mut n = net(2, 3, 1, regression);
            let x = [0.5, -0.25];
            let t = [0.9];

            n.forward(&x).unwrap();
            let before = n.compute_error(&t);
            n.feedback(&t);
            n.forward(&x).unwrap();
            let after = n.compute_error(&t);
            assert!(after < before, "regression={regression} {after} >= {before}");
        }
    }

    #[test]
    fn feedback_applies_documented_update() {
        let mut n = net(1, 1, 1, true);
        let rates = n.rates();
        let x = [0.7];
        let t = [0.3];

        n.forward(&x).unwrap();
        let y = n.output_layer()[0];
        let h = n.hidden_layer().to_vec();
        let wo = n.weight_output().clone();
        let wh = n.weight_hidden().clone();

        n.feedback(&t);

        let err_out = y - t[0];
        assert_eq!(n.err_output(), &[err_out]);
        let err_hidden = err_out * wo[(0, 0)];
        assert!((n.err_hidden()[0] - err_hidden).abs() < 1e-15);

        for j in 0..2 {
            let change = rates.learning_rate * err_out * h[j];
            assert!((n.weight_output()[(0, j)] - (wo[(0, j)] - change)).abs() < 1e-15);
            assert!((n.last_change_output()[(0, j)] - change).abs() < 1e-15);
        }

        let delta = err_hidden * sigmoid_derivative(h[0]);
        let inputs = [x[0], 1.0];
        for j in 0..2 {
            let change = rates.learning_rate * delta * inputs[j];
            assert!((n.weight_hidden()[(0, j)] - (wh[(0, j)] - change)).abs() < 1e-15);
        }

        // Bias row of the hidden matrix is inert.
        assert_eq!(n.weight_hidden().row(1), wh.row(1));
    }

    #[test]
    fn momentum_carries_previous_change() {
        let mut n = net(1, 1, 1, true);
        let x = [0.7];
        let t = [0.3];

        n.forward(&x).unwrap();
        n.feedback(&t);
        let first = n.last_change_output()[(0, 1)];

        n.forward(&x).unwrap();
        let err = n.output_layer()[0] - t[0];
        n.feedback(&t);
        let expected = n.rates().learning_rate * err * 1.0 + n.rates().momentum * first;
        assert!((n.last_change_output()[(0, 1)] - expected).abs() < 1e-15);
    }

    #[test]
    fn sparse_feedback_only_updates_touched_columns() {
        let mut n = net(4, 3, 1, false);
        let x = sparse(&[(0, 1.0), (2, 0.5)]);
        let before = n.weight_hidden().clone();

        n.forward_sparse(&x).unwrap();
        n.feedback_sparse(&[1.0], &x);

        for i in 0..3 {
            for j in [1, 3] {
                assert_eq!(n.weight_hidden()[(i, j)], before[(i, j)]);
                assert_eq!(n.last_change_hidden()[(i, j)], 0.0);
            }
            for j in [0, 2, 4] {
                assert_ne!(n.weight_hidden()[(i, j)], before[(i, j)]);
            }
        }
    }

    #[test]
    #[should_panic(expected = "target len")]
    fn feedback_panics_on_wrong_target_len() {
        let mut n = net(2, 2, 1, false);
        n.forward(&[0.0, 0.0]).unwrap();
        n.feedback(&[0.0, 1.0]);
    }
}
