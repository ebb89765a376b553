//! Host implementations of the two per-lane kernels.
//!
//! The CPU and serial backends share these so both run exactly the arithmetic the OpenCL
//! program in `kernels.cl` runs, in the same summation order.

use ndarray::{ArrayView1, ArrayViewMut1};

use crate::error::{NetError, Result};

use crate::activations::{sigmoid, sigmoid_derivative};
use super::ErrorSignal;

/// Name of the forward kernel in every backend.
pub const FEED_FORWARD: &str = "feed_forward";

/// Name of the backward kernel in every backend.
pub const BACK_PROPAGATION: &str = "back_propagation";

/// Convert a size or label into the `int` the device kernels take.
pub fn int_arg(value: usize, kernel: &'static str, layer: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        NetError::dispatch_failure(kernel, layer, format!("{} does not fit a kernel int argument", value))
    })
}

/// Forward lane: weighted sum of the inputs plus `bias * bias_weight`, through the sigmoid.
#[inline]
pub fn feed_forward_lane(inputs: ArrayView1<f64>, weights: ArrayView1<f64>, bias: f64, bias_weight: f64) -> f64 {
    let mut sum = 0.0;
    for (x, w) in inputs.iter().zip(weights.iter()) {
        sum += x * w;
    }
    sum += bias * bias_weight;
    sigmoid(sum)
}

/// Raw (pre-derivative) error of neuron `j`.
#[inline]
pub fn raw_error(j: usize, activation: f64, signal: &ErrorSignal<'_>) -> f64 {
    match signal {
        ErrorSignal::Target(label) => {
            let target = if j == *label { 1.0 } else { 0.0 };
            activation - target
        }
        ErrorSignal::NextLayer { weights, deltas } => {
            let mut sum = 0.0;
            for (w, d) in weights.column(j).iter().zip(deltas.iter()) {
                sum += w * d;
            }
            sum
        }
    }
}

/// Backward lane: compute the delta of neuron `j`, then step its incoming weights.
///
/// Returns the delta. Only row `j` of the weight matrix is touched.
#[inline]
pub fn back_propagation_lane(
    j: usize,
    activation: f64,
    inputs: ArrayView1<f64>,
    signal: &ErrorSignal<'_>,
    mut weights: ArrayViewMut1<f64>,
    learning_rate: f64,
) -> f64 {
    let delta = raw_error(j, activation, signal) * sigmoid_derivative(activation);
    for (w, x) in weights.iter_mut().zip(inputs.iter()) {
        *w -= learning_rate * x * delta;
    }
    delta
}
