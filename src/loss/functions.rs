use ndarray::{Array1, ArrayView1};

/// Trait defining the interface for loss functions
pub trait Loss: Send + Sync {
    /// Compute the loss for a single prediction and target
    fn compute(&self, prediction: ArrayView1<f64>, target: ArrayView1<f64>) -> f64;

    /// Compute the gradient of the loss with respect to predictions
    fn gradient(&self, prediction: ArrayView1<f64>, target: ArrayView1<f64>) -> Array1<f64>;
}

/// Mean squared difference over the output neurons.
///
/// `compute` is `mean_j((p_j - t_j)^2)`. `gradient` returns the raw error `p - t`
/// that the output-layer kernel uses, without the constant factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl Loss for SquaredError {
    fn compute(&self, prediction: ArrayView1<f64>, target: ArrayView1<f64>) -> f64 {
        if prediction.is_empty() {
            return 0.0;
        }
        let diff = &prediction - &target;
        (&diff * &diff).sum() / prediction.len() as f64
    }

    fn gradient(&self, prediction: ArrayView1<f64>, target: ArrayView1<f64>) -> Array1<f64> {
        &prediction - &target
    }
}

/// One-hot encoding of `label` over `classes` outputs.
///
/// A label outside the range yields an all-zero vector; callers validate labels first.
pub fn one_hot(label: usize, classes: usize) -> Array1<f64> {
    Array1::from_shape_fn(classes, |j| if j == label { 1.0 } else { 0.0 })
}
