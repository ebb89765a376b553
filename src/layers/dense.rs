use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use crate::error::{NetError, Result};

/// One fully connected layer of the chain.
///
/// `weights` is a row-major `(neuron_count, prev_count)` matrix: row `j` holds the
/// incoming weights of neuron `j`, so `weights[[j, k]]` is the weight from previous-layer
/// neuron `k`. The input layer (index 0) has empty weight, bias, bias-weight and delta
/// storage. Shapes are fixed at construction; the accessors only hand out views.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    index: usize,
    activations: Array1<f64>,
    weights: Array2<f64>,
    biases: Array1<f64>,
    bias_weights: Array1<f64>,
    deltas: Array1<f64>,
}

impl Layer {
    /// Create the input layer. It only carries activations.
    pub fn input(neuron_count: usize) -> Self {
        Layer {
            index: 0,
            activations: Array1::zeros(neuron_count),
            weights: Array2::zeros((0, 0)),
            biases: Array1::zeros(0),
            bias_weights: Array1::zeros(0),
            deltas: Array1::zeros(0),
        }
    }

    /// Create a non-input layer with zeroed parameters sized against the previous layer.
    pub fn dense(index: usize, neuron_count: usize, prev_count: usize) -> Self {
        debug_assert!(index > 0, "layer 0 is the input layer");
        Layer {
            index,
            activations: Array1::zeros(neuron_count),
            weights: Array2::zeros((neuron_count, prev_count)),
            biases: Array1::zeros(neuron_count),
            bias_weights: Array1::zeros(neuron_count),
            deltas: Array1::zeros(neuron_count),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_input(&self) -> bool {
        self.index == 0
    }

    pub fn neuron_count(&self) -> usize {
        self.activations.len()
    }

    /// Number of neurons feeding this layer; zero for the input layer.
    pub fn prev_count(&self) -> usize {
        self.weights.ncols()
    }

    pub fn activations(&self) -> ArrayView1<'_, f64> {
        self.activations.view()
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Weight from previous-layer neuron `k` into neuron `j`.
    pub fn weight(&self, j: usize, k: usize) -> f64 {
        self.weights[[j, k]]
    }

    pub fn biases(&self) -> ArrayView1<'_, f64> {
        self.biases.view()
    }

    pub fn bias_weights(&self) -> ArrayView1<'_, f64> {
        self.bias_weights.view()
    }

    pub fn deltas(&self) -> ArrayView1<'_, f64> {
        self.deltas.view()
    }

    pub fn weights_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.weights.view_mut()
    }

    pub fn biases_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.biases.view_mut()
    }

    pub fn bias_weights_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.bias_weights.view_mut()
    }

    /// Overwrite the weight matrix from a flat row-major slice.
    pub fn set_weights(&mut self, values: &[f64]) -> Result<()> {
        copy_exact("weights", self.weights.iter_mut(), values)
    }

    pub fn set_biases(&mut self, values: &[f64]) -> Result<()> {
        copy_exact("biases", self.biases.iter_mut(), values)
    }

    pub fn set_bias_weights(&mut self, values: &[f64]) -> Result<()> {
        copy_exact("bias_weights", self.bias_weights.iter_mut(), values)
    }

    /// Copy a feature vector into the activations of the input layer.
    pub(crate) fn load_input(&mut self, features: &[f64]) -> Result<()> {
        if features.len() != self.activations.len() {
            return Err(NetError::InputSizeMismatch {
                expected: self.activations.len(),
                actual: features.len(),
            });
        }
        self.activations
            .iter_mut()
            .zip(features)
            .for_each(|(a, &x)| *a = x);
        Ok(())
    }

    /// Borrows for a forward dispatch: parameters read-only, activations writable.
    pub(crate) fn forward_parts(
        &mut self,
    ) -> (ArrayView2<'_, f64>, ArrayView1<'_, f64>, ArrayView1<'_, f64>, ArrayViewMut1<'_, f64>) {
        (
            self.weights.view(),
            self.biases.view(),
            self.bias_weights.view(),
            self.activations.view_mut(),
        )
    }

    /// Borrows for a backward dispatch: activations read-only, weights and deltas writable.
    pub(crate) fn backward_parts(
        &mut self,
    ) -> (ArrayView1<'_, f64>, ArrayViewMut2<'_, f64>, ArrayViewMut1<'_, f64>) {
        (
            self.activations.view(),
            self.weights.view_mut(),
            self.deltas.view_mut(),
        )
    }
}

fn copy_exact<'a, I>(name: &str, target: I, values: &[f64]) -> Result<()>
where
    I: ExactSizeIterator<Item = &'a mut f64>,
{
    if target.len() != values.len() {
        return Err(NetError::invalid_parameter(
            name.to_string(),
            format!("expected {} values, got {}", target.len(), values.len()),
        ));
    }
    target.zip(values).for_each(|(t, &v)| *t = v);
    Ok(())
}
