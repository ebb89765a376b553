/// Logistic sigmoid, `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid given its output `a = sigmoid(x)`.
#[inline]
pub fn sigmoid_derivative(a: f64) -> f64 {
    a * (1.0 - a)
}
