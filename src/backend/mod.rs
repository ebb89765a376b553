//! Compute backends that run the per-neuron kernels.
//!
//! The engine talks to a backend through one operation: [`ComputeBackend::dispatch`], which
//! runs a named kernel over one lane per neuron of the current layer. A dispatch borrows the
//! host buffers it reads and writes and returns only after every lane has finished and every
//! write is visible in those buffers. Layers are dispatched one at a time, so the return of
//! one dispatch is the barrier before the next.
//!
//! Available backends:
//!
//! - [`CpuBackend`]: one rayon task per lane
//! - [`SerialBackend`]: single-threaded reference with a dispatch log and failure injection
//! - `OpenClBackend`: OpenCL device backend, behind the `gpu` feature

pub mod cpu;
pub mod kernels;
pub mod serial;

#[cfg(feature = "gpu")]
pub mod memory;

#[cfg(feature = "gpu")]
pub mod opencl;

use std::fmt;

use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};
use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

pub use cpu::CpuBackend;
pub use kernels::{BACK_PROPAGATION, FEED_FORWARD};
pub use serial::{DispatchRecord, SerialBackend};

#[cfg(feature = "gpu")]
pub use opencl::OpenClBackend;

/// Supported device types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Cpu,
    IntelGpu,
    NvidiaGpu,
    AmdGpu,
    OtherGpu,
}

/// Backend selection used by configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Cpu,
    Serial,
    #[serde(rename = "opencl")]
    OpenCl,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Cpu => write!(f, "cpu"),
            BackendKind::Serial => write!(f, "serial"),
            BackendKind::OpenCl => write!(f, "opencl"),
        }
    }
}

/// Trait for compute backends
pub trait ComputeBackend {
    /// Run one kernel over `dispatch.lanes()` independent lanes.
    ///
    /// Must not return before every lane has completed and its results are written back
    /// into the borrowed host buffers.
    fn dispatch(&mut self, dispatch: Dispatch<'_>) -> Result<()>;

    /// Get device type
    fn device_type(&self) -> DeviceType;

    /// Human-readable device description
    fn device_info(&self) -> Result<String>;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Box<B> {
    fn dispatch(&mut self, dispatch: Dispatch<'_>) -> Result<()> {
        (**self).dispatch(dispatch)
    }

    fn device_type(&self) -> DeviceType {
        (**self).device_type()
    }

    fn device_info(&self) -> Result<String> {
        (**self).device_info()
    }
}

/// Create a boxed backend of the requested kind.
pub fn create(kind: BackendKind) -> Result<Box<dyn ComputeBackend>> {
    let backend: Box<dyn ComputeBackend> = match kind {
        BackendKind::Cpu => Box::new(CpuBackend::new()),
        BackendKind::Serial => Box::new(SerialBackend::new()),
        #[cfg(feature = "gpu")]
        BackendKind::OpenCl => Box::new(OpenClBackend::new()?),
        #[cfg(not(feature = "gpu"))]
        BackendKind::OpenCl => {
            return Err(NetError::BackendUnavailable(
                "OpenCL support not compiled. Enable with --features gpu".to_string(),
            ))
        }
    };
    log::info!("using {} backend ({:?})", kind, backend.device_type());
    Ok(backend)
}

/// Work for the forward kernel: one lane per neuron of `layer`.
#[derive(Debug)]
pub struct ForwardLanes<'a> {
    pub layer: usize,
    /// Activations of the previous layer
    pub inputs: ArrayView1<'a, f64>,
    /// `(neurons, inputs)` row-major incoming weights
    pub weights: ArrayView2<'a, f64>,
    pub biases: ArrayView1<'a, f64>,
    pub bias_weights: ArrayView1<'a, f64>,
    /// Activations of this layer, written by the lanes
    pub outputs: ArrayViewMut1<'a, f64>,
}

/// Where a backward lane takes its raw error from.
#[derive(Debug, Clone, Copy)]
pub enum ErrorSignal<'a> {
    /// Output layer: compare against the one-hot encoding of this label.
    Target(usize),
    /// Hidden layer: back-project the next layer's deltas through its weights.
    NextLayer {
        weights: ArrayView2<'a, f64>,
        deltas: ArrayView1<'a, f64>,
    },
}

/// Work for the backward kernel: one lane per neuron of `layer`.
#[derive(Debug)]
pub struct BackwardLanes<'a> {
    pub layer: usize,
    /// Activations of the previous layer
    pub inputs: ArrayView1<'a, f64>,
    /// Activations of this layer from the matching forward pass
    pub activations: ArrayView1<'a, f64>,
    /// Incoming weights, updated in place
    pub weights: ArrayViewMut2<'a, f64>,
    /// Per-neuron error signal, written by the lanes
    pub deltas: ArrayViewMut1<'a, f64>,
    pub signal: ErrorSignal<'a>,
    pub learning_rate: f64,
}

/// A single kernel launch.
#[derive(Debug)]
pub enum Dispatch<'a> {
    FeedForward(ForwardLanes<'a>),
    BackPropagate(BackwardLanes<'a>),
}

impl Dispatch<'_> {
    pub fn kernel_name(&self) -> &'static str {
        match self {
            Dispatch::FeedForward(_) => FEED_FORWARD,
            Dispatch::BackPropagate(_) => BACK_PROPAGATION,
        }
    }

    pub fn layer(&self) -> usize {
        match self {
            Dispatch::FeedForward(lanes) => lanes.layer,
            Dispatch::BackPropagate(lanes) => lanes.layer,
        }
    }

    /// Grid size: the neuron count of the dispatched layer.
    pub fn lanes(&self) -> usize {
        match self {
            Dispatch::FeedForward(lanes) => lanes.outputs.len(),
            Dispatch::BackPropagate(lanes) => lanes.activations.len(),
        }
    }

    /// Check that every buffer agrees with the grid size before any lane runs.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(NetError::dispatch_failure(self.kernel_name(), self.layer(), reason));
        match self {
            Dispatch::FeedForward(lanes) => {
                let count = lanes.outputs.len();
                if lanes.weights.dim() != (count, lanes.inputs.len()) {
                    return fail(format!(
                        "weights shape {:?} does not match ({}, {})",
                        lanes.weights.dim(),
                        count,
                        lanes.inputs.len()
                    ));
                }
                if lanes.biases.len() != count || lanes.bias_weights.len() != count {
                    return fail(format!(
                        "bias buffers of length {}/{} for {} lanes",
                        lanes.biases.len(),
                        lanes.bias_weights.len(),
                        count
                    ));
                }
            }
            Dispatch::BackPropagate(lanes) => {
                let count = lanes.activations.len();
                if lanes.weights.dim() != (count, lanes.inputs.len()) {
                    return fail(format!(
                        "weights shape {:?} does not match ({}, {})",
                        lanes.weights.dim(),
                        count,
                        lanes.inputs.len()
                    ));
                }
                if lanes.deltas.len() != count {
                    return fail(format!("delta buffer of length {} for {} lanes", lanes.deltas.len(), count));
                }
                match lanes.signal {
                    ErrorSignal::Target(label) if label >= count => {
                        return fail(format!("target {} outside {} output lanes", label, count));
                    }
                    ErrorSignal::NextLayer { weights, deltas } => {
                        if weights.ncols() != count || weights.nrows() != deltas.len() {
                            return fail(format!(
                                "next layer weights {:?} and deltas {} do not fit {} lanes",
                                weights.dim(),
                                deltas.len(),
                                count
                            ));
                        }
                    }
                    ErrorSignal::Target(_) => {}
                }
            }
        }
        Ok(())
    }
}
