use ndarray::Zip;

use crate::error::Result;
use super::kernels::{back_propagation_lane, feed_forward_lane};
use super::{BackwardLanes, ComputeBackend, DeviceType, Dispatch, ForwardLanes};

/// Multi-threaded host backend.
///
/// Each lane is a rayon task; `par_for_each` joins all of them before returning, which
/// gives the per-layer barrier the engine relies on.
#[derive(Debug, Clone, Default)]
pub struct CpuBackend {
    dispatches: usize,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dispatches completed so far.
    pub fn dispatch_count(&self) -> usize {
        self.dispatches
    }

    fn feed_forward(lanes: ForwardLanes<'_>) {
        let ForwardLanes {
            inputs,
            weights,
            biases,
            bias_weights,
            outputs,
            ..
        } = lanes;

        Zip::from(outputs)
            .and(weights.rows())
            .and(&biases)
            .and(&bias_weights)
            .par_for_each(|out, row, &bias, &bias_weight| {
                *out = feed_forward_lane(inputs, row, bias, bias_weight);
            });
    }

    fn back_propagate(lanes: BackwardLanes<'_>) {
        let BackwardLanes {
            inputs,
            activations,
            mut weights,
            deltas,
            signal,
            learning_rate,
            ..
        } = lanes;

        Zip::indexed(deltas)
            .and(weights.rows_mut())
            .and(&activations)
            .par_for_each(|j, delta, row, &activation| {
                *delta = back_propagation_lane(j, activation, inputs, &signal, row, learning_rate);
            });
    }
}

impl ComputeBackend for CpuBackend {
    fn dispatch(&mut self, dispatch: Dispatch<'_>) -> Result<()> {
        dispatch.validate()?;
        match dispatch {
            Dispatch::FeedForward(lanes) => Self::feed_forward(lanes),
            Dispatch::BackPropagate(lanes) => Self::back_propagate(lanes),
        }
        self.dispatches += 1;
        Ok(())
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Cpu
    }

    fn device_info(&self) -> Result<String> {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Ok(format!(
            "Device: Host CPU (rayon)\nVendor: host\nHardware Threads: {}",
            threads
        ))
    }
}
