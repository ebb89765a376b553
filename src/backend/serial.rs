use ndarray::Zip;

use crate::error::{NetError, Result};
use super::kernels::{back_propagation_lane, feed_forward_lane};
use super::{ComputeBackend, DeviceType, Dispatch};

/// One entry of the [`SerialBackend`] dispatch log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRecord {
    pub kernel: &'static str,
    pub layer: usize,
    pub lanes: usize,
}

/// Single-threaded reference backend.
///
/// Runs lanes one after another on the calling thread. Every dispatch is recorded, and a
/// failure can be injected at a chosen dispatch to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct SerialBackend {
    log: Vec<DispatchRecord>,
    fail_at: Option<usize>,
    attempts: usize,
}

impl SerialBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the dispatch with this zero-based attempt number, counted from construction.
    pub fn fail_on_dispatch(mut self, attempt: usize) -> Self {
        self.fail_at = Some(attempt);
        self
    }

    /// Completed dispatches, oldest first.
    pub fn dispatch_log(&self) -> &[DispatchRecord] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Dispatch attempts so far, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl ComputeBackend for SerialBackend {
    fn dispatch(&mut self, dispatch: Dispatch<'_>) -> Result<()> {
        let attempt = self.attempts;
        self.attempts += 1;

        dispatch.validate()?;
        let record = DispatchRecord {
            kernel: dispatch.kernel_name(),
            layer: dispatch.layer(),
            lanes: dispatch.lanes(),
        };
        if self.fail_at == Some(attempt) {
            return Err(NetError::dispatch_failure(record.kernel, record.layer, "injected failure"));
        }

        match dispatch {
            Dispatch::FeedForward(lanes) => {
                let inputs = lanes.inputs;
                Zip::from(lanes.outputs)
                    .and(lanes.weights.rows())
                    .and(&lanes.biases)
                    .and(&lanes.bias_weights)
                    .for_each(|out, row, &bias, &bias_weight| {
                        *out = feed_forward_lane(inputs, row, bias, bias_weight);
                    });
            }
            Dispatch::BackPropagate(mut lanes) => {
                let inputs = lanes.inputs;
                let signal = lanes.signal;
                let learning_rate = lanes.learning_rate;
                Zip::indexed(lanes.deltas)
                    .and(lanes.weights.rows_mut())
                    .and(&lanes.activations)
                    .for_each(|j, delta, row, &activation| {
                        *delta = back_propagation_lane(j, activation, inputs, &signal, row, learning_rate);
                    });
            }
        }

        self.log.push(record);
        Ok(())
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Cpu
    }

    fn device_info(&self) -> Result<String> {
        Ok("Device: Host CPU (serial reference)\nVendor: host\nHardware Threads: 1".to_string())
    }
}
