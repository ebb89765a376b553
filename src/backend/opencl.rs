use std::fmt;

use ndarray::{ArrayView1, ArrayView2};
use ocl::enums::{DeviceInfo, DeviceInfoResult, ProgramInfo, ProgramInfoResult};
use ocl::{Context, Device, Kernel, Platform, Program, Queue};
use ocl::DeviceType as OclDeviceType;

use crate::error::{NetError, Result};
use super::kernels::{int_arg, BACK_PROPAGATION, FEED_FORWARD};
use super::memory::BufferPool;
use super::{BackwardLanes, ComputeBackend, DeviceType, Dispatch, ErrorSignal, ForwardLanes};

const KERNEL_SOURCE: &str = include_str!("kernels.cl");

/// OpenCL backend.
///
/// The program is built once here and shared by every dispatch. All OpenCL objects are
/// reference counted by `ocl` and released on drop, including when construction fails
/// halfway through.
pub struct OpenClBackend {
    queue: Queue,
    device: Device,
    device_type: DeviceType,
    program: Program,
    pool: BufferPool,
}

impl OpenClBackend {
    /// Open the best available device and build the kernels.
    pub fn new() -> Result<Self> {
        let (platform, device, device_type) = Self::find_best_device()?;

        let context = Context::builder()
            .platform(platform)
            .devices(device)
            .build()
            .map_err(|e| NetError::BackendUnavailable(format!("Failed to create context: {}", e)))?;

        let queue = Queue::new(&context, device, None)
            .map_err(|e| NetError::BackendUnavailable(format!("Failed to create queue: {}", e)))?;

        let program = Program::builder()
            .source(KERNEL_SOURCE)
            .devices(device)
            .build(&context)
            .map_err(|e| NetError::KernelCompileError(e.to_string()))?;
        Self::check_kernels(&program)?;

        log::info!("OpenCL backend initialized on {:?}", device_type);

        Ok(Self {
            pool: BufferPool::new(queue.clone()),
            queue,
            device,
            device_type,
            program,
        })
    }

    fn check_kernels(program: &Program) -> Result<()> {
        let names = match program.info(ProgramInfo::KernelNames) {
            Ok(ProgramInfoResult::KernelNames(names)) => names,
            Ok(other) => return Err(NetError::KernelCompileError(format!("unexpected program info: {:?}", other))),
            Err(e) => return Err(NetError::KernelCompileError(e.to_string())),
        };
        for kernel in [FEED_FORWARD, BACK_PROPAGATION] {
            if !names.split(';').any(|name| name.trim() == kernel) {
                return Err(NetError::KernelCompileError(format!("kernel '{}' missing from program", kernel)));
            }
        }
        Ok(())
    }

    /// Pick a device: Intel, NVIDIA, AMD, any GPU, then a CPU OpenCL device.
    fn find_best_device() -> Result<(Platform, Device, DeviceType)> {
        // Platform::list panics when no ICD loader is installed
        let platforms = std::panic::catch_unwind(Platform::list)
            .map_err(|_| NetError::BackendUnavailable("OpenCL runtime not available".to_string()))?;

        if platforms.is_empty() {
            return Err(NetError::BackendUnavailable(
                "No OpenCL platforms found. Please install OpenCL drivers for your device.".to_string(),
            ));
        }

        let mut gpus = Vec::new();
        let mut cpus = Vec::new();
        for platform in &platforms {
            let devices = Device::list_all(platform)
                .map_err(|e| NetError::BackendUnavailable(format!("Failed to list devices: {}", e)))?;
            for device in devices {
                match device.info(DeviceInfo::Type) {
                    Ok(DeviceInfoResult::Type(dtype)) if dtype.contains(OclDeviceType::GPU) => {
                        let vendor = device.vendor().unwrap_or_default();
                        gpus.push((*platform, device, Self::classify_vendor(&vendor)));
                    }
                    Ok(DeviceInfoResult::Type(dtype)) if dtype.contains(OclDeviceType::CPU) => {
                        cpus.push((*platform, device, DeviceType::Cpu));
                    }
                    _ => {}
                }
            }
        }

        let priority = [DeviceType::IntelGpu, DeviceType::NvidiaGpu, DeviceType::AmdGpu, DeviceType::OtherGpu];
        for wanted in priority {
            if let Some(found) = gpus.iter().find(|(_, _, kind)| *kind == wanted) {
                return Ok(*found);
            }
        }

        if let Some(found) = cpus.first() {
            log::warn!("No GPU found, using CPU OpenCL device");
            return Ok(*found);
        }

        Err(NetError::BackendUnavailable(
            "No OpenCL device found (neither GPU nor CPU)".to_string(),
        ))
    }

    fn classify_vendor(vendor: &str) -> DeviceType {
        if vendor.contains("Intel") {
            DeviceType::IntelGpu
        } else if vendor.contains("NVIDIA") {
            DeviceType::NvidiaGpu
        } else if vendor.contains("AMD") || vendor.contains("Advanced Micro Devices") {
            DeviceType::AmdGpu
        } else {
            DeviceType::OtherGpu
        }
    }

    /// (allocated, reused) device buffer counts
    pub fn buffer_stats(&self) -> (usize, usize) {
        self.pool.stats()
    }

    fn feed_forward(&mut self, lanes: ForwardLanes<'_>) -> Result<()> {
        let layer = lanes.layer;
        let prev_count = lanes.inputs.len();
        let count = lanes.outputs.len();
        let prev_arg = int_arg(prev_count, FEED_FORWARD, layer)?;
        let count_arg = int_arg(count, FEED_FORWARD, layer)?;

        let inputs = self
            .pool
            .upload(host_slice(lanes.inputs, FEED_FORWARD, layer)?)
            .map_err(dispatch_error(FEED_FORWARD, layer))?;
        let weights = self
            .pool
            .upload(host_matrix(lanes.weights, FEED_FORWARD, layer)?)
            .map_err(dispatch_error(FEED_FORWARD, layer))?;
        let biases = self
            .pool
            .upload(host_slice(lanes.biases, FEED_FORWARD, layer)?)
            .map_err(dispatch_error(FEED_FORWARD, layer))?;
        let bias_weights = self
            .pool
            .upload(host_slice(lanes.bias_weights, FEED_FORWARD, layer)?)
            .map_err(dispatch_error(FEED_FORWARD, layer))?;
        let outputs = self.pool.get_buffer(count).map_err(dispatch_error(FEED_FORWARD, layer))?;

        let kernel = Kernel::builder()
            .program(&self.program)
            .name(FEED_FORWARD)
            .queue(self.queue.clone())
            .arg(&inputs)
            .arg(&weights)
            .arg(&biases)
            .arg(&bias_weights)
            .arg(&outputs)
            .arg(prev_arg)
            .arg(count_arg)
            .build()
            .map_err(dispatch_error(FEED_FORWARD, layer))?;

        unsafe {
            kernel
                .cmd()
                .global_work_size(count)
                .enq()
                .map_err(dispatch_error(FEED_FORWARD, layer))?;
        }
        self.queue.finish().map_err(dispatch_error(FEED_FORWARD, layer))?;

        let mut result = vec![0.0f64; count];
        outputs.read(&mut result).enq().map_err(dispatch_error(FEED_FORWARD, layer))?;
        let mut host = lanes.outputs;
        host.iter_mut().zip(&result).for_each(|(h, &r)| *h = r);

        self.pool.return_buffer(inputs, prev_count);
        self.pool.return_buffer(weights, count * prev_count);
        self.pool.return_buffer(biases, count);
        self.pool.return_buffer(bias_weights, count);
        self.pool.return_buffer(outputs, count);
        Ok(())
    }

    fn back_propagate(&mut self, lanes: BackwardLanes<'_>) -> Result<()> {
        let layer = lanes.layer;
        let prev_count = lanes.inputs.len();
        let count = lanes.activations.len();

        let (target, next_weights, next_deltas) = match lanes.signal {
            ErrorSignal::Target(label) => (int_arg(label, BACK_PROPAGATION, layer)?, &[][..], &[][..]),
            ErrorSignal::NextLayer { weights, deltas } => (
                -1,
                host_matrix(weights, BACK_PROPAGATION, layer)?,
                host_slice(deltas, BACK_PROPAGATION, layer)?,
            ),
        };
        let next_count = next_deltas.len();
        let prev_arg = int_arg(prev_count, BACK_PROPAGATION, layer)?;
        let count_arg = int_arg(count, BACK_PROPAGATION, layer)?;
        let next_arg = int_arg(next_count, BACK_PROPAGATION, layer)?;

        let inputs = self
            .pool
            .upload(host_slice(lanes.inputs, BACK_PROPAGATION, layer)?)
            .map_err(dispatch_error(BACK_PROPAGATION, layer))?;
        let activations = self
            .pool
            .upload(host_slice(lanes.activations, BACK_PROPAGATION, layer)?)
            .map_err(dispatch_error(BACK_PROPAGATION, layer))?;
        let weights = self
            .pool
            .upload(host_matrix(lanes.weights.view(), BACK_PROPAGATION, layer)?)
            .map_err(dispatch_error(BACK_PROPAGATION, layer))?;
        let deltas = self.pool.get_buffer(count).map_err(dispatch_error(BACK_PROPAGATION, layer))?;
        let next_weights_buffer = self
            .pool
            .upload(next_weights)
            .map_err(dispatch_error(BACK_PROPAGATION, layer))?;
        let next_deltas_buffer = self
            .pool
            .upload(next_deltas)
            .map_err(dispatch_error(BACK_PROPAGATION, layer))?;

        let kernel = Kernel::builder()
            .program(&self.program)
            .name(BACK_PROPAGATION)
            .queue(self.queue.clone())
            .arg(&inputs)
            .arg(&activations)
            .arg(&weights)
            .arg(&deltas)
            .arg(&next_weights_buffer)
            .arg(&next_deltas_buffer)
            .arg(prev_arg)
            .arg(count_arg)
            .arg(next_arg)
            .arg(target)
            .arg(lanes.learning_rate)
            .build()
            .map_err(dispatch_error(BACK_PROPAGATION, layer))?;

        unsafe {
            kernel
                .cmd()
                .global_work_size(count)
                .enq()
                .map_err(dispatch_error(BACK_PROPAGATION, layer))?;
        }
        self.queue.finish().map_err(dispatch_error(BACK_PROPAGATION, layer))?;

        let mut new_weights = vec![0.0f64; count * prev_count];
        let mut new_deltas = vec![0.0f64; count];
        weights.read(&mut new_weights).enq().map_err(dispatch_error(BACK_PROPAGATION, layer))?;
        deltas.read(&mut new_deltas).enq().map_err(dispatch_error(BACK_PROPAGATION, layer))?;

        let mut host_weights = lanes.weights;
        host_weights.iter_mut().zip(&new_weights).for_each(|(h, &r)| *h = r);
        let mut host_deltas = lanes.deltas;
        host_deltas.iter_mut().zip(&new_deltas).for_each(|(h, &r)| *h = r);

        self.pool.return_buffer(inputs, prev_count);
        self.pool.return_buffer(activations, count);
        self.pool.return_buffer(weights, count * prev_count);
        self.pool.return_buffer(deltas, count);
        self.pool.return_buffer(next_weights_buffer, next_weights.len());
        self.pool.return_buffer(next_deltas_buffer, next_count);
        Ok(())
    }
}

fn dispatch_error<E: fmt::Display>(kernel: &'static str, layer: usize) -> impl Fn(E) -> NetError {
    move |e| NetError::dispatch_failure(kernel, layer, e.to_string())
}

fn query_error<E: fmt::Display>(e: E) -> NetError {
    NetError::BackendUnavailable(e.to_string())
}

fn host_slice<'a>(view: ArrayView1<'a, f64>, kernel: &'static str, layer: usize) -> Result<&'a [f64]> {
    view.to_slice()
        .ok_or_else(|| NetError::dispatch_failure(kernel, layer, "host buffer is not contiguous"))
}

fn host_matrix<'a>(view: ArrayView2<'a, f64>, kernel: &'static str, layer: usize) -> Result<&'a [f64]> {
    view.to_slice()
        .ok_or_else(|| NetError::dispatch_failure(kernel, layer, "weight matrix is not row-major contiguous"))
}

impl ComputeBackend for OpenClBackend {
    fn dispatch(&mut self, dispatch: Dispatch<'_>) -> Result<()> {
        dispatch.validate()?;
        match dispatch {
            Dispatch::FeedForward(lanes) => self.feed_forward(lanes),
            Dispatch::BackPropagate(lanes) => self.back_propagate(lanes),
        }
    }

    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn device_info(&self) -> Result<String> {
        let name = self.device.name().map_err(query_error)?;
        let vendor = self.device.vendor().map_err(query_error)?;
        let version = self.device.version().map_err(query_error)?;
        let max_compute_units = match self.device.info(DeviceInfo::MaxComputeUnits).map_err(query_error)? {
            DeviceInfoResult::MaxComputeUnits(units) => units,
            _ => return Err(NetError::BackendUnavailable("Failed to get max compute units".to_string())),
        };
        let max_work_group_size = self.device.max_wg_size().map_err(query_error)?;

        Ok(format!(
            "Device: {}\nVendor: {}\nVersion: {}\nCompute Units: {}\nMax Work Group Size: {}",
            name, vendor, version, max_compute_units, max_work_group_size
        ))
    }
}

impl fmt::Display for OpenClBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpenCL Backend ({:?})", self.device_type)
    }
}
