use std::collections::HashMap;

use ocl::{Buffer, Queue};

/// Device buffer pool keyed by element count.
///
/// Layer shapes never change, so after the first sample every dispatch finds its buffers
/// here instead of allocating.
pub struct BufferPool {
    queue: Queue,
    buffers: HashMap<usize, Vec<Buffer<f64>>>,
    allocated_count: usize,
    reused_count: usize,
}

impl BufferPool {
    pub fn new(queue: Queue) -> Self {
        Self {
            queue,
            buffers: HashMap::new(),
            allocated_count: 0,
            reused_count: 0,
        }
    }

    /// Get a buffer of `len` elements, reusing a returned one if possible
    pub fn get_buffer(&mut self, len: usize) -> ocl::Result<Buffer<f64>> {
        if let Some(buffer) = self.buffers.get_mut(&len).and_then(Vec::pop) {
            self.reused_count += 1;
            return Ok(buffer);
        }

        self.allocated_count += 1;
        log::debug!("allocating device buffer of {} elements", len);
        Buffer::<f64>::builder()
            .queue(self.queue.clone())
            .flags(ocl::flags::MEM_READ_WRITE)
            .len(len.max(1))
            .build()
    }

    /// Get a buffer and copy `data` into it
    pub fn upload(&mut self, data: &[f64]) -> ocl::Result<Buffer<f64>> {
        let buffer = self.get_buffer(data.len())?;
        if !data.is_empty() {
            buffer.write(data).enq()?;
        }
        Ok(buffer)
    }

    /// Return a buffer to the pool
    pub fn return_buffer(&mut self, buffer: Buffer<f64>, len: usize) {
        self.buffers.entry(len).or_default().push(buffer);
    }

    /// (allocated, reused)
    pub fn stats(&self) -> (usize, usize) {
        (self.allocated_count, self.reused_count)
    }
}
