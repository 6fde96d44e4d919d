//! # Buffer State Module
//!
//! GPU storage for chunk meshes. `BufferState` is the wgpu-backed
//! [`MeshBackend`]: one vertex buffer per chunk, keyed by its [`MeshHandle`].
//!
//! ## Key Features
//!
//! * Buffers are rewritten in place while the new mesh fits, and reallocated
//!   only when it grows past the current allocation
//! * Buffer usage analytics and memory tracking
//! * A [`DrawSink`] that replays chunk draws into a `wgpu::RenderPass`
//!
//! ## Thread Affinity
//!
//! Every call here must come from the thread that owns the device. Worker
//! threads never see a `BufferState`.

use std::collections::HashMap;

use log::{info, trace, warn};
use wgpu::{util::DeviceExt, Buffer, Device, Queue};

use crate::{
    core::{EngineError, EngineResult},
    engine_state::{
        rendering::{
            meshing::{MeshBackend, MeshHandle},
            DrawSink, Vertex,
        },
        voxels::coords::ChunkCoord,
    },
};

/// Analytics data for a GPU buffer
///
/// Tracks memory allocation, usage, and write operations for a buffer
/// to help identify optimization opportunities.
#[derive(Debug)]
struct BufferAnalytics {
    /// Total memory allocated for the buffer in bytes
    allocated_memory: u64,
    /// Bytes holding the current mesh
    used_memory: u64,
    /// Number of times the buffer has been written to
    times_written: u64,
}

/// Central manager for chunk vertex buffers.
///
/// # Examples
///
/// ```no_run
/// use voxel_world::engine_state::buffer_state::BufferState;
///
/// let buffer_state = BufferState::request_headless().unwrap();
/// println!("{} bytes allocated", buffer_state.get_total_allocated_memory());
/// ```
pub struct BufferState {
    /// Reference to the GPU device
    device: Device,
    /// Reference to the GPU command queue
    queue: Queue,
    /// Vertex buffer behind each live mesh handle
    buffers: HashMap<MeshHandle, Buffer>,
    /// Analytics data for each buffer
    buffer_analytics: HashMap<MeshHandle, BufferAnalytics>,
    next_handle: u64,
}

impl BufferState {
    /// Creates a new buffer state manager
    ///
    /// # Arguments
    ///
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    pub fn new(device: Device, queue: Queue) -> Self {
        Self {
            device,
            queue,
            buffers: HashMap::new(),
            buffer_analytics: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Acquires a device without a surface and wraps it.
    ///
    /// # Errors
    ///
    /// `EngineError::Gpu` when no adapter or device is available.
    pub fn request_headless() -> EngineResult<Self> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::PRIMARY,
                flags: wgpu::InstanceFlags::empty(),
                backend_options: wgpu::BackendOptions::from_env_or_default(),
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|err| EngineError::Gpu(err.to_string()))?;

            info!("Using adapter {:?}", adapter.get_info().name);

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    label: Some("Voxel World Device"),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    trace: wgpu::Trace::Off,
                })
                .await
                .map_err(|err| EngineError::Gpu(err.to_string()))?;

            Ok(Self::new(device, queue))
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Gets the vertex buffer behind `handle`
    pub fn get_buffer(&self, handle: MeshHandle) -> Option<&Buffer> {
        self.buffers.get(&handle)
    }

    /// Number of live vertex buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Gets the total allocated memory across all buffers
    ///
    /// # Returns
    ///
    /// Total allocated memory in bytes
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, buffer_analytics| acc + buffer_analytics.allocated_memory)
    }

    /// Gets the total used memory across all buffers
    ///
    /// # Returns
    ///
    /// Total used memory in bytes
    pub fn get_total_used_memory(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, buffer_analytics| acc + buffer_analytics.used_memory)
    }

    /// Total writes across all buffers, allocations included.
    pub fn get_total_writes(&self) -> u64 {
        self.buffer_analytics
            .values()
            .fold(0, |acc, buffer_analytics| acc + buffer_analytics.times_written)
    }

    fn create_vertex_buffer(&mut self, handle: MeshHandle, contents: &[u8]) {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Chunk Vertex Buffer"),
                contents,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });

        self.buffers.insert(handle, buffer);
        self.buffer_analytics.insert(
            handle,
            BufferAnalytics {
                allocated_memory: contents.len() as u64,
                used_memory: contents.len() as u64,
                times_written: 1,
            },
        );
    }
}

impl MeshBackend for BufferState {
    fn upload(&mut self, existing: Option<MeshHandle>, vertices: &[Vertex]) -> EngineResult<MeshHandle> {
        if vertices.is_empty() {
            return Err(EngineError::Gpu("refusing to upload an empty mesh".to_string()));
        }
        let contents: &[u8] = bytemuck::cast_slice(vertices);
        let size = contents.len() as u64;

        if let Some(handle) = existing {
            if let Some(buffer) = self.buffers.get(&handle) {
                if buffer.size() >= size {
                    self.queue.write_buffer(buffer, 0, contents);
                    if let Some(analytics) = self.buffer_analytics.get_mut(&handle) {
                        analytics.used_memory = size;
                        analytics.times_written += 1;
                    }
                    trace!("Rewrote {:?} in place ({} bytes)", handle, size);
                    return Ok(handle);
                }

                trace!("Growing {:?} from {} to {} bytes", handle, buffer.size(), size);
                buffer.destroy();
            }
            self.create_vertex_buffer(handle, contents);
            return Ok(handle);
        }

        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.create_vertex_buffer(handle, contents);
        Ok(handle)
    }

    fn release(&mut self, handle: MeshHandle) {
        self.buffer_analytics.remove(&handle);
        match self.buffers.remove(&handle) {
            Some(buffer) => buffer.destroy(),
            None => warn!("Release of unknown buffer {:?}", handle),
        }
    }
}

/// Replays chunk draws into a render pass whose pipeline and bind groups the
/// host has already set.
pub struct RenderPassSink<'p, 'e> {
    pass: &'p mut wgpu::RenderPass<'e>,
    buffers: &'p BufferState,
}

impl<'p, 'e> RenderPassSink<'p, 'e> {
    pub fn new(pass: &'p mut wgpu::RenderPass<'e>, buffers: &'p BufferState) -> Self {
        Self { pass, buffers }
    }
}

impl DrawSink for RenderPassSink<'_, '_> {
    fn draw_chunk(&mut self, coord: ChunkCoord, handle: MeshHandle, vertex_count: u32) {
        let Some(buffer) = self.buffers.get_buffer(handle) else {
            warn!("Chunk {:?} points at missing buffer {:?}", coord, handle);
            return;
        };
        self.pass.set_vertex_buffer(0, buffer.slice(..));
        self.pass.draw(0..vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quads(count: usize) -> Vec<Vertex> {
        vec![bytemuck::Zeroable::zeroed(); 6 * count]
    }

    #[test]
    fn test_upload_rewrite_and_release() {
        // Skipped on machines without a usable adapter.
        let Ok(mut buffer_state) = BufferState::request_headless() else {
            return;
        };
        let vertex_size = std::mem::size_of::<Vertex>() as u64;

        let handle = buffer_state.upload(None, &quads(2)).unwrap();
        assert_eq!(buffer_state.get_total_allocated_memory(), 12 * vertex_size);

        let same = buffer_state.upload(Some(handle), &quads(1)).unwrap();
        assert_eq!(same, handle);
        assert_eq!(buffer_state.get_total_allocated_memory(), 12 * vertex_size);
        assert_eq!(buffer_state.get_total_used_memory(), 6 * vertex_size);

        let grown = buffer_state.upload(Some(handle), &quads(4)).unwrap();
        assert_eq!(grown, handle);
        assert_eq!(buffer_state.get_total_allocated_memory(), 24 * vertex_size);

        buffer_state.release(handle);
        assert_eq!(buffer_state.buffer_count(), 0);
        assert_eq!(buffer_state.get_total_allocated_memory(), 0);
    }
}
