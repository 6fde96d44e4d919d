//! In-memory mesh storage for tests, benchmarks and hosts without a GPU.

use std::collections::HashMap;

use log::warn;

use super::{MeshBackend, MeshHandle};
use crate::{core::EngineResult, engine_state::rendering::Vertex};

/// A [`MeshBackend`] that keeps vertex data in host memory.
///
/// Counts uploads and releases so callers can check that nothing leaks and
/// that empty meshes never reach the backend.
#[derive(Debug, Default)]
pub struct HeadlessMeshBackend {
    meshes: HashMap<MeshHandle, Vec<Vertex>>,
    next_handle: u64,
    uploads: usize,
    releases: usize,
}

impl HeadlessMeshBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices stored under `handle`.
    pub fn vertices(&self, handle: MeshHandle) -> Option<&[Vertex]> {
        self.meshes.get(&handle).map(Vec::as_slice)
    }

    /// Number of buffers currently held.
    pub fn live_mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total uploads so far.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Total releases so far.
    pub fn release_count(&self) -> usize {
        self.releases
    }
}

impl MeshBackend for HeadlessMeshBackend {
    fn upload(&mut self, existing: Option<MeshHandle>, vertices: &[Vertex]) -> EngineResult<MeshHandle> {
        self.uploads += 1;

        if let Some(handle) = existing {
            if let Some(buffer) = self.meshes.get_mut(&handle) {
                buffer.clear();
                buffer.extend_from_slice(vertices);
                return Ok(handle);
            }
        }

        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.meshes.insert(handle, vertices.to_vec());
        Ok(handle)
    }

    fn release(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_some() {
            self.releases += 1;
        } else {
            warn!("Release of unknown mesh {:?}", handle);
        }
    }
}
