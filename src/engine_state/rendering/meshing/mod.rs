//! Mesh generation and GPU storage for chunk geometry.
//!
//! # Architecture
//! - `mesh/`: The face-culled mesher turning voxels into vertices
//! - [`MeshBackend`]: Where vertex buffers live. Implemented by the wgpu
//!   `BufferState` and by [`HeadlessMeshBackend`]
//! - [`ChunkMesh`]: What a chunk remembers about its uploaded geometry
//!
//! Building vertices is pure CPU work. Uploading and releasing go through the
//! backend and must happen on the thread that owns the graphics device.

mod headless;
mod mesh;

pub use headless::HeadlessMeshBackend;
pub use mesh::*;

use crate::{core::EngineResult, engine_state::rendering::Vertex};

/// Opaque id of one uploaded vertex buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// GPU-side geometry of one chunk.
///
/// `vertex_count` is always a multiple of 6. An empty mesh has no handle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMesh {
    /// Buffer holding the vertices, absent for empty meshes
    pub handle: Option<MeshHandle>,
    /// Number of vertices to draw
    pub vertex_count: u32,
}

impl ChunkMesh {
    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }
}

/// Storage for uploaded chunk geometry.
pub trait MeshBackend {
    /// Stores `vertices`, reusing `existing` when one is given.
    ///
    /// # Returns
    /// The handle now holding the vertices. Implementations may keep
    /// `existing` or replace it.
    fn upload(&mut self, existing: Option<MeshHandle>, vertices: &[Vertex]) -> EngineResult<MeshHandle>;

    /// Frees the buffer behind `handle`.
    fn release(&mut self, handle: MeshHandle);
}

/// Uploads freshly built vertices for a chunk whose current mesh is `existing`.
///
/// No vertices means no upload: any previous buffer is released and the
/// returned mesh is empty.
pub fn upload_chunk_mesh(
    backend: &mut dyn MeshBackend,
    existing: ChunkMesh,
    vertices: &[Vertex],
) -> EngineResult<ChunkMesh> {
    debug_assert_eq!(vertices.len() % 6, 0);

    if vertices.is_empty() {
        if let Some(handle) = existing.handle {
            backend.release(handle);
        }
        return Ok(ChunkMesh::default());
    }

    let handle = backend.upload(existing.handle, vertices)?;
    Ok(ChunkMesh {
        handle: Some(handle),
        vertex_count: vertices.len() as u32,
    })
}

/// Releases a chunk's buffer, leaving it empty.
pub fn release_chunk_mesh(backend: &mut dyn MeshBackend, mesh: &mut ChunkMesh) {
    if let Some(handle) = mesh.handle.take() {
        backend.release(handle);
    }
    mesh.vertex_count = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Vec<Vertex> {
        vec![bytemuck::Zeroable::zeroed(); 6]
    }

    #[test]
    fn test_empty_upload_skips_backend() {
        let mut backend = HeadlessMeshBackend::new();
        let mesh = upload_chunk_mesh(&mut backend, ChunkMesh::default(), &[]).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.handle, None);
        assert_eq!(backend.upload_count(), 0);
    }

    #[test]
    fn test_reupload_reuses_handle() {
        let mut backend = HeadlessMeshBackend::new();
        let first = upload_chunk_mesh(&mut backend, ChunkMesh::default(), &quad()).unwrap();
        let mut twelve = quad();
        twelve.extend(quad());
        let second = upload_chunk_mesh(&mut backend, first, &twelve).unwrap();

        assert_eq!(first.handle, second.handle);
        assert_eq!(second.vertex_count, 12);
        assert_eq!(backend.live_mesh_count(), 1);
    }

    #[test]
    fn test_emptying_releases_buffer() {
        let mut backend = HeadlessMeshBackend::new();
        let first = upload_chunk_mesh(&mut backend, ChunkMesh::default(), &quad()).unwrap();
        let emptied = upload_chunk_mesh(&mut backend, first, &[]).unwrap();

        assert!(emptied.is_empty());
        assert_eq!(backend.release_count(), 1);
        assert_eq!(backend.live_mesh_count(), 0);
    }
}
