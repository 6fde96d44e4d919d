//! # Rendering Module
//!
//! The world-facing half of rendering: chunk meshes and the per-frame draw walk.
//!
//! Pipelines, shaders and the camera belong to the host. The host supplies a
//! [`ChunkVisibility`] test (usually its frustum) and a [`DrawSink`] that turns
//! draw requests into GPU commands; [`draw_visible_chunks`] connects the two
//! with whatever the chunk store currently holds.

pub mod meshing;
mod vertex;

pub use vertex::Vertex;

use meshing::MeshHandle;

use super::voxels::{chunk::CHUNK_SIZE, coords::ChunkCoord, world::World};

/// Renderer-side visibility test for one chunk column.
pub trait ChunkVisibility {
    /// Whether the chunk at `(chunk_x, chunk_z)`, `chunk_size` blocks wide,
    /// may be on screen.
    fn is_chunk_visible(&self, chunk_x: i32, chunk_z: i32, chunk_size: usize) -> bool;
}

impl<F> ChunkVisibility for F
where
    F: Fn(i32, i32, usize) -> bool,
{
    fn is_chunk_visible(&self, chunk_x: i32, chunk_z: i32, chunk_size: usize) -> bool {
        self(chunk_x, chunk_z, chunk_size)
    }
}

/// Visibility test that accepts every chunk.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysVisible;

impl ChunkVisibility for AlwaysVisible {
    fn is_chunk_visible(&self, _chunk_x: i32, _chunk_z: i32, _chunk_size: usize) -> bool {
        true
    }
}

/// Consumer of per-chunk draw calls.
pub trait DrawSink {
    /// Draws `vertex_count` vertices from the buffer behind `handle`.
    fn draw_chunk(&mut self, coord: ChunkCoord, handle: MeshHandle, vertex_count: u32);
}

/// What one [`draw_visible_chunks`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Chunks handed to the sink
    pub drawn: usize,
    /// Chunks skipped because their mesh is empty
    pub skipped_empty: usize,
    /// Chunks skipped by the visibility test
    pub culled: usize,
    /// Vertices submitted
    pub vertices: u64,
}

/// Submits every loaded, non-empty, visible chunk to `sink`.
///
/// Empty meshes are skipped before the visibility test runs and never reach
/// the sink. Iteration order follows the store and is unspecified.
pub fn draw_visible_chunks(
    world: &World,
    visibility: &dyn ChunkVisibility,
    sink: &mut dyn DrawSink,
) -> RenderStats {
    let mut stats = RenderStats::default();

    for chunk in world.chunks() {
        let mesh = chunk.mesh;
        let Some(handle) = mesh.handle.filter(|_| !mesh.is_empty()) else {
            stats.skipped_empty += 1;
            continue;
        };

        if !visibility.is_chunk_visible(chunk.position.x, chunk.position.y, CHUNK_SIZE) {
            stats.culled += 1;
            continue;
        }

        sink.draw_chunk(chunk.position, handle, mesh.vertex_count);
        stats.drawn += 1;
        stats.vertices += mesh.vertex_count as u64;
    }

    stats
}
