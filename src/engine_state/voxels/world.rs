//! # World Module
//!
//! This module provides the `World` struct, the chunk store. It is the sole owner of
//! every loaded chunk and the entry point for block queries and edits.
//!
//! ## Architecture
//!
//! Chunks live in a hash map keyed by their 2D grid coordinate, so lookups and
//! point queries are O(1). Only chunks near the observer are loaded; the
//! streaming controller adds and evicts them.
//!
//! ## Meshing
//!
//! A chunk's mesh depends on its own voxels and on which of its four lateral
//! neighbours are loaded. Editing a block on a chunk edge therefore re-meshes
//! the neighbour across that edge too.
//!
//! ## Thread Affinity
//!
//! Meshing uploads through a `MeshBackend`, so every mutating call belongs on
//! the thread that owns the graphics device.

use std::collections::HashMap;

use cgmath::{Point2, Point3, Vector3};
use log::{debug, warn};

use crate::core::{EngineError, EngineResult};
use crate::engine_state::rendering::meshing::{
    build_chunk_vertices, release_chunk_mesh, upload_chunk_mesh, MeshBackend, NeighborChunks,
};

use super::{
    block::block_type::BlockType,
    chunk::{Chunk, CHUNK_SIZE},
    coords::{split_world_position, ChunkCoord},
    raycast::{self, RaycastHit},
};

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point2;
/// use voxel_world::engine_state::voxels::{chunk::Chunk, world::World};
///
/// let mut world = World::new();
/// world.insert(Chunk::empty(Point2::new(0, 0))).unwrap();
/// assert!(world.contains(Point2::new(0, 0)));
/// ```
#[derive(Debug, Default)]
pub struct World {
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        World {
            chunks: HashMap::new(),
        }
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Mutable access to the chunk at `coord`.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Whether a chunk is loaded at `coord`.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Adds a chunk at its own position.
    ///
    /// Inserting over an already loaded chunk is a caller bug: it panics in
    /// debug builds and is rejected without touching the store in release.
    pub fn insert(&mut self, chunk: Chunk) -> EngineResult<()> {
        let coord = chunk.position;
        if self.chunks.contains_key(&coord) {
            debug_assert!(false, "chunk {:?} inserted twice", coord);
            warn!("Rejected second insert of chunk {:?}", coord);
            return Err(EngineError::ChunkAlreadyLoaded(coord));
        }

        self.chunks.insert(coord, chunk);
        Ok(())
    }

    /// Takes a chunk out of the store.
    ///
    /// The caller owns the chunk's GPU buffer from here on; see [`World::evict`].
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    /// Releases a chunk's GPU buffer and drops it.
    ///
    /// # Returns
    /// `false` if nothing was loaded at `coord`.
    pub fn evict(&mut self, coord: ChunkCoord, backend: &mut dyn MeshBackend) -> bool {
        match self.chunks.remove(&coord) {
            Some(mut chunk) => {
                release_chunk_mesh(backend, &mut chunk.mesh);
                debug!("Evicted chunk {:?}", coord);
                true
            }
            None => false,
        }
    }

    /// All loaded chunks, in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    /// Coordinates of all loaded chunks, in no particular order.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Borrows the loaded lateral neighbours of `coord`.
    pub fn neighbors_of(&self, coord: ChunkCoord) -> NeighborChunks<'_> {
        NeighborChunks {
            west: self.get(Point2::new(coord.x - 1, coord.y)),
            east: self.get(Point2::new(coord.x + 1, coord.y)),
            north: self.get(Point2::new(coord.x, coord.y - 1)),
            south: self.get(Point2::new(coord.x, coord.y + 1)),
        }
    }

    /// Rebuilds and re-uploads the mesh of the chunk at `coord`.
    ///
    /// # Returns
    /// `false` if no chunk is loaded there.
    pub fn remesh_chunk(&mut self, coord: ChunkCoord, backend: &mut dyn MeshBackend) -> EngineResult<bool> {
        let Some(chunk) = self.chunks.get(&coord) else {
            return Ok(false);
        };
        let vertices = build_chunk_vertices(chunk, &self.neighbors_of(coord));
        let mesh = upload_chunk_mesh(backend, chunk.mesh, &vertices)?;

        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.mesh = mesh;
        }
        Ok(true)
    }

    /// Block at a world position.
    ///
    /// Air when the owning chunk is not loaded or `y` is outside the world.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        split_world_position(Point3::new(x, y, z))
            .and_then(|(coord, local)| {
                self.get(coord)
                    .map(|chunk| chunk.block_at(local.x, local.y, local.z))
            })
            .unwrap_or(BlockType::AIR)
    }

    /// Changes one block and re-meshes every chunk whose faces it touches.
    ///
    /// Does nothing when `y` is outside the world or the chunk is not loaded.
    /// Besides the owning chunk, the neighbour across each chunk edge the block
    /// sits on is re-meshed as well.
    ///
    /// # Returns
    /// `true` if a voxel changed.
    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        block_type: BlockType,
        backend: &mut dyn MeshBackend,
    ) -> EngineResult<bool> {
        let Some((coord, local)) = split_world_position(Point3::new(x, y, z)) else {
            return Ok(false);
        };
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            debug!("Ignored edit at ({}, {}, {}): chunk {:?} not loaded", x, y, z, coord);
            return Ok(false);
        };

        if chunk.set_block_at(local.x, local.y, local.z, block_type) == block_type {
            return Ok(false);
        }

        self.remesh_chunk(coord, backend)?;

        let last = CHUNK_SIZE - 1;
        let edges = [
            (local.x == 0, Point2::new(coord.x - 1, coord.y)),
            (local.x == last, Point2::new(coord.x + 1, coord.y)),
            (local.z == 0, Point2::new(coord.x, coord.y - 1)),
            (local.z == last, Point2::new(coord.x, coord.y + 1)),
        ];
        for (on_edge, neighbor) in edges {
            if on_edge {
                self.remesh_chunk(neighbor, backend)?;
            }
        }

        Ok(true)
    }

    /// First solid block along a ray, see [`raycast::raycast`].
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        raycast::raycast(self, origin, direction, max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::HeadlessMeshBackend;

    fn solid_world(coords: &[(i32, i32)], backend: &mut HeadlessMeshBackend) -> World {
        let mut world = World::new();
        for &(x, z) in coords {
            world.insert(Chunk::filled(Point2::new(x, z), BlockType::STONE)).unwrap();
        }
        for &(x, z) in coords {
            world.remesh_chunk(Point2::new(x, z), backend).unwrap();
        }
        world
    }

    #[test]
    fn test_block_at_resolves_negative_coordinates() {
        let mut world = World::new();
        let mut chunk = Chunk::empty(Point2::new(-1, -1));
        chunk.set_block_at(15, 5, 15, BlockType::SNOW);
        world.insert(chunk).unwrap();

        assert_eq!(world.block_at(-1, 5, -1), BlockType::SNOW);
        assert_eq!(world.block_at(-1, 6, -1), BlockType::AIR);
        assert_eq!(world.block_at(-17, 5, -1), BlockType::AIR);
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = World::new();
        for (x, z) in [(0, 0), (-1, 0), (0, -1), (-1, -1)] {
            world.insert(Chunk::empty(Point2::new(x, z))).unwrap();
        }

        for (x, y, z) in [(0, 0, 0), (-1, 5, -1), (15, 255, -16), (-16, 128, 15), (7, 1, -9)] {
            assert!(world.set_block(x, y, z, BlockType::WOOD, &mut backend).unwrap());
            assert_eq!(world.block_at(x, y, z), BlockType::WOOD);
        }
    }

    #[test]
    fn test_out_of_range_height_is_air_and_ignored() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = World::new();
        world.insert(Chunk::filled(Point2::new(0, 0), BlockType::STONE)).unwrap();

        assert!(!world.set_block(1, -1, 1, BlockType::SAND, &mut backend).unwrap());
        assert!(!world.set_block(1, 256, 1, BlockType::SAND, &mut backend).unwrap());
        assert_eq!(world.block_at(1, -1, 1), BlockType::AIR);
        assert_eq!(world.block_at(1, 256, 1), BlockType::AIR);
        assert_eq!(backend.upload_count(), 0);
    }

    #[test]
    fn test_set_block_on_missing_chunk_is_noop() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = World::new();
        assert!(!world.set_block(100, 10, 100, BlockType::DIRT, &mut backend).unwrap());
        assert!(world.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "inserted twice")]
    fn test_double_insert_panics_in_debug() {
        let mut world = World::new();
        world.insert(Chunk::empty(Point2::new(3, 3))).unwrap();
        let _ = world.insert(Chunk::empty(Point2::new(3, 3)));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_double_insert_is_rejected_in_release() {
        let mut world = World::new();
        world.insert(Chunk::empty(Point2::new(3, 3))).unwrap();
        let result = world.insert(Chunk::filled(Point2::new(3, 3), BlockType::STONE));
        assert!(matches!(result, Err(EngineError::ChunkAlreadyLoaded(_))));
        assert_eq!(world.block_at(48, 0, 48), BlockType::AIR);
    }

    #[test]
    fn test_evict_releases_mesh() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = solid_world(&[(0, 0)], &mut backend);
        assert_eq!(backend.live_mesh_count(), 1);

        assert!(world.evict(Point2::new(0, 0), &mut backend));
        assert_eq!(backend.live_mesh_count(), 0);
        assert!(!world.evict(Point2::new(0, 0), &mut backend));
    }

    #[test]
    fn test_edge_edit_remeshes_west_neighbor() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = World::new();

        // A lone pillar at the east edge of chunk (1, 2), facing empty chunk (2, 2).
        let mut west = Chunk::empty(Point2::new(1, 2));
        west.set_block_at(15, 10, 5, BlockType::STONE);
        world.insert(west).unwrap();
        world.insert(Chunk::empty(Point2::new(2, 2))).unwrap();
        world.remesh_chunk(Point2::new(1, 2), &mut backend).unwrap();
        world.remesh_chunk(Point2::new(2, 2), &mut backend).unwrap();

        let west_before = world.get(Point2::new(1, 2)).unwrap().mesh.vertex_count;
        assert_eq!(west_before, 36);
        assert!(world.get(Point2::new(2, 2)).unwrap().mesh.is_empty());

        // World x = 32 is local x = 0 of chunk (2, 2).
        assert!(world.set_block(32, 10, 37, BlockType::STONE, &mut backend).unwrap());

        let west_after = world.get(Point2::new(1, 2)).unwrap().mesh.vertex_count;
        let east_after = world.get(Point2::new(2, 2)).unwrap().mesh.vertex_count;
        assert_eq!(west_after, west_before - 6);
        assert_eq!(east_after, 30);
    }

    #[test]
    fn test_interior_edit_leaves_neighbors_alone() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = solid_world(&[(0, 0), (1, 0)], &mut backend);
        let uploads = backend.upload_count();

        assert!(world.set_block(5, 255, 5, BlockType::AIR, &mut backend).unwrap());
        assert_eq!(backend.upload_count(), uploads + 1);
    }

    #[test]
    fn test_unchanged_edit_does_not_remesh() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = solid_world(&[(0, 0)], &mut backend);
        let uploads = backend.upload_count();

        assert!(!world.set_block(3, 3, 3, BlockType::STONE, &mut backend).unwrap());
        assert_eq!(backend.upload_count(), uploads);
    }

    #[test]
    fn test_clearing_chunk_releases_buffer() {
        let mut backend = HeadlessMeshBackend::new();
        let mut world = World::new();
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.set_block_at(4, 4, 4, BlockType::DIRT);
        world.insert(chunk).unwrap();
        world.remesh_chunk(Point2::new(0, 0), &mut backend).unwrap();
        assert_eq!(backend.live_mesh_count(), 1);

        world.set_block(4, 4, 4, BlockType::AIR, &mut backend).unwrap();
        let mesh = world.get(Point2::new(0, 0)).unwrap().mesh;
        assert!(mesh.is_empty());
        assert_eq!(mesh.handle, None);
        assert_eq!(backend.live_mesh_count(), 0);
    }
}
