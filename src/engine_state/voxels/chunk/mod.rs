//! # Chunk Module
//!
//! This module provides the `Chunk` struct: one 16 x 256 x 16 column of the
//! world, plus the mesh last built from it.
//!
//! ## Storage
//!
//! Blocks are stored densely, one `BlockType` per voxel, column-major:
//! index = `(x * CHUNK_SIZE + z) * CHUNK_HEIGHT + y`. A whole vertical column is
//! therefore contiguous, which is the order the terrain generator fills it in
//! and the order the mesher walks it.
//!
//! ### Performance Characteristics
//! - **Block Lookup**: O(1)
//! - **Memory Usage**: 64 KiB per chunk
//!
//! The array is allocated once when the chunk is created and never resized;
//! only individual voxels change afterwards.

use cgmath::Point3;

use super::block::block_type::BlockType;
use super::coords::{chunk_origin, ChunkCoord};
use crate::engine_state::rendering::meshing::ChunkMesh;

pub use chunk_creation::ChunkCreationIterator;
pub use chunk_iteration::ChunkBlockIterator;

mod chunk_creation;
mod chunk_iteration;

/// Width and depth of a chunk in blocks.
pub const CHUNK_SIZE: usize = 16;
/// Height of a chunk (and of the world) in blocks.
pub const CHUNK_HEIGHT: usize = 256;
/// Number of vertical columns in a chunk.
pub const CHUNK_COLUMNS: usize = CHUNK_SIZE * CHUNK_SIZE;
/// Total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_COLUMNS * CHUNK_HEIGHT;

/// A fixed-size column of voxels addressed by its 2D chunk coordinate.
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: ChunkCoord,

    /// Dense voxel storage, see the module docs for the layout.
    blocks: Box<[BlockType]>,

    /// The mesh last built from `blocks`. Empty until the chunk is meshed.
    pub mesh: ChunkMesh,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn empty(position: ChunkCoord) -> Self {
        Self::filled(position, BlockType::AIR)
    }

    /// Creates a new chunk where every voxel is `block_type`.
    pub fn filled(position: ChunkCoord, block_type: BlockType) -> Self {
        let mut cci = ChunkCreationIterator::new(position);
        for _ in 0..CHUNK_VOLUME {
            cci.push_block_type(block_type);
        }
        cci.return_chunk()
    }

    /// Storage index of a local position.
    #[inline]
    pub(crate) fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_SIZE && y < CHUNK_HEIGHT && z < CHUNK_SIZE);
        (x * CHUNK_SIZE + z) * CHUNK_HEIGHT + y
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[Self::index(x, y, z)]
    }

    /// Gets the block at a local position that may fall outside this chunk.
    ///
    /// # Returns
    /// `None` if any component lies outside the chunk's bounds.
    pub fn get_block(&self, local: Point3<i32>) -> Option<BlockType> {
        let in_bounds = (0..CHUNK_SIZE as i32).contains(&local.x)
            && (0..CHUNK_HEIGHT as i32).contains(&local.y)
            && (0..CHUNK_SIZE as i32).contains(&local.z);
        in_bounds.then(|| self.block_at(local.x as usize, local.y as usize, local.z as usize))
    }

    /// Overwrites one voxel.
    ///
    /// # Returns
    /// The block that was there before.
    pub fn set_block_at(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) -> BlockType {
        std::mem::replace(&mut self.blocks[Self::index(x, y, z)], block_type)
    }

    /// The raw voxel array in storage order.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    /// Iterates over every non-air block with its local position.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Whether the chunk holds no solid block at all.
    pub fn is_all_air(&self) -> bool {
        self.blocks.iter().all(|block| !block.is_solid())
    }

    /// World position of this chunk's (0, 0, 0) block.
    pub fn world_origin(&self) -> Point3<i32> {
        chunk_origin(self.position)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;

    #[test]
    fn test_empty_chunk_is_all_air() {
        let chunk = Chunk::empty(Point2::new(0, 0));
        assert!(chunk.is_all_air());
        assert_eq!(chunk.blocks().len(), CHUNK_VOLUME);
        assert_eq!(chunk.iter_blocks().count(), 0);
        assert!(chunk.mesh.is_empty());
    }

    #[test]
    fn test_set_block_returns_previous() {
        let mut chunk = Chunk::empty(Point2::new(1, -1));
        assert_eq!(chunk.set_block_at(3, 100, 7, BlockType::SAND), BlockType::AIR);
        assert_eq!(chunk.set_block_at(3, 100, 7, BlockType::STONE), BlockType::SAND);
        assert_eq!(chunk.block_at(3, 100, 7), BlockType::STONE);
        assert!(!chunk.is_all_air());
    }

    #[test]
    fn test_get_block_bounds() {
        let chunk = Chunk::filled(Point2::new(0, 0), BlockType::DIRT);
        assert_eq!(chunk.get_block(Point3::new(0, 0, 0)), Some(BlockType::DIRT));
        assert_eq!(chunk.get_block(Point3::new(15, 255, 15)), Some(BlockType::DIRT));
        assert_eq!(chunk.get_block(Point3::new(-1, 0, 0)), None);
        assert_eq!(chunk.get_block(Point3::new(0, 256, 0)), None);
        assert_eq!(chunk.get_block(Point3::new(0, 0, 16)), None);
    }

    #[test]
    fn test_columns_are_contiguous() {
        assert_eq!(Chunk::index(0, 1, 0), 1);
        assert_eq!(Chunk::index(0, 0, 1), CHUNK_HEIGHT);
        assert_eq!(Chunk::index(1, 0, 0), CHUNK_SIZE * CHUNK_HEIGHT);
        assert_eq!(Chunk::index(15, 255, 15), CHUNK_VOLUME - 1);
    }

    #[test]
    fn test_world_origin() {
        let chunk = Chunk::empty(Point2::new(-2, 3));
        assert_eq!(chunk.world_origin(), Point3::new(-32, 0, 48));
    }
}
